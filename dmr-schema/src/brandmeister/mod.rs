//! Wire types for the BrandMeister v2 REST API.
//!
//! Only the fields the importer reads are typed; everything else is kept in `extra`
//! so search results can be handed back to API clients unchanged.

mod device;
mod talkgroup;

pub use device::{Device, StaticTalkgroup};
pub use talkgroup::{TalkgroupEntry, flatten_talkgroup_directory};
