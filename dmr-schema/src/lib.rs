pub mod brandmeister;
pub mod lax;

pub use brandmeister::{Device, StaticTalkgroup, TalkgroupEntry, flatten_talkgroup_directory};
