//! Database module: models, records and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows (and the joined channel view)
//! - `records.rs`: write-side shapes plus boundary validation
//! - `schema.rs`: SQL DDL for initializing the database (SQLite)
//! - `queries/`: per-table SQL, executed only by the actor
//! - `actor.rs`: the single owner of the pool and its RPC handle

pub mod actor;
pub mod models;
pub mod records;
pub mod schema;

mod queries;

pub use actor::{DbActorHandle, spawn};
pub use models::{ChannelView, Repeater, Stats, SyncRecord, SyncStatus, Talkgroup};
pub use records::{
    BRANDMEISTER_TYPE, ChannelInput, NewChannel, RepeaterInput, TalkgroupInput, Validate,
};
pub use schema::SQLITE_INIT;
