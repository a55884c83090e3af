//! Reconciliation of directory records into the local store.

mod service;
mod transform;

pub use service::{ImportOutcome, ImportStep, Reconciler, StaticAssignment, TALKGROUP_SYNC};
pub use transform::{extract_bm_id, talkgroup_from_entry, transform_device};
