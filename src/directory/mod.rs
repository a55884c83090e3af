//! Read-only access to the BrandMeister device and talkgroup directory.

mod client;
mod filters;

use async_trait::async_trait;
use dmr_schema::{Device, StaticTalkgroup, TalkgroupEntry};
use serde_json::Value;

use crate::error::DirectoryError;

pub use client::BrandmeisterClient;
pub use filters::{filter_by_location, filter_us, parse_location_terms};

/// The directory operations the importer depends on.
///
/// `BrandmeisterClient` is the production implementation; tests substitute their own.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn list_talkgroups(&self) -> Result<Vec<TalkgroupEntry>, DirectoryError>;

    async fn get_device(&self, id: i64) -> Result<Device, DirectoryError>;

    /// Opaque profile document, passed through untouched.
    async fn get_device_profile(&self, id: i64) -> Result<Value, DirectoryError>;

    async fn get_device_talkgroups(&self, id: i64) -> Result<Vec<StaticTalkgroup>, DirectoryError>;

    async fn search_by_callsign(&self, callsign: &str) -> Result<Vec<Device>, DirectoryError>;

    async fn list_repeaters(&self) -> Result<Vec<Device>, DirectoryError>;

    async fn us_repeaters(&self) -> Result<Vec<Device>, DirectoryError> {
        Ok(filter_us(self.list_repeaters().await?))
    }

    async fn repeaters_by_location(&self, terms: &[String]) -> Result<Vec<Device>, DirectoryError> {
        Ok(filter_by_location(self.list_repeaters().await?, terms))
    }
}
