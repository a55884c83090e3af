use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Repeater {
    pub repeater_id: i64,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub tx_freq: f64,
    pub rx_freq: f64,
    pub color_code: i64,
    pub default_slot: i64,
    /// Free text. Imported repeaters carry `BM ID: <id>.` here; auto-channel creation reads it back.
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Talkgroup {
    pub tg_id: i64,
    pub name: String,
    /// Natural key. Unique across the table.
    pub number: i64,
    /// Provenance tag, e.g. `BrandMeister` or `Manual`.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub bm_id: Option<i64>,
    pub last_synced: Option<DateTime<Utc>>,
}

/// A channel row joined with its parents' display fields.
///
/// `repeater_name`, `talkgroup_name` and `talkgroup_number` are live values from the parent rows.
/// `contact_name`, the frequencies and `color_code` are what was stored when the channel was
/// created and are the values used for export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct ChannelView {
    pub channel_id: i64,
    pub repeater_id: i64,
    pub tg_id: i64,
    pub slot: i64,
    pub contact_name: Option<String>,
    pub rx_freq: f64,
    pub tx_freq: f64,
    pub color_code: i64,
    pub repeater_name: String,
    pub talkgroup_name: String,
    pub talkgroup_number: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SyncStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct SyncRecord {
    pub id: i64,
    pub sync_type: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records_synced: Option<i64>,
    pub status: SyncStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Stats {
    pub repeaters: i64,
    pub talkgroups: i64,
    pub channels: i64,
}
