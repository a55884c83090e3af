use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::lax;

/// A device (hotspot or repeater) as returned by `/device/{id}`, `/device?repeater=true`
/// and `/device/byCall`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    #[serde(deserialize_with = "lax::int")]
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,

    /// Free-form location, usually `"City, State"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Transmit frequency in MHz, as text.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lax::opt_string"
    )]
    pub tx: Option<String>,

    /// Receive frequency in MHz, as text.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lax::opt_string"
    )]
    pub rx: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lax::opt_int"
    )]
    pub colorcode: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Device {
    /// A minimal device with only its id set.
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            callsign: None,
            city: None,
            tx: None,
            rx: None,
            colorcode: None,
            description: None,
            extra: BTreeMap::new(),
        }
    }
}

/// One static talkgroup assignment from `/device/{id}/talkgroup`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaticTalkgroup {
    #[serde(deserialize_with = "lax::int")]
    pub talkgroup: i64,

    #[serde(deserialize_with = "lax::int")]
    pub slot: i64,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}
