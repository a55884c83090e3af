pub mod channels;
pub mod export;
pub mod meta;
pub mod repeaters;
pub mod talkgroups;

use serde::{Deserialize, Deserializer, de::Error as _};

use crate::error::DmrError;

/// `?q=` for search endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

impl SearchQuery {
    /// The trimmed query, or a validation error when it is missing or blank.
    pub fn required(&self) -> Result<&str, DmrError> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| DmrError::validation("Missing search query (q)"))
    }
}

/// `?repeater_id=` for channel listing and export. A blank value means every repeater.
#[derive(Debug, Default, Deserialize)]
pub struct RepeaterFilter {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub repeater_id: Option<i64>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| D::Error::custom(format!("expected an integer, got {s:?}")))
        })
        .transpose()
}
