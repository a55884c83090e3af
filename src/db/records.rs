//! Write-side record shapes and their boundary validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{Repeater, Talkgroup};
use crate::error::DmrError;

/// Provenance tag for talkgroups created by directory sync or channel expansion.
pub const BRANDMEISTER_TYPE: &str = "BrandMeister";

/// Checks a decoded request body before it reaches the store.
pub trait Validate {
    fn validate(&self) -> Result<(), DmrError>;
}

/// Full repeater record for create and replace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepeaterInput {
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub tx_freq: f64,
    pub rx_freq: f64,
    #[serde(default = "default_color_code")]
    pub color_code: i64,
    #[serde(default = "default_slot")]
    pub default_slot: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for RepeaterInput {
    fn validate(&self) -> Result<(), DmrError> {
        require_text("name", &self.name)?;
        require_frequency("tx_freq", self.tx_freq)?;
        require_frequency("rx_freq", self.rx_freq)?;
        require_color_code(self.color_code)?;
        require_slot("default_slot", self.default_slot)
    }
}

/// Full talkgroup record for create, replace and upsert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TalkgroupInput {
    pub name: String,
    pub number: i64,
    #[serde(rename = "type", default = "default_talkgroup_type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bm_id: Option<i64>,
    #[serde(default)]
    pub last_synced: Option<DateTime<Utc>>,
}

impl TalkgroupInput {
    /// Placeholder for a talkgroup referenced by the directory but not yet known locally.
    pub fn placeholder(number: i64) -> Self {
        Self {
            name: format!("TG {number}"),
            number,
            kind: BRANDMEISTER_TYPE.to_string(),
            description: None,
            bm_id: Some(number),
            last_synced: Some(Utc::now()),
        }
    }
}

impl Validate for TalkgroupInput {
    fn validate(&self) -> Result<(), DmrError> {
        require_text("name", &self.name)?;
        require_text("type", &self.kind)?;
        if self.number <= 0 {
            return Err(DmrError::validation(format!(
                "number must be a positive talkgroup number, got {}",
                self.number
            )));
        }
        Ok(())
    }
}

/// Channel as submitted by a client. Omitted snapshot fields are filled in by
/// [`NewChannel::from_parents`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelInput {
    pub repeater_id: i64,
    pub tg_id: i64,
    pub slot: i64,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub rx_freq: Option<f64>,
    #[serde(default)]
    pub tx_freq: Option<f64>,
    #[serde(default)]
    pub color_code: Option<i64>,
}

impl Validate for ChannelInput {
    fn validate(&self) -> Result<(), DmrError> {
        require_slot("slot", self.slot)?;
        if let Some(f) = self.rx_freq {
            require_frequency("rx_freq", f)?;
        }
        if let Some(f) = self.tx_freq {
            require_frequency("tx_freq", f)?;
        }
        if let Some(cc) = self.color_code {
            require_color_code(cc)?;
        }
        Ok(())
    }
}

/// Channel row as written to the store, snapshots resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewChannel {
    pub repeater_id: i64,
    pub tg_id: i64,
    pub slot: i64,
    pub contact_name: Option<String>,
    pub rx_freq: f64,
    pub tx_freq: f64,
    pub color_code: i64,
}

impl NewChannel {
    /// Snapshot the parents as they are right now. The channel never follows later edits.
    pub fn from_parents(repeater: &Repeater, talkgroup: &Talkgroup, slot: i64) -> Self {
        Self {
            repeater_id: repeater.repeater_id,
            tg_id: talkgroup.tg_id,
            slot,
            contact_name: Some(talkgroup.name.clone()),
            rx_freq: repeater.rx_freq,
            tx_freq: repeater.tx_freq,
            color_code: repeater.color_code,
        }
    }

    /// Client-supplied values win over the parent snapshot.
    pub fn from_input(input: ChannelInput, repeater: &Repeater, talkgroup: &Talkgroup) -> Self {
        let base = Self::from_parents(repeater, talkgroup, input.slot);
        Self {
            contact_name: input.contact_name.or(base.contact_name),
            rx_freq: input.rx_freq.unwrap_or(base.rx_freq),
            tx_freq: input.tx_freq.unwrap_or(base.tx_freq),
            color_code: input.color_code.unwrap_or(base.color_code),
            ..base
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), DmrError> {
    if value.trim().is_empty() {
        return Err(DmrError::validation(format!("Missing {field}")));
    }
    Ok(())
}

fn require_frequency(field: &str, mhz: f64) -> Result<(), DmrError> {
    if !mhz.is_finite() || mhz < 0.0 {
        return Err(DmrError::validation(format!(
            "{field} must be a non-negative frequency in MHz, got {mhz}"
        )));
    }
    Ok(())
}

fn require_color_code(cc: i64) -> Result<(), DmrError> {
    if !(1..=15).contains(&cc) {
        return Err(DmrError::validation(format!(
            "color_code must be between 1 and 15, got {cc}"
        )));
    }
    Ok(())
}

fn require_slot(field: &str, slot: i64) -> Result<(), DmrError> {
    if slot != 1 && slot != 2 {
        return Err(DmrError::validation(format!("{field} must be 1 or 2, got {slot}")));
    }
    Ok(())
}

fn default_color_code() -> i64 {
    1
}

fn default_slot() -> i64 {
    1
}

fn default_talkgroup_type() -> String {
    "Manual".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repeater() -> Repeater {
        Repeater {
            repeater_id: 7,
            name: "W9ABC".to_string(),
            city: None,
            state: None,
            tx_freq: 442.5,
            rx_freq: 447.5,
            color_code: 3,
            default_slot: 1,
            notes: None,
        }
    }

    fn talkgroup() -> Talkgroup {
        Talkgroup {
            tg_id: 11,
            name: "Worldwide".to_string(),
            number: 91,
            kind: BRANDMEISTER_TYPE.to_string(),
            description: None,
            bm_id: Some(91),
            last_synced: None,
        }
    }

    #[test]
    fn repeater_defaults_fill_color_code_and_slot() {
        let input: RepeaterInput =
            serde_json::from_value(json!({"name": "K1", "tx_freq": 1.0, "rx_freq": 2.0})).unwrap();

        assert_eq!(input.color_code, 1);
        assert_eq!(input.default_slot, 1);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn repeater_rejects_out_of_range_fields() {
        let base: RepeaterInput =
            serde_json::from_value(json!({"name": "K1", "tx_freq": 1.0, "rx_freq": 2.0})).unwrap();

        let bad_cc = RepeaterInput { color_code: 16, ..base.clone() };
        let bad_slot = RepeaterInput { default_slot: 3, ..base.clone() };
        let blank = RepeaterInput { name: "  ".to_string(), ..base.clone() };
        let nan = RepeaterInput { tx_freq: f64::NAN, ..base };

        for input in [bad_cc, bad_slot, blank, nan] {
            assert!(matches!(input.validate(), Err(DmrError::Validation(_))));
        }
    }

    #[test]
    fn talkgroup_type_defaults_to_manual() {
        let input: TalkgroupInput =
            serde_json::from_value(json!({"name": "Local", "number": 2})).unwrap();
        assert_eq!(input.kind, "Manual");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn placeholder_uses_number_as_name_and_external_id() {
        let tg = TalkgroupInput::placeholder(3100);
        assert_eq!(tg.name, "TG 3100");
        assert_eq!(tg.kind, BRANDMEISTER_TYPE);
        assert_eq!(tg.bm_id, Some(3100));
    }

    #[test]
    fn channel_snapshot_copies_parents() {
        let ch = NewChannel::from_parents(&repeater(), &talkgroup(), 2);

        assert_eq!(ch.repeater_id, 7);
        assert_eq!(ch.tg_id, 11);
        assert_eq!(ch.slot, 2);
        assert_eq!(ch.contact_name.as_deref(), Some("Worldwide"));
        assert_eq!((ch.rx_freq, ch.tx_freq, ch.color_code), (447.5, 442.5, 3));
    }

    #[test]
    fn channel_input_overrides_snapshot() {
        let input = ChannelInput {
            repeater_id: 7,
            tg_id: 11,
            slot: 1,
            contact_name: Some("WW".to_string()),
            rx_freq: None,
            tx_freq: Some(440.0),
            color_code: None,
        };

        let ch = NewChannel::from_input(input, &repeater(), &talkgroup());

        assert_eq!(ch.contact_name.as_deref(), Some("WW"));
        assert_eq!((ch.rx_freq, ch.tx_freq, ch.color_code), (447.5, 440.0, 3));
    }
}
