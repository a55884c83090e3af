//! Mapping from directory records to local record shapes.

use std::sync::LazyLock;

use chrono::Utc;
use dmr_schema::{Device, TalkgroupEntry};
use regex::Regex;

use crate::db::{BRANDMEISTER_TYPE, RepeaterInput, TalkgroupInput};

static BM_ID_IN_NOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BM ID: (\d+)").expect("valid BM ID regex"));

/// Builds a local repeater from a directory device.
///
/// The device id is written into `notes` as `BM ID: <id>.` so it can be recovered later by
/// [`extract_bm_id`].
pub fn transform_device(device: &Device) -> RepeaterInput {
    let name = device
        .callsign
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map_or_else(|| format!("Repeater {}", device.id), str::to_string);

    let (city, state) = split_location(device.city.as_deref().unwrap_or_default());

    let color_code = device
        .colorcode
        .filter(|cc| (1..=15).contains(cc))
        .unwrap_or(1);

    RepeaterInput {
        name,
        city,
        state,
        tx_freq: parse_mhz(device.tx.as_deref()),
        rx_freq: parse_mhz(device.rx.as_deref()),
        color_code,
        default_slot: 1,
        notes: Some(format!(
            "BM ID: {}. {}",
            device.id,
            device.description.as_deref().unwrap_or_default()
        )),
    }
}

/// Directory talkgroup entry as a local talkgroup, stamped as synced now.
pub fn talkgroup_from_entry(entry: &TalkgroupEntry) -> TalkgroupInput {
    TalkgroupInput {
        name: entry
            .name
            .clone()
            .unwrap_or_else(|| format!("TG {}", entry.id)),
        number: entry.id,
        kind: BRANDMEISTER_TYPE.to_string(),
        description: None,
        bm_id: Some(entry.id),
        last_synced: Some(Utc::now()),
    }
}

/// Recovers the directory id from repeater notes written by [`transform_device`].
pub fn extract_bm_id(notes: Option<&str>) -> Option<i64> {
    BM_ID_IN_NOTES
        .captures(notes?)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// `"Springfield, IL"` becomes `("Springfield", "IL")`. Parts after the second are dropped.
fn split_location(raw: &str) -> (Option<String>, Option<String>) {
    let mut parts = raw
        .split(',')
        .map(|s| Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string));
    let city = parts.next().flatten();
    let state = parts.next().flatten();
    (city, state)
}

fn parse_mhz(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}
