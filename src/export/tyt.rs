//! TYT (MD-380 family) codeplug import dialect.

use std::borrow::Cow;

use serde::Serialize;

use crate::db::{ChannelView, Talkgroup};
use crate::error::ExportError;

/// Channel and contact names longer than this are cut by the radio firmware on import.
const NAME_MAX_CHARS: usize = 16;

/// Data rows shown by [`preview`] in the export endpoint.
pub const PREVIEW_ROWS: usize = 10;

pub const CHANNEL_HEADERS: [&str; 46] = [
    "No.",
    "Channel Name",
    "Receive Frequency",
    "Transmit Frequency",
    "Channel Type",
    "Transmit Power",
    "Band Width",
    "CTCSS/DCS Decode",
    "CTCSS/DCS Encode",
    "Contact",
    "Contact Call Type",
    "Contact TG/DMR ID",
    "Radio ID",
    "Busy Lock/TX Permit",
    "Squelch Mode",
    "Optional Signal",
    "DTMF ID",
    "2Tone ID",
    "5Tone ID",
    "PTT ID",
    "Color Code",
    "Slot",
    "Scan List",
    "Receive Group List",
    "PTT Prohibit",
    "Reverse",
    "Simplex TDMA",
    "Slot Suit",
    "AES Digital Encryption",
    "Digital Encryption",
    "Call Confirmation",
    "Talk Around(Simplex)",
    "Work Alone",
    "Custom CTCSS",
    "DMR MODE",
    "DataACK Disable",
    "APRS RX",
    "Analog APRS PTT Mode",
    "Digital APRS PTT Mode",
    "APRS Report Type",
    "Digital APRS Report Channel",
    "Correct Frequency[Hz]",
    "SMS Confirmation",
    "Exclude channel from roaming",
    "DMR Encryption",
    "Multiple Key",
];

pub const CONTACT_HEADERS: [&str; 10] = [
    "No.",
    "Radio ID",
    "Callsign",
    "Name",
    "City",
    "State",
    "Country",
    "Remarks",
    "Call Type",
    "Call Alert",
];

/// Firmware defaults for columns 34..=46 (`Custom CTCSS` through `Multiple Key`).
const CHANNEL_TAIL: [&str; 13] = [
    "251.1", "0", "Off", "Off", "Off", "Off", "Off", "1", "0", "Off", "0", "Off", "Off",
];

/// One row per channel, numbered from 1, under the 46-column TYT header.
pub fn render_channels(channels: &[ChannelView]) -> Result<String, ExportError> {
    if channels.is_empty() {
        return Err(ExportError::Empty("channels"));
    }

    let mut lines = Vec::with_capacity(channels.len() + 1);
    lines.push(CHANNEL_HEADERS.join(","));
    for (index, ch) in channels.iter().enumerate() {
        lines.push(channel_row(index + 1, ch));
    }
    Ok(lines.join("\n"))
}

fn channel_row(no: usize, ch: &ChannelView) -> String {
    let name = truncate_name(&format!("{}-{}", ch.repeater_name, ch.talkgroup_name));
    let contact = ch
        .contact_name
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(&ch.talkgroup_name);

    let head = [
        no.to_string(),
        name,
        format!("{:.5}", ch.rx_freq),
        format!("{:.5}", ch.tx_freq),
        "D-Digital".to_string(),
        "High".to_string(),
        "12.5K".to_string(),
        "Off".to_string(),
        "Off".to_string(),
        contact.to_string(),
        "Group Call".to_string(),
        ch.talkgroup_number.to_string(),
        "1".to_string(),
        "Off".to_string(),
        "Carrier".to_string(),
        "Off".to_string(),
        "1".to_string(),
        "1".to_string(),
        "1".to_string(),
        "Off".to_string(),
        ch.color_code.to_string(),
        ch.slot.to_string(),
        "None".to_string(),
        "None".to_string(),
        "Off".to_string(),
        "Off".to_string(),
        "Off".to_string(),
        "Off".to_string(),
        "Normal Encryption".to_string(),
        "Off".to_string(),
        "Off".to_string(),
        "Off".to_string(),
        "Off".to_string(),
    ];

    head.iter()
        .map(|f| escape_field(f))
        .chain(CHANNEL_TAIL.iter().map(|f| Cow::Borrowed(*f)))
        .collect::<Vec<_>>()
        .join(",")
}

/// One group-call contact per talkgroup, in the order given.
pub fn render_contacts(talkgroups: &[Talkgroup]) -> Result<String, ExportError> {
    if talkgroups.is_empty() {
        return Err(ExportError::Empty("talkgroups"));
    }

    let mut lines = Vec::with_capacity(talkgroups.len() + 1);
    lines.push(CONTACT_HEADERS.join(","));
    for (index, tg) in talkgroups.iter().enumerate() {
        let name = truncate_name(&tg.name);
        let row = [
            Cow::Owned((index + 1).to_string()),
            Cow::Owned(tg.number.to_string()),
            Cow::Borrowed(""),
            escape_field(&name),
            Cow::Borrowed(""),
            Cow::Borrowed(""),
            Cow::Borrowed(""),
            escape_field(&tg.kind),
            Cow::Borrowed("Group Call"),
            Cow::Borrowed("None"),
        ];
        lines.push(row.join(","));
    }
    Ok(lines.join("\n"))
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CsvPreview {
    pub preview: String,
    pub total_lines: usize,
}

/// Header plus the first `rows` data lines, and the line count of the whole document.
pub fn preview(csv: &str, rows: usize) -> CsvPreview {
    let lines: Vec<&str> = csv.split('\n').collect();
    CsvPreview {
        preview: lines[..lines.len().min(rows + 1)].join("\n"),
        total_lines: lines.len(),
    }
}

fn truncate_name(name: &str) -> String {
    name.chars().take(NAME_MAX_CHARS).collect()
}

/// Line breaks become spaces so every record stays on one line; a field with a
/// separator or quote is then quoted.
fn escape_field(field: &str) -> Cow<'_, str> {
    let field = if field.contains(['\n', '\r']) {
        Cow::Owned(field.replace(['\n', '\r'], " "))
    } else {
        Cow::Borrowed(field)
    };
    if field.contains([',', '"']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(repeater_name: &str, talkgroup_name: &str) -> ChannelView {
        ChannelView {
            channel_id: 1,
            repeater_id: 1,
            tg_id: 1,
            slot: 2,
            contact_name: Some(talkgroup_name.to_string()),
            rx_freq: 447.5,
            tx_freq: 442.5,
            color_code: 3,
            repeater_name: repeater_name.to_string(),
            talkgroup_name: talkgroup_name.to_string(),
            talkgroup_number: 3100,
        }
    }

    fn fields(line: &str) -> Vec<&str> {
        line.split(',').collect()
    }

    #[test]
    fn header_has_every_firmware_column() {
        let csv = render_channels(&[channel("W9ABC", "USA")]).unwrap();
        let header = csv.lines().next().unwrap();

        assert_eq!(fields(header).len(), 46);
        assert!(header.starts_with("No.,Channel Name,Receive Frequency"));
        assert!(header.ends_with("DMR Encryption,Multiple Key"));
    }

    #[test]
    fn channel_row_carries_snapshot_values() {
        let csv = render_channels(&[channel("W9ABC", "USA")]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        let f = fields(row);

        assert_eq!(f.len(), 46);
        assert_eq!(f[0], "1");
        assert_eq!(f[1], "W9ABC-USA");
        assert_eq!(f[2], "447.50000");
        assert_eq!(f[3], "442.50000");
        assert_eq!(f[9], "USA");
        assert_eq!(f[11], "3100");
        assert_eq!(f[20], "3");
        assert_eq!(f[21], "2");
        assert_eq!(f[28], "Normal Encryption");
        assert_eq!(f[33], "251.1");
        assert_eq!(f[45], "Off");
    }

    #[test]
    fn long_names_are_cut_to_sixteen_chars() {
        let csv = render_channels(&[channel("KC9XYZ-Repeater", "Worldwide")]).unwrap();
        let name = fields(csv.lines().nth(1).unwrap())[1];

        assert_eq!(name.chars().count(), 16);
        assert_eq!(name, "KC9XYZ-Repeater-");
    }

    #[test]
    fn empty_contact_falls_back_to_talkgroup_name() {
        let mut ch = channel("W9ABC", "USA");
        ch.contact_name = Some(String::new());
        let csv = render_channels(&[ch]).unwrap();

        assert_eq!(fields(csv.lines().nth(1).unwrap())[9], "USA");
    }

    #[test]
    fn k_channels_render_k_plus_one_lines() {
        let channels: Vec<_> = (0..3).map(|_| channel("W9ABC", "USA")).collect();
        let csv = render_channels(&channels).unwrap();

        assert_eq!(csv.split('\n').count(), 4);
        assert!(!csv.ends_with('\n'));
        assert!(csv.lines().nth(3).unwrap().starts_with("3,"));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert_eq!(render_channels(&[]), Err(ExportError::Empty("channels")));
        assert_eq!(render_contacts(&[]), Err(ExportError::Empty("talkgroups")));
    }

    #[test]
    fn fields_with_separators_are_quoted() {
        let csv = render_channels(&[channel("Ops", "A,\"B\"")]).unwrap();
        let row = csv.lines().nth(1).unwrap();

        assert!(row.contains(",\"A,\"\"B\"\"\","));
    }

    #[test]
    fn line_breaks_in_names_stay_on_one_row() {
        let csv = render_channels(&[channel("W9\nABC", "US\r\nA, East")]).unwrap();

        assert_eq!(csv.split('\n').count(), 2);
        let row = csv.split('\n').nth(1).unwrap();
        assert!(row.starts_with("1,\"W9 ABC-US  A, Ea\","));
        assert_eq!(preview(&csv, PREVIEW_ROWS).total_lines, 2);
    }

    #[test]
    fn contacts_use_number_and_type() {
        let tg = Talkgroup {
            tg_id: 1,
            name: "North America Regional".to_string(),
            number: 93,
            kind: "BrandMeister".to_string(),
            description: None,
            bm_id: Some(93),
            last_synced: None,
        };

        let csv = render_contacts(&[tg]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next().unwrap(), CONTACT_HEADERS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "1,93,,North America Re,,,,BrandMeister,Group Call,None"
        );
    }

    #[test]
    fn preview_keeps_header_and_first_rows() {
        let channels: Vec<_> = (0..12).map(|_| channel("W9ABC", "USA")).collect();
        let csv = render_channels(&channels).unwrap();

        let p = preview(&csv, PREVIEW_ROWS);

        assert_eq!(p.total_lines, 13);
        assert_eq!(p.preview.split('\n').count(), 11);
        assert!(p.preview.split('\n').last().unwrap().starts_with("10,"));
    }
}
