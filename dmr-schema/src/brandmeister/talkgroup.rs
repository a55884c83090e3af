use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of the `/talkgroup` directory, which the service returns as a single
/// `{ "<number>": "<name>", ... }` object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TalkgroupEntry {
    pub id: i64,
    pub name: Option<String>,
}

/// Flattens the talkgroup directory object into entries ordered by id.
///
/// Returns the entries and the keys that were skipped because they are not integers.
pub fn flatten_talkgroup_directory(raw: Map<String, Value>) -> (Vec<TalkgroupEntry>, Vec<String>) {
    let mut skipped = Vec::new();
    let mut entries: Vec<TalkgroupEntry> = raw
        .into_iter()
        .filter_map(|(key, value)| {
            let Ok(id) = key.trim().parse::<i64>() else {
                skipped.push(key);
                return None;
            };
            let name = match value {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            };
            Some(TalkgroupEntry { id, name })
        })
        .collect();

    entries.sort_by_key(|e| e.id);
    (entries, skipped)
}
