//! SQL DDL for initializing the database schema.
//!
//! Runs on every start. Tables are `IF NOT EXISTS` with the column names of earlier releases.
//! Those releases allowed several talkgroups with one `number`; before the unique index is
//! built, channels are moved to the oldest row of each number and the other rows deleted.

/// SQLite schema includes:
/// - `repeaters`, `talkgroups`, `channels` (channels reference both parents, not enforced)
/// - `sync_log` (one row per directory sync attempt)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Repeaters
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS repeaters (
    repeater_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    city TEXT NULL,
    state TEXT NULL,
    tx_freq REAL NOT NULL,
    rx_freq REAL NOT NULL,
    color_code INTEGER NOT NULL DEFAULT 1,
    default_slot INTEGER NOT NULL DEFAULT 1,
    notes TEXT NULL
);

-- ---------------------------------------------------------------------------
-- Talkgroups (number is the natural key used by directory sync)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS talkgroups (
    tg_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    number INTEGER NOT NULL,
    type TEXT NOT NULL,
    description TEXT NULL,
    bm_id INTEGER NULL,
    last_synced TEXT NULL -- RFC3339
);

-- ---------------------------------------------------------------------------
-- Channels (contact_name, frequencies and color_code are creation-time snapshots)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS channels (
    channel_id INTEGER PRIMARY KEY AUTOINCREMENT,
    repeater_id INTEGER NOT NULL,
    tg_id INTEGER NOT NULL,
    slot INTEGER NOT NULL,
    contact_name TEXT NULL,
    rx_freq REAL NOT NULL,
    tx_freq REAL NOT NULL,
    color_code INTEGER NOT NULL,
    FOREIGN KEY (repeater_id) REFERENCES repeaters(repeater_id),
    FOREIGN KEY (tg_id) REFERENCES talkgroups(tg_id)
);

CREATE INDEX IF NOT EXISTS idx_channels_repeater ON channels(repeater_id);

-- ---------------------------------------------------------------------------
-- Talkgroup number uniqueness (folds duplicates left by earlier releases)
-- ---------------------------------------------------------------------------
UPDATE channels
SET tg_id = (
    SELECT MIN(keep.tg_id)
    FROM talkgroups AS dup
    JOIN talkgroups AS keep ON keep.number = dup.number
    WHERE dup.tg_id = channels.tg_id
)
WHERE tg_id IN (
    SELECT tg_id FROM talkgroups
    WHERE tg_id NOT IN (SELECT MIN(tg_id) FROM talkgroups GROUP BY number)
);

DELETE FROM talkgroups
WHERE tg_id NOT IN (SELECT MIN(tg_id) FROM talkgroups GROUP BY number);

CREATE UNIQUE INDEX IF NOT EXISTS idx_talkgroups_number_unique ON talkgroups(number);

-- ---------------------------------------------------------------------------
-- Sync log
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS sync_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sync_type TEXT NOT NULL,
    started_at TEXT NOT NULL, -- RFC3339
    completed_at TEXT NULL, -- RFC3339
    records_synced INTEGER NULL,
    status TEXT NOT NULL DEFAULT 'running'
);

CREATE INDEX IF NOT EXISTS idx_sync_log_type ON sync_log(sync_type);
"#;
