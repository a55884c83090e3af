mod common;

use dmr_builder::DmrError;
use dmr_builder::db::{NewChannel, RepeaterInput, SyncStatus, TalkgroupInput};

fn repeater(name: &str) -> RepeaterInput {
    RepeaterInput {
        name: name.to_string(),
        city: Some("Springfield".to_string()),
        state: Some("IL".to_string()),
        tx_freq: 442.5,
        rx_freq: 447.5,
        color_code: 1,
        default_slot: 1,
        notes: None,
    }
}

fn talkgroup(name: &str, number: i64) -> TalkgroupInput {
    TalkgroupInput {
        name: name.to_string(),
        number,
        kind: "Manual".to_string(),
        description: None,
        bm_id: None,
        last_synced: None,
    }
}

#[tokio::test]
async fn repeater_crud_and_search() {
    let db = common::temp_db("repeaters").await;

    assert!(db.list_repeaters().await.unwrap().is_empty());

    let created = db.create_repeater(repeater("W9ABC")).await.unwrap();
    assert_eq!(created.name, "W9ABC");
    assert_eq!(db.get_repeater(created.repeater_id).await.unwrap(), Some(created.clone()));

    // Case-insensitive over name, city and state.
    assert_eq!(db.search_repeaters("w9a").await.unwrap().len(), 1);
    assert_eq!(db.search_repeaters("SPRING").await.unwrap().len(), 1);
    assert_eq!(db.search_repeaters("il").await.unwrap().len(), 1);
    assert!(db.search_repeaters("chicago").await.unwrap().is_empty());
    // Wildcard characters are matched literally.
    assert!(db.search_repeaters("%").await.unwrap().is_empty());

    let mut munich = repeater("DB0MU");
    munich.city = Some("München".to_string());
    munich.state = Some("BY".to_string());
    let munich = db.create_repeater(munich).await.unwrap();
    let found = db.search_repeaters("MÜNCHEN").await.unwrap();
    assert_eq!(found, vec![munich.clone()]);
    db.delete_repeater(munich.repeater_id).await.unwrap();

    let mut replacement = repeater("W9ABC-R");
    replacement.city = None;
    let updated = db
        .update_repeater(created.repeater_id, replacement)
        .await
        .unwrap()
        .expect("row exists");
    assert_eq!(updated.name, "W9ABC-R");
    assert_eq!(updated.city, None);

    assert_eq!(db.update_repeater(9999, repeater("ghost")).await.unwrap(), None);

    assert_eq!(db.delete_repeater(created.repeater_id).await.unwrap(), 1);
    assert_eq!(db.get_repeater(created.repeater_id).await.unwrap(), None);
}

#[tokio::test]
async fn upsert_by_number_keeps_one_row_with_latest_name() {
    let db = common::temp_db("upsert").await;

    let mut first = talkgroup("Old name", 3100);
    first.kind = "BrandMeister".to_string();
    let a = db.upsert_talkgroup(first).await.unwrap();

    let mut second = talkgroup("USA", 3100);
    second.kind = "BrandMeister".to_string();
    second.bm_id = Some(3100);
    let b = db.upsert_talkgroup(second).await.unwrap();

    assert_eq!(a.tg_id, b.tg_id);
    assert_eq!(b.name, "USA");
    assert_eq!(b.bm_id, Some(3100));

    let all = db.list_talkgroups().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "USA");
    assert_eq!(all[0].number, 3100);
}

#[tokio::test]
async fn duplicate_talkgroup_number_is_a_validation_error() {
    let db = common::temp_db("tg-unique").await;

    let local = db.create_talkgroup(talkgroup("Local", 2)).await.unwrap();
    let err = db.create_talkgroup(talkgroup("Other", 2)).await.unwrap_err();
    assert!(matches!(err, DmrError::Validation(_)), "got {err:?}");

    let other = db.create_talkgroup(talkgroup("Other", 3)).await.unwrap();
    let err = db
        .update_talkgroup(other.tg_id, talkgroup("Other", 2))
        .await
        .unwrap_err();
    assert!(matches!(err, DmrError::Validation(_)), "got {err:?}");

    assert_eq!(
        db.get_talkgroup_by_number(2).await.unwrap().map(|t| t.tg_id),
        Some(local.tg_id)
    );
    assert_eq!(db.update_talkgroup(9999, talkgroup("Ghost", 9)).await.unwrap(), None);
}

#[tokio::test]
async fn talkgroup_search_matches_name_and_number_text() {
    let db = common::temp_db("tg-search").await;
    db.create_talkgroup(talkgroup("Worldwide", 91)).await.unwrap();
    db.create_talkgroup(talkgroup("USA", 3100)).await.unwrap();
    db.create_talkgroup(talkgroup("Illinois", 3117)).await.unwrap();

    let by_number: Vec<i64> = db
        .search_talkgroups("31")
        .await
        .unwrap()
        .iter()
        .map(|t| t.number)
        .collect();
    assert_eq!(by_number, vec![3100, 3117]);

    assert_eq!(db.search_talkgroups("world").await.unwrap().len(), 1);

    db.create_talkgroup(talkgroup("Österreich", 232)).await.unwrap();
    assert_eq!(db.search_talkgroups("österreich").await.unwrap().len(), 1);
}

#[tokio::test]
async fn channels_snapshot_parents_and_hide_orphans() {
    let db = common::temp_db("channels").await;

    let r = db.create_repeater(repeater("W9ABC")).await.unwrap();
    let tg = db.create_talkgroup(talkgroup("Worldwide", 91)).await.unwrap();

    let ch = db
        .create_channel(NewChannel::from_parents(&r, &tg, 2))
        .await
        .unwrap()
        .expect("parents exist");
    assert_eq!(ch.contact_name.as_deref(), Some("Worldwide"));
    assert_eq!((ch.tx_freq, ch.rx_freq, ch.color_code), (442.5, 447.5, 1));
    assert_eq!(ch.repeater_name, "W9ABC");
    assert_eq!(ch.talkgroup_number, 91);

    // Parent edits show up in the live join columns but never in the snapshot.
    let mut moved = repeater("W9ABC");
    moved.tx_freq = 440.0;
    db.update_repeater(r.repeater_id, moved).await.unwrap();
    db.update_talkgroup(tg.tg_id, talkgroup("WW", 91)).await.unwrap();

    let ch = db.get_channel(ch.channel_id).await.unwrap().unwrap();
    assert_eq!(ch.tx_freq, 442.5);
    assert_eq!(ch.contact_name.as_deref(), Some("Worldwide"));
    assert_eq!(ch.talkgroup_name, "WW");

    assert_eq!(db.list_channels(Some(r.repeater_id)).await.unwrap().len(), 1);
    assert!(db.list_channels(Some(r.repeater_id + 1)).await.unwrap().is_empty());

    // Deleting the talkgroup leaves the channel row but reads no longer return it.
    assert_eq!(db.delete_talkgroup(tg.tg_id).await.unwrap(), 1);
    assert!(db.list_channels(None).await.unwrap().is_empty());
    assert_eq!(db.get_channel(ch.channel_id).await.unwrap(), None);
    assert_eq!(db.stats().await.unwrap().channels, 1);

    assert_eq!(db.delete_channels_for_repeater(r.repeater_id).await.unwrap(), 1);
    assert_eq!(db.stats().await.unwrap().channels, 0);
}

#[tokio::test]
async fn channel_update_replaces_row_or_reports_missing() {
    let db = common::temp_db("channel-update").await;
    let r = db.create_repeater(repeater("W9ABC")).await.unwrap();
    let tg = db.create_talkgroup(talkgroup("USA", 3100)).await.unwrap();
    let ch = db
        .create_channel(NewChannel::from_parents(&r, &tg, 1))
        .await
        .unwrap()
        .unwrap();

    let mut replacement = NewChannel::from_parents(&r, &tg, 2);
    replacement.contact_name = Some("USA Nationwide".to_string());
    let updated = db
        .update_channel(ch.channel_id, replacement.clone())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.slot, 2);
    assert_eq!(updated.contact_name.as_deref(), Some("USA Nationwide"));

    assert_eq!(db.update_channel(9999, replacement).await.unwrap(), None);
    assert_eq!(db.delete_channel(ch.channel_id).await.unwrap(), 1);
    assert_eq!(db.delete_channel(ch.channel_id).await.unwrap(), 0);
}

#[tokio::test]
async fn sync_log_moves_from_running_to_terminal_once() {
    let db = common::temp_db("sync-log").await;

    assert_eq!(db.last_sync("talkgroups").await.unwrap(), None);

    let id = db.begin_sync("talkgroups").await.unwrap();
    let running = db.last_sync("talkgroups").await.unwrap().unwrap();
    assert_eq!(running.id, id);
    assert_eq!(running.status, SyncStatus::Running);
    assert_eq!(running.records_synced, None);
    assert_eq!(running.completed_at, None);

    let err = db.complete_sync(id, SyncStatus::Running, 0).await.unwrap_err();
    assert!(matches!(err, DmrError::Unexpected(_)));

    let done = db.complete_sync(id, SyncStatus::Completed, 42).await.unwrap();
    assert_eq!(done.status, SyncStatus::Completed);
    assert_eq!(done.records_synced, Some(42));
    assert!(done.completed_at.is_some());

    let again = db.complete_sync(id, SyncStatus::Failed, 0).await.unwrap_err();
    assert!(matches!(again, DmrError::Unexpected(_)));

    let missing = db.complete_sync(id + 100, SyncStatus::Failed, 0).await.unwrap_err();
    assert!(matches!(missing, DmrError::NotFound(_)));

    let second = db.begin_sync("talkgroups").await.unwrap();
    assert_eq!(db.last_sync("talkgroups").await.unwrap().unwrap().id, second);
    assert_eq!(db.last_sync("repeaters").await.unwrap(), None);
}

#[tokio::test]
async fn stats_count_every_table() {
    let db = common::temp_db("stats").await;
    let r = db.create_repeater(repeater("W9ABC")).await.unwrap();
    let tg = db.create_talkgroup(talkgroup("USA", 3100)).await.unwrap();
    db.create_talkgroup(talkgroup("Worldwide", 91)).await.unwrap();
    db.create_channel(NewChannel::from_parents(&r, &tg, 1))
        .await
        .unwrap();

    let stats = db.stats().await.unwrap();
    assert_eq!((stats.repeaters, stats.talkgroups, stats.channels), (1, 2, 1));
}

#[tokio::test]
async fn duplicate_talkgroup_numbers_from_older_databases_are_folded() {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
    use std::str::FromStr;

    let url = common::temp_db_url("legacy");
    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::from_str(&url)
            .unwrap()
            .create_if_missing(true),
    )
    .await
    .unwrap();
    for stmt in [
        "CREATE TABLE repeaters (repeater_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, \
         city TEXT NULL, state TEXT NULL, tx_freq REAL NOT NULL, rx_freq REAL NOT NULL, \
         color_code INTEGER NOT NULL DEFAULT 1, default_slot INTEGER NOT NULL DEFAULT 1, notes TEXT NULL)",
        "CREATE TABLE talkgroups (tg_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, \
         number INTEGER NOT NULL, type TEXT NOT NULL, description TEXT NULL, bm_id INTEGER NULL, \
         last_synced TEXT NULL)",
        "CREATE TABLE channels (channel_id INTEGER PRIMARY KEY AUTOINCREMENT, repeater_id INTEGER NOT NULL, \
         tg_id INTEGER NOT NULL, slot INTEGER NOT NULL, contact_name TEXT NULL, rx_freq REAL NOT NULL, \
         tx_freq REAL NOT NULL, color_code INTEGER NOT NULL)",
        "INSERT INTO repeaters (name, tx_freq, rx_freq) VALUES ('W9ABC', 442.5, 447.5)",
        "INSERT INTO talkgroups (name, number, type) VALUES ('USA', 3100, 'Manual')",
        "INSERT INTO talkgroups (name, number, type) VALUES ('USA again', 3100, 'BrandMeister')",
        "INSERT INTO talkgroups (name, number, type) VALUES ('Worldwide', 91, 'Manual')",
        "INSERT INTO channels (repeater_id, tg_id, slot, rx_freq, tx_freq, color_code) \
         VALUES (1, 2, 1, 447.5, 442.5, 1)",
    ] {
        sqlx::query(stmt).execute(&pool).await.unwrap();
    }
    pool.close().await;

    let db = dmr_builder::db::spawn(&url).await.unwrap();

    let talkgroups = db.list_talkgroups().await.unwrap();
    let names: Vec<_> = talkgroups.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["USA", "Worldwide"]);

    // The channel that pointed at the deleted duplicate now points at the kept row.
    let channels = db.list_channels(None).await.unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].tg_id, 1);
    assert_eq!(channels[0].talkgroup_number, 3100);

    let err = db.create_talkgroup(talkgroup("Dup", 91)).await.unwrap_err();
    assert!(matches!(err, DmrError::Validation(_)));
}
