//! SQL for each table. Everything here runs inside the `DbActor`.

pub(super) mod channels;
pub(super) mod repeaters;
pub(super) mod sync_log;
pub(super) mod talkgroups;

use crate::db::models::Stats;
use crate::error::DmrError;
use sqlx::SqlitePool;

/// Case-insensitive substring matcher for local search.
///
/// Matching runs here instead of in SQL: SQLite's `LIKE` and `lower()` only fold ASCII, so
/// `MÜNCHEN` would miss `münchen`.
pub(super) struct Folded(String);

impl Folded {
    pub(super) fn new(query: &str) -> Self {
        Self(query.to_lowercase())
    }

    pub(super) fn matches(&self, field: Option<&str>) -> bool {
        field.is_some_and(|f| f.to_lowercase().contains(&self.0))
    }
}

pub(super) async fn stats(pool: &SqlitePool) -> Result<Stats, DmrError> {
    let (repeaters, talkgroups, channels): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM repeaters),
            (SELECT COUNT(*) FROM talkgroups),
            (SELECT COUNT(*) FROM channels)
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(Stats {
        repeaters,
        talkgroups,
        channels,
    })
}
