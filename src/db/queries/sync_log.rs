use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::{SyncRecord, SyncStatus};
use crate::error::DmrError;

const COLUMNS: &str = "id, sync_type, started_at, completed_at, records_synced, status";

pub(crate) async fn begin(pool: &SqlitePool, sync_type: &str) -> Result<i64, DmrError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO sync_log (sync_type, started_at, status)
        VALUES (?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(sync_type)
    .bind(Utc::now())
    .bind(SyncStatus::Running)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Moves a running record to its terminal status. Any other transition is refused.
pub(crate) async fn complete(
    pool: &SqlitePool,
    id: i64,
    status: SyncStatus,
    records_synced: i64,
) -> Result<SyncRecord, DmrError> {
    if status == SyncStatus::Running {
        return Err(DmrError::Unexpected(format!(
            "sync record {id} cannot be completed as running"
        )));
    }

    let row = sqlx::query_as::<_, SyncRecord>(&format!(
        r#"
        UPDATE sync_log
        SET completed_at = ?, records_synced = ?, status = ?
        WHERE id = ? AND status = ?
        RETURNING {COLUMNS}
        "#
    ))
    .bind(Utc::now())
    .bind(records_synced)
    .bind(status)
    .bind(id)
    .bind(SyncStatus::Running)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = row {
        return Ok(row);
    }

    let existing: Option<SyncStatus> =
        sqlx::query_scalar("SELECT status FROM sync_log WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    match existing {
        None => Err(DmrError::not_found(format!("Sync record {id} not found"))),
        Some(current) => Err(DmrError::Unexpected(format!(
            "sync record {id} already finished as {current:?}"
        ))),
    }
}

pub(crate) async fn last(pool: &SqlitePool, sync_type: &str) -> Result<Option<SyncRecord>, DmrError> {
    let row = sqlx::query_as::<_, SyncRecord>(&format!(
        "SELECT {COLUMNS} FROM sync_log WHERE sync_type = ? ORDER BY id DESC LIMIT 1"
    ))
    .bind(sync_type)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
