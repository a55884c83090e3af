use sqlx::SqlitePool;
use tracing::debug;

use super::Folded;
use crate::db::models::Talkgroup;
use crate::db::records::TalkgroupInput;
use crate::error::DmrError;

const COLUMNS: &str = "tg_id, name, number, type, description, bm_id, last_synced";

pub(crate) async fn list(pool: &SqlitePool) -> Result<Vec<Talkgroup>, DmrError> {
    let rows = sqlx::query_as::<_, Talkgroup>(&format!(
        "SELECT {COLUMNS} FROM talkgroups ORDER BY tg_id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub(crate) async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Talkgroup>, DmrError> {
    let row = sqlx::query_as::<_, Talkgroup>(&format!(
        "SELECT {COLUMNS} FROM talkgroups WHERE tg_id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub(crate) async fn get_by_number(
    pool: &SqlitePool,
    number: i64,
) -> Result<Option<Talkgroup>, DmrError> {
    let row = sqlx::query_as::<_, Talkgroup>(&format!(
        "SELECT {COLUMNS} FROM talkgroups WHERE number = ?"
    ))
    .bind(number)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Case-insensitive (Unicode) substring match on the name or the decimal number.
pub(crate) async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<Talkgroup>, DmrError> {
    let q = Folded::new(query);
    let rows = sqlx::query_as::<_, Talkgroup>(&format!(
        "SELECT {COLUMNS} FROM talkgroups ORDER BY number"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .filter(|t| q.matches(Some(&t.name)) || q.matches(Some(&t.number.to_string())))
        .collect())
}

pub(crate) async fn create(pool: &SqlitePool, input: TalkgroupInput) -> Result<Talkgroup, DmrError> {
    let number = input.number;
    sqlx::query_as::<_, Talkgroup>(&format!(
        r#"
        INSERT INTO talkgroups (name, number, type, description, bm_id, last_synced)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(input.name)
    .bind(input.number)
    .bind(input.kind)
    .bind(input.description)
    .bind(input.bm_id)
    .bind(input.last_synced)
    .fetch_one(pool)
    .await
    .map_err(|e| duplicate_number(e, number))
}

/// Insert, or overwrite name/type/description/bm_id/last_synced of the row holding `number`.
pub(crate) async fn upsert(pool: &SqlitePool, input: TalkgroupInput) -> Result<Talkgroup, DmrError> {
    let row = sqlx::query_as::<_, Talkgroup>(&format!(
        r#"
        INSERT INTO talkgroups (name, number, type, description, bm_id, last_synced)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(number) DO UPDATE SET
            name = excluded.name,
            type = excluded.type,
            description = excluded.description,
            bm_id = excluded.bm_id,
            last_synced = excluded.last_synced
        RETURNING {COLUMNS}
        "#
    ))
    .bind(input.name)
    .bind(input.number)
    .bind(input.kind)
    .bind(input.description)
    .bind(input.bm_id)
    .bind(input.last_synced)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Full replace, including `number`. A missing id updates nothing and yields `None`.
pub(crate) async fn update(
    pool: &SqlitePool,
    id: i64,
    input: TalkgroupInput,
) -> Result<Option<Talkgroup>, DmrError> {
    let number = input.number;
    let row = sqlx::query_as::<_, Talkgroup>(&format!(
        r#"
        UPDATE talkgroups
        SET name = ?, number = ?, type = ?, description = ?, bm_id = ?, last_synced = ?
        WHERE tg_id = ?
        RETURNING {COLUMNS}
        "#
    ))
    .bind(input.name)
    .bind(input.number)
    .bind(input.kind)
    .bind(input.description)
    .bind(input.bm_id)
    .bind(input.last_synced)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| duplicate_number(e, number))?;

    debug!(table = "talkgroups", id, found = row.is_some(), "db update applied");
    Ok(row)
}

/// Deletes only the talkgroup row; channels pointing at it become orphans.
pub(crate) async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, DmrError> {
    let res = sqlx::query("DELETE FROM talkgroups WHERE tg_id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

fn duplicate_number(e: sqlx::Error, number: i64) -> DmrError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DmrError::validation(format!("Talkgroup number {number} already exists"))
        }
        other => other.into(),
    }
}
