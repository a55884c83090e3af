use sqlx::SqlitePool;
use tracing::debug;

use super::Folded;
use crate::db::models::Repeater;
use crate::db::records::RepeaterInput;
use crate::error::DmrError;

const COLUMNS: &str =
    "repeater_id, name, city, state, tx_freq, rx_freq, color_code, default_slot, notes";

pub(crate) async fn list(pool: &SqlitePool) -> Result<Vec<Repeater>, DmrError> {
    let rows = sqlx::query_as::<_, Repeater>(&format!(
        "SELECT {COLUMNS} FROM repeaters ORDER BY repeater_id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub(crate) async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Repeater>, DmrError> {
    let row = sqlx::query_as::<_, Repeater>(&format!(
        "SELECT {COLUMNS} FROM repeaters WHERE repeater_id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Case-insensitive (Unicode) substring match on name, city or state.
pub(crate) async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<Repeater>, DmrError> {
    let q = Folded::new(query);
    let rows = list(pool).await?;
    Ok(rows
        .into_iter()
        .filter(|r| {
            q.matches(Some(&r.name)) || q.matches(r.city.as_deref()) || q.matches(r.state.as_deref())
        })
        .collect())
}

pub(crate) async fn create(pool: &SqlitePool, input: RepeaterInput) -> Result<Repeater, DmrError> {
    let row = sqlx::query_as::<_, Repeater>(&format!(
        r#"
        INSERT INTO repeaters (name, city, state, tx_freq, rx_freq, color_code, default_slot, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(input.name)
    .bind(input.city)
    .bind(input.state)
    .bind(input.tx_freq)
    .bind(input.rx_freq)
    .bind(input.color_code)
    .bind(input.default_slot)
    .bind(input.notes)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Full replace. A missing id updates nothing and yields `None`.
pub(crate) async fn update(
    pool: &SqlitePool,
    id: i64,
    input: RepeaterInput,
) -> Result<Option<Repeater>, DmrError> {
    let row = sqlx::query_as::<_, Repeater>(&format!(
        r#"
        UPDATE repeaters
        SET name = ?, city = ?, state = ?, tx_freq = ?, rx_freq = ?,
            color_code = ?, default_slot = ?, notes = ?
        WHERE repeater_id = ?
        RETURNING {COLUMNS}
        "#
    ))
    .bind(input.name)
    .bind(input.city)
    .bind(input.state)
    .bind(input.tx_freq)
    .bind(input.rx_freq)
    .bind(input.color_code)
    .bind(input.default_slot)
    .bind(input.notes)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    debug!(table = "repeaters", id, found = row.is_some(), "db update applied");
    Ok(row)
}

/// Deletes only the repeater row; channels pointing at it are left alone.
pub(crate) async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, DmrError> {
    let res = sqlx::query("DELETE FROM repeaters WHERE repeater_id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
