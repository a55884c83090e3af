use sqlx::SqlitePool;

use crate::db::models::ChannelView;
use crate::db::records::NewChannel;
use crate::error::DmrError;

const SELECT_VIEW: &str = r#"
    SELECT c.channel_id, c.repeater_id, c.tg_id, c.slot, c.contact_name,
           c.rx_freq, c.tx_freq, c.color_code,
           r.name AS repeater_name, t.name AS talkgroup_name, t.number AS talkgroup_number
    FROM channels c
    JOIN repeaters r ON c.repeater_id = r.repeater_id
    JOIN talkgroups t ON c.tg_id = t.tg_id
"#;

/// Joined channel rows, optionally for one repeater. Orphaned channels are not returned.
pub(crate) async fn list(
    pool: &SqlitePool,
    repeater_id: Option<i64>,
) -> Result<Vec<ChannelView>, DmrError> {
    let rows = match repeater_id {
        Some(repeater_id) => {
            sqlx::query_as::<_, ChannelView>(&format!(
                "{SELECT_VIEW} WHERE c.repeater_id = ? ORDER BY c.channel_id"
            ))
            .bind(repeater_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ChannelView>(&format!("{SELECT_VIEW} ORDER BY c.channel_id"))
                .fetch_all(pool)
                .await?
        }
    };
    Ok(rows)
}

pub(crate) async fn get(pool: &SqlitePool, id: i64) -> Result<Option<ChannelView>, DmrError> {
    let row = sqlx::query_as::<_, ChannelView>(&format!("{SELECT_VIEW} WHERE c.channel_id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Returns the new id. The parents are not checked.
pub(crate) async fn create(pool: &SqlitePool, channel: NewChannel) -> Result<i64, DmrError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO channels (repeater_id, tg_id, slot, contact_name, rx_freq, tx_freq, color_code)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING channel_id
        "#,
    )
    .bind(channel.repeater_id)
    .bind(channel.tg_id)
    .bind(channel.slot)
    .bind(channel.contact_name)
    .bind(channel.rx_freq)
    .bind(channel.tx_freq)
    .bind(channel.color_code)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Returns whether a row was replaced.
pub(crate) async fn update(
    pool: &SqlitePool,
    id: i64,
    channel: NewChannel,
) -> Result<bool, DmrError> {
    let res = sqlx::query(
        r#"
        UPDATE channels
        SET repeater_id = ?, tg_id = ?, slot = ?, contact_name = ?,
            rx_freq = ?, tx_freq = ?, color_code = ?
        WHERE channel_id = ?
        "#,
    )
    .bind(channel.repeater_id)
    .bind(channel.tg_id)
    .bind(channel.slot)
    .bind(channel.contact_name)
    .bind(channel.rx_freq)
    .bind(channel.tx_freq)
    .bind(channel.color_code)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(res.rows_affected() > 0)
}

pub(crate) async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, DmrError> {
    let res = sqlx::query("DELETE FROM channels WHERE channel_id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub(crate) async fn delete_for_repeater(pool: &SqlitePool, repeater_id: i64) -> Result<u64, DmrError> {
    let res = sqlx::query("DELETE FROM channels WHERE repeater_id = ?")
        .bind(repeater_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
