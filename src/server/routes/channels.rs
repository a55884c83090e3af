use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use super::RepeaterFilter;
use crate::db::{ChannelInput, ChannelView, NewChannel, Repeater, Talkgroup};
use crate::error::DmrError;
use crate::server::extract::{ApiPath, ApiQuery, ValidJson};
use crate::server::router::DmrState;

pub fn router() -> Router<DmrState> {
    Router::new()
        .route("/channels", get(list).post(create))
        .route(
            "/channels/{id}",
            get(get_one).put(update).delete(delete_one),
        )
}

async fn list(
    State(state): State<DmrState>,
    ApiQuery(filter): ApiQuery<RepeaterFilter>,
) -> Result<Json<Vec<ChannelView>>, DmrError> {
    Ok(Json(state.db.list_channels(filter.repeater_id).await?))
}

async fn get_one(
    State(state): State<DmrState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ChannelView>, DmrError> {
    state
        .db
        .get_channel(id)
        .await?
        .map(Json)
        .ok_or_else(|| DmrError::not_found("Channel not found"))
}

/// Omitted snapshot fields are copied from the parents as they are now.
async fn create(
    State(state): State<DmrState>,
    ValidJson(input): ValidJson<ChannelInput>,
) -> Result<(StatusCode, Json<ChannelView>), DmrError> {
    let (repeater, talkgroup) = parents(&state, &input).await?;
    let channel = NewChannel::from_input(input, &repeater, &talkgroup);

    let view = state
        .db
        .create_channel(channel)
        .await?
        .ok_or_else(|| DmrError::Unexpected("channel parents vanished during create".into()))?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Omitted snapshot fields keep their stored values; they are never re-read from the parents.
async fn update(
    State(state): State<DmrState>,
    ApiPath(id): ApiPath<i64>,
    ValidJson(input): ValidJson<ChannelInput>,
) -> Result<Json<ChannelView>, DmrError> {
    let existing = state
        .db
        .get_channel(id)
        .await?
        .ok_or_else(|| DmrError::not_found("Channel not found"))?;
    parents(&state, &input).await?;

    let channel = NewChannel {
        repeater_id: input.repeater_id,
        tg_id: input.tg_id,
        slot: input.slot,
        contact_name: input.contact_name.or(existing.contact_name),
        rx_freq: input.rx_freq.unwrap_or(existing.rx_freq),
        tx_freq: input.tx_freq.unwrap_or(existing.tx_freq),
        color_code: input.color_code.unwrap_or(existing.color_code),
    };

    state
        .db
        .update_channel(id, channel)
        .await?
        .map(Json)
        .ok_or_else(|| DmrError::not_found("Channel not found"))
}

async fn delete_one(
    State(state): State<DmrState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, DmrError> {
    state.db.delete_channel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn parents(
    state: &DmrState,
    input: &ChannelInput,
) -> Result<(Repeater, Talkgroup), DmrError> {
    let repeater = state
        .db
        .get_repeater(input.repeater_id)
        .await?
        .ok_or_else(|| {
            DmrError::validation(format!("Repeater {} does not exist", input.repeater_id))
        })?;
    let talkgroup = state
        .db
        .get_talkgroup(input.tg_id)
        .await?
        .ok_or_else(|| DmrError::validation(format!("Talkgroup {} does not exist", input.tg_id)))?;
    Ok((repeater, talkgroup))
}
