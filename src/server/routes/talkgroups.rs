use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};

use super::SearchQuery;
use crate::db::{Talkgroup, TalkgroupInput};
use crate::error::DmrError;
use crate::reconcile::TALKGROUP_SYNC;
use crate::server::extract::{ApiPath, ApiQuery, ValidJson};
use crate::server::router::DmrState;

pub fn router() -> Router<DmrState> {
    Router::new()
        .route("/talkgroups", get(list).post(create))
        .route("/talkgroups/search", get(search))
        .route("/talkgroups/sync-status", get(sync_status))
        .route("/talkgroups/sync", post(sync))
        .route(
            "/talkgroups/{id}",
            get(get_one).put(update).delete(delete_one),
        )
}

async fn list(State(state): State<DmrState>) -> Result<Json<Vec<Talkgroup>>, DmrError> {
    Ok(Json(state.db.list_talkgroups().await?))
}

async fn get_one(
    State(state): State<DmrState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Talkgroup>, DmrError> {
    state
        .db
        .get_talkgroup(id)
        .await?
        .map(Json)
        .ok_or_else(|| DmrError::not_found("Talkgroup not found"))
}

async fn create(
    State(state): State<DmrState>,
    ValidJson(input): ValidJson<TalkgroupInput>,
) -> Result<(StatusCode, Json<Talkgroup>), DmrError> {
    let talkgroup = state.db.create_talkgroup(input).await?;
    Ok((StatusCode::CREATED, Json(talkgroup)))
}

async fn update(
    State(state): State<DmrState>,
    ApiPath(id): ApiPath<i64>,
    ValidJson(input): ValidJson<TalkgroupInput>,
) -> Result<Json<Talkgroup>, DmrError> {
    state
        .db
        .update_talkgroup(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| DmrError::not_found("Talkgroup not found"))
}

/// Channels pointing at the talkgroup are left in place and drop out of channel reads.
async fn delete_one(
    State(state): State<DmrState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, DmrError> {
    state.db.delete_talkgroup(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn search(
    State(state): State<DmrState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<Talkgroup>>, DmrError> {
    Ok(Json(state.db.search_talkgroups(query.required()?).await?))
}

async fn sync_status(State(state): State<DmrState>) -> Result<Json<Value>, DmrError> {
    let body = match state.db.last_sync(TALKGROUP_SYNC).await? {
        Some(record) => json!(record),
        None => json!({ "message": "Never synced" }),
    };
    Ok(Json(body))
}

async fn sync(State(state): State<DmrState>) -> Result<Json<Value>, DmrError> {
    let synced = state.reconciler.sync_talkgroups().await?;
    Ok(Json(json!({
        "message": "Sync completed",
        "records_synced": synced,
    })))
}
