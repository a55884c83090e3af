use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use dmr_schema::Device;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::SearchQuery;
use crate::db::{Repeater, RepeaterInput, Validate};
use crate::error::DmrError;
use crate::reconcile::{ImportOutcome, StaticAssignment};
use crate::server::extract::{ApiPath, ApiQuery, ValidJson};
use crate::server::router::DmrState;

pub fn router() -> Router<DmrState> {
    Router::new()
        .route("/repeaters", get(list).post(create))
        .route("/repeaters/search", get(search_directory))
        .route("/repeaters/search/local", get(search_local))
        .route("/repeaters/bm/us", get(us_repeaters))
        .route("/repeaters/bm/callsign", get(by_callsign))
        .route("/repeaters/bm/{bm_id}", get(device))
        .route("/repeaters/bm/{bm_id}/profile", get(device_profile))
        .route("/repeaters/bm/{bm_id}/talkgroups", get(static_talkgroups))
        .route("/repeaters/import", post(import))
        .route("/repeaters/import-with-channels", post(import_with_channels))
        .route(
            "/repeaters/{id}",
            get(get_one).put(update).delete(delete_one),
        )
        .route("/repeaters/{id}/auto-channels", post(auto_channels))
}

/// Body of the two import endpoints.
#[derive(Debug, Deserialize, Serialize)]
pub struct ImportRequest {
    #[serde(default, deserialize_with = "dmr_schema::lax::opt_int")]
    pub bm_id: Option<i64>,
}

impl ImportRequest {
    fn bm_id(&self) -> Result<i64, DmrError> {
        self.bm_id
            .filter(|id| *id > 0)
            .ok_or_else(|| DmrError::validation("Missing bm_id"))
    }
}

impl Validate for ImportRequest {
    fn validate(&self) -> Result<(), DmrError> {
        self.bm_id().map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
pub struct CallsignQuery {
    #[serde(default)]
    pub callsign: Option<String>,
}

async fn list(State(state): State<DmrState>) -> Result<Json<Vec<Repeater>>, DmrError> {
    Ok(Json(state.db.list_repeaters().await?))
}

async fn get_one(
    State(state): State<DmrState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Repeater>, DmrError> {
    state
        .db
        .get_repeater(id)
        .await?
        .map(Json)
        .ok_or_else(|| DmrError::not_found("Repeater not found"))
}

async fn create(
    State(state): State<DmrState>,
    ValidJson(input): ValidJson<RepeaterInput>,
) -> Result<(StatusCode, Json<Repeater>), DmrError> {
    let repeater = state.db.create_repeater(input).await?;
    Ok((StatusCode::CREATED, Json(repeater)))
}

async fn update(
    State(state): State<DmrState>,
    ApiPath(id): ApiPath<i64>,
    ValidJson(input): ValidJson<RepeaterInput>,
) -> Result<Json<Repeater>, DmrError> {
    state
        .db
        .update_repeater(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| DmrError::not_found("Repeater not found"))
}

/// Channels go first; the store does not cascade.
async fn delete_one(
    State(state): State<DmrState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, DmrError> {
    let channels = state.db.delete_channels_for_repeater(id).await?;
    state.db.delete_repeater(id).await?;
    info!(repeater_id = id, channels_deleted = channels, "repeater deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn search_local(
    State(state): State<DmrState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<Repeater>>, DmrError> {
    Ok(Json(state.db.search_repeaters(query.required()?).await?))
}

async fn search_directory(
    State(state): State<DmrState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<Device>>, DmrError> {
    let devices = state.reconciler.search_directory(query.required()?).await?;
    Ok(Json(devices))
}

async fn us_repeaters(State(state): State<DmrState>) -> Result<Json<Vec<Device>>, DmrError> {
    Ok(Json(state.directory().us_repeaters().await?))
}

async fn by_callsign(
    State(state): State<DmrState>,
    ApiQuery(query): ApiQuery<CallsignQuery>,
) -> Result<Json<Vec<Device>>, DmrError> {
    let callsign = query
        .callsign
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| DmrError::validation("Missing callsign"))?;
    Ok(Json(state.directory().search_by_callsign(callsign).await?))
}

async fn device(
    State(state): State<DmrState>,
    ApiPath(bm_id): ApiPath<i64>,
) -> Result<Json<Device>, DmrError> {
    Ok(Json(state.directory().get_device(bm_id).await?))
}

async fn device_profile(
    State(state): State<DmrState>,
    ApiPath(bm_id): ApiPath<i64>,
) -> Result<Json<Value>, DmrError> {
    Ok(Json(state.reconciler.device_profile(bm_id).await?))
}

async fn static_talkgroups(
    State(state): State<DmrState>,
    ApiPath(bm_id): ApiPath<i64>,
) -> Result<Json<Vec<StaticAssignment>>, DmrError> {
    Ok(Json(state.reconciler.static_talkgroups(bm_id).await?))
}

async fn import(
    State(state): State<DmrState>,
    ValidJson(req): ValidJson<ImportRequest>,
) -> Result<(StatusCode, Json<Repeater>), DmrError> {
    let repeater = state.reconciler.import_repeater(req.bm_id()?).await?;
    Ok((StatusCode::CREATED, Json(repeater)))
}

async fn import_with_channels(
    State(state): State<DmrState>,
    ValidJson(req): ValidJson<ImportRequest>,
) -> Result<Json<ImportOutcome>, DmrError> {
    Ok(Json(state.reconciler.import_with_channels(req.bm_id()?).await?))
}

async fn auto_channels(
    State(state): State<DmrState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Value>, DmrError> {
    let created = state.reconciler.auto_channels(id).await?;
    Ok(Json(json!({ "channels_created": created })))
}
