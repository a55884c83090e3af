use axum::{
    Json, Router,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};

use super::RepeaterFilter;
use crate::error::DmrError;
use crate::export::{self, PREVIEW_ROWS};
use crate::server::extract::ApiQuery;
use crate::server::router::DmrState;

pub fn router() -> Router<DmrState> {
    Router::new()
        .route("/export/tyt", get(tyt_channels))
        .route("/export/tyt/preview", get(tyt_preview))
        .route("/export/contacts", get(tyt_contacts))
}

fn csv_attachment(filename: &'static str, body: String) -> Response {
    (
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

async fn tyt_channels(
    State(state): State<DmrState>,
    ApiQuery(filter): ApiQuery<RepeaterFilter>,
) -> Result<Response, DmrError> {
    let channels = state.db.list_channels(filter.repeater_id).await?;
    let csv = export::render_channels(&channels)?;
    Ok(csv_attachment("dmr-channels.csv", csv))
}

/// Empty selections give an empty preview rather than a 404, so the UI can render it as is.
async fn tyt_preview(
    State(state): State<DmrState>,
    ApiQuery(filter): ApiQuery<RepeaterFilter>,
) -> Result<Json<Value>, DmrError> {
    let channels = state.db.list_channels(filter.repeater_id).await?;
    if channels.is_empty() {
        return Ok(Json(json!({ "preview": "", "count": 0 })));
    }

    let csv = export::render_channels(&channels)?;
    let preview = export::preview(&csv, PREVIEW_ROWS);
    Ok(Json(json!({
        "preview": preview.preview,
        "count": channels.len(),
        "total_lines": preview.total_lines,
    })))
}

async fn tyt_contacts(State(state): State<DmrState>) -> Result<Response, DmrError> {
    let talkgroups = state.db.list_talkgroups().await?;
    let csv = export::render_contacts(&talkgroups)?;
    Ok(csv_attachment("dmr-contacts.csv", csv))
}
