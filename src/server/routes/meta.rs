use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use crate::db::Stats;
use crate::error::DmrError;
use crate::server::router::DmrState;

pub fn router() -> Router<DmrState> {
    Router::new()
        .route("/", get(catalogue))
        .route("/stats", get(stats))
}

pub(crate) async fn not_found_handler() -> DmrError {
    DmrError::not_found("Not found")
}

async fn stats(State(state): State<DmrState>) -> Result<Json<Stats>, DmrError> {
    Ok(Json(state.db.stats().await?))
}

async fn catalogue() -> Json<Value> {
    Json(json!({
        "name": "DMR Builder API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "repeaters": {
                "GET /api/repeaters": "List all repeaters",
                "GET /api/repeaters/{id}": "Get single repeater",
                "GET /api/repeaters/search?q=": "Search BrandMeister repeaters by location",
                "GET /api/repeaters/search/local?q=": "Search local repeaters",
                "GET /api/repeaters/bm/us": "Get all US repeaters from BrandMeister",
                "GET /api/repeaters/bm/callsign?callsign=": "Find BrandMeister devices by callsign",
                "GET /api/repeaters/bm/{bm_id}": "Get a BrandMeister device",
                "GET /api/repeaters/bm/{bm_id}/profile": "Get a BrandMeister device profile",
                "GET /api/repeaters/bm/{bm_id}/talkgroups": "Get static talkgroups for BM repeater",
                "POST /api/repeaters": "Create repeater",
                "POST /api/repeaters/import": "Import repeater from BrandMeister",
                "POST /api/repeaters/import-with-channels": "Import repeater with auto-created channels",
                "POST /api/repeaters/{id}/auto-channels": "Create channels from BM static TGs",
                "PUT /api/repeaters/{id}": "Update repeater",
                "DELETE /api/repeaters/{id}": "Delete repeater and its channels"
            },
            "talkgroups": {
                "GET /api/talkgroups": "List all talkgroups",
                "GET /api/talkgroups/{id}": "Get single talkgroup",
                "GET /api/talkgroups/search?q=": "Search talkgroups",
                "GET /api/talkgroups/sync-status": "Get last sync info",
                "POST /api/talkgroups/sync": "Sync from BrandMeister",
                "POST /api/talkgroups": "Create talkgroup",
                "PUT /api/talkgroups/{id}": "Update talkgroup",
                "DELETE /api/talkgroups/{id}": "Delete talkgroup"
            },
            "channels": {
                "GET /api/channels": "List all channels",
                "GET /api/channels?repeater_id=X": "List channels for repeater",
                "GET /api/channels/{id}": "Get single channel",
                "POST /api/channels": "Create channel",
                "PUT /api/channels/{id}": "Update channel",
                "DELETE /api/channels/{id}": "Delete channel"
            },
            "export": {
                "GET /api/export/tyt": "Download TYT CSV codeplug",
                "GET /api/export/tyt?repeater_id=X": "Download TYT CSV for specific repeater",
                "GET /api/export/tyt/preview": "Preview TYT CSV export",
                "GET /api/export/contacts": "Download contacts CSV"
            },
            "meta": {
                "GET /api/stats": "Entity counts"
            }
        }
    }))
}
