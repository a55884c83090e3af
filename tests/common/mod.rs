#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use dmr_builder::db::DbActorHandle;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

/// Fresh file-backed database in the temp dir.
pub async fn temp_db(label: &str) -> DbActorHandle {
    dmr_builder::db::spawn(&temp_db_url(label))
        .await
        .expect("spawn db actor")
}

/// `sqlite:` URL of a database file that does not exist yet.
pub fn temp_db_url(label: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "dmr-builder-{label}-{}-{nanos}.sqlite",
        std::process::id()
    ));

    format!("sqlite:{}", temp_path.display())
}

/// Knobs and counters shared with the mock directory.
#[derive(Default)]
pub struct MockDirectory {
    pub fail_talkgroups: AtomicBool,
    pub fail_assignments: AtomicBool,
    pub requests: AtomicUsize,
}

impl MockDirectory {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

type Shared = Arc<MockDirectory>;

fn hit(state: &Shared) {
    state.requests.fetch_add(1, Ordering::SeqCst);
}

fn unavailable() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "directory down for maintenance").into_response()
}

pub fn springfield_device() -> Value {
    json!({
        "id": 4781,
        "callsign": "W9ABC",
        "city": "Springfield, IL",
        "tx": "442.500",
        "rx": "447.500",
        "colorcode": 1,
        "description": "Linked to BrandMeister",
        "status": 4,
        "hardware": "MMDVM"
    })
}

fn repeaters() -> Value {
    json!([
        springfield_device(),
        {"id": 310_888, "callsign": "K9XYZ", "city": "Peoria, IL", "tx": "443.1", "rx": "448.1", "colorcode": "7"},
        {"id": 2_341_234, "callsign": "GB7AA", "city": "Springfield, UK"},
        {"id": 311_000, "callsign": "N0CITY"}
    ])
}

async fn talkgroups(State(state): State<Shared>) -> Response {
    hit(&state);
    if state.fail_talkgroups.load(Ordering::SeqCst) {
        return unavailable();
    }
    Json(json!({
        "91": "Worldwide",
        "3100": "USA",
        "31172": "",
        "beta": "Not a number"
    }))
    .into_response()
}

async fn device(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    hit(&state);
    if id == 4781 {
        Json(springfield_device()).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"message": "Device not found"}))).into_response()
    }
}

async fn device_profile(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    hit(&state);
    Json(json!({"device": id, "staticSubscriptions": [{"talkgroup": 31172, "slot": 1}]}))
        .into_response()
}

async fn device_talkgroups(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    hit(&state);
    if state.fail_assignments.load(Ordering::SeqCst) {
        return unavailable();
    }
    if id != 4781 {
        return Json(json!([])).into_response();
    }
    Json(json!([
        {"talkgroup": "31172", "slot": "1", "repeaterid": "4781"},
        {"talkgroup": 3100, "slot": 2, "repeaterid": 4781}
    ]))
    .into_response()
}

#[derive(Deserialize)]
struct CallsignParams {
    callsign: String,
}

async fn by_call(State(state): State<Shared>, Query(params): Query<CallsignParams>) -> Response {
    hit(&state);
    let matches: Vec<Value> = repeaters()
        .as_array()
        .into_iter()
        .flatten()
        .filter(|d| d["callsign"].as_str() == Some(params.callsign.as_str()))
        .cloned()
        .collect();
    Json(matches).into_response()
}

#[derive(Deserialize)]
struct DeviceListParams {
    repeater: Option<String>,
}

async fn device_list(
    State(state): State<Shared>,
    Query(params): Query<DeviceListParams>,
) -> Response {
    hit(&state);
    if params.repeater.as_deref() != Some("true") {
        return (StatusCode::BAD_REQUEST, "repeater=true required").into_response();
    }
    Json(repeaters()).into_response()
}

/// Serves a BrandMeister-shaped API on an ephemeral local port.
///
/// Returns the `/v2` base URL and the shared knobs.
pub async fn spawn_mock_directory() -> (Url, Shared) {
    let state: Shared = Arc::new(MockDirectory::default());
    let app = Router::new()
        .route("/v2/talkgroup", get(talkgroups))
        .route("/v2/device", get(device_list))
        .route("/v2/device/byCall", get(by_call))
        .route("/v2/device/{id}", get(device))
        .route("/v2/device/{id}/profile", get(device_profile))
        .route("/v2/device/{id}/talkgroup", get(device_talkgroups))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock directory");
    let addr = listener.local_addr().expect("mock directory addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock directory server");
    });

    let base = Url::parse(&format!("http://{addr}/v2")).expect("mock base url");
    (base, state)
}

/// Directory config pointed at `base` with a short timeout.
pub fn directory_config(base: Url) -> dmr_builder::config::DirectoryConfig {
    let mut cfg = dmr_builder::config::DirectoryConfig::default().with_base_url(base);
    cfg.timeout_secs = 5;
    cfg
}
