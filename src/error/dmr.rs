use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error as ThisError;

use super::{DirectoryError, ExportError};

#[derive(Debug, ThisError)]
pub enum DmrError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("Ractor error: {0}")]
    Actor(String),

    #[error("{source} ({steps_completed} steps completed before the failure)")]
    IncompleteImport {
        steps_completed: usize,
        source: Box<DmrError>,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl DmrError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DmrError::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DmrError::Validation(message.into())
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            DmrError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            DmrError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            DmrError::Database(_) | DmrError::Actor(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
            DmrError::Directory(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DIRECTORY_ERROR"),
            // A partially applied import is always a server-side failure, whatever stopped it.
            DmrError::IncompleteImport { source, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, source.status_and_code().1)
            }
            DmrError::Unexpected(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<ExportError> for DmrError {
    fn from(e: ExportError) -> Self {
        DmrError::NotFound(e.to_string())
    }
}

impl From<JsonRejection> for DmrError {
    fn from(rejection: JsonRejection) -> Self {
        DmrError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for DmrError {
    fn from(rejection: QueryRejection) -> Self {
        DmrError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for DmrError {
    fn from(rejection: PathRejection) -> Self {
        DmrError::Validation(rejection.body_text())
    }
}

impl IntoResponse for DmrError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = self.status_and_code();
        let details = match &self {
            DmrError::IncompleteImport {
                steps_completed, ..
            } => Some(json!({ "steps_completed": steps_completed })),
            DmrError::Directory(e) => e
                .status()
                .map(|s| json!({ "upstream_status": s.as_u16() })),
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!(code, error = %self, "request failed");
        }

        let body = ApiErrorObject {
            code: code.to_string(),
            message: self.to_string(),
            details,
        };
        (status, Json(ApiErrorBody { inner: body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Debug, Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: DmrError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_maps_to_400_with_message() {
        let (status, body) = body_json(DmrError::validation("Missing bm_id")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Missing bm_id");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn incomplete_import_keeps_inner_code_and_reports_steps() {
        let err = DmrError::IncompleteImport {
            steps_completed: 3,
            source: Box::new(DmrError::Directory(DirectoryError::UpstreamStatus {
                status: StatusCode::BAD_GATEWAY,
                body: "bad gateway".to_string(),
            })),
        };

        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "DIRECTORY_ERROR");
        assert_eq!(body["error"]["details"]["steps_completed"], 3);
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("502 Bad Gateway")
        );
    }

    #[test]
    fn empty_export_is_not_found() {
        let err: DmrError = ExportError::Empty("channels").into();
        assert!(matches!(err, DmrError::NotFound(ref m) if m == "No channels to export"));
    }
}
