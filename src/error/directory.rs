use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// Failures talking to the external directory service.
///
/// None of these are retried; callers record the attempt as failed and move on.
#[derive(Debug, ThisError)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("directory returned {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    #[error("directory payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("directory base url cannot carry a path: {0}")]
    InvalidBaseUrl(url::Url),
}

impl DirectoryError {
    /// Upstream status, if the service answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DirectoryError::UpstreamStatus { status, .. } => Some(*status),
            DirectoryError::Request(e) => e.status(),
            _ => None,
        }
    }
}
