use thiserror::Error as ThisError;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum ExportError {
    #[error("No {0} to export")]
    Empty(&'static str),
}
