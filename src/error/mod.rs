mod directory;
mod dmr;
mod export;

pub use directory::DirectoryError;
pub use dmr::{ApiErrorBody, ApiErrorObject, DmrError};
pub use export::ExportError;
