pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod export;
pub mod reconcile;
pub mod server;

mod utils;

pub use error::DmrError;
