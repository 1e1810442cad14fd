//! Error types for whisperlog-core

use thiserror::Error;

use crate::ai::FlowError;
use crate::angel_number::ValidationError;
use crate::mirror::MirrorError;

/// Result type alias using whisperlog-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in whisperlog-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry not found
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Input rejected by validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No async runtime available for background work
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Invalid configuration or input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote mirror error
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    /// Insight flow produced no usable output
    #[error(transparent)]
    Flow(#[from] FlowError),
}
