//! Snapshot store error types
//!
//! Defines all errors that can occur in the storage layer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the snapshot store
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization of a snapshot failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored snapshot file exists but cannot be parsed
    #[error("Corrupt snapshot {path:?}: {error}")]
    Corrupt { path: PathBuf, error: String },
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
