//! Local persistence errors.

use thiserror::Error;

use super::ErrorCategory;

/// Failure reading or writing the local key-value store.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(String),

    #[error("storage serialization error: {0}")]
    Serialization(String),

    #[error("no data directory available")]
    NoDataDirectory,
}

impl StorageError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Storage
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
