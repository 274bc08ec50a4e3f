//! Error types for the artifact store

use thiserror::Error;

/// Errors that can occur persisting or loading artifacts
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization error
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
