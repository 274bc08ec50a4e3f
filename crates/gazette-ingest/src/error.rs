//! Error types for episode building and submission

use thiserror::Error;

/// Errors that can occur while building or submitting episodes
#[derive(Error, Debug)]
pub enum IngestError {
    /// Transient failures exhausted the retry budget
    #[error("transient ingestion failure after {attempts} attempts: {cause}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last transient cause observed
        cause: String,
    },

    /// The service permanently rejected the submission
    #[error("submission rejected: {0}")]
    Rejected(String),

    /// Payload serialization error
    #[error("payload serialization error: {0}")]
    Payload(String),

    /// Dedup ledger error
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Task or semaphore error inside the submission driver
    #[error("submission driver error: {0}")]
    Internal(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
