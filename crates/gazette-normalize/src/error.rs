//! Error types for the normalizer

use thiserror::Error;

/// Errors that can occur while normalizing a document
///
/// Heuristic misses are not errors: absent metadata and flagged
/// segmentation anomalies flow through the data model. Only
/// inconsistent internal state surfaces here, and it is fatal for the
/// affected document alone.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The mapper produced an inconsistent clause tree
    #[error("mapping failure: {0}")]
    MappingFailure(String),

    /// Artifact store error while persisting the mapped record
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
