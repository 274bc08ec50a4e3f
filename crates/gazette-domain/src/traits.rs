//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its
//! infrastructure. Implementations live in other crates
//! (gazette-store, gazette-ingest).

use crate::episode::{AcceptedEpisode, Episode};
use crate::ident::{CircularId, ContentHash};
use crate::record::CircularRecord;
use std::fmt;

/// Durable persistence for mapped artifacts
///
/// Implemented by the infrastructure layer (gazette-store). Writes are
/// keyed by circular identity: mapping the same source twice overwrites
/// rather than duplicates.
pub trait ArtifactStore {
    /// Error type for store operations
    type Error;

    /// Persist a mapped record, replacing any prior version
    fn put_record(&mut self, record: &CircularRecord) -> Result<(), Self::Error>;

    /// Fetch a mapped record by id
    fn get_record(&self, id: &CircularId) -> Result<Option<CircularRecord>, Self::Error>;

    /// Persist the episode payload list built for a circular
    fn put_episodes(&mut self, id: &CircularId, episodes: &[Episode]) -> Result<(), Self::Error>;
}

/// Failure classification returned by an ingestion sink
///
/// Transient failures are retryable (network errors, rate limits);
/// rejected submissions are permanent and must be surfaced, not
/// retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkFailure {
    /// Retryable failure such as a network error or rate limit
    Transient(String),

    /// Permanent rejection such as a malformed or oversized payload
    Rejected(String),
}

impl SinkFailure {
    /// Whether the submission may be retried
    pub fn is_transient(&self) -> bool {
        matches!(self, SinkFailure::Transient(_))
    }
}

impl fmt::Display for SinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkFailure::Transient(cause) => write!(f, "transient sink failure: {}", cause),
            SinkFailure::Rejected(cause) => write!(f, "submission rejected: {}", cause),
        }
    }
}

impl std::error::Error for SinkFailure {}

/// The external knowledge-graph ingestion boundary
///
/// The sink is not assumed to deduplicate; the pipeline performs its
/// own hash-based dedup before submitting.
#[async_trait::async_trait]
pub trait EpisodeSink: Send + Sync {
    /// Submit one episode, returning the service's storage key
    async fn submit(&self, episode: &Episode) -> Result<AcceptedEpisode, SinkFailure>;
}

/// Append-only set of content hashes already submitted
///
/// Used as a dedup guard across runs. Safe for concurrent read during
/// a run; writes are serialized by the caller.
pub trait DedupLedger {
    /// Error type for ledger operations
    type Error;

    /// Whether a content hash has been recorded
    fn contains(&self, hash: &ContentHash) -> bool;

    /// Record a content hash
    fn append(&mut self, hash: &ContentHash) -> Result<(), Self::Error>;
}
