//! Graph-ingestion episode payloads

use crate::ident::{CircularId, ClauseId, ContentHash, EpisodeId};
use serde::{Deserialize, Serialize};

/// A discrete unit of content for the ingestion boundary
///
/// Ephemeral until accepted by the external service; retried on
/// transient failure, never silently dropped. `id` is derived from
/// `content_hash` so re-submitting identical content is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Deterministic identity derived from `content_hash`
    pub id: EpisodeId,

    /// The owning circular
    pub circular_id: CircularId,

    /// Clauses carried by this episode, in document order
    pub clause_ids: Vec<ClauseId>,

    /// Human-readable episode name, e.g. `circ-xxxx_clause_2`
    pub name: String,

    /// Serialized content payload
    pub payload: String,

    /// SHA-256 of `payload`
    pub content_hash: ContentHash,
}

/// Acknowledgement returned by the ingestion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedEpisode {
    /// The episode that was accepted
    pub episode_id: EpisodeId,

    /// Storage key assigned by the service
    pub storage_key: String,
}
