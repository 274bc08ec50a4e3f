//! The canonical circular record

use crate::clause::ClauseTree;
use crate::ident::{CircularId, SourceHash};
use crate::metadata::CircularMetadata;
use serde::{Deserialize, Serialize};

/// Canonical mapped form of one circular
///
/// Never mutated after creation; re-processing a changed source builds
/// a new record (with a new identity) rather than patching this one.
/// Serialized as a durable artifact, so field names are stable and
/// unknown fields are ignored on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircularRecord {
    /// Deterministic identity derived from `source_hash`
    pub id: CircularId,

    /// Inferred document metadata
    pub metadata: CircularMetadata,

    /// The clause decomposition
    pub clauses: ClauseTree,

    /// SHA-256 of the full cleaned document text
    pub source_hash: SourceHash,

    /// Originating file name, when known
    #[serde(default)]
    pub source_file: Option<String>,

    /// Number of pages in the source document
    #[serde(default)]
    pub page_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::{ClauseNode, NumberPath};
    use crate::ident::ClauseId;

    #[test]
    fn test_record_round_trips_through_json() {
        let source_hash = SourceHash::of_text("body");
        let path = NumberPath::parse("1").unwrap();
        let clause = ClauseNode {
            id: ClauseId::derive(&source_hash, &path, 0),
            number_path: path,
            text: "First clause".to_string(),
            order_index: 0,
            parent_id: None,
            order_anomaly: false,
        };
        let record = CircularRecord {
            id: CircularId::derive(&source_hash),
            metadata: CircularMetadata::absent(),
            clauses: ClauseTree::new(vec![clause]),
            source_hash,
            source_file: Some("circular.pdf".to_string()),
            page_count: 3,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: CircularRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
