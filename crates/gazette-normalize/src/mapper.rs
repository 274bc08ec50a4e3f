//! Joining inference and segmentation into a canonical record

use crate::error::NormalizeError;
use crate::segmenter::Segmentation;
use gazette_domain::traits::ArtifactStore;
use gazette_domain::{
    CircularId, CircularMetadata, CircularRecord, ClauseId, ClauseNode, ClauseTree,
    CleanedDocument, SourceHash,
};
use tracing::info;

/// Assembles the canonical `CircularRecord`
///
/// The source hash is computed over the full cleaned text, and every
/// identifier in the record is derived from it, so mapping the same
/// cleaned input twice reproduces the same record identity — the
/// property idempotent re-ingestion rests on.
#[derive(Debug, Default)]
pub struct RecordMapper;

impl RecordMapper {
    /// Create a mapper
    pub fn new() -> Self {
        Self
    }

    /// Map a cleaned document into a record
    ///
    /// Fails only on inconsistent internal state (a clause referencing
    /// a parent that is missing or not an ancestor); such a failure is
    /// fatal for this document and must not abort the batch.
    pub fn map(
        &self,
        source_file: Option<&str>,
        cleaned: &CleanedDocument,
        metadata: CircularMetadata,
        segmentation: Segmentation,
    ) -> Result<CircularRecord, NormalizeError> {
        let full_text = cleaned.full_text();
        let source_hash = SourceHash::of_text(&full_text);
        let circular_id = CircularId::derive(&source_hash);

        // Ids first: children reference parents by id, and parents
        // always precede children in the arena.
        let ids: Vec<ClauseId> = segmentation
            .clauses
            .iter()
            .map(|c| ClauseId::derive(&source_hash, &c.number_path, c.order_index))
            .collect();

        let nodes: Vec<ClauseNode> = segmentation
            .clauses
            .into_iter()
            .enumerate()
            .map(|(idx, clause)| ClauseNode {
                id: ids[idx].clone(),
                parent_id: clause.parent.map(|p| ids[p].clone()),
                number_path: clause.number_path,
                text: clause.text,
                order_index: clause.order_index,
                order_anomaly: clause.order_anomaly,
            })
            .collect();

        let clauses = ClauseTree::new(nodes);
        clauses.verify().map_err(NormalizeError::MappingFailure)?;

        info!(
            circular_id = %circular_id,
            clauses = clauses.len(),
            degraded_pages = cleaned.degraded_pages.len(),
            "mapped circular record"
        );

        Ok(CircularRecord {
            id: circular_id,
            metadata,
            clauses,
            source_hash,
            source_file: source_file.map(str::to_string),
            page_count: cleaned.pages.len() as u32,
        })
    }

    /// Map and persist in one step
    ///
    /// A second mapping of the same source overwrites the stored
    /// artifact rather than duplicating it — the record's identity is
    /// its content.
    pub fn map_and_store<S>(
        &self,
        source_file: Option<&str>,
        cleaned: &CleanedDocument,
        metadata: CircularMetadata,
        segmentation: Segmentation,
        store: &mut S,
    ) -> Result<CircularRecord, NormalizeError>
    where
        S: ArtifactStore,
        S::Error: std::fmt::Display,
    {
        let record = self.map(source_file, cleaned, metadata, segmentation)?;
        store
            .put_record(&record)
            .map_err(|e| NormalizeError::Store(e.to_string()))?;
        Ok(record)
    }
}
