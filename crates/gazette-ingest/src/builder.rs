//! Building episode payloads from circular records

use crate::config::{Granularity, IngestConfig};
use crate::error::IngestError;
use chrono::NaiveDate;
use gazette_domain::traits::DedupLedger;
use gazette_domain::{
    CircularRecord, ClauseId, ClauseNode, ContentHash, Episode, EpisodeId,
};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Result of one build pass over a record
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Episodes to submit, in document order
    pub episodes: Vec<Episode>,

    /// Entries skipped because their content hash was already built
    /// this run or found in the persisted ledger
    pub skipped: usize,
}

/// Per-clause episode payload
///
/// Field order is the serialized order; it is part of the content-hash
/// contract and must stay stable.
#[derive(Serialize)]
struct ClausePayload<'a> {
    circular_id: &'a str,
    circular_number: Option<&'a str>,
    title: Option<&'a str>,
    authority: Option<&'a str>,
    effective_date: Option<NaiveDate>,
    source_file: Option<&'a str>,
    number_path: String,
    lineage: Vec<String>,
    order_anomaly: bool,
    text: &'a str,
}

/// One clause entry inside a per-circular payload
#[derive(Serialize)]
struct ClauseEntry<'a> {
    number_path: String,
    lineage: Vec<String>,
    order_anomaly: bool,
    text: &'a str,
}

/// Whole-circular episode payload
#[derive(Serialize)]
struct CircularPayload<'a> {
    circular_id: &'a str,
    circular_number: Option<&'a str>,
    title: Option<&'a str>,
    authority: Option<&'a str>,
    effective_date: Option<NaiveDate>,
    source_file: Option<&'a str>,
    clauses: Vec<ClauseEntry<'a>>,
}

/// Leading metadata episode payload
#[derive(Serialize)]
struct MetadataPayload<'a> {
    circular_id: &'a str,
    circular_number: Option<&'a str>,
    title: Option<&'a str>,
    authority: Option<&'a str>,
    effective_date: Option<NaiveDate>,
    source_file: Option<&'a str>,
    page_count: u32,
    preamble: Option<&'a str>,
}

/// Translates records into episode payloads with a dedup guard
///
/// The builder keeps the set of content hashes it has produced across
/// calls, so building episodes twice from the same record yields zero
/// new episodes on the second pass. An optional persisted ledger
/// extends the guard across runs. This is a guard against redundant
/// submissions, not a correctness requirement — the sink's identifiers
/// are deterministic too.
pub struct EpisodeBuilder {
    config: IngestConfig,
    seen: HashSet<ContentHash>,
}

impl EpisodeBuilder {
    /// Create a builder
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            seen: HashSet::new(),
        }
    }

    /// Forget every content hash built so far
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    /// Build episodes for one record
    pub fn build<L>(
        &mut self,
        record: &CircularRecord,
        prior: Option<&L>,
    ) -> Result<BuildResult, IngestError>
    where
        L: DedupLedger,
    {
        let mut episodes = Vec::new();
        let mut skipped = 0usize;

        if self.config.emit_metadata_episode {
            let payload = serialize(&MetadataPayload {
                circular_id: record.id.as_str(),
                circular_number: record.metadata.circular_number.as_deref(),
                title: record.metadata.title.as_deref(),
                authority: record.metadata.authority.as_deref(),
                effective_date: record.metadata.effective_date,
                source_file: record.source_file.as_deref(),
                page_count: record.page_count,
                preamble: preamble_text(record),
            })?;
            let name = format!("circular_meta_{}", record.id);
            self.push_unless_seen(record, name, payload, Vec::new(), prior, &mut episodes, &mut skipped);
        }

        match self.config.granularity {
            Granularity::PerClause => {
                for node in substantive_nodes(record) {
                    let payload = serialize(&ClausePayload {
                        circular_id: record.id.as_str(),
                        circular_number: record.metadata.circular_number.as_deref(),
                        title: record.metadata.title.as_deref(),
                        authority: record.metadata.authority.as_deref(),
                        effective_date: record.metadata.effective_date,
                        source_file: record.source_file.as_deref(),
                        number_path: node.number_path.to_string(),
                        lineage: lineage(record, node),
                        order_anomaly: node.order_anomaly,
                        text: &node.text,
                    })?;
                    let name = format!("{}_clause_{}", record.id, node.order_index);
                    self.push_unless_seen(
                        record,
                        name,
                        payload,
                        vec![node.id.clone()],
                        prior,
                        &mut episodes,
                        &mut skipped,
                    );
                }
            }
            Granularity::PerCircular => {
                let clauses: Vec<ClauseEntry> = substantive_nodes(record)
                    .into_iter()
                    .map(|node| ClauseEntry {
                        number_path: node.number_path.to_string(),
                        lineage: lineage(record, node),
                        order_anomaly: node.order_anomaly,
                        text: &node.text,
                    })
                    .collect();
                let payload = serialize(&CircularPayload {
                    circular_id: record.id.as_str(),
                    circular_number: record.metadata.circular_number.as_deref(),
                    title: record.metadata.title.as_deref(),
                    authority: record.metadata.authority.as_deref(),
                    effective_date: record.metadata.effective_date,
                    source_file: record.source_file.as_deref(),
                    clauses,
                })?;
                let name = format!("{}_clauses", record.id);
                let clause_ids = substantive_nodes(record)
                    .into_iter()
                    .map(|n| n.id.clone())
                    .collect();
                self.push_unless_seen(
                    record,
                    name,
                    payload,
                    clause_ids,
                    prior,
                    &mut episodes,
                    &mut skipped,
                );
            }
        }

        info!(
            circular_id = %record.id,
            built = episodes.len(),
            skipped,
            "episode build complete"
        );
        Ok(BuildResult { episodes, skipped })
    }

    #[allow(clippy::too_many_arguments)]
    fn push_unless_seen<L>(
        &mut self,
        record: &CircularRecord,
        name: String,
        payload: String,
        clause_ids: Vec<ClauseId>,
        prior: Option<&L>,
        episodes: &mut Vec<Episode>,
        skipped: &mut usize,
    ) where
        L: DedupLedger,
    {
        let content_hash = ContentHash::of_payload(&payload);
        let in_prior = prior.is_some_and(|ledger| ledger.contains(&content_hash));
        if self.seen.contains(&content_hash) || in_prior {
            debug!(name = %name, "skipping already-built episode");
            *skipped += 1;
            return;
        }
        self.seen.insert(content_hash.clone());
        episodes.push(Episode {
            id: EpisodeId::derive(&content_hash),
            circular_id: record.id.clone(),
            clause_ids,
            name,
            payload,
            content_hash,
        });
    }
}

fn serialize<T: Serialize>(payload: &T) -> Result<String, IngestError> {
    serde_json::to_string(payload).map_err(|e| IngestError::Payload(e.to_string()))
}

/// Clauses that become episodes
///
/// The preamble root is front-matter, not substantive content — except
/// in a markerless document, where the single root clause is the whole
/// body and must not be dropped.
fn substantive_nodes(record: &CircularRecord) -> Vec<&ClauseNode> {
    let nodes = record.clauses.nodes();
    if nodes.len() == 1 {
        return nodes.iter().collect();
    }
    nodes.iter().filter(|n| !n.number_path.is_root()).collect()
}

/// Ancestor number paths, outermost first, for graph edge construction
fn lineage(record: &CircularRecord, node: &ClauseNode) -> Vec<String> {
    let mut chain: Vec<String> = record
        .clauses
        .ancestors(&node.id)
        .into_iter()
        .map(|a| a.number_path.to_string())
        .collect();
    chain.reverse();
    chain
}

/// Preamble (root clause) text, when the document has one
fn preamble_text(record: &CircularRecord) -> Option<&str> {
    record
        .clauses
        .nodes()
        .iter()
        .find(|n| n.number_path.is_root() && !n.text.is_empty())
        .map(|n| n.text.as_str())
}
