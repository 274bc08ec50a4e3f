//! Per-document outcomes and the batch summary report

use gazette_domain::CircularId;

/// Failure taxonomy label carried on non-success outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Inconsistent internal state while mapping or persisting
    Mapping,

    /// Transient ingestion failures exhausted the retry budget
    IngestionTransient,

    /// The ingestion service permanently rejected a payload
    IngestionRejected,

    /// Unexpected runner-internal error
    Internal,
}

impl FailureKind {
    /// Get the taxonomy label as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Mapping => "mapping_failure",
            FailureKind::IngestionTransient => "ingestion_transient",
            FailureKind::IngestionRejected => "ingestion_rejected",
            FailureKind::Internal => "internal",
        }
    }
}

/// Outcome of one document's pipeline run
#[derive(Debug)]
pub enum DocumentOutcome {
    /// Mapped and persisted; ingestion not requested (dry run)
    Mapped {
        /// Identity of the mapped record
        circular_id: CircularId,
        /// Clauses in the mapped tree
        clauses: usize,
        /// Whether any page had no usable text
        degraded: bool,
    },

    /// Mapped, persisted, and every built episode accepted
    Ingested {
        /// Identity of the mapped record
        circular_id: CircularId,
        /// Episodes accepted this run
        episodes: usize,
        /// Episodes skipped by the dedup guard
        skipped: usize,
        /// Whether any page had no usable text
        degraded: bool,
    },

    /// Processing did not run to completion (cancellation between stages)
    Skipped {
        /// Why the document was skipped
        reason: String,
    },

    /// The document failed; the rest of the batch is unaffected
    Failed {
        /// Taxonomy label
        label: FailureKind,
        /// Human-readable cause
        cause: String,
    },
}

impl DocumentOutcome {
    /// Whether this outcome counts as success
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            DocumentOutcome::Mapped { .. } | DocumentOutcome::Ingested { .. }
        )
    }
}

/// One document's entry in the batch report
#[derive(Debug)]
pub struct DocumentReport {
    /// Document name (typically the source file name)
    pub name: String,

    /// What happened to it
    pub outcome: DocumentOutcome,
}

/// Outcome report for one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-document outcomes, in input order
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    /// Documents that mapped or ingested successfully
    pub fn succeeded(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.outcome.is_success())
            .count()
    }

    /// Documents that failed
    pub fn failed(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.outcome, DocumentOutcome::Failed { .. }))
            .count()
    }

    /// Documents skipped by cancellation
    pub fn skipped(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.outcome, DocumentOutcome::Skipped { .. }))
            .count()
    }

    /// Whether every document succeeded
    pub fn all_succeeded(&self) -> bool {
        self.documents.iter().all(|d| d.outcome.is_success())
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Batch Summary".to_string(),
            "=============".to_string(),
            format!(
                "Documents: {} ({} ok, {} failed, {} skipped)",
                self.documents.len(),
                self.succeeded(),
                self.failed(),
                self.skipped()
            ),
            String::new(),
        ];

        for doc in &self.documents {
            let line = match &doc.outcome {
                DocumentOutcome::Mapped { circular_id, clauses, degraded } => format!(
                    "  mapped    {} -> {} ({} clauses{})",
                    doc.name,
                    circular_id,
                    clauses,
                    if *degraded { ", degraded" } else { "" }
                ),
                DocumentOutcome::Ingested { circular_id, episodes, skipped, degraded } => format!(
                    "  ingested  {} -> {} ({} episodes, {} deduped{})",
                    doc.name,
                    circular_id,
                    episodes,
                    skipped,
                    if *degraded { ", degraded" } else { "" }
                ),
                DocumentOutcome::Skipped { reason } => {
                    format!("  skipped   {} ({})", doc.name, reason)
                }
                DocumentOutcome::Failed { label, cause } => {
                    format!("  FAILED    {} [{}] {}", doc.name, label.as_str(), cause)
                }
            };
            lines.push(line);
        }

        lines.join("\n")
    }
}
