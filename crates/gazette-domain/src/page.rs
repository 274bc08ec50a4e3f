//! Page-level input and cleaned-document types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One page of raw extracted text, as produced by the external
/// extraction collaborator
///
/// Immutable once read; the pipeline never mutates page input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number within the source document
    pub page_number: u32,

    /// Raw extracted text for the page (may be empty for unreadable pages)
    pub raw_text: String,
}

/// One page after boilerplate removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPage {
    /// 1-based page number carried over from the input
    pub page_number: u32,

    /// Page text with boilerplate lines removed
    pub text: String,
}

/// A document's pages after boilerplate removal
///
/// Lives for the duration of one document's processing and is consumed
/// read-only by the metadata inferrer, the clause segmenter, and the
/// record mapper.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CleanedDocument {
    /// Cleaned pages in page order
    pub pages: Vec<CleanedPage>,

    /// Distinct raw lines that were removed as boilerplate
    pub removed_lines: BTreeSet<String>,

    /// Pages that carried no usable text and were skipped
    pub degraded_pages: Vec<u32>,
}

impl CleanedDocument {
    /// Full cleaned body text: non-empty pages joined in page order
    ///
    /// This is the text the source hash is computed over, so the join
    /// must be deterministic.
    pub fn full_text(&self) -> String {
        let parts: Vec<&str> = self
            .pages
            .iter()
            .map(|p| p.text.trim())
            .filter(|t| !t.is_empty())
            .collect();
        parts.join("\n\n")
    }

    /// Whether any page had to be skipped for lack of usable text
    pub fn is_degraded(&self) -> bool {
        !self.degraded_pages.is_empty()
    }
}
