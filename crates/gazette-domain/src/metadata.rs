//! Document-level metadata inferred from the cleaned first pages

use crate::tier::ConfidenceTier;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata field keys used in the confidence map
pub mod fields {
    /// The circular's reference number
    pub const CIRCULAR_NUMBER: &str = "circular_number";
    /// The circular's title or subject line
    pub const TITLE: &str = "title";
    /// The issuing authority
    pub const AUTHORITY: &str = "authority";
    /// The date the circular takes effect
    pub const EFFECTIVE_DATE: &str = "effective_date";
}

/// Inferred document-level metadata
///
/// Every field may be absent; inference is heuristic and an absent
/// field is a normal outcome, not an error. The `confidence` map
/// carries an entry for every field so the derivation of each value
/// (or its absence) is always explicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircularMetadata {
    /// Reference number, e.g. "07/2024"
    #[serde(default)]
    pub circular_number: Option<String>,

    /// Title or subject line
    #[serde(default)]
    pub title: Option<String>,

    /// Issuing authority
    #[serde(default)]
    pub authority: Option<String>,

    /// Effective date
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,

    /// Derivation tier per field
    #[serde(default)]
    pub confidence: BTreeMap<String, ConfidenceTier>,
}

impl CircularMetadata {
    /// Metadata with every field absent
    pub fn absent() -> Self {
        let mut confidence = BTreeMap::new();
        for field in [
            fields::CIRCULAR_NUMBER,
            fields::TITLE,
            fields::AUTHORITY,
            fields::EFFECTIVE_DATE,
        ] {
            confidence.insert(field.to_string(), ConfidenceTier::Absent);
        }
        Self {
            circular_number: None,
            title: None,
            authority: None,
            effective_date: None,
            confidence,
        }
    }

    /// The derivation tier recorded for a field
    pub fn tier_for(&self, field: &str) -> ConfidenceTier {
        self.confidence
            .get(field)
            .copied()
            .unwrap_or(ConfidenceTier::Absent)
    }
}

impl Default for CircularMetadata {
    fn default() -> Self {
        Self::absent()
    }
}
