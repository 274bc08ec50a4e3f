//! Confidence tiers for inferred metadata fields

use serde::{Deserialize, Serialize};

/// How a metadata field was derived
///
/// Every inferred field carries a tier so downstream consumers can tell
/// a pattern-matched value from a positional guess from a field that
/// was simply not found. Ordering follows derivation strength:
/// `Absent < PositionalHeuristic < ExactPattern`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// No rule matched; the field is not populated
    Absent,

    /// Derived from document position (e.g. first non-empty line)
    PositionalHeuristic,

    /// Matched an explicit pattern rule
    ExactPattern,
}

impl ConfidenceTier {
    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Absent => "absent",
            ConfidenceTier::PositionalHeuristic => "positional_heuristic",
            ConfidenceTier::ExactPattern => "exact_pattern",
        }
    }

    /// Parse a tier from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "absent" => Some(ConfidenceTier::Absent),
            "positional_heuristic" => Some(ConfidenceTier::PositionalHeuristic),
            "exact_pattern" => Some(ConfidenceTier::ExactPattern),
            _ => None,
        }
    }

    /// Whether the field carries a value at all
    pub fn is_present(&self) -> bool {
        !matches!(self, ConfidenceTier::Absent)
    }
}

impl std::str::FromStr for ConfidenceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid confidence tier: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(ConfidenceTier::ExactPattern > ConfidenceTier::PositionalHeuristic);
        assert!(ConfidenceTier::PositionalHeuristic > ConfidenceTier::Absent);
    }

    #[test]
    fn test_tier_round_trip() {
        for tier in [
            ConfidenceTier::Absent,
            ConfidenceTier::PositionalHeuristic,
            ConfidenceTier::ExactPattern,
        ] {
            assert_eq!(ConfidenceTier::parse(tier.as_str()), Some(tier));
        }
    }

    #[test]
    fn test_tier_parse_invalid() {
        assert_eq!(ConfidenceTier::parse("guessed"), None);
    }

    #[test]
    fn test_tier_presence() {
        assert!(!ConfidenceTier::Absent.is_present());
        assert!(ConfidenceTier::ExactPattern.is_present());
    }
}
