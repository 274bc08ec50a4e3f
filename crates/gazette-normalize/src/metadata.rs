//! Heuristic inference of document-level metadata

use crate::config::NormalizeConfig;
use chrono::NaiveDate;
use gazette_domain::metadata::fields;
use gazette_domain::{CircularMetadata, CleanedDocument, ConfidenceTier};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

// Date token shared by the date rules: "12-Mar-2024", "12 March 2024",
// "2024-03-12", "12/03/2024".
const DATE_TOKEN: &str =
    r"(?:\d{1,2}[-/ ](?:[A-Za-z]{3,9}|\d{1,2})[-/ ]\d{2,4}|\d{4}-\d{2}-\d{2})";

static RE_CIRCULAR_NO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)circular\s+(?:no|number)\.?\s*[:\-]?\s*([A-Za-z0-9/\-\.]*\d[A-Za-z0-9/\-\.]*)")
        .unwrap()
});
static RE_REF_NO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:no|ref)\.?\s*[:\-]?\s*([A-Za-z0-9/\-\.]*\d[A-Za-z0-9/\-\.]*)")
        .unwrap()
});
static RE_SUBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*(?:subject|sub)\s*[:.\-]\s*(\S.*)$").unwrap());
static RE_ISSUED_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*issued\s+by\s*[:\-]?\s*(\S.*)$").unwrap());
static RE_ORG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^\s*((?:ministry|department|directorate|office|commission|board|authority)\s+of\s+\S[^\r\n]*)$",
    )
    .unwrap()
});
static RE_DATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:dated|effective\s+(?:from|date)?)\s*[:\-]?\s*({})",
        DATE_TOKEN
    ))
    .unwrap()
});
static RE_ANY_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"({})", DATE_TOKEN)).unwrap());

/// One declarative matcher in a field's ordered rule list
struct PatternRule {
    tier: ConfidenceTier,
    regex: &'static LazyLock<Regex>,
}

/// Ordered rule lists per field; the first rule that matches wins.
static CIRCULAR_NUMBER_RULES: &[PatternRule] = &[
    PatternRule { tier: ConfidenceTier::ExactPattern, regex: &RE_CIRCULAR_NO },
    PatternRule { tier: ConfidenceTier::ExactPattern, regex: &RE_REF_NO },
];
static AUTHORITY_RULES: &[PatternRule] = &[
    PatternRule { tier: ConfidenceTier::ExactPattern, regex: &RE_ISSUED_BY },
    PatternRule { tier: ConfidenceTier::ExactPattern, regex: &RE_ORG_LINE },
];

/// Infers `CircularMetadata` from the cleaned first pages
///
/// Fields are inferred independently: a miss on one never blocks
/// another, and a field with no matching rule stays absent — callers
/// must treat that as a normal outcome.
pub struct MetadataInferrer {
    scan_pages: usize,
}

impl MetadataInferrer {
    /// Create an inferrer from the normalizer configuration
    pub fn new(config: &NormalizeConfig) -> Self {
        Self {
            scan_pages: config.metadata_scan_pages,
        }
    }

    /// Infer metadata from a cleaned document
    pub fn infer(&self, doc: &CleanedDocument) -> CircularMetadata {
        let scan: String = doc
            .pages
            .iter()
            .take(self.scan_pages)
            .map(|p| p.text.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut meta = CircularMetadata::absent();
        if scan.trim().is_empty() {
            return meta;
        }

        if let Some((value, tier)) = apply_rules(&scan, CIRCULAR_NUMBER_RULES) {
            meta.circular_number = Some(trim_reference(&value));
            meta.confidence.insert(fields::CIRCULAR_NUMBER.to_string(), tier);
        }

        if let Some((value, tier)) = self.infer_title(&scan) {
            meta.title = Some(value);
            meta.confidence.insert(fields::TITLE.to_string(), tier);
        }

        if let Some((value, tier)) = apply_rules(&scan, AUTHORITY_RULES) {
            meta.authority = Some(value.trim_end_matches(['.', ',']).trim().to_string());
            meta.confidence.insert(fields::AUTHORITY.to_string(), tier);
        }

        if let Some((date, tier)) = self.infer_date(&scan) {
            meta.effective_date = Some(date);
            meta.confidence.insert(fields::EFFECTIVE_DATE.to_string(), tier);
        }

        debug!(
            circular_number = meta.circular_number.as_deref().unwrap_or("-"),
            effective_date = %meta.effective_date.map(|d| d.to_string()).unwrap_or_default(),
            "metadata inference complete"
        );
        meta
    }

    /// Title: an explicit subject line wins; otherwise fall back to the
    /// first non-empty scanned line as a positional guess.
    fn infer_title(&self, scan: &str) -> Option<(String, ConfidenceTier)> {
        if let Some(caps) = RE_SUBJECT.captures(scan) {
            return Some((
                caps[1].trim().to_string(),
                ConfidenceTier::ExactPattern,
            ));
        }
        scan.lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(|l| (l.to_string(), ConfidenceTier::PositionalHeuristic))
    }

    /// Effective date: a "dated ..." pattern wins; otherwise the first
    /// parseable date anywhere in the scanned text.
    fn infer_date(&self, scan: &str) -> Option<(NaiveDate, ConfidenceTier)> {
        if let Some(caps) = RE_DATED.captures(scan) {
            if let Some(date) = parse_date(&caps[1]) {
                return Some((date, ConfidenceTier::ExactPattern));
            }
        }
        for caps in RE_ANY_DATE.captures_iter(scan) {
            if let Some(date) = parse_date(&caps[1]) {
                return Some((date, ConfidenceTier::PositionalHeuristic));
            }
        }
        None
    }
}

/// Run an ordered rule list; first match wins
fn apply_rules(text: &str, rules: &[PatternRule]) -> Option<(String, ConfidenceTier)> {
    for rule in rules {
        if let Some(caps) = rule.regex.captures(text) {
            return Some((caps[1].trim().to_string(), rule.tier));
        }
    }
    None
}

/// Strip trailing punctuation a reference capture may drag along
fn trim_reference(value: &str) -> String {
    value.trim_end_matches(['.', ',', ';']).to_string()
}

/// Parse a date token in the formats circulars actually carry
fn parse_date(token: &str) -> Option<NaiveDate> {
    let canonical: String = token
        .trim()
        .chars()
        .map(|c| if c == '/' || c == ' ' { '-' } else { c })
        .collect();
    for format in ["%Y-%m-%d", "%d-%b-%Y", "%d-%B-%Y", "%d-%m-%Y", "%d-%b-%y", "%d-%m-%y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&canonical, format) {
            return Some(date);
        }
    }
    None
}
