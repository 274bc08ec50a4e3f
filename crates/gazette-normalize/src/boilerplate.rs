//! Repeated header/footer detection and removal

use crate::config::NormalizeConfig;
use gazette_domain::{CleanedDocument, CleanedPage, Page};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Detects lines repeated across a document's pages and strips them
///
/// Candidates are taken from the first/last few lines of every page and
/// counted under a normalized form (whitespace collapsed, lowercased,
/// digits wildcarded), so "Page 3" and "Page 12" — or an OCR-garbled
/// digit — count as the same line. A candidate seen on at least the
/// threshold fraction of pages is removed from every page it appears
/// on, wherever it appears.
pub struct BoilerplateDetector {
    head_lines: usize,
    tail_lines: usize,
    threshold: f64,
}

impl BoilerplateDetector {
    /// Create a detector from the normalizer configuration
    pub fn new(config: &NormalizeConfig) -> Self {
        Self {
            head_lines: config.head_lines,
            tail_lines: config.tail_lines,
            threshold: config.boilerplate_threshold,
        }
    }

    /// Remove boilerplate from a document's pages
    ///
    /// With fewer than 2 pages there is no repetition signal, so
    /// detection is skipped and the pages pass through unchanged.
    pub fn clean(&self, pages: &[Page]) -> CleanedDocument {
        let boilerplate = if pages.len() < 2 {
            debug!(pages = pages.len(), "too few pages for boilerplate detection, passing through");
            HashSet::new()
        } else {
            self.detect(pages)
        };

        let mut cleaned_pages = Vec::with_capacity(pages.len());
        let mut removed_lines = BTreeSet::new();
        let mut degraded_pages = Vec::new();

        for page in pages {
            if page.raw_text.trim().is_empty() {
                degraded_pages.push(page.page_number);
                cleaned_pages.push(CleanedPage {
                    page_number: page.page_number,
                    text: String::new(),
                });
                continue;
            }

            let mut kept = Vec::new();
            for line in page.raw_text.lines() {
                let trimmed = line.trim();
                if !trimmed.is_empty() && boilerplate.contains(&normalize_line(trimmed)) {
                    removed_lines.insert(trimmed.to_string());
                } else {
                    kept.push(line);
                }
            }
            cleaned_pages.push(CleanedPage {
                page_number: page.page_number,
                text: kept.join("\n").trim().to_string(),
            });
        }

        if !removed_lines.is_empty() {
            debug!(
                removed = removed_lines.len(),
                degraded = degraded_pages.len(),
                "boilerplate removal complete"
            );
        }

        CleanedDocument {
            pages: cleaned_pages,
            removed_lines,
            degraded_pages,
        }
    }

    /// Count normalized header/footer candidates across all pages
    fn detect(&self, pages: &[Page]) -> HashSet<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();

        for page in pages {
            let lines: Vec<&str> = page
                .raw_text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect();
            if lines.is_empty() {
                continue;
            }

            // A candidate counts once per page even if it shows up in
            // both the head and tail zone of a short page.
            let mut seen_on_page = HashSet::new();
            let head = lines.iter().take(self.head_lines);
            let tail = lines
                .iter()
                .skip(lines.len().saturating_sub(self.tail_lines));
            for line in head.chain(tail) {
                seen_on_page.insert(normalize_line(line));
            }
            for normalized in seen_on_page {
                *counts.entry(normalized).or_insert(0) += 1;
            }
        }

        let total = pages.len() as f64;
        counts
            .into_iter()
            .filter(|(_, count)| *count as f64 / total >= self.threshold)
            .map(|(line, _)| line)
            .collect()
    }
}

/// Normalized comparison form: whitespace collapsed, ASCII lowercased,
/// digit runs replaced with a single `#`
///
/// Collapsing runs (not single digits) keeps "Page 9" and "Page 10"
/// on the same normalized form.
fn normalize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_space = false;
    let mut in_digit_run = false;
    for ch in line.trim().chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            in_digit_run = false;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if ch.is_ascii_digit() {
            if !in_digit_run {
                out.push('#');
                in_digit_run = true;
            }
        } else {
            out.extend(ch.to_lowercase());
            in_digit_run = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: u32, text: &str) -> Page {
        Page {
            page_number: n,
            raw_text: text.to_string(),
        }
    }

    #[test]
    fn test_normalize_line_wildcards_digit_runs() {
        assert_eq!(normalize_line("Circular Office — Page 3"), "circular office — page #");
        assert_eq!(
            normalize_line("Circular Office — Page 12"),
            "circular office — page #"
        );
        assert_eq!(normalize_line("Ref 12/34"), "ref #/#");
        assert_eq!(normalize_line("  Mixed   Case\tText "), "mixed case text");
    }

    #[test]
    fn test_single_page_is_a_no_op() {
        let detector = BoilerplateDetector::new(&NormalizeConfig::default());
        let pages = vec![page(1, "Header\nBody text\nFooter")];
        let doc = detector.clean(&pages);
        assert_eq!(doc.pages[0].text, "Header\nBody text\nFooter");
        assert!(doc.removed_lines.is_empty());
    }

    #[test]
    fn test_repeated_header_removed_from_every_page() {
        let detector = BoilerplateDetector::new(&NormalizeConfig::default());
        let pages = vec![
            page(1, "Internal Memo\nFirst page body"),
            page(2, "Internal Memo\nSecond page body"),
            page(3, "Internal Memo\nThird page body"),
        ];
        let doc = detector.clean(&pages);
        for cleaned in &doc.pages {
            assert!(!cleaned.text.contains("Internal Memo"));
        }
        assert!(doc.removed_lines.contains("Internal Memo"));
    }

    #[test]
    fn test_ocr_garbled_page_number_variant_still_matches() {
        let detector = BoilerplateDetector::new(&NormalizeConfig::default());
        // Page 3 carries a garbled digit in the shared header; the
        // digit wildcard makes all three normalize identically.
        let pages = vec![
            page(1, "Revenue Dept — Page 1\nalpha"),
            page(2, "Revenue Dept — Page 2\nbeta"),
            page(3, "Revenue Dept — Page 8\ngamma"),
        ];
        let doc = detector.clean(&pages);
        assert_eq!(doc.pages[0].text, "alpha");
        assert_eq!(doc.pages[1].text, "beta");
        assert_eq!(doc.pages[2].text, "gamma");
        assert_eq!(doc.removed_lines.len(), 3);
    }

    #[test]
    fn test_below_threshold_is_kept() {
        let detector = BoilerplateDetector::new(&NormalizeConfig::default());
        // Shared line on 1 of 3 pages: 33% < 60% threshold.
        let pages = vec![
            page(1, "Rare header\nbody one"),
            page(2, "body two"),
            page(3, "body three"),
        ];
        let doc = detector.clean(&pages);
        assert!(doc.pages[0].text.contains("Rare header"));
        assert!(doc.removed_lines.is_empty());
    }

    #[test]
    fn test_empty_page_flagged_degraded() {
        let detector = BoilerplateDetector::new(&NormalizeConfig::default());
        let pages = vec![
            page(1, "Header\nbody"),
            page(2, "   "),
            page(3, "Header\nmore body"),
        ];
        let doc = detector.clean(&pages);
        assert_eq!(doc.degraded_pages, vec![2]);
        assert_eq!(doc.pages[1].text, "");
    }

    #[test]
    fn test_footer_zone_candidates_detected() {
        let detector = BoilerplateDetector::new(&NormalizeConfig::default());
        let pages = vec![
            page(1, "body one\nline\nline\nline\nConfidential"),
            page(2, "body two\nline b\nline c\nline d\nConfidential"),
        ];
        let doc = detector.clean(&pages);
        assert!(doc.removed_lines.contains("Confidential"));
        assert!(!doc.pages[0].text.contains("Confidential"));
    }
}
