//! Hierarchical clause segmentation

use gazette_domain::NumberPath;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

// A marker is a dotted number at line start: "1.", "1.1.", "2)",
// "1.2.3 Heading". Single numbers require the trailing "." or ")" so
// body lines that merely start with a number (dates, quantities) are
// not mistaken for clauses.
static RE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(\d+(?:\.\d+)+)\.?|(\d+)[.)])(?:\s+(\S.*))?\s*$").unwrap()
});

/// One clause produced by segmentation, arena-indexed
///
/// Identifiers are not assigned here — they depend on the document's
/// source hash, which the record mapper computes. `parent` indexes into
/// the owning [`Segmentation`] arena; parents always precede children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedClause {
    /// Hierarchical clause number; empty for the preamble root
    pub number_path: NumberPath,

    /// Clause body text, marker stripped
    pub text: String,

    /// Position in document order, starting at 0
    pub order_index: u32,

    /// Arena index of the owning clause, absent for top-level clauses
    pub parent: Option<usize>,

    /// Set when the clause number was out of order or duplicated
    pub order_anomaly: bool,
}

/// Result of segmenting one document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    /// Clauses in document order
    pub clauses: Vec<SegmentedClause>,
}

impl Segmentation {
    /// Whether any clause carries an ordering anomaly
    pub fn has_anomalies(&self) -> bool {
        self.clauses.iter().any(|c| c.order_anomaly)
    }
}

/// Splits cleaned body text into a clause hierarchy
///
/// Nesting is decided purely by comparing each marker's number path
/// against the stack of currently open clauses: a new marker closes
/// every open clause whose path is not a strict prefix of its own, then
/// opens as a child of the deepest remaining open clause. Out-of-order
/// or duplicate numbering never fails — the clause is kept as a new
/// sibling with `order_anomaly` set so consumers can audit it.
#[derive(Debug, Default)]
pub struct ClauseSegmenter;

impl ClauseSegmenter {
    /// Create a segmenter
    pub fn new() -> Self {
        Self
    }

    /// Segment the full cleaned body text
    ///
    /// Text before the first marker, or a document with no markers at
    /// all, lands in a single root clause with the empty number path.
    /// This never fails.
    pub fn segment(&self, text: &str) -> Segmentation {
        let mut clauses: Vec<SegmentedClause> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        let mut preamble: Option<usize> = None;

        for line in text.lines() {
            let Some((path, rest)) = match_marker(line) else {
                match open.last().copied().or(preamble) {
                    Some(idx) => {
                        let target = &mut clauses[idx].text;
                        if !target.is_empty() {
                            target.push('\n');
                        }
                        target.push_str(line);
                    }
                    None if line.trim().is_empty() => {}
                    None => {
                        let idx = clauses.len();
                        clauses.push(SegmentedClause {
                            number_path: NumberPath::root(),
                            text: line.to_string(),
                            order_index: idx as u32,
                            parent: None,
                            order_anomaly: false,
                        });
                        preamble = Some(idx);
                    }
                }
                continue;
            };

            // Close every open clause that is not an ancestor of the
            // new marker.
            while let Some(&top) = open.last() {
                if clauses[top].number_path.is_strict_prefix_of(&path) {
                    break;
                }
                open.pop();
            }
            let parent = open.last().copied();
            let anomaly = sibling_anomaly(&clauses, parent, &path);
            if anomaly {
                warn!(path = %path, "clause number out of order; kept as sibling");
            }

            let idx = clauses.len();
            clauses.push(SegmentedClause {
                number_path: path,
                text: rest.unwrap_or_default().to_string(),
                order_index: idx as u32,
                parent,
                order_anomaly: anomaly,
            });
            open.push(idx);
        }

        if clauses.is_empty() {
            clauses.push(SegmentedClause {
                number_path: NumberPath::root(),
                text: String::new(),
                order_index: 0,
                parent: None,
                order_anomaly: false,
            });
        }
        for clause in &mut clauses {
            clause.text = clause.text.trim().to_string();
        }

        Segmentation { clauses }
    }
}

/// Parse a clause marker at line start
fn match_marker(line: &str) -> Option<(NumberPath, Option<&str>)> {
    let caps = RE_MARKER.captures(line)?;
    let path_str = caps.get(1).or_else(|| caps.get(2))?.as_str();
    // Oversized numbers fall through to body text rather than erroring.
    let path = NumberPath::parse(path_str)?;
    Some((path, caps.get(3).map(|m| m.as_str())))
}

/// Whether a new marker breaks strictly-increasing sibling order
///
/// Compared against the most recent sibling with the same parent and
/// depth; a clause whose own parent marker was missing has no
/// comparable sibling and is not flagged.
fn sibling_anomaly(clauses: &[SegmentedClause], parent: Option<usize>, path: &NumberPath) -> bool {
    let (Some(new_last), depth) = (path.last(), path.depth()) else {
        return false;
    };
    clauses
        .iter()
        .rev()
        .find(|c| c.parent == parent && c.number_path.depth() == depth)
        .and_then(|c| c.number_path.last())
        .is_some_and(|prev_last| new_last <= prev_last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> Segmentation {
        ClauseSegmenter::new().segment(text)
    }

    fn paths(seg: &Segmentation) -> Vec<String> {
        seg.clauses.iter().map(|c| c.number_path.to_string()).collect()
    }

    #[test]
    fn test_flat_clauses() {
        let seg = segment("1. First clause\n2. Second clause\n3. Third clause");
        assert_eq!(paths(&seg), vec!["1", "2", "3"]);
        assert!(seg.clauses.iter().all(|c| c.parent.is_none()));
        assert_eq!(seg.clauses[0].text, "First clause");
    }

    #[test]
    fn test_nested_clauses() {
        let seg = segment("1. Parent\n1.1. Child\n1.1.1. Grandchild\n2. Next parent");
        assert_eq!(paths(&seg), vec!["1", "1.1", "1.1.1", "2"]);
        assert_eq!(seg.clauses[1].parent, Some(0));
        assert_eq!(seg.clauses[2].parent, Some(1));
        assert_eq!(seg.clauses[3].parent, None);
        assert!(!seg.has_anomalies());
    }

    #[test]
    fn test_body_text_attaches_to_deepest_open_clause() {
        let seg = segment("1. Heading\ncontinuation line\n1.1. Child\nchild detail\nmore detail");
        assert_eq!(seg.clauses[0].text, "Heading\ncontinuation line");
        assert_eq!(seg.clauses[1].text, "Child\nchild detail\nmore detail");
    }

    #[test]
    fn test_preamble_before_first_marker() {
        let seg = segment("Issued for general guidance.\n\n1. Scope");
        assert_eq!(paths(&seg), vec!["", "1"]);
        assert!(seg.clauses[0].number_path.is_root());
        assert_eq!(seg.clauses[0].text, "Issued for general guidance.");
        assert_eq!(seg.clauses[0].order_index, 0);
    }

    #[test]
    fn test_no_markers_yields_single_root() {
        let seg = segment("Just prose.\nNothing numbered anywhere.");
        assert_eq!(seg.clauses.len(), 1);
        assert!(seg.clauses[0].number_path.is_root());
        assert_eq!(seg.clauses[0].text, "Just prose.\nNothing numbered anywhere.");
    }

    #[test]
    fn test_empty_input_yields_single_root() {
        let seg = segment("");
        assert_eq!(seg.clauses.len(), 1);
        assert!(seg.clauses[0].number_path.is_root());
        assert_eq!(seg.clauses[0].text, "");
    }

    #[test]
    fn test_out_of_order_sibling_flagged_not_dropped() {
        let seg = segment("3. Third\n2. Second appears late");
        assert_eq!(paths(&seg), vec!["3", "2"]);
        assert!(!seg.clauses[0].order_anomaly);
        assert!(seg.clauses[1].order_anomaly);
    }

    #[test]
    fn test_duplicate_sibling_flagged() {
        let seg = segment("2. First copy\n2. Second copy");
        assert_eq!(paths(&seg), vec!["2", "2"]);
        assert!(seg.clauses[1].order_anomaly);
        assert_eq!(seg.clauses[1].text, "Second copy");
    }

    #[test]
    fn test_sibling_closes_nested_branch() {
        let seg = segment("1. One\n1.2. One two\n2. Two\n2.1. Two one");
        assert_eq!(paths(&seg), vec!["1", "1.2", "2", "2.1"]);
        assert_eq!(seg.clauses[3].parent, Some(2));
    }

    #[test]
    fn test_missing_parent_marker_keeps_deep_path() {
        // "2.1" with no "2." before it: top-level placement, no anomaly
        // (there is no comparable sibling at that depth).
        let seg = segment("1. One\n2.1 Deep without parent");
        assert_eq!(paths(&seg), vec!["1", "2.1"]);
        assert_eq!(seg.clauses[1].parent, None);
        assert!(!seg.clauses[1].order_anomaly);
    }

    #[test]
    fn test_plain_number_line_is_not_a_marker() {
        let seg = segment("1. Clause\n12 March 2024 is the effective date");
        assert_eq!(seg.clauses.len(), 1);
        assert!(seg.clauses[0].text.contains("12 March 2024"));
    }

    #[test]
    fn test_parenthesis_marker() {
        let seg = segment("1) First\n2) Second");
        assert_eq!(paths(&seg), vec!["1", "2"]);
    }

    #[test]
    fn test_marker_with_no_inline_text() {
        let seg = segment("1.\nBody on the following line\n2. Next");
        assert_eq!(paths(&seg), vec!["1", "2"]);
        assert_eq!(seg.clauses[0].text, "Body on the following line");
    }
}
