//! Clause nodes, number paths, and the clause tree

use crate::ident::ClauseId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Hierarchical clause number, e.g. `[1, 2, 3]` for "1.2.3"
///
/// The empty path denotes the document root (preamble text that
/// precedes any numbered clause, or a whole document with no numbering
/// at all).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumberPath(Vec<u32>);

impl NumberPath {
    /// Build a path from its segments
    pub fn new(segments: Vec<u32>) -> Self {
        Self(segments)
    }

    /// The empty root path
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path such as "1.2.3"
    ///
    /// Returns `None` for an empty string or any non-numeric segment.
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        let segments: Option<Vec<u32>> = s.split('.').map(|seg| seg.parse().ok()).collect();
        segments.map(Self)
    }

    /// The path's segments in order
    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Nesting depth; the root path has depth 0
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The last segment, if any
    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    /// Whether this is the document-root path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` is a strict prefix of `other`
    ///
    /// "1.2" is a strict prefix of "1.2.3" but not of itself.
    pub fn is_strict_prefix_of(&self, other: &NumberPath) -> bool {
        self.0.len() < other.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl fmt::Display for NumberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", seg)?;
            first = false;
        }
        Ok(())
    }
}

/// One clause of a circular
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseNode {
    /// Deterministic identifier (source hash + path + order index)
    pub id: ClauseId,

    /// Hierarchical clause number; empty for the preamble root
    pub number_path: NumberPath,

    /// Clause body text, marker stripped
    pub text: String,

    /// Position in document order, starting at 0
    pub order_index: u32,

    /// Owning clause, absent for top-level clauses
    #[serde(default)]
    pub parent_id: Option<ClauseId>,

    /// Set when this clause's number was out of order or duplicated
    /// relative to its siblings; the clause is kept as-is for audit
    #[serde(default)]
    pub order_anomaly: bool,
}

/// The clause tree of one circular, stored as an arena in document order
///
/// Parent/child structure is expressed through `parent_id` references
/// into the arena rather than owned sub-trees, which keeps ownership
/// flat and the serialized form append-ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClauseTree {
    nodes: Vec<ClauseNode>,
}

impl ClauseTree {
    /// Build a tree from nodes already in document order
    pub fn new(nodes: Vec<ClauseNode>) -> Self {
        Self { nodes }
    }

    /// All nodes in document order
    pub fn nodes(&self) -> &[ClauseNode] {
        &self.nodes
    }

    /// Number of clauses in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no clauses
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a clause by id
    pub fn get(&self, id: &ClauseId) -> Option<&ClauseNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Top-level clauses (no parent) in document order
    pub fn roots(&self) -> impl Iterator<Item = &ClauseNode> {
        self.nodes.iter().filter(|n| n.parent_id.is_none())
    }

    /// Direct children of a clause in document order
    pub fn children(&self, id: &ClauseId) -> Vec<&ClauseNode> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id.as_ref() == Some(id))
            .collect()
    }

    /// Ancestor chain for a clause, nearest parent first
    pub fn ancestors(&self, id: &ClauseId) -> Vec<&ClauseNode> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(|n| n.parent_id.as_ref());
        while let Some(parent_id) = current {
            match self.get(parent_id) {
                Some(parent) => {
                    chain.push(parent);
                    current = parent.parent_id.as_ref();
                }
                None => break,
            }
        }
        chain
    }

    /// Check structural integrity
    ///
    /// Every `parent_id` must resolve to a node whose path is a strict
    /// prefix of the child's, and siblings must be strictly increasing
    /// in document order unless flagged `order_anomaly`. A violation
    /// here means the mapper produced inconsistent state and the
    /// document must not be persisted.
    pub fn verify(&self) -> Result<(), String> {
        for node in &self.nodes {
            if let Some(parent_id) = &node.parent_id {
                let parent = self.get(parent_id).ok_or_else(|| {
                    format!(
                        "clause {} references unknown parent {}",
                        node.id, parent_id
                    )
                })?;
                if !parent.number_path.is_strict_prefix_of(&node.number_path) {
                    return Err(format!(
                        "clause {} ({}) is not nested under parent {} ({})",
                        node.id, node.number_path, parent.id, parent.number_path
                    ));
                }
            }
        }

        // Sibling ordering per (parent, depth), in document order. Depth
        // is part of the key: a clause whose own parent marker was
        // missing sits beside shallower siblings and is not comparable
        // to them by trailing number.
        let mut last_by_parent: HashMap<(Option<&ClauseId>, usize), u32> = HashMap::new();
        for node in &self.nodes {
            let Some(last) = node.number_path.last() else {
                continue; // preamble root carries no number
            };
            let key = (node.parent_id.as_ref(), node.number_path.depth());
            if let Some(&prev) = last_by_parent.get(&key) {
                if last <= prev && !node.order_anomaly {
                    return Err(format!(
                        "clause {} ({}) breaks sibling order without an anomaly flag",
                        node.id, node.number_path
                    ));
                }
            }
            last_by_parent.insert(key, last);
        }

        Ok(())
    }
}
