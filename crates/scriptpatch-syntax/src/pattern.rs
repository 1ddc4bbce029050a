//! Composable structural predicates over nodes and their ancestor chains
//!
//! Patterns are plain values with `and`/`or` combinators rather than a trait
//! hierarchy. They hold no mutable state, so one pattern can be shared
//! process-wide and reused across queries.

use crate::tree::{Document, NodeId, NodeKind};

/// A structural predicate over a node and its ancestor chain
#[derive(Debug, Clone)]
pub struct Pattern {
    kind: PatternKind,
}

#[derive(Debug, Clone)]
enum PatternKind {
    Kind(NodeKind),
    AncestorKind { depth: usize, kind: NodeKind },
    FirstChildOfAncestor { depth: usize },
    And(Vec<Pattern>),
    Or(Vec<Pattern>),
}

impl Pattern {
    /// Matches nodes with the given kind
    pub fn kind(kind: NodeKind) -> Self {
        Pattern {
            kind: PatternKind::Kind(kind),
        }
    }

    /// Matches when the ancestor exactly `depth` levels up has the given kind
    pub fn ancestor_kind(depth: usize, kind: NodeKind) -> Self {
        Pattern {
            kind: PatternKind::AncestorKind { depth, kind },
        }
    }

    /// Matches when walking `depth` levels up and then following first
    /// children back down lands on the node itself
    pub fn first_child_of_ancestor(depth: usize) -> Self {
        Pattern {
            kind: PatternKind::FirstChildOfAncestor { depth },
        }
    }

    /// Matches when every part matches
    pub fn and(parts: Vec<Pattern>) -> Self {
        Pattern {
            kind: PatternKind::And(parts),
        }
    }

    /// Matches when any part matches
    pub fn or(parts: Vec<Pattern>) -> Self {
        Pattern {
            kind: PatternKind::Or(parts),
        }
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        match &self.kind {
            PatternKind::Kind(kind) => doc.kind(node) == *kind,
            PatternKind::AncestorKind { depth, kind } => doc
                .ancestor_at(node, *depth)
                .map(|a| doc.kind(a) == *kind)
                .unwrap_or(false),
            PatternKind::FirstChildOfAncestor { depth } => {
                let Some(ancestor) = doc.ancestor_at(node, *depth) else {
                    return false;
                };
                let mut current = ancestor;
                while let Some(first) = doc.first_child(current) {
                    current = first;
                    if current == node {
                        return true;
                    }
                }
                current == node
            }
            PatternKind::And(parts) => parts.iter().all(|p| p.matches(doc, node)),
            PatternKind::Or(parts) => parts.iter().any(|p| p.matches(doc, node)),
        }
    }
}
