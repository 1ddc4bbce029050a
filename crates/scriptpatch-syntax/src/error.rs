//! Error types for parsing and tree mutation

use thiserror::Error;

use crate::tree::NodeId;

/// Errors reported by the fragment parser
#[derive(Debug, Error)]
pub enum ParseError {
    /// A token appeared where no statement or expression can start
    #[error("unexpected token {found:?} at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    /// Input ended inside an unfinished construct
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A closing delimiter is missing
    #[error("missing closing {expected:?} for delimiter opened at offset {offset}")]
    UnbalancedDelimiter { expected: char, offset: usize },

    /// A string literal runs past the end of the input
    #[error("unterminated string literal at offset {offset}")]
    UnterminatedString { offset: usize },

    /// A fragment parse produced no usable node
    #[error("fragment contains no statement")]
    EmptyFragment,
}

/// Errors reported by `Document` mutation entry points
#[derive(Debug, Error)]
pub enum EditError {
    /// The anchor node has no parent, so there is no position to splice into
    #[error("node {0:?} is detached from the tree")]
    Detached(NodeId),

    /// The node being inserted already has a parent
    #[error("node {0:?} is already attached")]
    AlreadyAttached(NodeId),

    /// A leaf node cannot receive children
    #[error("node {0:?} is a leaf and cannot hold children")]
    LeafParent(NodeId),
}
