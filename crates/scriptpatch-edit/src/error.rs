//! Error types for structural editing

use scriptpatch_syntax::{EditError, ParseError};
use thiserror::Error;

/// Result type for edit operations
pub type Result<T> = std::result::Result<T, ScriptEditError>;

/// Errors surfaced by edit operations.
///
/// "Not applicable here" outcomes (a locator miss, a duplicate snippet, a
/// scope that cannot be obtained) are `Ok(None)`, not errors; these variants
/// cover genuinely malformed snippets and invalid tree operations.
#[derive(Debug, Error)]
pub enum ScriptEditError {
    /// A snippet could not be parsed as a fragment
    #[error("snippet parse error: {0}")]
    Parse(#[from] ParseError),

    /// A tree mutation primitive was rejected
    #[error("tree edit error: {0}")]
    Edit(#[from] EditError),
}
