//! Lossless syntax tree for structural build-script editing
//!
//! This crate provides the shared substrate for the completion and
//! structural-edit pipelines:
//!
//! - [`tree`]: an arena-backed [`Document`](tree::Document) owning immutable-shape
//!   nodes, with insert/replace mutation entry points that keep spans
//!   consistent with the concatenated leaf text.
//! - [`pattern`]: composable structural predicates (kind, ancestor-at-depth,
//!   first-child-of-ancestor, and/or) shared across queries.
//! - [`parser`]: a lossless parser for the script DSL subset, also used to
//!   parse snippets in isolation so they can be grafted into a document.
//!
//! All operations are synchronous and assume exclusive access to the
//! `Document`; nothing here spawns work or blocks.

pub mod error;
pub mod parser;
pub mod pattern;
pub mod tree;

pub use error::{EditError, ParseError};
pub use parser::{parse, parse_declaration_fragment, parse_expression_fragment};
pub use pattern::Pattern;
pub use tree::{Ancestors, Document, NodeId, NodeKind, Span};
