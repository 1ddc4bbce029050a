//! Structural gate deciding where named-parameter completion applies
//!
//! The position filter is a cheap tree check that runs before any symbol
//! resolution: the cursor must sit on an identifier leaf that is either the
//! leading token of a plain argument or inside the name part of a named
//! argument, both exactly two levels up. Looser matching would fire inside
//! nested expressions.

use std::sync::OnceLock;

use scriptpatch_syntax::{Document, NodeId, NodeKind, Pattern};

use crate::resolve::value_arguments;

fn position_pattern() -> &'static Pattern {
    static PATTERN: OnceLock<Pattern> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Pattern::and(vec![
            Pattern::kind(NodeKind::Identifier),
            Pattern::or(vec![
                Pattern::and(vec![
                    Pattern::ancestor_kind(2, NodeKind::Argument),
                    Pattern::first_child_of_ancestor(2),
                ]),
                Pattern::ancestor_kind(2, NodeKind::ArgumentName),
            ]),
        ])
    })
}

/// True when the cursor position is eligible for named-parameter completion
pub fn is_named_argument_position(doc: &Document, position: NodeId) -> bool {
    position_pattern().matches(doc, position)
}

/// True when only a named parameter can legally follow at this position:
/// some argument strictly before the current one is already named, which in
/// the host language forces every later argument to be named as well.
///
/// Scanning stops at the current argument; named arguments after it do not
/// count.
pub fn is_only_named_parameter_expected(doc: &Document, position: NodeId) -> bool {
    if !is_named_argument_position(doc, position) {
        return false;
    }
    let Some(argument) = doc.strict_ancestor_of_kind(position, NodeKind::Argument) else {
        return false;
    };
    let Some(call) = doc.strict_ancestor_of_kind(argument, NodeKind::Call) else {
        return false;
    };
    for arg in value_arguments(doc, call) {
        if arg.node == argument {
            break;
        }
        if arg.name.is_some() {
            return true;
        }
    }
    false
}
