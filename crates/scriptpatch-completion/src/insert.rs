//! Insertion behavior applied by the host when a suggestion is accepted
//!
//! The host hands over a live text buffer plus the completion offsets; the
//! behavior splices the rendered parameter name over the typed range, then
//! applies the `" = "` tail policy and leaves the cursor ready for a value.

use crate::types::NamedParameterInsertion;

/// Mutable view of the host buffer during insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionContext {
    pub text: String,
    /// Offset where the completed token starts
    pub start_offset: usize,
    /// Offset just past the current token
    pub tail_offset: usize,
    pub cursor: usize,
}

impl NamedParameterInsertion {
    /// Replace the typed range with the escaped parameter name and apply the
    /// assignment tail
    pub fn handle(&self, ctx: &mut InsertionContext) {
        let rendered = render_identifier(&self.parameter);
        ctx.text
            .replace_range(ctx.start_offset..ctx.tail_offset, &rendered);
        ctx.cursor = ctx.start_offset + rendered.len();
        apply_eq_tail(ctx);
    }
}

/// Append `" = "` after the cursor, or step over an assignment token that is
/// already there (completing over `name = value` must not double the `=`)
fn apply_eq_tail(ctx: &mut InsertionContext) {
    let bytes = ctx.text.as_bytes();
    let mut probe = ctx.cursor;
    while probe < bytes.len() && bytes[probe] == b' ' {
        probe += 1;
    }
    if probe < bytes.len() && bytes[probe] == b'=' && bytes.get(probe + 1) != Some(&b'=') {
        let after = probe + 1;
        if ctx.text.as_bytes().get(after) == Some(&b' ') {
            ctx.cursor = after + 1;
        } else {
            ctx.text.insert(after, ' ');
            ctx.cursor = after + 1;
        }
    } else {
        ctx.text.insert_str(ctx.cursor, " = ");
        ctx.cursor += 3;
    }
}

const KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "val", "var", "when", "while",
];

/// Render a parameter name as valid source identifier text, backquoting
/// keywords and names that are not plain identifiers
pub fn render_identifier(name: &str) -> String {
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
                && !KEYWORDS.contains(&name)
        }
        None => false,
    };
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name)
    }
}
