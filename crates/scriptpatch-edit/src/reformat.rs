//! Whitespace normalization around edits
//!
//! Two layers: [`add_newlines_if_needed`] keeps inserted elements on their
//! own lines at edit time, and [`reindent`] renders document text with
//! normalized indentation, standing in for the host editor's post-edit
//! reformat pass.

use scriptpatch_syntax::{Document, NodeId, NodeKind};

use crate::error::Result;

/// Put a freshly inserted element on its own line: a newline is added before
/// it when the previous sibling ends in non-blank text, and after it when
/// the next sibling starts with non-blank text.
pub fn add_newlines_if_needed(doc: &mut Document, node: NodeId) -> Result<()> {
    if let Some(prev) = doc.prev_sibling(node) {
        if !doc.text(prev).trim().is_empty() {
            let ws = doc.new_leaf(NodeKind::Whitespace, "\n");
            doc.insert_before(node, ws)?;
        }
    }
    if let Some(next) = doc.next_sibling(node) {
        if !doc.text(next).trim().is_empty() {
            let ws = doc.new_leaf(NodeKind::Whitespace, "\n");
            doc.insert_after(node, ws)?;
        }
    }
    Ok(())
}

/// Re-render document text with four-space indentation derived from brace
/// depth. String literals and line comments are ignored when counting
/// braces. Only leading whitespace changes; line contents are untouched.
pub fn reindent(text: &str) -> String {
    let mut depth = 0usize;
    let mut lines = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        let (opens, closes) = brace_delta(trimmed);
        let level = if trimmed.starts_with('}') {
            depth.saturating_sub(1)
        } else {
            depth
        };
        if trimmed.is_empty() {
            lines.push(String::new());
        } else {
            lines.push(format!("{}{}", "    ".repeat(level), trimmed));
        }
        depth = (depth + opens).saturating_sub(closes);
    }
    let mut out = lines.join("\n");
    if text.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn brace_delta(line: &str) -> (usize, usize) {
    let mut opens = 0;
    let mut closes = 0;
    let mut in_string = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if in_string => {
                chars.next();
            }
            '"' => in_string = !in_string,
            '/' if !in_string && chars.peek() == Some(&'/') => break,
            '{' if !in_string => opens += 1,
            '}' if !in_string => closes += 1,
            _ => {}
        }
    }
    (opens, closes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptpatch_syntax::parse;

    #[test]
    fn newline_added_only_next_to_non_blank_siblings() {
        let mut doc = parse("buildscript {\n}").unwrap();
        let (frag, stmt) =
            scriptpatch_syntax::parse_expression_fragment("repositories {\n}").unwrap();
        let node = doc.graft(&frag, stmt);
        let root = doc.root();
        doc.append_child(root, node).unwrap();
        add_newlines_if_needed(&mut doc, node).unwrap();
        assert_eq!(doc.full_text(), "buildscript {\n}\nrepositories {\n}");
        // a second normalization pass changes nothing: siblings are blank now
        add_newlines_if_needed(&mut doc, node).unwrap();
        assert_eq!(doc.full_text(), "buildscript {\n}\nrepositories {\n}");
    }

    #[test]
    fn reindent_nests_by_brace_depth() {
        let text = "buildscript {\nrepositories {\nmavenCentral()\n}\n}";
        assert_eq!(
            reindent(text),
            "buildscript {\n    repositories {\n        mavenCentral()\n    }\n}"
        );
    }

    #[test]
    fn reindent_ignores_braces_in_strings_and_comments() {
        let text = "check(\"{\")\n// stray } in a comment\ndone()";
        assert_eq!(reindent(text), text);
    }

    #[test]
    fn reindent_preserves_blank_lines_and_trailing_newline() {
        let text = "a()\n\nb()\n";
        assert_eq!(reindent(text), text);
    }
}
