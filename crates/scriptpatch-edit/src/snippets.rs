//! Idempotent snippet insertion (SnippetDeduplicator + TreeInserter)

use scriptpatch_syntax::{parse_expression_fragment, Document, NodeId, NodeKind};
use tracing::debug;

use crate::error::Result;
use crate::reformat::add_newlines_if_needed;

/// Insert a detached statement into a container at the conventional position.
///
/// For a braced block the statement goes just inside the braces; for the
/// script root it goes before the first non-import statement (`first`) or at
/// the end. Imports stay ahead of any `first` insertion because the leading
/// position conventionally belongs to blocks like `buildscript` only among
/// statements.
pub fn insert_statement(
    doc: &mut Document,
    container: NodeId,
    node: NodeId,
    first: bool,
) -> Result<NodeId> {
    if doc.kind(container) == NodeKind::Block {
        if first {
            match doc.first_child(container) {
                Some(open) => doc.insert_after(open, node)?,
                None => doc.append_child(container, node)?,
            };
        } else {
            match doc.last_child(container) {
                Some(close) => doc.insert_before(close, node)?,
                None => doc.append_child(container, node)?,
            };
        }
    } else if first {
        let anchor = doc
            .children(container)
            .iter()
            .copied()
            .find(|&c| !doc.kind(c).is_trivia() && doc.kind(c) != NodeKind::Import);
        match anchor {
            Some(anchor) => doc.insert_before(anchor, node)?,
            None => doc.append_child(container, node)?,
        };
    } else {
        doc.append_child(container, node)?;
    }
    Ok(node)
}

/// Insert `snippet` into the block unless the block's current text already
/// contains it as a literal substring.
///
/// The substring check is deliberately coarse: callers provide snippet text
/// canonical enough that its presence implies "already configured". Returns
/// the inserted statement, or `None` when the snippet was already present.
pub fn add_expression_if_missing(
    doc: &mut Document,
    block: NodeId,
    snippet: &str,
    first: bool,
) -> Result<Option<NodeId>> {
    if doc.text(block).contains(snippet) {
        debug!(snippet, "snippet already present, skipping insertion");
        return Ok(None);
    }
    let (fragment, expression) = parse_expression_fragment(snippet)?;
    let node = doc.graft(&fragment, expression);
    insert_statement(doc, block, node, first)?;
    add_newlines_if_needed(doc, node)?;
    Ok(Some(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{find_block, BlockScope};
    use scriptpatch_syntax::parse;

    fn dependencies_block(doc: &Document) -> NodeId {
        find_block(doc, "dependencies", BlockScope::TopLevel).unwrap()
    }

    #[test]
    fn inserts_once_and_only_once() {
        let mut doc = parse("dependencies {\n}").unwrap();
        let block = dependencies_block(&doc);
        let added = add_expression_if_missing(&mut doc, block, "compile(\"junit:junit:4.12\")", false)
            .unwrap();
        assert!(added.is_some());
        let again =
            add_expression_if_missing(&mut doc, block, "compile(\"junit:junit:4.12\")", false)
                .unwrap();
        assert!(again.is_none());
        assert_eq!(doc.full_text().matches("junit:junit").count(), 1);
    }

    #[test]
    fn first_flag_inserts_at_block_head() {
        let mut doc = parse("dependencies {\n    second()\n}").unwrap();
        let block = dependencies_block(&doc);
        add_expression_if_missing(&mut doc, block, "first()", true).unwrap();
        let text = doc.full_text();
        assert!(text.find("first()").unwrap() < text.find("second()").unwrap());
    }

    #[test]
    fn malformed_snippet_is_an_error() {
        let mut doc = parse("dependencies {\n}").unwrap();
        let block = dependencies_block(&doc);
        assert!(add_expression_if_missing(&mut doc, block, "compile(", false).is_err());
    }
}
