//! Locating and synthesizing configuration blocks
//!
//! A "block" is the braced body of a call like `dependencies { ... }`: a
//! call whose callee matches the requested name and whose only argument is
//! the trailing braced lambda. Missing blocks are synthesized by parsing
//! `name {\n}` in isolation and grafting it into the target scope.

use scriptpatch_syntax::{parse_expression_fragment, Document, NodeId, NodeKind};
use tracing::debug;

use crate::error::Result;
use crate::reformat::add_newlines_if_needed;
use crate::snippets::insert_statement;

/// Where a block is searched for or synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockScope {
    /// Directly among the script's top-level statements
    TopLevel,
    /// Among the statements of an existing block
    Within(NodeId),
}

/// Callee text of a call expression
pub(crate) fn callee_text(doc: &Document, call: NodeId) -> Option<String> {
    doc.child_of_kind(call, NodeKind::Name).map(|n| doc.text(n))
}

/// The braced body of a call, provided the body is the call's sole argument
pub(crate) fn call_block(doc: &Document, call: NodeId) -> Option<NodeId> {
    let block = doc.child_of_kind(call, NodeKind::Block)?;
    if let Some(list) = doc.child_of_kind(call, NodeKind::ArgumentList) {
        if !doc.children_of_kind(list, NodeKind::Argument).is_empty() {
            return None;
        }
    }
    Some(block)
}

fn scope_container(doc: &Document, scope: BlockScope) -> NodeId {
    match scope {
        BlockScope::TopLevel => doc.root(),
        BlockScope::Within(block) => block,
    }
}

/// The call node carrying a named block, if present in the scope
pub fn find_block_call(doc: &Document, name: &str, scope: BlockScope) -> Option<NodeId> {
    let container = scope_container(doc, scope);
    doc.children_of_kind(container, NodeKind::Call)
        .into_iter()
        .find(|&call| {
            callee_text(doc, call).as_deref() == Some(name) && call_block(doc, call).is_some()
        })
}

/// Body of a named block in the given scope, or `None` if absent
pub fn find_block(doc: &Document, name: &str, scope: BlockScope) -> Option<NodeId> {
    find_block_call(doc, name, scope).and_then(|call| call_block(doc, call))
}

/// Locate a named block, synthesizing `name {\n}` in the scope when absent.
///
/// `insert_first` places the new block ahead of other statements (used for
/// `buildscript`, which conventionally precedes everything else). A second
/// call with the same name returns the existing body; no duplicate block is
/// ever created.
pub fn get_or_create_block(
    doc: &mut Document,
    name: &str,
    scope: BlockScope,
    insert_first: bool,
) -> Result<Option<NodeId>> {
    if let Some(existing) = find_block(doc, name, scope) {
        return Ok(Some(existing));
    }
    debug!(name, "synthesizing missing block");
    let (fragment, statement) = parse_expression_fragment(&format!("{} {{\n}}", name))?;
    let node = doc.graft(&fragment, statement);
    let container = scope_container(doc, scope);
    insert_statement(doc, container, node, insert_first)?;
    add_newlines_if_needed(doc, node)?;
    Ok(call_block(doc, node))
}

/// Locate or create the top-level `apply` block.
///
/// A new `apply {}` is placed immediately after an existing `plugins` block
/// to preserve the conventional ordering of top-level declarations; without
/// a `plugins` block it is appended.
pub fn get_or_create_apply_block(doc: &mut Document) -> Result<Option<NodeId>> {
    if let Some(existing) = find_block(doc, "apply", BlockScope::TopLevel) {
        return Ok(Some(existing));
    }
    let (fragment, statement) = parse_expression_fragment("apply {\n}")?;
    let node = doc.graft(&fragment, statement);
    match find_block_call(doc, "plugins", BlockScope::TopLevel) {
        Some(plugins) => {
            doc.insert_after(plugins, node)?;
        }
        None => {
            let root = doc.root();
            insert_statement(doc, root, node, false)?;
        }
    }
    add_newlines_if_needed(doc, node)?;
    Ok(call_block(doc, node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptpatch_syntax::parse;

    #[test]
    fn finds_existing_top_level_block() {
        let doc = parse("repositories {\n    mavenCentral()\n}").unwrap();
        let block = find_block(&doc, "repositories", BlockScope::TopLevel).unwrap();
        assert!(doc.text(block).contains("mavenCentral()"));
    }

    #[test]
    fn call_with_arguments_is_not_a_block() {
        let doc = parse("repositories(x) {\n}").unwrap();
        assert!(find_block(&doc, "repositories", BlockScope::TopLevel).is_none());
    }

    #[test]
    fn finds_nested_block() {
        let doc = parse("buildscript {\n    repositories {\n    }\n}").unwrap();
        let outer = find_block(&doc, "buildscript", BlockScope::TopLevel).unwrap();
        assert!(find_block(&doc, "repositories", BlockScope::Within(outer)).is_some());
        assert!(find_block(&doc, "dependencies", BlockScope::Within(outer)).is_none());
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let mut doc = parse("").unwrap();
        let created = get_or_create_block(&mut doc, "dependencies", BlockScope::TopLevel, false)
            .unwrap()
            .unwrap();
        let found = get_or_create_block(&mut doc, "dependencies", BlockScope::TopLevel, false)
            .unwrap()
            .unwrap();
        assert_eq!(created, found);
        assert_eq!(doc.full_text().matches("dependencies {").count(), 1);
    }

    #[test]
    fn insert_first_precedes_existing_statements() {
        let mut doc = parse("repositories {\n}").unwrap();
        get_or_create_block(&mut doc, "buildscript", BlockScope::TopLevel, true).unwrap();
        let text = doc.full_text();
        assert!(text.find("buildscript").unwrap() < text.find("repositories").unwrap());
    }

    #[test]
    fn apply_block_lands_after_plugins() {
        let mut doc = parse("plugins {\n    application\n}\nrepositories {\n}").unwrap();
        get_or_create_apply_block(&mut doc).unwrap().unwrap();
        let text = doc.full_text();
        let apply = text.find("apply {").unwrap();
        assert!(text.find("plugins {").unwrap() < apply);
        assert!(apply < text.find("repositories {").unwrap());
    }
}
