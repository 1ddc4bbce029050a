//! Candidate resolution and the named-argument filter
//!
//! Symbol resolution itself is an external oracle behind [`SymbolResolver`];
//! this module extracts the call site from the tree, narrows oracle results
//! to function-like candidates, and computes which parameter names are
//! already bound at the site.

use std::collections::{HashMap, HashSet};

use scriptpatch_syntax::{Document, NodeId, NodeKind};

use crate::types::{Symbol, SymbolKind};

/// Resolution oracle for a call's callee reference.
///
/// Implementations never fail: a callee that cannot be resolved yields an
/// empty candidate list and completion degrades to "no suggestions".
pub trait SymbolResolver {
    fn resolve(&self, callee: &str) -> Vec<Symbol>;
}

/// Table-backed resolver, useful for hosts with a precomputed symbol index
/// and for tests
#[derive(Debug, Clone, Default)]
pub struct StaticSymbolResolver {
    symbols: HashMap<String, Vec<Symbol>>,
}

impl StaticSymbolResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, callee: impl Into<String>, symbol: Symbol) {
        self.symbols.entry(callee.into()).or_default().push(symbol);
    }
}

impl SymbolResolver for StaticSymbolResolver {
    fn resolve(&self, callee: &str) -> Vec<Symbol> {
        self.symbols.get(callee).cloned().unwrap_or_default()
    }
}

/// One supplied argument at a call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgument {
    pub node: NodeId,
    /// Explicit name for named arguments, `None` for positional ones
    pub name: Option<String>,
}

/// Resolved view of a call expression
#[derive(Debug, Clone)]
pub struct CallSite {
    pub call: NodeId,
    pub callee: String,
    pub arguments: Vec<CallArgument>,
}

/// Arguments supplied between the call's parentheses, in source order
pub fn value_arguments(doc: &Document, call: NodeId) -> Vec<CallArgument> {
    let Some(list) = doc.child_of_kind(call, NodeKind::ArgumentList) else {
        return Vec::new();
    };
    doc.children_of_kind(list, NodeKind::Argument)
        .into_iter()
        .map(|node| {
            let name = doc
                .child_of_kind(node, NodeKind::ArgumentName)
                .map(|n| doc.text(n));
            CallArgument { node, name }
        })
        .collect()
}

/// Build the call-site view enclosing a completion position.
///
/// Returns `None` when the position is not inside a call's argument, which
/// is a normal outcome, not an error.
pub fn call_site_at(doc: &Document, position: NodeId) -> Option<CallSite> {
    let argument = doc.strict_ancestor_of_kind(position, NodeKind::Argument)?;
    let call = doc.strict_ancestor_of_kind(argument, NodeKind::Call)?;
    let callee = doc.child_of_kind(call, NodeKind::Name).map(|n| doc.text(n))?;
    Some(CallSite {
        call,
        callee,
        arguments: value_arguments(doc, call),
    })
}

/// Oracle results narrowed to candidates callable with named arguments
pub fn resolve_candidates(resolver: &dyn SymbolResolver, callee: &str) -> Vec<Symbol> {
    resolver
        .resolve(callee)
        .into_iter()
        .filter(|s| s.kind == SymbolKind::Function)
        .collect()
}

/// Parameter names already bound at the call site for one candidate symbol.
///
/// Positional arguments bind by the symbol's declared order, named arguments
/// by their explicit name. The argument currently being completed is
/// excluded. Positional arguments beyond the candidate's declared parameters
/// bind nothing and are ignored.
pub fn used_parameter_names(
    site: &CallSite,
    current_argument: NodeId,
    symbol: &Symbol,
) -> HashSet<String> {
    let mut used = HashSet::new();
    let mut positional = 0usize;
    for argument in &site.arguments {
        if argument.node == current_argument {
            continue;
        }
        match &argument.name {
            Some(name) => {
                used.insert(name.clone());
            }
            None => {
                if let Some(parameter) = symbol.parameters.get(positional) {
                    used.insert(parameter.name.clone());
                }
                positional += 1;
            }
        }
    }
    used
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterInfo;
    use scriptpatch_syntax::parse;

    fn leaf(doc: &Document, text: &str) -> NodeId {
        doc.descendants(doc.root())
            .into_iter()
            .find(|&n| doc.kind(n) == NodeKind::Identifier && doc.leaf_text(n) == Some(text))
            .unwrap()
    }

    fn render_symbol() -> Symbol {
        Symbol::function(
            "render",
            vec![
                ParameterInfo::new("width", "Int"),
                ParameterInfo::new("height", "Int"),
                ParameterInfo::new("title", "String"),
            ],
        )
    }

    #[test]
    fn call_site_reports_callee_and_arguments() {
        let doc = parse("render(a, height = b, c)").unwrap();
        let site = call_site_at(&doc, leaf(&doc, "c")).unwrap();
        assert_eq!(site.callee, "render");
        assert_eq!(site.arguments.len(), 3);
        assert_eq!(site.arguments[1].name.as_deref(), Some("height"));
        assert_eq!(site.arguments[0].name, None);
    }

    #[test]
    fn positional_arguments_bind_by_declared_order() {
        let doc = parse("render(a, b, c)").unwrap();
        let site = call_site_at(&doc, leaf(&doc, "c")).unwrap();
        let current = site.arguments[2].node;
        let used = used_parameter_names(&site, current, &render_symbol());
        assert_eq!(
            used,
            ["width", "height"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[test]
    fn named_arguments_bind_by_name() {
        let doc = parse("render(title = t, x)").unwrap();
        let site = call_site_at(&doc, leaf(&doc, "x")).unwrap();
        let current = site.arguments[1].node;
        let used = used_parameter_names(&site, current, &render_symbol());
        assert_eq!(used, ["title"].iter().map(|s| s.to_string()).collect());
    }

    #[test]
    fn surplus_positional_arguments_are_ignored() {
        let doc = parse("render(a, b, c, d, e)").unwrap();
        let site = call_site_at(&doc, leaf(&doc, "e")).unwrap();
        let current = site.arguments[4].node;
        let symbol = Symbol::function("render", vec![ParameterInfo::new("width", "Int")]);
        let used = used_parameter_names(&site, current, &symbol);
        // only the first positional argument binds a declared name
        assert_eq!(used, ["width"].iter().map(|s| s.to_string()).collect());
    }

    #[test]
    fn non_function_candidates_are_filtered() {
        let mut resolver = StaticSymbolResolver::new();
        resolver.insert("render", render_symbol());
        resolver.insert(
            "render",
            Symbol {
                name: "render".into(),
                kind: SymbolKind::Property,
                has_stable_parameter_names: false,
                parameters: vec![],
            },
        );
        let candidates = resolve_candidates(&resolver, "render");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, SymbolKind::Function);
    }

    #[test]
    fn unresolved_callee_yields_no_candidates() {
        let resolver = StaticSymbolResolver::new();
        assert!(resolve_candidates(&resolver, "unknown").is_empty());
    }
}
