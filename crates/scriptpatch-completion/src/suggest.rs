//! Suggestion building for named parameters

use std::sync::OnceLock;

use regex::Regex;
use scriptpatch_syntax::{Document, NodeId, NodeKind};
use tracing::trace;

use crate::matcher::is_named_argument_position;
use crate::resolve::{call_site_at, resolve_candidates, used_parameter_names, SymbolResolver};
use crate::types::{IconTag, NamedParameterInsertion, Suggestion, SuggestionPriority};

/// Produce named-parameter suggestions for the cursor position.
///
/// For every resolved function-like candidate with stable parameter names,
/// every declared parameter not already bound at the call site becomes one
/// suggestion. Suggestions from different overloads are not deduplicated by
/// name; merging duplicates is the host UI's concern.
pub fn complete(doc: &Document, position: NodeId, resolver: &dyn SymbolResolver) -> Vec<Suggestion> {
    if !is_named_argument_position(doc, position) {
        return Vec::new();
    }
    let Some(site) = call_site_at(doc, position) else {
        return Vec::new();
    };
    let Some(current) = doc.strict_ancestor_of_kind(position, NodeKind::Argument) else {
        return Vec::new();
    };

    let mut suggestions = Vec::new();
    for symbol in resolve_candidates(resolver, &site.callee) {
        if !symbol.has_stable_parameter_names {
            trace!(symbol = %symbol.name, "skipping candidate without stable parameter names");
            continue;
        }
        let used = used_parameter_names(&site, current, &symbol);
        for parameter in &symbol.parameters {
            if used.contains(&parameter.name) {
                continue;
            }
            suggestions.push(Suggestion {
                lookup: parameter.name.clone(),
                presentable: format!("{} =", parameter.name),
                tail: format!(" {}", short_type_name(&parameter.type_name)),
                icon: IconTag::Parameter,
                priority: SuggestionPriority::NamedParameter,
                insertion: NamedParameterInsertion {
                    parameter: parameter.name.clone(),
                },
            });
        }
    }
    suggestions
}

/// Strip package qualifiers so tails read `List<String>` rather than
/// `kotlin.collections.List<kotlin.String>`
fn short_type_name(type_name: &str) -> String {
    static QUALIFIER: OnceLock<Regex> = OnceLock::new();
    let qualifier =
        QUALIFIER.get_or_init(|| Regex::new(r"\b[a-z_][A-Za-z0-9_]*\.").expect("valid regex"));
    qualifier.replace_all(type_name, "").into_owned()
}
