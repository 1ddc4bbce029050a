//! Value types exchanged between the completion pipeline and the host

use serde::{Deserialize, Serialize};

/// What kind of thing a resolved symbol is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Function-like; callable with named arguments
    Function,
    Property,
    Class,
    Other,
}

/// One declared parameter of a callable symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    /// Possibly qualified type text; rendered short in suggestion tails
    pub type_name: String,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        ParameterInfo {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A candidate symbol returned by the resolution oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Whether the declared parameter names are contractually usable for
    /// by-name binding
    pub has_stable_parameter_names: bool,
    pub parameters: Vec<ParameterInfo>,
}

impl Symbol {
    /// Convenience constructor for a function with stable parameter names
    pub fn function(name: impl Into<String>, parameters: Vec<ParameterInfo>) -> Self {
        Symbol {
            name: name.into(),
            kind: SymbolKind::Function,
            has_stable_parameter_names: true,
            parameters,
        }
    }
}

/// Priority class attached to a suggestion.
///
/// Global ordering against other completion kinds is the host's ranking
/// policy; this core only assigns the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionPriority {
    Default,
    NamedParameter,
}

/// Icon tag for host-side presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconTag {
    Parameter,
}

/// Insertion behavior carried by a suggestion; the host invokes it with a
/// live text buffer when the suggestion is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedParameterInsertion {
    pub parameter: String,
}

/// One proposed completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Text used for lookup and insertion
    pub lookup: String,
    /// Presentable text, `"name ="`
    pub presentable: String,
    /// Tail text showing the parameter's short type name
    pub tail: String,
    pub icon: IconTag,
    pub priority: SuggestionPriority,
    pub insertion: NamedParameterInsertion,
}
