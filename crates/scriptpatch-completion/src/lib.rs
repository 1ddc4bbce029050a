//! Named-parameter completion pipeline
//!
//! Inside a call's argument list, offer the unbound parameter names of every
//! resolved candidate overload as completions. The pipeline is
//! PositionMatcher → CandidateResolver → NamedArgumentFilter →
//! SuggestionBuilder:
//!
//! 1. [`matcher`] gates the cursor position with a cheap structural pattern
//!    before any resolution runs.
//! 2. [`resolve`] builds the call-site view, queries the external
//!    [`SymbolResolver`] oracle, and computes already-bound parameter names.
//! 3. [`suggest`] turns the remaining names into ranked [`Suggestion`]s with
//!    an attached insertion behavior ([`insert`]).
//!
//! Every failure mode degrades to "no suggestions": an unmatched position,
//! an unresolvable callee, or a candidate without stable parameter names
//! never produces an error.

pub mod insert;
pub mod matcher;
pub mod resolve;
pub mod suggest;
pub mod types;

pub use insert::{render_identifier, InsertionContext};
pub use matcher::{is_named_argument_position, is_only_named_parameter_expected};
pub use resolve::{
    call_site_at, resolve_candidates, used_parameter_names, CallArgument, CallSite,
    StaticSymbolResolver, SymbolResolver,
};
pub use suggest::complete;
pub use types::{
    IconTag, NamedParameterInsertion, ParameterInfo, Suggestion, SuggestionPriority, Symbol,
    SymbolKind,
};
