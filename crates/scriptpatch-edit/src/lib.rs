//! Structural, idempotent editing of build-configuration scripts
//!
//! Edits are applied to the lossless tree from `scriptpatch-syntax`, never to
//! raw text: blocks like `buildscript` and `dependencies` are located or
//! synthesized structurally, snippets are parsed in isolation and grafted in,
//! and every operation can be re-applied without duplicating anything.
//!
//! Layering, bottom up:
//!
//! - [`reformat`]: newline normalization around insertions and a whole-text
//!   reindent pass standing in for the host editor's formatter.
//! - [`snippets`]: position-aware statement insertion plus the
//!   contains-check that makes insertions idempotent.
//! - [`blocks`]: finding and synthesizing named configuration blocks at the
//!   top level or inside another block.
//! - [`configure`]: the user-visible operations composed from the above:
//!   plugin wiring, repositories, imports, task parameters, coroutines.
//!
//! Locator misses and already-present snippets are `Ok(None)` outcomes;
//! [`ScriptEditError`] is reserved for malformed snippets and invalid tree
//! mutations.

pub mod blocks;
pub mod configure;
pub mod error;
pub mod reformat;
pub mod snippets;

pub use blocks::{find_block, find_block_call, get_or_create_apply_block, get_or_create_block, BlockScope};
pub use configure::{
    add_import_if_missing, add_plugin_if_missing, add_plugin_to_classpath_if_missing,
    add_repository_if_missing, change_coroutine_configuration, change_kotlin_task_parameter,
    configure_build_script, contains_compile_stdlib, kotlin_module_snippet,
    repository_url_for_version, script_dependency_snippet, DEV_REPOSITORY_URL,
    EAP_11_REPOSITORY_URL, EAP_REPOSITORY_URL,
    JCENTER, KOTLIN_VERSION_PROPERTY, MAVEN_CENTRAL,
};
pub use error::{Result, ScriptEditError};
pub use reformat::{add_newlines_if_needed, reindent};
pub use snippets::{add_expression_if_missing, insert_statement};
