//! High-level build-script configuration operations
//!
//! These operations compose the block locators and snippet insertion into the
//! user-visible edits: wiring the Kotlin plugin into a build script, pointing
//! repositories at the right channel for a version, updating compiler task
//! parameters, and switching the coroutine support level. Every operation is
//! idempotent; applying one to an already-configured script is a no-op
//! reported as `Ok(None)` (or `Ok(false)` for the composite).

use scriptpatch_syntax::{
    parse_declaration_fragment, parse_expression_fragment, Document, NodeId, NodeKind,
};
use tracing::debug;

use crate::blocks::{
    callee_text, find_block, get_or_create_apply_block, get_or_create_block, BlockScope,
};
use crate::error::Result;
use crate::reformat::add_newlines_if_needed;
use crate::snippets::{add_expression_if_missing, insert_statement};

/// Extra-properties key holding the Kotlin version
pub const KOTLIN_VERSION_PROPERTY: &str = "kotlin_version";

/// Canonical repository sentinels; their presence in a `repositories` block
/// means the block is already configured.
pub const MAVEN_CENTRAL: &str = "mavenCentral()";
pub const JCENTER: &str = "jcenter()";

/// Release-channel repository URLs
pub const EAP_REPOSITORY_URL: &str = "http://dl.bintray.com/kotlin/kotlin-eap";
pub const EAP_11_REPOSITORY_URL: &str = "http://dl.bintray.com/kotlin/kotlin-eap-1.1";
pub const DEV_REPOSITORY_URL: &str = "https://dl.bintray.com/kotlin/kotlin-dev";

const KOTLIN_COMPILE_IMPORT: &str = "org.jetbrains.kotlin.gradle.tasks.KotlinCompile";
const COROUTINES_IMPORT: &str = "org.jetbrains.kotlin.gradle.dsl.Coroutines";

/// Dependency-string prefix marking a stdlib coordinate, quotes included
const STDLIB_COORDINATE_PREFIX: &str = "\"org.jetbrains.kotlin:kotlin-stdlib";

/// Module names `kotlinModule(...)` may use for the standard library
const STDLIB_MODULES: [&str; 5] = ["stdlib", "stdlib-jre7", "stdlib-jre8", "stdlib-jdk7", "stdlib-jdk8"];

/// `kotlinModule` invocation for an artifact, versioned through the
/// `kotlin_version` extra property
pub fn kotlin_module_snippet(artifact: &str) -> String {
    let module = artifact.strip_prefix("kotlin-").unwrap_or(artifact);
    format!(
        "kotlinModule(\"{}\", extra[\"{}\"].toString())",
        module, KOTLIN_VERSION_PROPERTY
    )
}

/// `compile(...)` dependency statement for an artifact
pub fn script_dependency_snippet(artifact: &str) -> String {
    format!("compile({})", kotlin_module_snippet(artifact))
}

fn version_property_snippet(version: &str) -> String {
    format!("extra[\"{}\"] = \"{}\"", KOTLIN_VERSION_PROPERTY, version)
}

fn maven_repository_snippet(url: &str) -> String {
    format!("maven {{\n    setUrl(\"{}\")\n}}", url)
}

/// Non-release versions resolve from a channel repository; releases come from
/// the default repository and need no URL.
pub fn repository_url_for_version(version: &str) -> Option<&'static str> {
    if version.contains("dev") {
        Some(DEV_REPOSITORY_URL)
    } else if version.contains("eap") {
        if version.starts_with("1.1") {
            Some(EAP_11_REPOSITORY_URL)
        } else {
            Some(EAP_REPOSITORY_URL)
        }
    } else {
        None
    }
}

fn is_repository_configured(repositories_text: &str) -> bool {
    repositories_text.contains(MAVEN_CENTRAL) || repositories_text.contains(JCENTER)
}

/// Add the repository serving `version` to a `repositories` block.
///
/// Channel versions always get their channel repository; the sentinel check
/// only suppresses the default Maven Central fallback, since a block that
/// already names a default repository still cannot resolve EAP or dev
/// artifacts.
pub fn add_repository_if_missing(
    doc: &mut Document,
    repositories: NodeId,
    version: &str,
) -> Result<Option<NodeId>> {
    let snippet = match repository_url_for_version(version) {
        Some(url) => maven_repository_snippet(url),
        None => {
            if is_repository_configured(&doc.text(repositories)) {
                debug!(version, "repositories block already configured");
                return Ok(None);
            }
            MAVEN_CENTRAL.to_string()
        }
    };
    add_expression_if_missing(doc, repositories, &snippet, false)
}

/// Add the Kotlin Gradle plugin to a buildscript `dependencies` block
pub fn add_plugin_to_classpath_if_missing(
    doc: &mut Document,
    dependencies: NodeId,
) -> Result<Option<NodeId>> {
    let snippet = format!("classpath({})", kotlin_module_snippet("kotlin-gradle-plugin"));
    add_expression_if_missing(doc, dependencies, &snippet, false)
}

fn argument_nodes(doc: &Document, call: NodeId) -> Vec<NodeId> {
    doc.child_of_kind(call, NodeKind::ArgumentList)
        .map(|list| doc.children_of_kind(list, NodeKind::Argument))
        .unwrap_or_default()
}

fn first_argument_text(doc: &Document, call: NodeId) -> Option<String> {
    argument_nodes(doc, call)
        .first()
        .map(|&arg| doc.text(arg).trim().to_string())
}

/// `plugin("name")` call inside a block, if present
pub fn find_plugin(doc: &Document, block: NodeId, name: &str) -> Option<NodeId> {
    let quoted = format!("\"{}\"", name);
    doc.children_of_kind(block, NodeKind::Call)
        .into_iter()
        .find(|&call| {
            callee_text(doc, call).as_deref() == Some("plugin")
                && first_argument_text(doc, call).as_deref() == Some(quoted.as_str())
        })
}

/// Register a plugin in the top-level `apply` block, creating the block after
/// `plugins` when absent
pub fn add_plugin_if_missing(doc: &mut Document, name: &str) -> Result<Option<NodeId>> {
    let Some(apply) = get_or_create_apply_block(doc)? else {
        return Ok(None);
    };
    if find_plugin(doc, apply, name).is_some() {
        debug!(name, "plugin already applied");
        return Ok(None);
    }
    add_expression_if_missing(doc, apply, &format!("plugin(\"{}\")", name), false)
}

fn is_stdlib_dependency_argument(doc: &Document, argument: NodeId) -> bool {
    if let Some(literal) = doc.child_of_kind(argument, NodeKind::StringLiteral) {
        if doc.text(literal).starts_with(STDLIB_COORDINATE_PREFIX) {
            return true;
        }
    }
    if let Some(call) = doc.child_of_kind(argument, NodeKind::Call) {
        if callee_text(doc, call).as_deref() == Some("kotlinModule") {
            if let Some(first) = first_argument_text(doc, call) {
                return STDLIB_MODULES
                    .iter()
                    .any(|m| first == format!("\"{}\"", m));
            }
        }
    }
    false
}

/// Whether the top-level `dependencies` block already declares the Kotlin
/// standard library under any of its module names or coordinates
pub fn contains_compile_stdlib(doc: &Document) -> bool {
    let Some(dependencies) = find_block(doc, "dependencies", BlockScope::TopLevel) else {
        return false;
    };
    doc.children_of_kind(dependencies, NodeKind::Call)
        .into_iter()
        .any(|call| {
            callee_text(doc, call).as_deref() == Some("compile")
                && argument_nodes(doc, call)
                    .first()
                    .is_some_and(|&arg| is_stdlib_dependency_argument(doc, arg))
        })
}

fn import_path(doc: &Document, import: NodeId) -> Option<String> {
    doc.child_of_kind(import, NodeKind::Identifier)
        .map(|leaf| doc.text(leaf))
}

/// Add an import directive unless the same path is already imported. New
/// imports go after the last existing import, or ahead of all statements in a
/// script without imports.
pub fn add_import_if_missing(doc: &mut Document, path: &str) -> Result<Option<NodeId>> {
    let root = doc.root();
    let imports = doc.children_of_kind(root, NodeKind::Import);
    if imports
        .iter()
        .any(|&import| import_path(doc, import).as_deref() == Some(path))
    {
        return Ok(None);
    }
    let (fragment, statement) = parse_declaration_fragment(&format!("import {}", path))?;
    let node = doc.graft(&fragment, statement);
    match imports.last() {
        Some(&last) => {
            doc.insert_after(last, node)?;
        }
        None => {
            insert_statement(doc, root, node, true)?;
        }
    }
    add_newlines_if_needed(doc, node)?;
    Ok(Some(node))
}

fn find_assignment(doc: &Document, block: NodeId, lhs: &str) -> Option<NodeId> {
    doc.children_of_kind(block, NodeKind::Assignment)
        .into_iter()
        .find(|&assignment| {
            doc.first_child(assignment)
                .is_some_and(|first| doc.text(first) == lhs)
        })
}

/// Set a `kotlinOptions` parameter on the compile task, replacing an existing
/// assignment to the same parameter in place.
///
/// When the script has no `kotlinOptions` block yet, the task delegate
/// declaration and its import are added before the block is created.
pub fn change_kotlin_task_parameter(
    doc: &mut Document,
    parameter: &str,
    value: &str,
    for_tests: bool,
) -> Result<Option<NodeId>> {
    let task = if for_tests { "compileTestKotlin" } else { "compileKotlin" };
    let block_name = format!("{}.kotlinOptions", task);
    let snippet = format!("{} = \"{}\"", parameter, value);

    if find_block(doc, &block_name, BlockScope::TopLevel).is_none() {
        add_import_if_missing(doc, KOTLIN_COMPILE_IMPORT)?;
        let declaration = format!("val {}: KotlinCompile by tasks", task);
        if !doc.full_text().contains(&declaration) {
            let (fragment, statement) = parse_declaration_fragment(&declaration)?;
            let node = doc.graft(&fragment, statement);
            let root = doc.root();
            insert_statement(doc, root, node, false)?;
            add_newlines_if_needed(doc, node)?;
        }
    }
    let Some(options) = get_or_create_block(doc, &block_name, BlockScope::TopLevel, false)? else {
        return Ok(None);
    };
    if let Some(existing) = find_assignment(doc, options, parameter) {
        if doc.text(existing) == snippet {
            return Ok(None);
        }
        debug!(parameter, value, "replacing task parameter assignment");
        let (fragment, statement) = parse_expression_fragment(&snippet)?;
        let node = doc.graft(&fragment, statement);
        doc.replace(existing, node)?;
        return Ok(Some(node));
    }
    add_expression_if_missing(doc, options, &snippet, false)
}

/// Switch coroutine support in the `kotlin` block, replacing any existing
/// setting.
pub fn change_coroutine_configuration(doc: &mut Document, option: &str) -> Result<Option<NodeId>> {
    let snippet = format!("experimental.coroutines = Coroutines.{}", option.to_uppercase());
    add_import_if_missing(doc, COROUTINES_IMPORT)?;
    let Some(kotlin) = get_or_create_block(doc, "kotlin", BlockScope::TopLevel, false)? else {
        return Ok(None);
    };
    if let Some(existing) = find_assignment(doc, kotlin, "experimental.coroutines") {
        if doc.text(existing) == snippet {
            return Ok(None);
        }
        let (fragment, statement) = parse_expression_fragment(&snippet)?;
        let node = doc.graft(&fragment, statement);
        doc.replace(existing, node)?;
        return Ok(Some(node));
    }
    add_expression_if_missing(doc, kotlin, &snippet, false)
}

/// Wire the Kotlin plugin into a build script end to end: buildscript version
/// property, channel repositories, plugin classpath, `apply`, and the
/// standard-library dependency.
///
/// Returns whether anything changed; a fully configured script reports
/// `Ok(false)`.
pub fn configure_build_script(
    doc: &mut Document,
    plugin_name: &str,
    stdlib_artifact: &str,
    version: &str,
) -> Result<bool> {
    let mut changed = false;

    if let Some(buildscript) = get_or_create_block(doc, "buildscript", BlockScope::TopLevel, true)? {
        changed |= add_expression_if_missing(
            doc,
            buildscript,
            &version_property_snippet(version),
            true,
        )?
        .is_some();
        if let Some(repositories) =
            get_or_create_block(doc, "repositories", BlockScope::Within(buildscript), false)?
        {
            changed |= add_repository_if_missing(doc, repositories, version)?.is_some();
        }
        if let Some(dependencies) =
            get_or_create_block(doc, "dependencies", BlockScope::Within(buildscript), false)?
        {
            changed |= add_plugin_to_classpath_if_missing(doc, dependencies)?.is_some();
        }
    }

    changed |= add_plugin_if_missing(doc, plugin_name)?.is_some();

    if !contains_compile_stdlib(doc) {
        if let Some(dependencies) =
            get_or_create_block(doc, "dependencies", BlockScope::TopLevel, false)?
        {
            let snippet = script_dependency_snippet(stdlib_artifact);
            changed |= add_expression_if_missing(doc, dependencies, &snippet, false)?.is_some();
        }
    }

    if let Some(repositories) =
        get_or_create_block(doc, "repositories", BlockScope::TopLevel, false)?
    {
        changed |= add_repository_if_missing(doc, repositories, version)?.is_some();
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptpatch_syntax::parse;

    #[test]
    fn repository_url_tracks_release_channel() {
        assert_eq!(repository_url_for_version("1.1.0"), None);
        assert_eq!(repository_url_for_version("1.1.0-eap-23"), Some(EAP_11_REPOSITORY_URL));
        assert_eq!(repository_url_for_version("1.2.0-eap-11"), Some(EAP_REPOSITORY_URL));
        assert_eq!(repository_url_for_version("1.2.0-dev-44"), Some(DEV_REPOSITORY_URL));
    }

    #[test]
    fn configured_repositories_are_left_alone() {
        let mut doc = parse("repositories {\n    jcenter()\n}").unwrap();
        let repositories = find_block(&doc, "repositories", BlockScope::TopLevel).unwrap();
        let added = add_repository_if_missing(&mut doc, repositories, "1.1.0").unwrap();
        assert!(added.is_none());
        assert!(!doc.full_text().contains(MAVEN_CENTRAL));
    }

    #[test]
    fn channel_repository_is_added_alongside_existing_default() {
        let mut doc = parse("repositories {\n    jcenter()\n}").unwrap();
        let repositories = find_block(&doc, "repositories", BlockScope::TopLevel).unwrap();
        let added = add_repository_if_missing(&mut doc, repositories, "1.1.0-eap-23").unwrap();
        assert!(added.is_some());
        let text = doc.full_text();
        assert!(text.contains(EAP_11_REPOSITORY_URL));
        assert_eq!(text.matches("jcenter()").count(), 1);
    }

    #[test]
    fn eap_version_adds_channel_repository() {
        let mut doc = parse("repositories {\n}").unwrap();
        let repositories = find_block(&doc, "repositories", BlockScope::TopLevel).unwrap();
        add_repository_if_missing(&mut doc, repositories, "1.1.0-eap-23").unwrap();
        assert!(doc.full_text().contains(EAP_11_REPOSITORY_URL));
    }

    #[test]
    fn import_is_added_once_after_existing_imports() {
        let mut doc = parse("import a.b.c\n\nkotlin {\n}").unwrap();
        add_import_if_missing(&mut doc, COROUTINES_IMPORT).unwrap().unwrap();
        assert!(add_import_if_missing(&mut doc, COROUTINES_IMPORT).unwrap().is_none());
        let text = doc.full_text();
        assert_eq!(text.matches(COROUTINES_IMPORT).count(), 1);
        assert!(text.find("a.b.c").unwrap() < text.find(COROUTINES_IMPORT).unwrap());
        assert!(text.find(COROUTINES_IMPORT).unwrap() < text.find("kotlin {").unwrap());
    }

    #[test]
    fn import_precedes_statements_in_importless_script() {
        let mut doc = parse("kotlin {\n}").unwrap();
        add_import_if_missing(&mut doc, COROUTINES_IMPORT).unwrap().unwrap();
        let text = doc.full_text();
        assert!(text.find(COROUTINES_IMPORT).unwrap() < text.find("kotlin {").unwrap());
    }

    #[test]
    fn stdlib_dependency_is_detected_in_both_spellings() {
        let module = parse(
            "dependencies {\n    compile(kotlinModule(\"stdlib-jre7\", extra[\"kotlin_version\"].toString()))\n}",
        )
        .unwrap();
        assert!(contains_compile_stdlib(&module));
        let coordinate =
            parse("dependencies {\n    compile(\"org.jetbrains.kotlin:kotlin-stdlib:1.1.0\")\n}")
                .unwrap();
        assert!(contains_compile_stdlib(&coordinate));
        let other = parse("dependencies {\n    compile(\"junit:junit:4.12\")\n}").unwrap();
        assert!(!contains_compile_stdlib(&other));
    }

    #[test]
    fn task_parameter_is_replaced_in_place() {
        let mut doc = parse("compileKotlin.kotlinOptions {\n    jvmTarget = \"1.6\"\n}").unwrap();
        change_kotlin_task_parameter(&mut doc, "jvmTarget", "1.8", false)
            .unwrap()
            .unwrap();
        let text = doc.full_text();
        assert!(text.contains("jvmTarget = \"1.8\""));
        assert!(!text.contains("1.6"));
        assert_eq!(text.matches("jvmTarget").count(), 1);
        // already at the requested value: nothing to do
        assert!(change_kotlin_task_parameter(&mut doc, "jvmTarget", "1.8", false)
            .unwrap()
            .is_none());
    }

    #[test]
    fn missing_options_block_gets_task_delegate_and_import() {
        let mut doc = parse("").unwrap();
        change_kotlin_task_parameter(&mut doc, "jvmTarget", "1.8", true)
            .unwrap()
            .unwrap();
        let text = doc.full_text();
        assert!(text.contains(&format!("import {}", KOTLIN_COMPILE_IMPORT)));
        assert!(text.contains("val compileTestKotlin: KotlinCompile by tasks"));
        assert!(text.contains("compileTestKotlin.kotlinOptions {"));
        assert!(text.contains("jvmTarget = \"1.8\""));
    }

    #[test]
    fn coroutine_setting_is_replaced_not_duplicated() {
        let mut doc = parse("kotlin {\n    experimental.coroutines = Coroutines.ERROR\n}").unwrap();
        change_coroutine_configuration(&mut doc, "enable").unwrap().unwrap();
        let text = doc.full_text();
        assert!(text.contains("experimental.coroutines = Coroutines.ENABLE"));
        assert!(!text.contains("ERROR"));
        assert!(text.contains(&format!("import {}", COROUTINES_IMPORT)));
    }

    #[test]
    fn apply_plugin_is_idempotent() {
        let mut doc = parse("apply {\n    plugin(\"kotlin\")\n}").unwrap();
        assert!(add_plugin_if_missing(&mut doc, "kotlin").unwrap().is_none());
        add_plugin_if_missing(&mut doc, "kotlin-android").unwrap().unwrap();
        assert_eq!(doc.full_text().matches("plugin(").count(), 2);
    }
}
