//! Extraction pass over a single build file.

use super::context::{ExtractionContext, FileExtraction, Scratch};
use super::grammar;
use super::types::{Datasource, PackageDependency, VariableTable};
use crate::config::RegistryUrls;
use crate::constants::BUILD_PROPERTIES_FILE;
use crate::lexer::tokenize;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{trace, warn};

const SBT_DEP_NAME: &str = "sbt/sbt";
const SBT_VERSIONING: &str = "semver";
const SBT_RELEASE_TAG_PATTERN: &str = r"^v(?<version>\S+)";

/// Inputs of one file pass besides the content itself.
#[derive(Debug, Clone)]
pub struct ParseOptions<'a> {
    /// Path of the file, relative to the project root
    pub package_file: &'a str,
    /// Configured registries
    pub registries: &'a RegistryUrls,
    /// Registries discovered elsewhere, appended after the central one
    pub registry_urls: &'a [String],
    /// Table new definitions are written to
    pub local_vars: Arc<VariableTable>,
    /// Read-only fallback table
    pub global_vars: Arc<VariableTable>,
    /// Scala binary version known before the pass
    pub scala_version: Option<String>,
}

/// Whether `package_file` is an sbt launcher properties file.
#[must_use]
pub fn is_build_properties(package_file: &str) -> bool {
    package_file == BUILD_PROPERTIES_FILE
        || package_file.strip_suffix(BUILD_PROPERTIES_FILE).is_some_and(|prefix| prefix.ends_with('/'))
}

/// Run one extraction pass over `content`.
///
/// Returns `None` when the file cannot be tokenized (logged as a warning) or
/// when a `build.properties` file declares no sbt version.
#[must_use]
pub fn extract_file(content: &str, options: ParseOptions<'_>) -> Option<FileExtraction> {
    if is_build_properties(options.package_file) {
        return extract_build_properties(content, options);
    }

    let tokens = match tokenize(content) {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(package_file = options.package_file, error = %e, "Sbt parsing error");
            return None;
        }
    };

    let mut registry_urls = Vec::with_capacity(options.registry_urls.len() + 1);
    registry_urls.push(options.registries.maven_central.clone());
    registry_urls.extend_from_slice(options.registry_urls);

    let ctx = ExtractionContext {
        package_file: options.package_file.to_string(),
        global_vars: options.global_vars,
        local_vars: options.local_vars,
        deps: Arc::default(),
        registry_urls,
        plugin_registry_url: options.registries.sbt_plugins.clone(),
        scala_version: options.scala_version,
        package_file_version: None,
        scratch: Scratch::default(),
    };

    let result = grammar::query().run(&tokens, ctx).into_result();
    trace!(package_file = options.package_file, deps = result.deps.len(), "Extracted file");
    Some(result)
}

static SBT_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"sbt\.version *= *(?<version>\d+\.\d+\.\d+)").expect("sbt.version pattern is valid")
});

/// A `build.properties` pass leaves the incoming local table untouched.
fn extract_build_properties(content: &str, options: ParseOptions<'_>) -> Option<FileExtraction> {
    let captures = SBT_VERSION_REGEX.captures(content);
    let Some((matched, version)) = captures.and_then(|c| Some((c.get(0)?, c.name("version")?))) else {
        trace!(package_file = options.package_file, "No sbt.version declared");
        return None;
    };

    let mut dep = PackageDependency::new(Datasource::GithubReleases, SBT_DEP_NAME, SBT_DEP_NAME);
    dep.versioning = Some(SBT_VERSIONING.to_string());
    dep.current_value = Some(version.as_str().to_string());
    dep.replace_string = Some(matched.as_str().to_string());
    dep.extract_version = Some(SBT_RELEASE_TAG_PATTERN.to_string());

    Some(FileExtraction {
        package_file: options.package_file.to_string(),
        deps: vec![dep],
        local_vars: Arc::unwrap_or_clone(options.local_vars),
        registry_urls: vec![options.registries.maven_central.clone()],
        scala_version: None,
        package_file_version: None,
    })
}
