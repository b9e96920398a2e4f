//! Data types produced by extraction.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// `dep_type` value that marks a build-tool plugin.
pub const PLUGIN_DEP_TYPE: &str = "plugin";

/// A value bound by `val name = "..."` or `name := "..."`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// The string literal bound to the name
    pub value: String,
    /// Build file that defines the variable
    pub source_file: String,
    /// Zero-based line of the value literal
    pub line_index: usize,
}

/// Variables keyed by their raw (undotted) name.
pub type VariableTable = BTreeMap<String, Variable>;

/// Where a dependency's versions are looked up downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Datasource {
    /// Maven repositories (the Scala runtime library)
    Maven,
    /// sbt library dependencies
    SbtPackage,
    /// sbt plugins
    SbtPlugin,
    /// GitHub releases (the sbt launcher itself)
    GithubReleases,
}

impl Datasource {
    /// Stable identifier of the datasource.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::SbtPackage => "sbt-package",
            Self::SbtPlugin => "sbt-plugin",
            Self::GithubReleases => "github-releases",
        }
    }
}

impl fmt::Display for Datasource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One dependency declaration found in a build file.
///
/// Carries enough addressing metadata (`edit_file`, `variable_name`,
/// `replace_string`) for a later rewrite step to update the version in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDependency {
    /// Version lookup source
    pub datasource: Datasource,
    /// Human-facing name, `group:artifact` for libraries
    pub dep_name: String,
    /// Identity used for lookups; may carry a `_<scalaVersion>` suffix
    pub package_name: String,
    /// Declared version; `None` when it referenced an unknown variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
    /// Versioning scheme override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versioning: Option<String>,
    /// Trailing qualifier (`Test`, `"provided"`, classifier) or `plugin`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dep_type: Option<String>,
    /// Groups dependencies sharing one version variable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    /// Variable the version was read from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    /// Registries to query, in priority order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub registry_urls: Vec<String>,
    /// File a rewrite must edit to change the version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_file: Option<String>,
    /// Exact source text to replace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_string: Option<String>,
    /// Regex applied to upstream release names to obtain versions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_version: Option<String>,
    /// Minor and patch updates should be proposed separately
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub separate_minor_patch: bool,
}

impl PackageDependency {
    /// A dependency with only its identity filled in.
    pub fn new(datasource: Datasource, dep_name: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            datasource,
            dep_name: dep_name.into(),
            package_name: package_name.into(),
            current_value: None,
            versioning: None,
            dep_type: None,
            group_name: None,
            variable_name: None,
            registry_urls: Vec::new(),
            edit_file: None,
            replace_string: None,
            extract_version: None,
            separate_minor_patch: false,
        }
    }

    /// Whether this dependency is a build-tool plugin.
    #[must_use]
    pub fn is_plugin(&self) -> bool {
        self.dep_type.as_deref() == Some(PLUGIN_DEP_TYPE)
    }
}

/// Dependencies grouped under the file a rewrite would edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageFile {
    /// Edit-target file, relative to the project root
    pub package_file: String,
    /// De-duplicated dependencies in declaration order
    pub deps: Vec<PackageDependency>,
}

/// Content of one build file, as handed to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Path relative to the project root, `/`-separated
    pub package_file: String,
    /// UTF-8 file content
    pub content: String,
}

impl FileContent {
    /// Pair a relative path with its content.
    pub fn new(package_file: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            package_file: package_file.into(),
            content: content.into(),
        }
    }
}
