//! Per-file extraction state threaded through the matcher.
//!
//! [`ExtractionContext`] is a value type: the matcher clones it before every
//! alternation attempt and keeps only the clone of a successful match. The
//! dependency list and local variable table are behind [`Arc`] so those clones
//! stay cheap; handlers that modify them go through [`Arc::make_mut`].

use super::types::{PackageDependency, Variable, VariableTable};
use std::sync::Arc;

/// Transient fields filled in while a single rule is matching.
///
/// Every handler that completes a dependency calls [`Scratch::take`], so no
/// partial state reaches the next match attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scratch {
    /// Resolved group id
    pub group_id: Option<String>,
    /// Resolved artifact id
    pub artifact_id: Option<String>,
    /// Resolved version
    pub current_value: Option<String>,
    /// Name captured by a variable definition
    pub current_var_name: Option<String>,
    /// Trailing qualifier or `plugin`
    pub dep_type: Option<String>,
    /// Set by `%%` and `%%%`
    pub use_scala_version: bool,
    /// Variable the version came from (dot-stripped)
    pub variable_name: Option<String>,
    /// File defining that variable
    pub variable_source: Option<String>,
    /// Scala version captured by `scalaVersion := ...`
    pub scala_version: Option<String>,
}

impl Scratch {
    /// Move all fields out, leaving an empty scratch behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

/// Accumulated state for one pass over one build file.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    /// File being extracted
    pub package_file: String,
    /// Project-wide variables, read-only
    pub global_vars: Arc<VariableTable>,
    /// Variables visible to this group; definitions land here
    pub local_vars: Arc<VariableTable>,
    /// Dependencies emitted so far
    pub deps: Arc<Vec<PackageDependency>>,
    /// Registry URLs known to this file, seeded from configuration
    pub registry_urls: Vec<String>,
    /// Appended to every plugin dependency
    pub plugin_registry_url: String,
    /// Normalized Scala binary version, if known
    pub scala_version: Option<String>,
    /// The project's own `version := ...`
    pub package_file_version: Option<String>,
    /// In-progress match state
    pub scratch: Scratch,
}

impl ExtractionContext {
    /// Look up a symbol by its last dot segment, local table first.
    ///
    /// `Versions.akka` and `akka` resolve to the same variable; two unrelated
    /// objects defining `akka` cannot be told apart.
    #[must_use]
    pub fn resolve(&self, symbol: &str) -> Option<&Variable> {
        let key = last_dot_segment(symbol);
        self.local_vars.get(key).or_else(|| self.global_vars.get(key))
    }

    /// Bind `name` in the local table.
    pub fn define_var(&mut self, name: String, variable: Variable) {
        Arc::make_mut(&mut self.local_vars).insert(name, variable);
    }

    /// Record a completed dependency.
    pub fn push_dep(&mut self, dep: PackageDependency) {
        Arc::make_mut(&mut self.deps).push(dep);
    }

    /// Consume the context, keeping what outlives the pass.
    #[must_use]
    pub fn into_result(self) -> FileExtraction {
        FileExtraction {
            package_file: self.package_file,
            deps: Arc::unwrap_or_clone(self.deps),
            local_vars: Arc::unwrap_or_clone(self.local_vars),
            registry_urls: self.registry_urls,
            scala_version: self.scala_version,
            package_file_version: self.package_file_version,
        }
    }
}

/// Result of extracting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExtraction {
    /// The extracted file
    pub package_file: String,
    /// Dependencies in declaration order, registry URLs already attached
    pub deps: Vec<PackageDependency>,
    /// Local table after the pass (input table plus new definitions)
    pub local_vars: VariableTable,
    /// Registry seed plus every valid resolver URL in the file
    pub registry_urls: Vec<String>,
    /// Normalized Scala version in effect at the end of the file
    pub scala_version: Option<String>,
    /// `version := ...` of the file, if any
    pub package_file_version: Option<String>,
}

/// Final segment of a dotted name.
#[must_use]
pub fn last_dot_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
