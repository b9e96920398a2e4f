//! Constants used throughout the sbt-extract codebase.
//!
//! Registry URLs here are only defaults: the driver receives the values that
//! end up in [`crate::config::RegistryUrls`], which may be overridden by
//! configuration files.

/// Default central Maven registry, seeded into every file's registry list.
pub const MAVEN_CENTRAL: &str = "https://repo.maven.apache.org/maven2";

/// Default registry for sbt plugins, appended to every plugin dependency.
pub const SBT_PLUGINS_REPO: &str = "https://repo.scala-sbt.org/scalasbt/sbt-plugin-releases";

/// Maximum group nesting the root search descends into.
///
/// Input nested deeper than this is still tokenized but never searched, which
/// bounds matcher recursion on malformed or adversarial files.
pub const ROOT_SEARCH_MAX_DEPTH: usize = 32;

/// Maximum bracket nesting the tokenizer accepts.
///
/// Deeper input is rejected as a syntax error so the token tree stays shallow
/// enough to clone, compare and drop without exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Name of the project configuration directory (phase-1 files live here).
pub const PROJECT_CONFIG_DIR: &str = "project";

/// Group key of files located directly at the project root.
pub const ROOT_GROUP: &str = ".";

/// Build-tool properties file holding `sbt.version`.
pub const BUILD_PROPERTIES_FILE: &str = "project/build.properties";

/// Project-level configuration file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "sbt-extract.toml";

/// Environment variable overriding the user-level configuration path.
pub const CONFIG_PATH_ENV: &str = "SBT_EXTRACT_CONFIG";

/// Default number of files read concurrently.
pub const DEFAULT_MAX_CONCURRENT_READS: usize = 16;
