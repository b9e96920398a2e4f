//! Configuration for sbt-extract.
//!
//! Settings are merged from up to four layers, later layers winning field by
//! field:
//!
//! 1. Built-in defaults ([`ExtractConfig::default`])
//! 2. The user configuration file, `<config dir>/sbt-extract/config.toml`
//!    (or the path in `SBT_EXTRACT_CONFIG`)
//! 3. The project file `sbt-extract.toml` at the project root
//! 4. An explicit `--config <path>`
//!
//! Missing user and project files are skipped. An explicit path that does not
//! exist is an error, as is any file that fails to parse.
//!
//! ```toml
//! max_concurrent_reads = 8
//!
//! [registry_urls]
//! maven_central = "https://maven.example.com/releases"
//!
//! [discovery]
//! include = ["**/*.sbt", "**/project/*.scala"]
//! exclude_dirs = ["target", "node_modules"]
//! ```

mod global;
mod parser;

pub use global::{ConfigLayer, DiscoveryLayer, RegistryLayer, default_path};
pub use parser::parse_config;

use crate::constants::{DEFAULT_MAX_CONCURRENT_READS, MAVEN_CENTRAL, SBT_PLUGINS_REPO};
use serde::Serialize;

/// Effective configuration after all layers are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractConfig {
    /// Registries injected into extracted dependencies
    pub registry_urls: RegistryUrls,
    /// Which files count as sbt build files
    pub discovery: DiscoveryConfig,
    /// Upper bound on files read at the same time
    pub max_concurrent_reads: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            registry_urls: RegistryUrls::default(),
            discovery: DiscoveryConfig::default(),
            max_concurrent_reads: DEFAULT_MAX_CONCURRENT_READS,
        }
    }
}

/// Fixed registry URLs supplied to the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryUrls {
    /// Seed of every file's registry list
    pub maven_central: String,
    /// Appended to every plugin dependency
    pub sbt_plugins: String,
}

impl Default for RegistryUrls {
    fn default() -> Self {
        Self {
            maven_central: MAVEN_CENTRAL.to_string(),
            sbt_plugins: SBT_PLUGINS_REPO.to_string(),
        }
    }
}

/// File discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryConfig {
    /// Glob patterns matched against `/`-separated paths relative to the root
    pub include: Vec<String>,
    /// Directory names never descended into
    pub exclude_dirs: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include: vec![
                "**/*.sbt".to_string(),
                "**/project/*.scala".to_string(),
                "**/project/build.properties".to_string(),
            ],
            exclude_dirs: vec!["target".to_string()],
        }
    }
}
