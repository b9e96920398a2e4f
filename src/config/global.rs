//! Configuration file layers and their merge into [`ExtractConfig`].
//!
//! Every file deserializes into a [`ConfigLayer`] whose fields are all
//! optional; a layer only overrides what it sets. Unknown keys are rejected so
//! typos surface as errors instead of silently falling back to defaults.

use super::{ExtractConfig, parse_config};
use crate::constants::{CONFIG_PATH_ENV, PROJECT_CONFIG_FILE};
use crate::core::ExtractError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One configuration file, before merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    /// Registry overrides
    #[serde(default)]
    pub registry_urls: RegistryLayer,
    /// Discovery overrides
    #[serde(default)]
    pub discovery: DiscoveryLayer,
    /// Read concurrency override
    pub max_concurrent_reads: Option<usize>,
}

/// `[registry_urls]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryLayer {
    /// Central registry URL
    pub maven_central: Option<String>,
    /// Plugin registry URL
    pub sbt_plugins: Option<String>,
}

/// `[discovery]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryLayer {
    /// Replaces the include patterns
    pub include: Option<Vec<String>>,
    /// Replaces the excluded directory names
    pub exclude_dirs: Option<Vec<String>>,
}

impl ConfigLayer {
    /// Load one layer from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load_from(path: &Path) -> Result<Self> {
        parse_config(path).await
    }

    /// Overlay this layer onto `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ConfigParseError`] for registry URLs that do not
    /// parse or a zero read concurrency. `source` names the layer in the error.
    pub fn apply_to(self, config: &mut ExtractConfig, source: &str) -> Result<(), ExtractError> {
        let invalid = |reason: String| ExtractError::ConfigParseError {
            file: source.to_string(),
            reason,
        };

        for url in [&self.registry_urls.maven_central, &self.registry_urls.sbt_plugins].into_iter().flatten() {
            url::Url::parse(url).map_err(|e| invalid(format!("invalid registry URL '{url}': {e}")))?;
        }
        if self.max_concurrent_reads == Some(0) {
            return Err(invalid("max_concurrent_reads must be at least 1".to_string()));
        }

        if let Some(url) = self.registry_urls.maven_central {
            config.registry_urls.maven_central = url;
        }
        if let Some(url) = self.registry_urls.sbt_plugins {
            config.registry_urls.sbt_plugins = url;
        }
        if let Some(include) = self.discovery.include {
            config.discovery.include = include;
        }
        if let Some(exclude_dirs) = self.discovery.exclude_dirs {
            config.discovery.exclude_dirs = exclude_dirs;
        }
        if let Some(max) = self.max_concurrent_reads {
            config.max_concurrent_reads = max;
        }
        Ok(())
    }
}

/// Location of the user configuration file.
///
/// `SBT_EXTRACT_CONFIG` takes precedence over the platform config directory
/// (`~/.config/sbt-extract/config.toml` on Linux). Returns `None` when neither
/// is available.
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("sbt-extract").join("config.toml"))
}

impl ExtractConfig {
    /// Load the effective configuration for a project.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` does not exist or any present layer is
    /// malformed.
    pub async fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        Self::load_layers(default_path().as_deref(), project_root, explicit).await
    }

    /// Load the effective configuration from an explicit set of layer files.
    ///
    /// # Errors
    ///
    /// Same as [`ExtractConfig::load`].
    pub async fn load_layers(user: Option<&Path>, project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let project = project_root.join(PROJECT_CONFIG_FILE);
        for path in [user, Some(project.as_path())].into_iter().flatten() {
            if path.is_file() {
                apply_file(&mut config, path).await?;
            } else {
                debug!("No config at {}", path.display());
            }
        }

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ExtractError::ConfigNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            apply_file(&mut config, path).await?;
        }

        Ok(config)
    }
}

async fn apply_file(config: &mut ExtractConfig, path: &Path) -> Result<()> {
    debug!("Loading config layer {}", path.display());
    let layer = ConfigLayer::load_from(path).await?;
    layer
        .apply_to(config, &path.display().to_string())
        .with_context(|| format!("Failed to apply config file: {}", path.display()))
}
