//! Helpers shared by the commands.

use crate::config::ExtractConfig;
use crate::core::ExtractError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// The project root to operate on: `path` or the current directory.
pub fn project_root(path: Option<&Path>) -> Result<PathBuf> {
    let root = match path {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    if !root.is_dir() {
        return Err(ExtractError::DirectoryNotFound {
            path: root.display().to_string(),
        }
        .into());
    }
    Ok(root)
}

/// Load the layered configuration for `root`.
pub async fn load_config(root: &Path, explicit: Option<&Path>) -> Result<ExtractConfig> {
    ExtractConfig::load(root, explicit).await.context("Failed to load configuration")
}
