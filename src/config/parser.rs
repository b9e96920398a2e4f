//! TOML parsing with file path context.

use anyhow::{Context, Result};
use std::path::Path;

/// Read a TOML file and deserialize it into `T`.
///
/// # Errors
///
/// Returns an error naming the file if it cannot be read or does not match
/// the shape of `T`.
pub async fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
