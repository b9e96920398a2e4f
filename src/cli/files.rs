//! `sbt-extract files`: list discovered build files.

use super::common::{load_config, project_root};
use crate::utils::discovery::discover_package_files;
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

/// List the build files extraction would read.
#[derive(Args, Debug)]
pub struct FilesCommand {
    /// Project directory (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

impl FilesCommand {
    /// Print one relative path per line.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or configuration is invalid.
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let root = project_root(self.path.as_deref())?;
        let config = load_config(&root, config_path).await?;
        for file in discover_package_files(&root, &config.discovery)? {
            println!("{file}");
        }
        Ok(())
    }
}
