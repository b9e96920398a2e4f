//! `sbt-extract extract`: discover, read and extract a project.

use super::common::{load_config, project_root};
use crate::extract::{LocalFileReader, PackageDependency, PackageFile, extract_all_package_files};
use crate::utils::discovery::discover_package_files;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// How results are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Grouped, colored listing
    #[default]
    Text,
    /// The extracted package files as JSON (`null` when nothing was found)
    Json,
}

/// Extract dependencies from an sbt project.
#[derive(Args, Debug)]
pub struct ExtractCommand {
    /// Project directory (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl ExtractCommand {
    /// Run extraction and print the result.
    ///
    /// Finding nothing is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or configuration is invalid.
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let root = project_root(self.path.as_deref())?;
        let config = load_config(&root, config_path).await?;
        let package_files = discover_package_files(&root, &config.discovery)?;
        info!("Extracting {} build files from {}", package_files.len(), root.display());

        let reader = LocalFileReader::new(&root);
        let result = extract_all_package_files(&config, &package_files, &reader).await;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            OutputFormat::Text => print!("{}", render_text(result.as_deref())),
        }
        Ok(())
    }
}

/// Render results as an indented listing grouped by edit-target file.
#[must_use]
pub fn render_text(package_files: Option<&[PackageFile]>) -> String {
    let Some(package_files) = package_files else {
        return format!("{}\n", "No dependencies found".yellow());
    };

    let mut out = String::new();
    for package_file in package_files {
        let _ = writeln!(out, "{}", package_file.package_file.bold());
        for dep in &package_file.deps {
            let _ = writeln!(out, "  {}", render_dependency(dep));
        }
    }
    out
}

fn render_dependency(dep: &PackageDependency) -> String {
    let version = match &dep.current_value {
        Some(version) => version.green().to_string(),
        None => "(unresolved)".yellow().to_string(),
    };
    let mut line = format!("{} {} [{}]", dep.package_name, version, dep.datasource);
    if let Some(dep_type) = &dep.dep_type {
        let _ = write!(line, " {dep_type}");
    }
    if let Some(variable) = &dep.variable_name {
        let _ = write!(line, " {}", format!("via {variable}").dimmed());
    }
    line
}
