//! Command-line interface for sbt-extract.
//!
//! ```text
//! sbt-extract [--verbose | --quiet] [--config <FILE>] <COMMAND>
//!
//! Commands:
//!   extract  Extract dependencies from an sbt project
//!   files    List the build files extraction would read
//! ```
//!
//! Logging goes to stderr. `--verbose` enables debug output, `--quiet`
//! disables logging entirely, and otherwise `RUST_LOG` is honored with
//! `info` as the fallback.

mod common;
mod extract;
mod files;


pub use extract::{ExtractCommand, OutputFormat};
pub use files::FilesCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging
    pub log_level: Option<String>,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Does nothing when logging is disabled or a subscriber is already set.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).try_init();
    }
}

/// Extract dependency declarations from sbt builds.
#[derive(Parser)]
#[command(
    name = "sbt-extract",
    about = "Extract dependency declarations from sbt build definitions",
    version,
    long_about = "sbt-extract reads *.sbt, project/*.scala and project/build.properties files and \
                  reports the libraries, plugins, resolvers, Scala version and sbt version they declare."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file applied on top of user and project configuration
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract dependencies from an sbt project
    Extract(ExtractCommand),

    /// List the build files extraction would read
    Files(FilesCommand),
}

impl Cli {
    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the project
    /// directory cannot be walked.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command with an already built [`CliConfig`].
    ///
    /// # Errors
    ///
    /// See [`Cli::execute`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Extract(cmd) => cmd.execute(config.config_path.as_deref()).await,
            Commands::Files(cmd) => cmd.execute(config.config_path.as_deref()).await,
        }
    }
}
