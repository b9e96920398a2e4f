//! sbt-extract - dependency extraction for sbt builds
//!
//! Reads the build definition of an sbt project (`*.sbt`, `project/*.scala`,
//! `project/build.properties`) without evaluating it and reports the
//! dependency declarations it contains: library coordinates, plugins,
//! resolver URLs, the Scala runtime version and the sbt version itself.
//! Every dependency carries enough addressing metadata (edit file, version
//! variable, replace string) for a later rewrite step.
//!
//! # Architecture Overview
//!
//! Extraction is a pattern match over a token tree rather than a parse:
//!
//! - [`lexer`] turns source text into tokens, with bracketed regions as
//!   nested groups
//! - [`matcher`] provides composable rules that thread a context value
//!   through every successful match
//! - [`extract`] holds the sbt grammar, per-file passes and the two-phase
//!   project driver that scopes variables per directory
//!
//! # Core Modules
//!
//! - [`cli`] - the `sbt-extract` command-line interface
//! - [`config`] - layered configuration (defaults, user, project, `--config`)
//! - [`core`] - error types and user-facing error rendering
//! - [`constants`] - default registries and limits
//! - [`utils`] - build file discovery
//!
//! # Example
//!
//! ```rust,no_run
//! use sbt_extract::config::ExtractConfig;
//! use sbt_extract::extract::{LocalFileReader, extract_all_package_files};
//! use sbt_extract::utils::discovery::discover_package_files;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let root = Path::new("my-sbt-project");
//! let config = ExtractConfig::load(root, None).await?;
//! let files = discover_package_files(root, &config.discovery)?;
//! match extract_all_package_files(&config, &files, &LocalFileReader::new(root)).await {
//!     Some(package_files) => println!("{} files with dependencies", package_files.len()),
//!     None => println!("No dependencies found"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod extract;
pub mod lexer;
pub mod matcher;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
