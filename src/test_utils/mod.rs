//! Test utilities for sbt-extract
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use sbt_extract::test_utils::{ProjectFixture, init_test_logging};
//!
//! # fn example() -> anyhow::Result<()> {
//! init_test_logging(None);
//! let project = ProjectFixture::new()?.with_file("build.sbt", r#"scalaVersion := "3.3.1""#)?;
//! assert!(project.path().join("build.sbt").exists());
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::ProjectFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays
/// off.
///
/// ```bash
/// RUST_LOG=sbt_extract=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
