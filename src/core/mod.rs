//! Core types shared across sbt-extract.
//!
//! Currently this is the error system:
//! - [`ExtractError`] - typed failures from tokenizing, configuration and discovery
//! - [`ErrorContext`] - user-facing wrapper with suggestions and details
//! - [`user_friendly_error`] - convert any `anyhow::Error` for display in the CLI

pub mod error;

pub use error::{ErrorContext, ExtractError, user_friendly_error};
