//! Error handling for sbt-extract
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`ExtractError`]) for the failures the library can report
//! 2. **User-friendly messages** ([`ErrorContext`]) with suggestions for CLI users
//!
//! Note that the extraction pipeline itself never surfaces an error to its caller:
//! a file that fails to tokenize is logged and contributes zero dependencies. The
//! typed errors here are produced by the tokenizer (and caught at the file
//! boundary), by configuration loading, and by file discovery.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sbt_extract::core::{ExtractError, ErrorContext, user_friendly_error};
//!
//! let error = ExtractError::ConfigNotFound {
//!     path: "custom.toml".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for sbt-extract operations.
///
/// # Error Categories
///
/// ## Tokenizing
/// - [`UnterminatedString`](Self::UnterminatedString) - string literal runs past end of line or file
/// - [`UnterminatedComment`](Self::UnterminatedComment) - block comment never closed
/// - [`UnexpectedDelimiter`](Self::UnexpectedDelimiter) - closing bracket with no matching opener
/// - [`UnclosedDelimiter`](Self::UnclosedDelimiter) - opening bracket never closed
/// - [`NestingTooDeep`](Self::NestingTooDeep) - brackets nested past the supported depth
///
/// ## Configuration
/// - [`ConfigNotFound`](Self::ConfigNotFound) - explicitly requested config file is missing
/// - [`ConfigParseError`](Self::ConfigParseError) - invalid TOML in a config file
/// - [`InvalidPattern`](Self::InvalidPattern) - an `include` glob does not compile
///
/// ## File System
/// - [`DirectoryNotFound`](Self::DirectoryNotFound) - the project root does not exist
/// - [`IoError`](Self::IoError) - standard I/O errors
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A string literal was not closed before the end of its line (or the file,
    /// for triple-quoted strings).
    #[error("Unterminated string literal starting at line {line}")]
    UnterminatedString {
        /// One-based line where the literal starts
        line: usize,
    },

    /// A `/* ... */` comment was not closed.
    #[error("Unterminated block comment starting at line {line}")]
    UnterminatedComment {
        /// One-based line where the comment starts
        line: usize,
    },

    /// A closing delimiter appeared that does not match the innermost open group.
    #[error("Unexpected '{found}' at line {line}")]
    UnexpectedDelimiter {
        /// The delimiter character that was found
        found: char,
        /// One-based line of the delimiter
        line: usize,
    },

    /// The input ended while a group was still open.
    #[error("Unclosed '{open}' opened at line {line}")]
    UnclosedDelimiter {
        /// The opening delimiter character
        open: char,
        /// One-based line of the opening delimiter
        line: usize,
    },

    /// Brackets are nested deeper than the tokenizer accepts.
    #[error("Brackets nested deeper than {limit} levels at line {line}")]
    NestingTooDeep {
        /// Maximum supported nesting depth
        limit: usize,
        /// One-based line of the opening delimiter that exceeded the limit
        line: usize,
    },

    /// An explicitly requested configuration file does not exist.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was requested
        path: String,
    },

    /// A configuration file contains invalid TOML or unknown fields.
    #[error("Invalid configuration in {file}: {reason}")]
    ConfigParseError {
        /// The configuration file
        file: String,
        /// Parser message
        reason: String,
    },

    /// An `include` pattern from the configuration is not a valid glob.
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Why it failed to compile
        reason: String,
    },

    /// The project root passed to discovery does not exist or is not a directory.
    #[error("Project directory not found: {path}")]
    DirectoryNotFound {
        /// The requested directory
        path: String,
    },

    /// Standard I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ExtractError {
    /// Whether this error was raised while tokenizing build file content.
    #[must_use]
    pub const fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            Self::UnterminatedString { .. }
                | Self::UnterminatedComment { .. }
                | Self::UnexpectedDelimiter { .. }
                | Self::UnclosedDelimiter { .. }
                | Self::NestingTooDeep { .. }
        )
    }
}

/// Error wrapper that adds a suggestion and details for display in the CLI.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error message
    pub error: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub fn new(error: impl fmt::Display) -> Self {
        Self {
            error: error.to_string(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    ///
    /// Suggestions are displayed in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    ///
    /// Details are displayed in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// Looks for an [`ExtractError`] or [`std::io::Error`] anywhere in the error
/// chain, so errors wrapped with `anyhow::Context` still get tailored advice.
/// The displayed message is the outermost context, which carries the most
/// specific description of what was being attempted.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    for cause in error.chain() {
        if let Some(extract_error) = cause.downcast_ref::<ExtractError>() {
            return create_error_context(message, extract_error);
        }

        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            match io_error.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    return ErrorContext::new(message)
                        .with_suggestion("Check file ownership and read permissions for the project tree");
                }
                std::io::ErrorKind::NotFound => {
                    return ErrorContext::new(message)
                        .with_suggestion("Check that the file or directory exists and the path is correct");
                }
                _ => {}
            }
        }
    }

    ErrorContext::new(message)
}

fn create_error_context(message: String, error: &ExtractError) -> ErrorContext {
    match error {
        ExtractError::ConfigNotFound { .. } => ErrorContext::new(message)
            .with_suggestion("Pass an existing file to --config or remove the flag to use defaults"),
        ExtractError::ConfigParseError { .. } => ErrorContext::new(message)
            .with_suggestion("Check the TOML syntax. Supported sections are [registry_urls] and [discovery]")
            .with_details("Unknown keys are rejected so typos do not silently fall back to defaults"),
        ExtractError::InvalidPattern { .. } => ErrorContext::new(message)
            .with_suggestion("Use glob syntax such as '**/*.sbt' or 'project/*.scala'"),
        ExtractError::DirectoryNotFound { .. } => ErrorContext::new(message)
            .with_suggestion("Pass the root of an sbt project, the directory containing build.sbt"),
        _ if error.is_syntax_error() => ErrorContext::new(message)
            .with_details("Files that fail to tokenize are skipped during extraction"),
        _ => ErrorContext::new(message),
    }
}
