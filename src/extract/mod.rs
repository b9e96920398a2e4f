//! Dependency extraction from sbt build definitions.
//!
//! The pipeline for one project:
//!
//! 1. [`reader`] reads every candidate file (concurrently, order preserved)
//! 2. [`project`] groups files by directory and runs two phases:
//!    - phase 1 over `project/` and the root collects global variables,
//!      resolver URLs and the Scala version
//!    - phase 2 extracts each directory group with its own local variables
//! 3. [`file`] runs one pass: tokenize, then the [`grammar`] query threads an
//!    [`ExtractionContext`] through every match
//! 4. Dependencies are grouped by edit target and de-duplicated
//!
//! A file that fails to tokenize is logged and skipped; nothing here returns
//! an error.
//!
//! # Example
//!
//! ```rust
//! use sbt_extract::config::RegistryUrls;
//! use sbt_extract::extract::{FileContent, extract_from_contents};
//!
//! let files = vec![FileContent::new(
//!     "build.sbt",
//!     r#"
//!     scalaVersion := "2.13.12"
//!     libraryDependencies += "org.typelevel" %% "cats-core" % "2.10.0"
//!     "#,
//! )];
//! let package_files = extract_from_contents(&RegistryUrls::default(), files).unwrap();
//! let deps = &package_files[0].deps;
//! assert_eq!(deps[1].package_name, "org.typelevel:cats-core_2.13");
//! ```

pub mod context;
pub mod file;
pub mod grammar;
pub mod project;
pub mod reader;
pub mod scala_version;
pub mod types;

pub use context::{ExtractionContext, FileExtraction, Scratch};
pub use file::{ParseOptions, extract_file};
pub use project::{ProjectState, extract_from_contents};
pub use reader::{FileReader, LocalFileReader, extract_all_package_files};
pub use types::{Datasource, FileContent, PackageDependency, PackageFile, Variable, VariableTable};

#[cfg(test)]
mod tests;
