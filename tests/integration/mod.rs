//! Integration test suite for sbt-extract
//!
//! End-to-end tests over real project trees on disk: discovery, reading,
//! two-phase extraction and the command-line binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: the `sbt-extract` binary (`extract`, `files`, errors)
//! - **project**: library entry points over multi-module projects

mod cli;
mod project;
