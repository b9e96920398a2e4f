//! Supporting utilities.
//!
//! - [`discovery`] - locating sbt build files below a project root

pub mod discovery;
