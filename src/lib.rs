//! covwrap - test runner and coverage report wrapper
//!
//! Runs a toolchain's test runner over the unit and integration suites and
//! stitches third-party coverage tools together into merged XML reports.

pub mod cli;
pub mod commands;
pub mod common;
pub mod exec;
pub mod pipeline;
pub mod tools;

// Re-export commonly used types for tests
pub use common::config::{Config, ToolSpec};
pub use common::{Error, Result};
pub use pipeline::{CoverageReport, Project};
