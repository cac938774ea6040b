//! External process execution
//!
//! Every tool the pipeline drives goes through a [`ProcessRunner`], which
//! lets tests substitute a recording runner and lets `--dry-run` print the
//! plan without touching anything.

mod runner;

#[cfg(test)]
pub(crate) mod mock;

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::common::config::ToolSpec;
use crate::common::Result;

pub use runner::{DryRunRunner, SystemRunner};

/// A single external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Pipeline step label used in logs and error messages
    pub step: String,
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the child
    pub cwd: PathBuf,
    /// Bytes written to the child's stdin, which is null when absent
    pub input: Option<Vec<u8>>,
}

impl Invocation {
    /// Build an invocation of `tool` with `extra` appended to its leading args
    pub fn new<I, S>(step: impl Into<String>, tool: &ToolSpec, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            step: step.into(),
            program: tool.program.clone(),
            args: tool.command(extra),
            cwd: PathBuf::from("."),
            input: None,
        }
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.cwd = dir.to_path_buf();
        self
    }

    pub fn with_input(mut self, input: Vec<u8>) -> Self {
        self.input = Some(input);
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        if self.input.is_some() {
            f.write_str(" < (piped)")?;
        }
        Ok(())
    }
}

/// Captured result of a successful invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Output {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Stdout followed by stderr, as a terminal would have shown them
    pub fn combined_lossy(&self) -> String {
        let mut combined = self.stdout_lossy();
        combined.push_str(&String::from_utf8_lossy(&self.stderr));
        combined
    }
}

/// Runs external commands to completion
///
/// Implementations return `Ok` only when the process exited successfully;
/// any other outcome is reported as [`crate::Error::ToolSpawn`] or
/// [`crate::Error::ToolFailed`].
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<Output>;

    /// Whether invocations are only being printed
    fn is_dry_run(&self) -> bool {
        false
    }
}
