//! Error types for covwrap
//!
//! Every failure of an external tool is wrapped with the pipeline step that
//! ran it, so the message tells the user which stage broke.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for covwrap
#[derive(Error, Debug)]
pub enum Error {
    // === External Tool Errors ===
    #[error("Failed to run '{tool}' for {step}: {source}")]
    ToolSpawn {
        step: String,
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{step} failed ({}){}", describe_code(.code), format_output(.output))]
    ToolFailed {
        step: String,
        code: Option<i32>,
        /// Captured stdout followed by stderr
        output: String,
    },

    #[error("Tool '{name}' not found: '{program}' is neither on PATH nor an executable path")]
    ToolNotFound { name: String, program: String },

    // === Coverage Errors ===
    #[error("No coverage profiles matched '{0}'")]
    NoProfiles(String),

    #[error("Coverage profile '{}' does not exist", .0.display())]
    MissingProfile(PathBuf),

    #[error("Invalid profile pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to write '{path}': {error}")]
    FileWrite { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a tool failure error from a captured exit status and output
    pub fn tool_failed(step: &str, code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> Self {
        let mut output = String::from_utf8_lossy(stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(stderr);
        let stderr = stderr.trim_end();
        if !stderr.is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(stderr);
        }
        Self::ToolFailed {
            step: step.to_string(),
            code,
            output,
        }
    }

    /// Create an error for a process that could not be started or awaited
    pub fn tool_spawn(step: &str, tool: &str, source: io::Error) -> Self {
        Self::ToolSpawn {
            step: step.to_string(),
            tool: tool.to_string(),
            source,
        }
    }

    /// Create a file write error
    pub fn file_write(path: &std::path::Path, error: io::Error) -> Self {
        Self::FileWrite {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Exit code the CLI should terminate with
    ///
    /// A failed tool's own exit status is passed through unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ToolFailed { code: Some(code), .. } if *code != 0 => *code,
            Error::ToolNotFound { .. } => 127,
            _ => 1,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn format_output(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(":\n{output}")
    }
}
