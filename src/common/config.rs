//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::paths::{project_config_path, user_config_path, Layout};
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Coverage directory and profile naming
    #[serde(default)]
    pub layout: Layout,

    /// External tool commands
    #[serde(default)]
    pub tools: Tools,

    /// Test runner settings
    #[serde(default)]
    pub test: TestSettings,
}

/// An external command: the program plus the arguments always passed first
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ToolSpec {
    /// Program name (looked up on PATH) or path to the executable
    pub program: String,

    /// Arguments placed before any per-invocation arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Full argument list for one invocation
    pub fn command<I, S>(&self, extra: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .iter()
            .cloned()
            .chain(extra.into_iter().map(Into::into))
            .collect()
    }
}

/// The external tools the pipeline drives
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Tools {
    /// Test runner, e.g. `go test`
    #[serde(default = "default_test_tool")]
    pub test: ToolSpec,

    /// Profile merger writing the merged profile to stdout
    #[serde(default = "default_merge_tool")]
    pub merge: ToolSpec,

    /// Converter from a profile to the intermediate JSON form
    #[serde(default = "default_convert_tool")]
    pub convert: ToolSpec,

    /// Converter from the intermediate form (stdin) to XML (stdout)
    #[serde(default = "default_xml_tool")]
    pub xml: ToolSpec,

    /// Per-function coverage summary of the merged profile
    #[serde(default = "default_summary_tool")]
    pub summary: ToolSpec,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            test: default_test_tool(),
            merge: default_merge_tool(),
            convert: default_convert_tool(),
            xml: default_xml_tool(),
            summary: default_summary_tool(),
        }
    }
}

fn default_test_tool() -> ToolSpec {
    ToolSpec::new("go", &["test"])
}
fn default_merge_tool() -> ToolSpec {
    ToolSpec::new("gocovmerge", &[])
}
fn default_convert_tool() -> ToolSpec {
    ToolSpec::new("gocov", &["convert"])
}
fn default_xml_tool() -> ToolSpec {
    ToolSpec::new("gocov-xml", &[])
}
fn default_summary_tool() -> ToolSpec {
    ToolSpec::new("go", &["tool", "cover", "-func"])
}

impl Tools {
    /// Tools paired with the role name used in messages
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ToolSpec)> {
        [
            ("test", &self.test),
            ("merge", &self.merge),
            ("convert", &self.convert),
            ("xml", &self.xml),
            ("summary", &self.summary),
        ]
        .into_iter()
    }
}

/// Settings for the test passes
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TestSettings {
    /// Packages exercised by the unit pass
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,

    /// Flags passed to the runner on every pass
    #[serde(default = "default_flags")]
    pub flags: Vec<String>,

    /// Build tags added to the integration pass as `-tags=a,b`
    #[serde(default)]
    pub integration_tags: Vec<String>,

    /// Packages instrumented on both passes as `-coverpkg=a,b`
    #[serde(default)]
    pub cover_packages: Vec<String>,

    /// Value for `-covermode`, left to the runner's default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_mode: Option<String>,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            packages: default_packages(),
            flags: default_flags(),
            integration_tags: Vec::new(),
            cover_packages: Vec::new(),
            cover_mode: None,
        }
    }
}

fn default_packages() -> Vec<String> {
    vec!["./...".to_string()]
}
fn default_flags() -> Vec<String> {
    ["-race", "-v", "-cover"].map(String::from).to_vec()
}

impl Config {
    /// Load configuration for a project
    ///
    /// An explicit path must exist. Otherwise `<root>/covwrap.toml` is tried,
    /// then the user configuration file, then built-in defaults.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Configuration file '{}' not found",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        let candidates: [Option<PathBuf>; 2] = [Some(project_config_path(root)), user_config_path()];
        for path in candidates.into_iter().flatten() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading configuration");
                return Self::from_file(&path);
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::ConfigParse(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
