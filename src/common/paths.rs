//! Coverage directory layout and configuration paths
//!
//! All layout paths are relative to the project root, since the external
//! tools are invoked with the project root as their working directory.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Name used for the configuration directory
const APP_NAME: &str = "covwrap";

/// Name of the per-project configuration file
pub const PROJECT_CONFIG_FILE: &str = "covwrap.toml";

/// Conventional directory layout for profiles and reports
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Layout {
    /// Directory receiving every profile and report
    #[serde(default = "default_coverage_dir")]
    pub coverage_dir: PathBuf,

    /// File name of the unit test profile
    #[serde(default = "default_unit_profile")]
    pub unit_profile: String,

    /// File name of the integration test profile
    #[serde(default = "default_integration_profile")]
    pub integration_profile: String,

    /// File name of the merged profile
    #[serde(default = "default_combined_profile")]
    pub combined_profile: String,

    /// Suffix shared by all raw profiles, used for globbing
    #[serde(default = "default_profile_extension")]
    pub profile_extension: String,

    /// Suffix replacing the profile suffix on converted reports
    #[serde(default = "default_report_extension")]
    pub report_extension: String,

    /// Integration test directory, passed verbatim as the package pattern
    #[serde(default = "default_integration_dir")]
    pub integration_dir: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            coverage_dir: default_coverage_dir(),
            unit_profile: default_unit_profile(),
            integration_profile: default_integration_profile(),
            combined_profile: default_combined_profile(),
            profile_extension: default_profile_extension(),
            report_extension: default_report_extension(),
            integration_dir: default_integration_dir(),
        }
    }
}

fn default_coverage_dir() -> PathBuf {
    PathBuf::from(".coverage")
}
fn default_unit_profile() -> String {
    "unit.cover.out".to_string()
}
fn default_integration_profile() -> String {
    "integration.cover.out".to_string()
}
fn default_combined_profile() -> String {
    "combined.cover.out".to_string()
}
fn default_profile_extension() -> String {
    "cover.out".to_string()
}
fn default_report_extension() -> String {
    "xml".to_string()
}
fn default_integration_dir() -> PathBuf {
    PathBuf::from("./tests/")
}

impl Layout {
    pub fn unit_profile(&self) -> PathBuf {
        self.coverage_dir.join(&self.unit_profile)
    }

    pub fn integration_profile(&self) -> PathBuf {
        self.coverage_dir.join(&self.integration_profile)
    }

    pub fn combined_profile(&self) -> PathBuf {
        self.coverage_dir.join(&self.combined_profile)
    }

    /// Human-readable glob matching every raw profile, e.g. `.coverage/*.cover.out`
    pub fn profile_glob(&self) -> String {
        self.coverage_dir
            .join(format!("*.{}", self.profile_extension))
            .to_string_lossy()
            .into_owned()
    }

    /// Glob pattern for the raw profiles below `root`
    ///
    /// Only the `*` is a wildcard; the root, the coverage directory and the
    /// suffix are matched literally.
    pub fn profile_pattern(&self, root: &Path) -> String {
        let dir = root.join(&self.coverage_dir);
        format!(
            "{}/*.{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            glob::Pattern::escape(&self.profile_extension)
        )
    }

    /// Package pattern for the integration pass
    pub fn integration_packages(&self) -> String {
        self.integration_dir.to_string_lossy().into_owned()
    }

    /// Whether the project has an integration test directory at all
    pub fn has_integration_tests(&self, root: &Path) -> bool {
        root.join(&self.integration_dir).exists()
    }

    /// Report path for a profile: the profile suffix swapped for the report one
    pub fn report_path(&self, profile: &Path) -> PathBuf {
        let suffix = format!(".{}", self.profile_extension);
        let stem = profile
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(&suffix));
        match stem {
            Some(stem) => profile.with_file_name(format!("{stem}.{}", self.report_extension)),
            None => profile.with_extension(&self.report_extension),
        }
    }

    /// Create the coverage directory below `root` if it is missing
    pub fn ensure_coverage_dir(&self, root: &Path) -> io::Result<PathBuf> {
        let dir = root.join(&self.coverage_dir);
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(dir)
    }
}

/// Drop `.` components so `./a/b` and `a/b` compare equal
pub fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/covwrap/`
/// - macOS: `~/Library/Application Support/covwrap/`
/// - Windows: `%APPDATA%\covwrap\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the user configuration file
pub fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the project configuration file
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(PROJECT_CONFIG_FILE)
}
