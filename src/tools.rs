//! External tool availability checks

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::common::config::{Config, ToolSpec};

/// Availability of one configured tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    /// Role in the pipeline (`test`, `merge`, `convert`, `xml`, `summary`)
    pub role: String,
    pub program: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub found: bool,
}

/// Resolve every configured tool
///
/// Programs containing a path separator are resolved against `root`, the
/// directory tools are started in; bare names are looked up on PATH.
pub fn check(config: &Config, root: &Path) -> Vec<ToolStatus> {
    config
        .tools
        .iter()
        .map(|(role, spec)| {
            let path = resolve(spec, root);
            ToolStatus {
                role: role.to_string(),
                program: spec.program.clone(),
                found: path.is_some(),
                path,
            }
        })
        .collect()
}

fn resolve(spec: &ToolSpec, root: &Path) -> Option<PathBuf> {
    let program = Path::new(&spec.program);
    if program.components().count() > 1 || program.is_absolute() {
        which::which_in(program, None::<&str>, root).ok()
    } else {
        which::which(program).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_missing_tool() {
        let mut config = Config::default();
        config.tools.merge = ToolSpec::new("covwrap-no-such-merger", &[]);

        let statuses = check(&config, Path::new("."));
        let merge = statuses.iter().find(|s| s.role == "merge").unwrap();
        assert!(!merge.found);
        assert!(merge.path.is_none());
        assert_eq!(statuses.len(), 5);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolves_relative_path_against_root() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir(&bin).unwrap();
        let tool = bin.join("merge.sh");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = Config::default();
        config.tools.merge = ToolSpec::new("./bin/merge.sh", &[]);

        let statuses = check(&config, dir.path());
        let merge = statuses.iter().find(|s| s.role == "merge").unwrap();
        assert!(merge.found);
    }

    #[cfg(unix)]
    #[test]
    fn test_finds_shell_on_path() {
        let mut config = Config::default();
        config.tools.test = ToolSpec::new("sh", &[]);

        let statuses = check(&config, Path::new("."));
        assert!(statuses[0].found);
    }
}
