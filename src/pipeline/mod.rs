//! Test and coverage pipelines
//!
//! Both pipelines are strictly sequential: each external tool runs to
//! completion before the next one starts. Every test pass writes its own
//! coverage profile and converts it to an XML report.

mod coverage;
mod suite;

use std::path::{Path, PathBuf};

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::exec::{Invocation, ProcessRunner};

pub use coverage::{run_coverage, CoverageReport};
pub use suite::run_tests;

/// Step label of the profile merge
pub const MERGE_STEP: &str = "merge profiles";
/// Step label of the coverage summary
pub const SUMMARY_STEP: &str = "coverage summary";

/// One of the two test passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Unit,
    Integration,
}

impl Pass {
    /// Step label used in logs and error messages
    pub fn step(self) -> &'static str {
        match self {
            Pass::Unit => "unit tests",
            Pass::Integration => "integration tests",
        }
    }
}

/// Output of one completed test pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutput {
    /// Runner stdout followed by stderr
    pub output: String,
    /// Raw profile written by the runner
    pub profile: PathBuf,
    /// XML report converted from the profile
    pub report: PathBuf,
}

/// A project root together with its effective configuration
#[derive(Debug, Clone)]
pub struct Project {
    /// Working directory for every tool; layout paths are relative to it
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn has_integration_tests(&self) -> bool {
        self.config.layout.has_integration_tests(&self.root)
    }

    pub fn profile(&self, pass: Pass) -> PathBuf {
        match pass {
            Pass::Unit => self.config.layout.unit_profile(),
            Pass::Integration => self.config.layout.integration_profile(),
        }
    }

    /// Test runner arguments for a pass, after the tool's own leading args
    pub fn test_args(&self, pass: Pass) -> Vec<String> {
        let settings = &self.config.test;
        let mut args = settings.flags.clone();

        if pass == Pass::Integration && !settings.integration_tags.is_empty() {
            args.push(format!("-tags={}", settings.integration_tags.join(",")));
        }
        if !settings.cover_packages.is_empty() {
            args.push(format!("-coverpkg={}", settings.cover_packages.join(",")));
        }
        if let Some(mode) = &settings.cover_mode {
            args.push(format!("-covermode={mode}"));
        }
        args.push("-coverprofile".to_string());
        args.push(self.profile(pass).to_string_lossy().into_owned());

        match pass {
            Pass::Unit => args.extend(settings.packages.iter().cloned()),
            Pass::Integration => args.push(self.config.layout.integration_packages()),
        }
        args
    }

    /// Create the coverage directory unless only printing the plan
    fn prepare(&self, runner: &dyn ProcessRunner) -> Result<()> {
        if !runner.is_dry_run() {
            self.config.layout.ensure_coverage_dir(&self.root)?;
        }
        Ok(())
    }
}

/// Run one test pass with profiling and convert its profile to XML
pub async fn run_pass(
    project: &Project,
    runner: &dyn ProcessRunner,
    pass: Pass,
) -> Result<PassOutput> {
    let tool = &project.config.tools.test;
    let invocation =
        Invocation::new(pass.step(), tool, project.test_args(pass)).in_dir(&project.root);
    let output = runner.run(&invocation).await?;

    let profile = project.profile(pass);
    let report = convert_profile(project, runner, &profile).await?;

    Ok(PassOutput {
        output: output.combined_lossy(),
        profile,
        report,
    })
}

/// Pipe one profile through the converter and XML tools, returning the report path
pub async fn convert_profile(
    project: &Project,
    runner: &dyn ProcessRunner,
    profile: &Path,
) -> Result<PathBuf> {
    let tools = &project.config.tools;
    let dry_run = runner.is_dry_run();

    if !dry_run && !project.root.join(profile).is_file() {
        return Err(Error::MissingProfile(profile.to_path_buf()));
    }

    let name = profile.to_string_lossy();
    let converted = runner
        .run(
            &Invocation::new(format!("convert {name}"), &tools.convert, [name.to_string()])
                .in_dir(&project.root),
        )
        .await?;

    let xml = runner
        .run(
            &Invocation::new(format!("xml report {name}"), &tools.xml, Vec::<String>::new())
                .in_dir(&project.root)
                .with_input(converted.stdout),
        )
        .await?;

    let report = project.config.layout.report_path(profile);
    if !dry_run {
        write_file(&project.root.join(&report), &xml.stdout)?;
    }
    tracing::info!(report = %report.display(), "Wrote coverage report");
    Ok(report)
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| Error::file_write(path, e))
}
