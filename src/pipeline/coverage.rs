//! Coverage runs: profile both test passes, merge, convert to XML, summarize

use std::path::{Path, PathBuf};

use super::{convert_profile, run_pass, write_file, Pass, Project, MERGE_STEP, SUMMARY_STEP};
use crate::common::paths::normalize;
use crate::common::{Error, Result};
use crate::exec::{Invocation, ProcessRunner};

/// Files produced by a coverage run, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    /// Raw profiles that were merged
    pub profiles: Vec<PathBuf>,
    /// Merged profile
    pub combined: PathBuf,
    /// XML reports, one per test pass followed by the combined one
    pub reports: Vec<PathBuf>,
    /// Per-function summary of the merged profile, if the summary tool succeeded
    pub summary: Option<String>,
}

/// Run both test passes with profiling and build the merged reports
///
/// The integration pass is skipped when the integration directory does not
/// exist. A failing summary tool is logged and leaves `summary` empty; every
/// other failure aborts the run.
pub async fn run_coverage(project: &Project, runner: &dyn ProcessRunner) -> Result<CoverageReport> {
    let layout = &project.config.layout;
    let dry_run = runner.is_dry_run();
    project.prepare(runner)?;

    let mut reports = vec![run_pass(project, runner, Pass::Unit).await?.report];
    let integration = project.has_integration_tests();
    if integration {
        reports.push(run_pass(project, runner, Pass::Integration).await?.report);
    } else {
        tracing::info!(
            dir = %layout.integration_dir.display(),
            "No integration test directory, skipping integration tests"
        );
    }

    let mut profiles = find_profiles(project)?;
    if profiles.is_empty() {
        if !dry_run {
            return Err(Error::NoProfiles(layout.profile_glob()));
        }
        profiles.push(layout.unit_profile());
        if integration {
            profiles.push(layout.integration_profile());
        }
    }
    tracing::debug!(?profiles, "Found coverage profiles");

    let combined = layout.combined_profile();
    let merge_args: Vec<String> = profiles
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let merged = runner
        .run(
            &Invocation::new(MERGE_STEP, &project.config.tools.merge, merge_args)
                .in_dir(&project.root),
        )
        .await?;
    if !dry_run {
        write_file(&project.root.join(&combined), &merged.stdout)?;
    }

    reports.push(convert_profile(project, runner, &combined).await?);
    let summary = summarize(project, runner, &combined).await;

    Ok(CoverageReport {
        profiles,
        combined,
        reports,
        summary,
    })
}

/// Raw profiles in the coverage directory, sorted, without the combined one
///
/// A combined profile left over from an earlier run also matches the glob;
/// merging it again would count every block twice.
fn find_profiles(project: &Project) -> Result<Vec<PathBuf>> {
    let layout = &project.config.layout;
    let combined = normalize(&layout.combined_profile());

    let mut profiles = Vec::new();
    for entry in glob::glob(&layout.profile_pattern(&project.root))? {
        let path = entry.map_err(glob::GlobError::into_error)?;
        let relative = normalize(path.strip_prefix(&project.root).unwrap_or(path.as_path()));
        if relative != combined {
            profiles.push(relative);
        }
    }
    profiles.sort();
    Ok(profiles)
}

async fn summarize(project: &Project, runner: &dyn ProcessRunner, combined: &Path) -> Option<String> {
    let invocation = Invocation::new(
        SUMMARY_STEP,
        &project.config.tools.summary,
        [combined.to_string_lossy().into_owned()],
    )
    .in_dir(&project.root);

    match runner.run(&invocation).await {
        Ok(output) => Some(output.combined_lossy()).filter(|s| !s.trim().is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, "Coverage summary failed");
            None
        }
    }
}
