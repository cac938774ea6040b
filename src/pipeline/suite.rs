//! Plain test suite runs

use super::{run_pass, Pass, Project};
use crate::common::Result;
use crate::exec::ProcessRunner;

/// Run the test suite and return the combined runner output
///
/// The integration pass runs first, and only when requested and the
/// integration directory exists. The unit pass always runs. Each pass leaves
/// a profile and its XML report in the coverage directory; the first failure
/// aborts the run.
pub async fn run_tests(
    project: &Project,
    runner: &dyn ProcessRunner,
    integration: bool,
) -> Result<String> {
    project.prepare(runner)?;
    let mut combined = String::new();

    if integration {
        if project.has_integration_tests() {
            let pass = run_pass(project, runner, Pass::Integration).await?;
            combined.push_str(&pass.output);
        } else {
            tracing::info!(
                dir = %project.config.layout.integration_dir.display(),
                "No integration test directory, skipping integration tests"
            );
        }
    }

    let pass = run_pass(project, runner, Pass::Unit).await?;
    combined.push_str(&pass.output);

    Ok(combined)
}
