//! CLI command handling
//!
//! Loads the project configuration, dispatches commands and formats output.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::exec::{DryRunRunner, ProcessRunner, SystemRunner};
use crate::pipeline::{self, CoverageReport, Project};
use crate::tools;

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Explicit configuration file
    pub config: Option<PathBuf>,
    /// Project root
    pub dir: PathBuf,
    /// Print invocations instead of running them
    pub dry_run: bool,
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, opts: GlobalOptions) -> Result<()> {
    let project = load_project(&opts)?;
    let runner: Box<dyn ProcessRunner> = if opts.dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(SystemRunner)
    };

    match command {
        Commands::Test { integration } => {
            let output = pipeline::run_tests(&project, runner.as_ref(), integration).await?;
            print!("{output}");
            Ok(())
        }

        Commands::Coverage => {
            let report = pipeline::run_coverage(&project, runner.as_ref()).await?;
            print_coverage_report(&report, opts.dry_run);
            Ok(())
        }

        Commands::Tools { json } => {
            let statuses = tools::check(&project.config, &project.root);

            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                println!("Coverage tools:");
                for status in &statuses {
                    match &status.path {
                        Some(path) => println!(
                            "  {} {:8} {}",
                            "✓".green(),
                            status.role,
                            path.display().to_string().dimmed()
                        ),
                        None => println!(
                            "  {} {:8} {} {}",
                            "✗".red(),
                            status.role,
                            status.program,
                            "(not found)".red()
                        ),
                    }
                }
            }

            match statuses.iter().find(|s| !s.found) {
                Some(missing) => Err(Error::ToolNotFound {
                    name: missing.role.clone(),
                    program: missing.program.clone(),
                }),
                None => Ok(()),
            }
        }

        Commands::Config => {
            print!("{}", project.config.to_toml()?);
            Ok(())
        }
    }
}

fn load_project(opts: &GlobalOptions) -> Result<Project> {
    let root = if opts.dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        opts.dir.as_path()
    };
    if !root.is_dir() {
        return Err(Error::Config(format!(
            "Project directory '{}' does not exist",
            root.display()
        )));
    }

    let config = Config::load(opts.config.as_deref(), root)?;
    tracing::debug!(root = %root.display(), "Loaded project configuration");
    Ok(Project::new(root, config))
}

fn print_coverage_report(report: &CoverageReport, dry_run: bool) {
    let heading = if dry_run {
        "Coverage plan:"
    } else {
        "Coverage reports:"
    };
    println!("\n{}", heading.blue().bold());
    for profile in &report.profiles {
        println!("  {} {}", "profile ".dimmed(), profile.display());
    }
    println!("  {} {}", "combined".dimmed(), report.combined.display());
    for path in &report.reports {
        println!("  {} {}", "report  ".dimmed(), path.display().to_string().green());
    }

    if let Some(summary) = &report.summary {
        println!("\n{}", "Coverage summary:".blue().bold());
        print!("{summary}");
        if !summary.ends_with('\n') {
            println!();
        }
    }
}
