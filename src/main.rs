//! covwrap - test runner and coverage report wrapper
//!
//! Runs the unit and integration test suites and turns their coverage
//! profiles into merged XML reports using external tools.

use std::path::PathBuf;

use clap::Parser;
use covwrap::cli::{self, GlobalOptions};
use covwrap::common::logging;
use covwrap::commands::Commands;

#[derive(Parser)]
#[command(name = "covwrap", about = "Test and coverage report wrapper")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ./covwrap.toml, then the user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project root the tools run in
    #[arg(long, short = 'C', global = true, default_value = ".")]
    dir: PathBuf,

    /// Print the commands that would run without running them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.verbose);

    let opts = GlobalOptions {
        config: cli.config,
        dir: cli.dir,
        dry_run: cli.dry_run,
    };

    if let Err(e) = cli::dispatch(cli.command, opts).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
