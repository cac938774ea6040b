//! CLI command definitions
//!
//! Defines the clap commands for covwrap.

use clap::Subcommand;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the unit tests, optionally preceded by the integration tests
    Test {
        /// Also run the integration test suite
        #[arg(long, short)]
        integration: bool,
    },

    /// Run both test suites with profiling and build merged XML coverage reports
    #[command(alias = "cov")]
    Coverage,

    /// Check that the configured external tools can be found
    Tools {
        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}
