//! Command-line interface for Moca's offline tooling.
//!
//! Two subcommands are provided:
//! - `enrich` scores every bus stop in a points table against the
//!   reference taxonomy and writes the expanded table.
//! - `simulate-demand` generates a synthetic booking table for forecasting
//!   experiments.
//!
//! Options layer configuration files, `MOCA_*` environment variables and
//! command-line flags through `ortho_config`.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use clap::{Parser, Subcommand};

mod enrich;
mod error;
mod simulate;

pub use error::CliError;

use enrich::{DefaultEnrichServices, EnrichArgs, run_enrich_with};
use simulate::{SimulateArgs, run_simulate_with};

const ARG_POINTS: &str = "points";
const ARG_POINTS_ENDPOINT: &str = "points-endpoint";
const ARG_TAXONOMY: &str = "taxonomy";
const ARG_OUTPUT: &str = "output";
const ARG_ORACLE_URL: &str = "oracle-url";
const ARG_ORACLE_MODEL: &str = "oracle-model";
const ARG_ORACLE_TIMEOUT_SECS: &str = "oracle-timeout-secs";
const ARG_NEIGHBOURS: &str = "neighbours";
const ARG_MAX_ATTEMPTS: &str = "max-attempts";
const ARG_EMBEDDING_CACHE: &str = "embedding-cache";
const ARG_SEED: &str = "seed";
const ARG_START: &str = "start";
const ARG_END: &str = "end";

/// Run the Moca CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments are invalid or the command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Enrich(args) => run_enrich_with(args, &DefaultEnrichServices, &mut stdout),
        Command::SimulateDemand(args) => run_simulate_with(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "moca",
    about = "Offline data preparation utilities for the Moca on-demand bus engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score bus stops from their tags and write the expanded table.
    Enrich(EnrichArgs),
    /// Generate a synthetic demand table.
    SimulateDemand(SimulateArgs),
}

/// Check that `path` names an existing file.
fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match moca_fs::file_exists(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
