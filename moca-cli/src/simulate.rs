//! Simulate-demand command implementation for the Moca CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::Parser;
use moca_demand::{DemandSummary, SimulationConfig, simulate, write_demand_csv};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_END, ARG_OUTPUT, ARG_SEED, ARG_START, CliError};

/// Demand table written when no path is given.
pub(crate) const DEFAULT_DEMAND_PATH: &str = "data/dummy.csv";

/// CLI arguments for the `simulate-demand` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "simulate-demand",
    long_about = "Generate a reproducible synthetic booking table with \
                 calendar, weather and lagged demand features for each day \
                 and time slot, then print summary statistics.",
    about = "Generate synthetic demand data"
)]
#[ortho_config(prefix = "MOCA")]
pub(crate) struct SimulateArgs {
    /// Destination for the demand CSV.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Random seed.
    #[arg(long = ARG_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// First simulated date (YYYY-MM-DD).
    #[arg(long = ARG_START, value_name = "date")]
    #[serde(default)]
    pub(crate) start: Option<NaiveDate>,
    /// Last simulated date (YYYY-MM-DD), inclusive.
    #[arg(long = ARG_END, value_name = "date")]
    #[serde(default)]
    pub(crate) end: Option<NaiveDate>,
}

impl SimulateArgs {
    pub(crate) fn into_config(self) -> Result<SimulateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(SimulateConfig::from(merged))
    }
}

/// Resolved `simulate-demand` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SimulateConfig {
    /// Demand CSV destination.
    pub(crate) output: Utf8PathBuf,
    /// Date range and seed.
    pub(crate) simulation: SimulationConfig,
}

impl From<SimulateArgs> for SimulateConfig {
    fn from(args: SimulateArgs) -> Self {
        let mut simulation = SimulationConfig::default();
        if let Some(start) = args.start {
            simulation = simulation.with_start(start);
        }
        if let Some(end) = args.end {
            simulation = simulation.with_end(end);
        }
        if let Some(seed) = args.seed {
            simulation = simulation.with_seed(seed);
        }
        Self {
            output: args
                .output
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DEMAND_PATH)),
            simulation,
        }
    }
}

pub(crate) fn run_simulate_with(args: SimulateArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let records = simulate(&config.simulation)?;
    write_demand_csv(&config.output, &records)?;
    let summary = DemandSummary::from_records(&records);
    writeln!(writer, "{summary}").map_err(CliError::WriteOutput)?;
    writeln!(writer, "wrote {}", config.output).map_err(CliError::WriteOutput)
}
