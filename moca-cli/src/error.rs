//! Error types emitted by the Moca CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use moca_data::{ClientBuildError, FetchError, TableWriteError, TaxonomyLoadError};
use moca_demand::{DemandWriteError, SimulationError};
use moca_scorer::{CacheFileError, OptionsError};
use thiserror::Error;

/// Errors emitted by the Moca CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Enrichment settings were rejected.
    #[error("invalid enrichment settings: {0}")]
    InvalidOptions(#[from] OptionsError),
    /// Building an HTTP client failed.
    #[error("failed to build HTTP client for {url:?}: {source}")]
    BuildClient {
        /// Service the client would talk to.
        url: String,
        /// Underlying build error.
        #[source]
        source: ClientBuildError,
    },
    /// Loading the reference taxonomy failed.
    #[error("failed to load taxonomy: {0}")]
    Taxonomy(#[from] TaxonomyLoadError),
    /// Fetching or loading the points table failed.
    #[error("failed to acquire points: {0}")]
    Points(#[from] FetchError),
    /// Reading or writing the persisted embedding cache failed.
    #[error("embedding cache error: {0}")]
    EmbeddingCache(#[from] CacheFileError),
    /// Writing the enriched table failed.
    #[error("failed to write enriched table: {0}")]
    WriteTable(#[from] TableWriteError),
    /// Demand simulation failed.
    #[error("demand simulation failed: {0}")]
    Simulation(#[from] SimulationError),
    /// Writing the demand table failed.
    #[error("failed to write demand table: {0}")]
    WriteDemand(#[from] DemandWriteError),
    /// Writing the command summary failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
