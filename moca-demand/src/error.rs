//! Error types for the demand generator.

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while simulating demand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The end date precedes the start date.
    #[error("simulation ends on {end}, before it starts on {start}")]
    InvalidRange {
        /// First simulated date.
        start: NaiveDate,
        /// Last simulated date.
        end: NaiveDate,
    },
    /// A probability distribution rejected its parameters.
    #[error("invalid distribution parameters: {message}")]
    Distribution {
        /// Detail from `rand_distr`.
        message: String,
    },
}

/// Errors raised while writing demand records.
#[derive(Debug, Error)]
pub enum DemandWriteError {
    /// The output file could not be created.
    #[error("failed to create demand table {path}")]
    Create {
        /// Output path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The byte-order mark or buffered output could not be written.
    #[error("failed to write demand CSV")]
    Io {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A record could not be serialised.
    #[error("failed to serialise demand record")]
    Csv {
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
}
