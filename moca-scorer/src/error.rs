//! Error types raised while enriching stops.
#![forbid(unsafe_code)]

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors from [`crate::ScoreAccumulator::finish`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// No tags were accumulated, so there is nothing to average.
    #[error("cannot aggregate a stop without tags")]
    NoTags,
}

/// Invalid enrichment settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// The neighbour count must be at least one.
    #[error("neighbour count must be at least 1")]
    ZeroNeighbours,
    /// The retry policy must allow at least one attempt.
    #[error("oracle attempts must be at least 1")]
    ZeroAttempts,
}

/// Errors raised while reading or writing a persisted embedding cache.
#[derive(Debug, Error)]
pub enum CacheFileError {
    /// Creating the parent directory for the cache file failed.
    #[error("failed to create parent directory for {path}")]
    CreateParent {
        /// Cache file path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Opening or creating the cache file failed.
    #[error("failed to open embedding cache at {path}")]
    Open {
        /// Cache file path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Serialising the cache to `bincode` failed.
    #[error("failed to serialise embedding cache into {path}")]
    Serialise {
        /// Cache file path.
        path: Utf8PathBuf,
        /// Source error from `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// Deserialising the cache from `bincode` failed.
    #[error("failed to deserialise embedding cache from {path}")]
    Deserialise {
        /// Cache file path.
        path: Utf8PathBuf,
        /// Source error from `bincode`.
        #[source]
        source: bincode::Error,
    },
    /// The file does not start with the cache magic bytes.
    #[error("{path} is not an embedding cache file")]
    BadMagic {
        /// Cache file path.
        path: Utf8PathBuf,
    },
    /// The file was written by an incompatible format version.
    #[error("embedding cache {path} has unsupported version {found}")]
    UnsupportedVersion {
        /// Cache file path.
        path: Utf8PathBuf,
        /// Version recorded in the file.
        found: u32,
    },
}
