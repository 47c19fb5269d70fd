//! Download the points table once and cache it on disk.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use moca_core::PointsTable;
use thiserror::Error;

use super::load::{PointsLoadError, load_points};
use crate::DEFAULT_USER_AGENT;
use crate::http::{BlockingClient, ClientBuildError};

/// Service the points table is downloaded from when no endpoint is configured.
pub const DEFAULT_POINTS_ENDPOINT: &str = "https://moca-jet.vercel.app/api/stops";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors raised while fetching or caching the points table.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("{url} answered with HTTP {status}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The request failed before a response arrived.
    #[error("request to {url} failed: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The cache file could not be written.
    #[error("failed to write points cache {path}")]
    Cache {
        /// Cache path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The cached table could not be loaded.
    #[error(transparent)]
    Load(#[from] PointsLoadError),
}

/// A remote origin for the points CSV.
pub trait PointsSource: Send + Sync {
    /// Fetch the full CSV body.
    ///
    /// # Errors
    /// Returns [`FetchError`] when the body cannot be retrieved.
    fn fetch(&self) -> Result<String, FetchError>;
}

/// Configuration for [`HttpPointsSource`].
#[derive(Debug, Clone)]
pub struct HttpPointsSourceConfig {
    /// URL returning the points CSV.
    pub url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl HttpPointsSourceConfig {
    /// Create a configuration for `url` with default timeout and agent.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches the points CSV with an HTTP `GET`.
#[derive(Debug)]
pub struct HttpPointsSource {
    http: BlockingClient,
    config: HttpPointsSourceConfig,
}

impl HttpPointsSource {
    /// Create a source for `url` with default settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(HttpPointsSourceConfig::new(url))
    }

    /// Create a source with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpPointsSourceConfig) -> Result<Self, ClientBuildError> {
        let http = BlockingClient::new(&config.user_agent, config.timeout)?;
        Ok(Self { http, config })
    }

    async fn fetch_async(&self) -> Result<String, FetchError> {
        let url = &self.config.url;
        let response = self
            .http
            .client()
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.clone(),
                status: status.as_u16(),
            });
        }
        response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> FetchError {
        let url = self.config.url.clone();
        if error.is_timeout() {
            return FetchError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return FetchError::Http {
                url,
                status: status.as_u16(),
            };
        }
        FetchError::Network {
            url,
            message: error.to_string(),
        }
    }
}

impl PointsSource for HttpPointsSource {
    fn fetch(&self) -> Result<String, FetchError> {
        self.http.block_on(self.fetch_async())
    }
}

/// Load the points table from `cache`, fetching it from `source` first
/// when the cache file does not exist.
///
/// # Errors
/// Returns [`FetchError`] when the download fails, the cache cannot be
/// written, or the cached CSV is invalid.
pub fn fetch_or_load_points(
    cache: &Utf8Path,
    source: &dyn PointsSource,
) -> Result<PointsTable, FetchError> {
    let cache_error = |err| FetchError::Cache {
        path: cache.to_path_buf(),
        source: err,
    };
    if !moca_fs::file_exists(cache).map_err(cache_error)? {
        info!("no points cache at {cache}; fetching");
        let body = source.fetch()?;
        moca_fs::write_file(cache, body.as_bytes()).map_err(cache_error)?;
        info!("cached {} bytes of points data at {cache}", body.len());
    }
    Ok(load_points(cache)?)
}
