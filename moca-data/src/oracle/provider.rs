//! HTTP-based `EmbeddingOracle`.
//!
//! [`HttpEmbeddingOracle`] posts each tag to an embedding service and
//! returns the vector it answers with. The [`EmbeddingOracle`] trait is
//! synchronous, so the async request is driven on an owned Tokio runtime.

use std::time::Duration;

use moca_core::{EmbeddingOracle, OracleError};

use super::wire::{EmbedRequest, EmbedResponse};
use crate::DEFAULT_USER_AGENT;
use crate::http::{BlockingClient, ClientBuildError, join_url};

/// Model used to build the reference embeddings.
pub const DEFAULT_MODEL: &str = "intfloat/multilingual-e5-small";

/// Default embedding service address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Path of the embedding endpoint below the base URL.
const EMBED_PATH: &str = "api/embed";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpEmbeddingOracle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEmbeddingOracleConfig {
    /// Base URL of the embedding service.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpEmbeddingOracleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpEmbeddingOracleConfig {
    /// Create a configuration for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
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

/// Embedding oracle backed by an HTTP service.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the oracle drives requests on its own
/// runtime. Inside a multi-threaded runtime it borrows the caller's handle
/// through `block_in_place`. Inside a `current_thread` runtime it falls
/// back to its own runtime and blocks the caller until the request ends.
///
/// # Errors
///
/// Timeouts map to [`OracleError::Timeout`], transport failures to
/// [`OracleError::Network`], non-success statuses to [`OracleError::Http`]
/// and undecodable bodies to [`OracleError::Parse`].
#[derive(Debug)]
pub struct HttpEmbeddingOracle {
    http: BlockingClient,
    config: HttpEmbeddingOracleConfig,
    endpoint: String,
}

impl HttpEmbeddingOracle {
    /// Create an oracle for the service at `base_url` with default settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(HttpEmbeddingOracleConfig::new(base_url))
    }

    /// Create an oracle with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpEmbeddingOracleConfig) -> Result<Self, ClientBuildError> {
        let http = BlockingClient::new(&config.user_agent, config.timeout)?;
        let endpoint = join_url(&config.base_url, EMBED_PATH);
        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    /// Full URL requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpEmbeddingOracleConfig {
        &self.config
    }

    async fn embed_async(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        let request = EmbedRequest {
            model: &self.config.model,
            input: [text],
        };
        let response = self
            .http
            .client()
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err))?;

        let body: EmbedResponse = response.json().await.map_err(|err| {
            if err.is_decode() {
                OracleError::Parse {
                    message: err.to_string(),
                }
            } else {
                self.convert_reqwest_error(&err)
            }
        })?;
        body.into_single()
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> OracleError {
        if error.is_timeout() {
            return OracleError::Timeout {
                endpoint: self.endpoint.clone(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return OracleError::Http {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        OracleError::Network {
            endpoint: self.endpoint.clone(),
            message: error.to_string(),
        }
    }
}

impl EmbeddingOracle for HttpEmbeddingOracle {
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        self.http.block_on(self.embed_async(text))
    }
}
