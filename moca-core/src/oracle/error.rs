use thiserror::Error;

/// Errors from [`crate::oracle::EmbeddingOracle::embed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The request did not complete within the configured timeout.
    #[error("embedding request to {endpoint} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint that was called.
        endpoint: String,
        /// Timeout in whole seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("embedding service at {endpoint} returned HTTP {status}: {message}")]
    Http {
        /// Endpoint that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Error detail from the client.
        message: String,
    },
    /// The connection could not be established or was interrupted.
    #[error("network error calling {endpoint}: {message}")]
    Network {
        /// Endpoint that was called.
        endpoint: String,
        /// Error detail from the client.
        message: String,
    },
    /// The response body was not a valid embedding payload.
    #[error("failed to parse embedding response: {message}")]
    Parse {
        /// Parser detail.
        message: String,
    },
    /// The oracle returned a vector with no components.
    #[error("embedding oracle returned an empty vector")]
    EmptyVector,
    /// The vector's length differs from the taxonomy's embeddings.
    #[error("embedding has {found} dimensions, expected {expected}")]
    DimensionMismatch {
        /// Dimensionality of the reference taxonomy.
        expected: usize,
        /// Dimensionality returned by the oracle.
        found: usize,
    },
}

impl OracleError {
    /// Report whether retrying the same request may succeed.
    ///
    /// Timeouts, connection failures and server-side (5xx) statuses are
    /// transient. Client errors and malformed payloads are not.
    ///
    /// # Examples
    /// ```
    /// use moca_core::OracleError;
    ///
    /// let timeout = OracleError::Timeout { endpoint: "http://oracle".into(), timeout_secs: 5 };
    /// assert!(timeout.is_retryable());
    /// assert!(!OracleError::EmptyVector.is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Parse { .. } | Self::EmptyVector | Self::DimensionMismatch { .. } => false,
        }
    }
}
