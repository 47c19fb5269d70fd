//! Turn free text into embedding vectors.
//!
//! The [`EmbeddingOracle`] trait abstracts the model that maps a tag to a
//! fixed-length vector. The resolver only consults it for tags that are
//! absent from the reference taxonomy, and callers pass it in explicitly so
//! tests can substitute a deterministic stub.
//!
//! Errors distinguish transient failures, which a retry may cure, from
//! permanent ones via [`OracleError::is_retryable`].

mod error;
mod provider;

pub use error::OracleError;
pub use provider::EmbeddingOracle;
