//! Embedding oracle trait and forwarding implementations.

use std::sync::Arc;

use super::error::OracleError;

/// Map a piece of text to an embedding vector.
///
/// Implementations must be deterministic for identical input and return
/// vectors of the same dimensionality as the reference taxonomy. They must
/// be thread-safe (`Send` + `Sync`) so one oracle can be shared by a cache
/// and a retry wrapper.
///
/// # Examples
///
/// ```rust
/// use moca_core::{EmbeddingOracle, OracleError};
///
/// struct LengthOracle;
///
/// impl EmbeddingOracle for LengthOracle {
///     fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
///         Ok(vec![1.0, f32::from(u8::try_from(text.len()).unwrap_or(u8::MAX))])
///     }
/// }
///
/// let vector = LengthOracle.embed("park")?;
/// assert_eq!(vector, vec![1.0, 4.0]);
/// # Ok::<(), OracleError>(())
/// ```
pub trait EmbeddingOracle: Send + Sync {
    /// Return the embedding of `text`.
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError>;
}

impl<T: EmbeddingOracle + ?Sized> EmbeddingOracle for &T {
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        (**self).embed(text)
    }
}

impl<T: EmbeddingOracle + ?Sized> EmbeddingOracle for Box<T> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        (**self).embed(text)
    }
}

impl<T: EmbeddingOracle + ?Sized> EmbeddingOracle for Arc<T> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        (**self).embed(text)
    }
}
