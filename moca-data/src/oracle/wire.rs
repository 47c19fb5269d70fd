//! Request and response bodies of the `/api/embed` endpoint.
//!
//! The request carries the model name and a batch of input texts; the
//! response carries one vector per input, in input order.

use moca_core::OracleError;
use serde::{Deserialize, Serialize};

/// Body posted to `/api/embed`.
#[derive(Debug, Serialize)]
pub struct EmbedRequest<'a> {
    /// Model identifier.
    pub model: &'a str,
    /// Texts to embed; this client always sends exactly one.
    pub input: [&'a str; 1],
}

/// Body returned by `/api/embed`.
#[derive(Debug, Deserialize)]
pub struct EmbedResponse {
    /// One vector per input text.
    pub embeddings: Vec<Vec<f32>>,
}

impl EmbedResponse {
    /// Extract the single vector a one-text request should produce.
    pub fn into_single(self) -> Result<Vec<f32>, OracleError> {
        let count = self.embeddings.len();
        let mut vectors = self.embeddings.into_iter();
        match (vectors.next(), count) {
            (Some(vector), 1) if vector.is_empty() => Err(OracleError::EmptyVector),
            (Some(vector), 1) => Ok(vector),
            _ => Err(OracleError::Parse {
                message: format!("expected one embedding, got {count}"),
            }),
        }
    }
}
