//! Deterministic oracles and taxonomy builders for unit and behaviour tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Category, CategoryScores, EmbeddingOracle, OracleError, ReferenceTag, Taxonomy, TaxonomyError};

/// Endpoint label reported by the doubles in this module.
pub const STUB_ENDPOINT: &str = "stub://oracle";

/// Oracle answering from a fixed text-to-vector table.
///
/// Unknown text yields a non-retryable HTTP 404 unless a default vector
/// has been configured.
#[derive(Debug, Clone, Default)]
pub struct StubOracle {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
    default: Option<Vec<f32>>,
}

impl StubOracle {
    /// Create an empty stub producing `dimension`-length vectors.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
            default: None,
        }
    }

    /// Register the vector returned for `text`.
    #[must_use]
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    /// Return `vector` for any unregistered text.
    #[must_use]
    pub fn with_default(mut self, vector: Vec<f32>) -> Self {
        self.default = Some(vector);
        self
    }

    /// Dimensionality this stub was created with.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }
}

impl EmbeddingOracle for StubOracle {
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        self.vectors
            .get(text)
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| OracleError::Http {
                endpoint: STUB_ENDPOINT.to_owned(),
                status: 404,
                message: format!("no stub vector for '{text}'"),
            })
    }
}

/// Oracle that always fails with the configured error.
#[derive(Debug, Clone)]
pub struct FailingOracle {
    error: OracleError,
}

impl FailingOracle {
    /// Fail every call with `error`.
    #[must_use]
    pub const fn new(error: OracleError) -> Self {
        Self { error }
    }

    /// Fail every call with a retryable timeout.
    #[must_use]
    pub fn timing_out() -> Self {
        Self::new(OracleError::Timeout {
            endpoint: STUB_ENDPOINT.to_owned(),
            timeout_secs: 1,
        })
    }
}

impl EmbeddingOracle for FailingOracle {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, OracleError> {
        Err(self.error.clone())
    }
}

/// Oracle that fails a fixed number of times before delegating.
#[derive(Debug)]
pub struct FlakyOracle<O> {
    inner: O,
    remaining_failures: AtomicUsize,
    error: OracleError,
}

impl<O> FlakyOracle<O> {
    /// Fail the first `failures` calls with `error`, then delegate to `inner`.
    pub const fn new(inner: O, failures: usize, error: OracleError) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(failures),
            error,
        }
    }
}

impl<O: EmbeddingOracle> EmbeddingOracle for FlakyOracle<O> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(self.error.clone());
        }
        self.inner.embed(text)
    }
}

/// Oracle wrapper recording how often each text was embedded.
///
/// Clones share their counters, so a test can keep one handle while the
/// code under test owns another.
#[derive(Debug, Clone)]
pub struct CountingOracle<O> {
    inner: O,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl<O> CountingOracle<O> {
    /// Wrap `inner`.
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Total number of calls across all texts.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    /// Number of calls made for `text`.
    #[must_use]
    pub fn calls_for(&self, text: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(text)
            .copied()
            .unwrap_or_default()
    }
}

impl<O: EmbeddingOracle> EmbeddingOracle for CountingOracle<O> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            *calls.entry(text.to_owned()).or_default() += 1;
        }
        self.inner.embed(text)
    }
}

/// Build a reference tag whose unlisted categories score zero.
#[must_use]
pub fn reference_tag(
    name: &str,
    stop_type: &str,
    embedding: Vec<f32>,
    scores: &[(Category, f64)],
) -> ReferenceTag {
    let mut category_scores = CategoryScores::zero();
    for &(category, value) in scores {
        category_scores.set(category, value);
    }
    ReferenceTag::new(name, category_scores, stop_type, embedding)
}

/// Build a reference tag with every category set to `value`.
#[must_use]
pub fn uniform_tag(name: &str, stop_type: &str, embedding: Vec<f32>, value: f64) -> ReferenceTag {
    ReferenceTag::new(
        name,
        CategoryScores::from_array([value; crate::CATEGORY_COUNT]),
        stop_type,
        embedding,
    )
}

/// Taxonomy of `count` tags named `tag-0`, `tag-1`, ... with one-hot
/// embeddings and uniform scores equal to their index.
///
/// # Errors
/// Returns [`TaxonomyError::Empty`] when `count` is zero.
pub fn one_hot_taxonomy(count: usize) -> Result<Taxonomy, TaxonomyError> {
    let tags = (0..count)
        .map(|index| {
            let embedding = (0..count)
                .map(|axis| if axis == index { 1.0 } else { 0.0 })
                .collect();
            let value = f64::from(u32::try_from(index).unwrap_or(u32::MAX));
            uniform_tag(&format!("tag-{index}"), &format!("type-{index}"), embedding, value)
        })
        .collect();
    Taxonomy::new(tags)
}
