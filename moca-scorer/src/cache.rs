//! Run-scoped memoisation of embedding lookups.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use moca_core::{EmbeddingOracle, OracleError};

/// Oracle wrapper that embeds each distinct text at most once.
///
/// Only successful results are cached, so a failed tag is retried the next
/// time a stop mentions it. The map sits behind a [`Mutex`] so the wrapper
/// keeps the `&self` signature of [`EmbeddingOracle`].
///
/// # Examples
/// ```
/// use moca_core::EmbeddingOracle;
/// use moca_core::test_support::{CountingOracle, StubOracle};
/// use moca_scorer::CachingOracle;
///
/// let counting = CountingOracle::new(StubOracle::new(1).with_default(vec![1.0]));
/// let cache = CachingOracle::new(counting.clone());
/// cache.embed("tram")?;
/// cache.embed("tram")?;
/// assert_eq!(counting.calls_for("tram"), 1);
/// # Ok::<(), moca_core::OracleError>(())
/// ```
#[derive(Debug)]
pub struct CachingOracle<O> {
    inner: O,
    entries: Mutex<HashMap<String, Arc<[f32]>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<O> CachingOracle<O> {
    /// Wrap `inner` with an empty cache.
    pub fn new(inner: O) -> Self {
        Self::with_entries(inner, HashMap::new())
    }

    /// Wrap `inner` with a cache seeded from a previous run.
    pub fn with_entries(inner: O, entries: HashMap<String, Vec<f32>>) -> Self {
        let seeded = entries
            .into_iter()
            .map(|(text, vector)| (text, Arc::from(vector)))
            .collect();
        Self {
            inner,
            entries: Mutex::new(seeded),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Copy of every cached vector, ordered by text.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Vec<f32>> {
        self.lock()
            .iter()
            .map(|(text, vector)| (text.clone(), vector.to_vec()))
            .collect()
    }

    /// Number of cached texts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Report whether nothing has been cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Lookups answered from the cache.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups forwarded to the wrapped oracle.
    #[must_use]
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<[f32]>>> {
        // Entries are inserted whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<O: EmbeddingOracle> EmbeddingOracle for CachingOracle<O> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        let cached = self.lock().get(text).cloned();
        if let Some(vector) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("embedding cache hit for '{text}'");
            return Ok(vector.to_vec());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let vector = self.inner.embed(text)?;
        self.lock()
            .insert(text.to_owned(), Arc::from(vector.as_slice()));
        Ok(vector)
    }
}
