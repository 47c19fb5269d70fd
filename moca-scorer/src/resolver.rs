//! Resolve free-text tags against the reference taxonomy.
//!
//! A tag that names a reference row exactly resolves to that row. Any
//! other tag is embedded through the oracle and compared with every row by
//! cosine similarity; the nearest rows become a [`Resolution::Fallback`].

use std::cmp::Ordering;
use std::num::NonZeroUsize;

use log::debug;
use moca_core::{EmbeddingOracle, OracleError, ReferenceTag, Taxonomy, cosine_similarity};

/// Default number of nearest reference rows used for an unknown tag.
pub const DEFAULT_NEIGHBOURS: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(count) => count,
    None => NonZeroUsize::MIN,
};

/// A reference row paired with its similarity to an unknown tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityMatch<'t> {
    /// Matched reference row.
    pub tag: &'t ReferenceTag,
    /// Cosine similarity in `[-1, 1]`; `0.0` when undefined.
    pub similarity: f64,
}

/// Outcome of resolving a single tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'t> {
    /// The tag names a reference row exactly.
    Exact(&'t ReferenceTag),
    /// The nearest rows by similarity, best first.
    Fallback(Vec<SimilarityMatch<'t>>),
}

/// Resolves tags by exact lookup with a similarity fallback.
pub struct TagResolver<'a> {
    taxonomy: &'a Taxonomy,
    oracle: &'a dyn EmbeddingOracle,
    neighbours: NonZeroUsize,
}

impl std::fmt::Debug for TagResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagResolver")
            .field("taxonomy_len", &self.taxonomy.len())
            .field("oracle", &"<dyn EmbeddingOracle>")
            .field("neighbours", &self.neighbours)
            .finish()
    }
}

impl<'a> TagResolver<'a> {
    /// Create a resolver keeping `neighbours` rows for unknown tags.
    pub const fn new(
        taxonomy: &'a Taxonomy,
        oracle: &'a dyn EmbeddingOracle,
        neighbours: NonZeroUsize,
    ) -> Self {
        Self {
            taxonomy,
            oracle,
            neighbours,
        }
    }

    /// Resolve `tag`.
    ///
    /// The oracle is only consulted when no row matches exactly.
    ///
    /// # Errors
    /// Propagates [`OracleError`] from the oracle, and reports
    /// [`OracleError::EmptyVector`] or [`OracleError::DimensionMismatch`]
    /// when the returned vector cannot be compared with the taxonomy.
    pub fn resolve(&self, tag: &str) -> Result<Resolution<'a>, OracleError> {
        if let Some(row) = self.taxonomy.get(tag) {
            debug!("tag '{tag}' matched reference row exactly");
            return Ok(Resolution::Exact(row));
        }

        let query = self.oracle.embed(tag)?;
        if query.is_empty() {
            return Err(OracleError::EmptyVector);
        }
        if query.len() != self.taxonomy.dimension() {
            return Err(OracleError::DimensionMismatch {
                expected: self.taxonomy.dimension(),
                found: query.len(),
            });
        }

        let matches = nearest_neighbours(self.taxonomy, &query, self.neighbours.get());
        if let Some(best) = matches.first() {
            debug!(
                "tag '{tag}' fell back to '{}' (similarity {:.4})",
                best.tag.name, best.similarity
            );
        }
        Ok(Resolution::Fallback(matches))
    }
}

/// Rank taxonomy rows by similarity to `query`, keeping the best `k`.
///
/// Equal similarities keep taxonomy order. When the taxonomy has fewer than
/// `k` rows every row is returned.
#[must_use]
pub fn nearest_neighbours<'t>(
    taxonomy: &'t Taxonomy,
    query: &[f32],
    k: usize,
) -> Vec<SimilarityMatch<'t>> {
    let similarities: Vec<f64> = taxonomy
        .iter()
        .map(|row| cosine_similarity(query, &row.embedding))
        .collect();
    top_k_indices(&similarities, k)
        .into_iter()
        .filter_map(|index| {
            let tag = taxonomy.tags().get(index)?;
            let similarity = similarities.get(index).copied()?;
            Some(SimilarityMatch { tag, similarity })
        })
        .collect()
}

/// Indices of the `k` largest values, largest first.
///
/// The sort is stable so equal values keep their input order. Non-finite
/// values rank as `0.0`.
#[must_use]
pub fn top_k_indices(values: &[f64], k: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = values
        .iter()
        .map(|&value| if value.is_finite() { value } else { 0.0 })
        .enumerate()
        .collect();
    ranked.sort_by(|left, right| right.1.partial_cmp(&left.1).unwrap_or(Ordering::Equal));
    ranked.truncate(k);
    ranked.into_iter().map(|(index, _)| index).collect()
}
