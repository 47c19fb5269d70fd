//! Reference taxonomy of known tags.
//!
//! Each [`ReferenceTag`] carries precomputed category scores, a stop type
//! label and an embedding vector. [`Taxonomy::new`] enforces unique names
//! and a uniform embedding dimensionality so that lookups downstream never
//! need to re-validate rows.

use std::collections::HashMap;

use thiserror::Error;

use crate::CategoryScores;

/// A curated tag with its scores and embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTag {
    /// Unique tag text, matched byte for byte.
    pub name: String,
    /// Scores for each category.
    pub scores: CategoryScores,
    /// Categorical label voted for when this tag is matched.
    pub stop_type: String,
    /// Precomputed embedding of `name`.
    pub embedding: Vec<f32>,
}

impl ReferenceTag {
    /// Construct a reference tag.
    pub fn new(
        name: impl Into<String>,
        scores: CategoryScores,
        stop_type: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            name: name.into(),
            scores,
            stop_type: stop_type.into(),
            embedding,
        }
    }
}

/// Errors returned by [`Taxonomy::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    /// No reference tags were supplied.
    #[error("reference taxonomy must contain at least one tag")]
    Empty,
    /// Two rows share the same name.
    #[error("reference tag '{name}' appears more than once")]
    DuplicateName {
        /// The repeated tag name.
        name: String,
    },
    /// A row carries an empty embedding.
    #[error("reference tag '{name}' has an empty embedding")]
    EmptyEmbedding {
        /// Name of the offending tag.
        name: String,
    },
    /// A row's embedding length differs from the first row's.
    #[error("reference tag '{name}' has {found} embedding dimensions, expected {expected}")]
    DimensionMismatch {
        /// Name of the offending tag.
        name: String,
        /// Dimensionality established by the first row.
        expected: usize,
        /// Dimensionality of the offending row.
        found: usize,
    },
}

/// Read-only table of reference tags with an exact-match index.
///
/// Iteration order is the order rows were supplied in; the fallback
/// ranking relies on it to break similarity ties.
///
/// # Examples
/// ```
/// use moca_core::{CategoryScores, ReferenceTag, Taxonomy};
///
/// # fn main() -> Result<(), moca_core::TaxonomyError> {
/// let taxonomy = Taxonomy::new(vec![ReferenceTag::new(
///     "bakery",
///     CategoryScores::zero(),
///     "commercial",
///     vec![1.0, 0.0],
/// )])?;
/// assert_eq!(taxonomy.dimension(), 2);
/// assert!(taxonomy.get("bakery").is_some());
/// assert!(taxonomy.get("Bakery").is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    tags: Vec<ReferenceTag>,
    by_name: HashMap<String, usize>,
    dimension: usize,
}

impl Taxonomy {
    /// Validate and index a list of reference tags.
    ///
    /// # Errors
    /// Returns [`TaxonomyError`] when the list is empty, a name repeats, or
    /// embeddings are empty or of differing lengths.
    pub fn new(tags: Vec<ReferenceTag>) -> Result<Self, TaxonomyError> {
        let Some(first) = tags.first() else {
            return Err(TaxonomyError::Empty);
        };
        let dimension = first.embedding.len();

        let mut by_name = HashMap::with_capacity(tags.len());
        for (position, tag) in tags.iter().enumerate() {
            if tag.embedding.is_empty() {
                return Err(TaxonomyError::EmptyEmbedding {
                    name: tag.name.clone(),
                });
            }
            if tag.embedding.len() != dimension {
                return Err(TaxonomyError::DimensionMismatch {
                    name: tag.name.clone(),
                    expected: dimension,
                    found: tag.embedding.len(),
                });
            }
            if by_name.insert(tag.name.clone(), position).is_some() {
                return Err(TaxonomyError::DuplicateName {
                    name: tag.name.clone(),
                });
            }
        }

        Ok(Self {
            tags,
            by_name,
            dimension,
        })
    }

    /// Look up a tag by exact, case-sensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReferenceTag> {
        self.by_name
            .get(name)
            .and_then(|&position| self.tags.get(position))
    }

    /// Rows in their original order.
    #[must_use]
    pub fn tags(&self) -> &[ReferenceTag] {
        &self.tags
    }

    /// Iterate over rows in their original order.
    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceTag> {
        self.tags.iter()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Report whether the taxonomy has no rows. Always `false` for a
    /// validated taxonomy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Embedding dimensionality shared by every row.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }
}

impl<'a> IntoIterator for &'a Taxonomy {
    type Item = &'a ReferenceTag;
    type IntoIter = std::slice::Iter<'a, ReferenceTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
