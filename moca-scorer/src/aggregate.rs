//! Accumulate resolved tags into one score vector per stop.
//!
//! Exact matches contribute their scores at full weight. Fallback matches
//! contribute a similarity-weighted blend whose weights sum to one, so
//! every tag carries the same total influence before the final average.

use moca_core::{CategoryScores, ReferenceTag, ScoreVector};

use crate::error::AggregationError;
use crate::resolver::{Resolution, SimilarityMatch};
use crate::vote::VoteTally;

/// Running totals for a single stop.
///
/// # Examples
/// ```
/// use moca_core::{Category, CategoryScores, ReferenceTag};
/// use moca_scorer::ScoreAccumulator;
///
/// let mut scores = CategoryScores::zero();
/// scores.set(Category::Commercial, 0.8);
/// let bakery = ReferenceTag::new("bakery", scores, "commercial", vec![1.0]);
///
/// let mut accumulator = ScoreAccumulator::new();
/// accumulator.add_exact(&bakery);
/// accumulator.add_exact(&bakery);
/// let vector = accumulator.finish()?;
/// assert_eq!(vector.stop_type, "commercial");
/// assert!((vector.scores.get(Category::Commercial) - 0.8).abs() < 1e-12);
/// # Ok::<(), moca_scorer::AggregationError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScoreAccumulator<'t> {
    totals: CategoryScores,
    tag_count: usize,
    votes: VoteTally<'t>,
}

impl<'t> ScoreAccumulator<'t> {
    /// Start an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            totals: CategoryScores::zero(),
            tag_count: 0,
            votes: VoteTally::new(),
        }
    }

    /// Add one resolved tag.
    pub fn add(&mut self, resolution: &Resolution<'t>) {
        match resolution {
            Resolution::Exact(row) => self.add_exact(row),
            Resolution::Fallback(matches) => self.add_fallback(matches),
        }
    }

    /// Add a tag that matched `row` exactly.
    pub fn add_exact(&mut self, row: &'t ReferenceTag) {
        self.totals.add_weighted(&row.scores, 1.0);
        self.votes.record(&row.stop_type);
        self.tag_count = self.tag_count.saturating_add(1);
    }

    /// Add a tag resolved through its nearest reference rows.
    ///
    /// `matches` must be ordered best first; the first row casts the vote.
    pub fn add_fallback(&mut self, matches: &[SimilarityMatch<'t>]) {
        for (candidate, weight) in matches.iter().zip(fallback_weights(matches)) {
            self.totals.add_weighted(&candidate.tag.scores, weight);
        }
        if let Some(best) = matches.first() {
            self.votes.record(&best.tag.stop_type);
        }
        self.tag_count = self.tag_count.saturating_add(1);
    }

    /// Number of tags added so far.
    #[must_use]
    pub const fn tag_count(&self) -> usize {
        self.tag_count
    }

    /// Average the totals over the tag count and resolve the stop type.
    ///
    /// # Errors
    /// Returns [`AggregationError::NoTags`] when nothing was added, rather
    /// than dividing by zero.
    #[expect(
        clippy::cast_precision_loss,
        reason = "tag counts are far below 2^52"
    )]
    pub fn finish(self) -> Result<ScoreVector, AggregationError> {
        if self.tag_count == 0 {
            return Err(AggregationError::NoTags);
        }
        let scores = self.totals.divided_by(self.tag_count as f64);
        let stop_type = self.votes.winner().unwrap_or_default();
        Ok(ScoreVector::new(scores, stop_type))
    }
}

/// Blend weights for a fallback tag's candidate rows.
///
/// Each weight is the candidate's similarity over the sum of similarities.
/// When that sum is exactly zero every candidate receives `1 / k`.
///
/// # Examples
/// ```
/// use moca_core::{CategoryScores, ReferenceTag};
/// use moca_scorer::{SimilarityMatch, fallback_weights};
///
/// let row = ReferenceTag::new("x", CategoryScores::zero(), "t", vec![1.0]);
/// let zero = SimilarityMatch { tag: &row, similarity: 0.0 };
/// assert_eq!(fallback_weights(&[zero; 5]), vec![0.2; 5]);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "weights are ratios of similarities over small candidate counts"
)]
pub fn fallback_weights(matches: &[SimilarityMatch<'_>]) -> Vec<f64> {
    let total: f64 = matches.iter().map(|candidate| candidate.similarity).sum();
    if total == 0.0 {
        let uniform = 1.0 / matches.len() as f64;
        return vec![uniform; matches.len()];
    }
    matches
        .iter()
        .map(|candidate| candidate.similarity / total)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use moca_core::Category;
    use moca_core::test_support::{reference_tag, uniform_tag};
    use rstest::rstest;

    const EPSILON: f64 = 1e-9;

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < EPSILON
    }

    #[rstest]
    fn exact_tags_are_averaged() {
        let high = uniform_tag("a", "x", vec![1.0], 4.0);
        let low = uniform_tag("b", "y", vec![1.0], 2.0);
        let mut accumulator = ScoreAccumulator::new();
        accumulator.add_exact(&high);
        accumulator.add_exact(&low);
        let vector = accumulator.finish().expect("two tags");
        assert!(vector.scores.iter().all(|(_, value)| close(value, 3.0)));
        assert_eq!(vector.stop_type, "x");
    }

    #[rstest]
    fn fallback_weights_follow_similarity() {
        let rows: Vec<_> = (0..5)
            .map(|index| uniform_tag(&format!("r{index}"), &format!("t{index}"), vec![1.0], 1.0))
            .collect();
        let similarities = [0.5, 0.4, 0.3, 0.2, 0.1];
        let matches: Vec<_> = rows
            .iter()
            .zip(similarities)
            .map(|(tag, similarity)| SimilarityMatch { tag, similarity })
            .collect();
        let weights = fallback_weights(&matches);
        let expected = [0.5 / 1.5, 0.4 / 1.5, 0.3 / 1.5, 0.2 / 1.5, 0.1 / 1.5];
        assert!(weights.iter().zip(expected).all(|(&w, e)| close(w, e)));
        assert!(close(weights.iter().sum(), 1.0));
    }

    #[rstest]
    fn degenerate_similarities_use_uniform_weights() {
        let row = uniform_tag("r", "t", vec![1.0], 1.0);
        let matches = [
            SimilarityMatch { tag: &row, similarity: 0.4 },
            SimilarityMatch { tag: &row, similarity: -0.4 },
        ];
        assert_eq!(fallback_weights(&matches), vec![0.5, 0.5]);
    }

    #[rstest]
    fn fallback_votes_for_the_best_candidate() {
        let best = reference_tag("bakery", "commercial", vec![1.0], &[(Category::Commercial, 1.0)]);
        let other = reference_tag("school", "education", vec![1.0], &[(Category::Education, 1.0)]);
        let mut accumulator = ScoreAccumulator::new();
        accumulator.add_fallback(&[
            SimilarityMatch { tag: &best, similarity: 0.75 },
            SimilarityMatch { tag: &other, similarity: 0.25 },
        ]);
        let vector = accumulator.finish().expect("one tag");
        assert_eq!(vector.stop_type, "commercial");
        assert!(close(vector.scores.get(Category::Commercial), 0.75));
        assert!(close(vector.scores.get(Category::Education), 0.25));
    }

    #[rstest]
    fn finishing_without_tags_is_an_error() {
        assert_eq!(ScoreAccumulator::new().finish(), Err(AggregationError::NoTags));
    }
}
