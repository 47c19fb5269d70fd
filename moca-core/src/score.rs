//! Per-stop enrichment result.

use crate::CategoryScores;

/// Aggregated scores and the voted stop type for a single stop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreVector {
    /// Category scores averaged over the stop's tags.
    pub scores: CategoryScores,
    /// Winning stop type label.
    pub stop_type: String,
}

impl ScoreVector {
    /// Construct a score vector.
    pub fn new(scores: CategoryScores, stop_type: impl Into<String>) -> Self {
        Self {
            scores,
            stop_type: stop_type.into(),
        }
    }

    /// Zero scores with an empty stop type, emitted for stops without tags.
    #[must_use]
    pub const fn sentinel() -> Self {
        Self {
            scores: CategoryScores::zero(),
            stop_type: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_all_zero() {
        let sentinel = ScoreVector::sentinel();
        assert!(sentinel.scores.iter().all(|(_, value)| value == 0.0));
        assert!(sentinel.stop_type.is_empty());
    }
}
