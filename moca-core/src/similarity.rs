//! Cosine similarity between embedding vectors.

/// Cosine similarity of two vectors, computed in `f64`.
///
/// Returns `0.0` whenever the measure is undefined: mismatched or empty
/// lengths, a zero-magnitude operand, or a non-finite result.
///
/// # Examples
/// ```
/// use moca_core::cosine_similarity;
///
/// assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
/// assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
/// ```
#[expect(clippy::float_arithmetic, reason = "cosine similarity is float maths")]
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, norm_a, norm_b), (&left, &right)| {
            let x = f64::from(left);
            let y = f64::from(right);
            (dot + x * y, norm_a + x * x, norm_b + y * y)
        },
    );

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    let similarity = dot / denominator;
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], 1.0)]
    #[case(&[1.0, 0.0], &[-1.0, 0.0], -1.0)]
    #[case(&[1.0, 0.0], &[0.0, 1.0], 0.0)]
    #[case(&[3.0, 4.0], &[6.0, 8.0], 1.0)]
    fn computes_expected_similarity(#[case] a: &[f32], #[case] b: &[f32], #[case] expected: f64) {
        assert!((cosine_similarity(a, b) - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(&[], &[])]
    #[case(&[1.0], &[1.0, 0.0])]
    #[case(&[0.0, 0.0], &[1.0, 0.0])]
    #[case(&[f32::NAN, 1.0], &[1.0, 0.0])]
    #[case(&[f32::INFINITY, 1.0], &[1.0, 0.0])]
    fn undefined_similarity_is_zero(#[case] a: &[f32], #[case] b: &[f32]) {
        assert_eq!(cosine_similarity(a, b), 0.0);
    }
}
