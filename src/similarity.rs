use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("embedding lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// Cosine similarity of two equal-length vectors.
///
/// Returns 0.0 when either vector has zero norm, so degenerate embeddings
/// compare as unrelated instead of dividing by zero. The result is clamped
/// to [-1, 1].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / denom).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_vector_is_one() {
        let v = [1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_are_zero() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn antiparallel_vectors_are_minus_one() {
        let a = [1.0, 0.0, 0.0];
        let b = [-1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn scaled_vectors_are_still_one() {
        let a = [0.1, 0.2, 0.3];
        let b = [1.0, 2.0, 3.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let a = [1.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        assert_eq!(
            cosine_similarity(&a, &b),
            Err(SimilarityError::LengthMismatch { left: 2, right: 3 })
        );
        assert_eq!(
            cosine_similarity(&b, &a),
            Err(SimilarityError::LengthMismatch { left: 3, right: 2 })
        );
        assert!(cosine_similarity(&a, &[]).is_err());
    }

    #[test]
    fn zero_norm_falls_back_to_zero() {
        let zero = [0.0, 0.0, 0.0];
        let v = [1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &v), Ok(0.0));
        assert_eq!(cosine_similarity(&v, &zero), Ok(0.0));
        assert_eq!(cosine_similarity(&zero, &zero), Ok(0.0));
    }
}
