//! Vector math shared by embedders and indexes.
//!
//! Embedders mean-pool token vectors and normalize; indexes score with
//! cosine similarity. Keeping both here guarantees every component agrees on
//! the metric.

use crate::error::{Error, Result};

/// Euclidean length of a vector.
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale a vector to unit length in place. Zero vectors are left unchanged.
pub fn normalize(v: &mut [f32]) {
    let mag = magnitude(v);
    if mag > 0.0 {
        v.iter_mut().for_each(|x| *x /= mag);
    }
}

/// Average per-token vectors into one fixed-length vector.
///
/// All token vectors must share one dimensionality. An empty token list is a
/// model failure, not a zero vector.
pub fn mean_pool(tokens: &[Vec<f32>]) -> Result<Vec<f32>> {
    let first = tokens.first().ok_or_else(|| {
        Error::EmbeddingUnavailable("model returned no token embeddings".to_string())
    })?;
    let dim = first.len();
    let mut pooled = vec![0.0f32; dim];

    for token in tokens {
        check_dimension(dim, token.len())?;
        for (acc, x) in pooled.iter_mut().zip(token) {
            *acc += x;
        }
    }

    let n = tokens.len() as f32;
    pooled.iter_mut().for_each(|x| *x /= n);
    Ok(pooled)
}

/// Cosine similarity between two vectors, accumulated in f64.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ;
/// callers that care about the length check use [`check_dimension`] first.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut na = 0.0f64;
    let mut nb = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    // Clamp rounding noise so identical vectors never exceed 1.0.
    (dot / (na.sqrt() * nb.sqrt())).clamp(-1.0, 1.0) as f32
}

/// Fail with `DimensionMismatch` unless `actual == expected`.
pub fn check_dimension(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionMismatch { expected, actual });
    }
    Ok(())
}
