//! Turning raw model output into a query vector.

use sema_core::{check_dimension, mean_pool, normalize, Result, Vector};

/// What a model handed back for one input text.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEmbedding {
    /// Already pooled into a single vector by the model server.
    Pooled(Vec<f32>),
    /// One vector per token; pooled here.
    Tokens(Vec<Vec<f32>>),
}

impl RawEmbedding {
    /// Mean-pool (if needed), normalize, and check dimensionality.
    pub fn finalize(self, dimension: usize) -> Result<Vector> {
        let mut pooled = match self {
            RawEmbedding::Pooled(v) => v,
            RawEmbedding::Tokens(tokens) => mean_pool(&tokens)?,
        };
        check_dimension(dimension, pooled.len())?;
        normalize(&mut pooled);
        Ok(Vector::from(pooled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_core::{magnitude, Error};

    #[test]
    fn pooled_output_is_normalized() {
        let v = RawEmbedding::Pooled(vec![3.0, 4.0]).finalize(2).unwrap();
        assert!((magnitude(v.as_slice()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn token_output_is_pooled_then_normalized() {
        let raw = RawEmbedding::Tokens(vec![vec![2.0, 0.0], vec![0.0, 2.0]]);
        let v = raw.finalize(2).unwrap();
        let s = v.as_slice();
        assert!((s[0] - s[1]).abs() < 1e-6);
        assert!((magnitude(s) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn wrong_dimension_is_rejected() {
        let err = RawEmbedding::Pooled(vec![1.0; 768])
            .finalize(384)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 384,
                actual: 768
            }
        ));
    }
}
