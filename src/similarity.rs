//! Similarity functions for node matching.
//!
//! | Function | Score | Range |
//! |----------|-------|-------|
//! | Cosine | Σ xᵢyᵢ / (‖x‖ ‖y‖) | [-1, 1] |
//! | Dot | Σ xᵢyᵢ | ℝ |
//! | NegEuclidean | -‖x - y‖ | (-∞, 0] |
//!
//! Higher is always more similar. A caller-supplied function can be plugged
//! in through [`Similarity::Custom`].

use crate::error::{Error, Result};
use candle_core::{DType, Tensor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Caller-supplied similarity over two `(dim,)` embeddings.
///
/// Must return a single-element tensor.
pub type SimilarityFn = Arc<dyn Fn(&Tensor, &Tensor) -> candle_core::Result<Tensor> + Send + Sync>;

/// Similarity used to compare two node embeddings.
#[derive(Clone, Default)]
pub enum Similarity {
    /// Cosine similarity.
    #[default]
    Cosine,
    /// Inner product.
    Dot,
    /// Negated Euclidean distance.
    NegEuclidean,
    /// Arbitrary tensor function.
    Custom(SimilarityFn),
}

impl fmt::Debug for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cosine => f.write_str("Cosine"),
            Self::Dot => f.write_str("Dot"),
            Self::NegEuclidean => f.write_str("NegEuclidean"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Similarity {
    /// Wrap a closure as a custom similarity.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Tensor, &Tensor) -> candle_core::Result<Tensor> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Score two embeddings of equal shape.
    pub fn score(&self, x: &Tensor, y: &Tensor) -> Result<f32> {
        if x.dims() != y.dims() {
            return Err(Error::DimensionMismatch {
                expected: x.elem_count(),
                got: y.elem_count(),
            });
        }
        match self {
            Self::Cosine => cosine(x, y),
            Self::Dot => Ok(x.mul(y)?.sum_all()?.to_scalar::<f32>()?),
            Self::NegEuclidean => {
                let dist = x.sub(y)?.sqr()?.sum_all()?.sqrt()?.to_scalar::<f32>()?;
                Ok(-dist)
            }
            Self::Custom(f) => {
                let out = f(x, y)?;
                if out.elem_count() != 1 {
                    return Err(Error::InvalidConfig(format!(
                        "custom similarity must return a scalar, got shape {:?}",
                        out.dims()
                    )));
                }
                let values = out.flatten_all()?.to_dtype(DType::F32)?.to_vec1::<f32>()?;
                values
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::Degenerate("custom similarity returned no value".into()))
            }
        }
    }

    /// Config-level kind, `None` for custom functions.
    pub fn kind(&self) -> Option<SimilarityKind> {
        match self {
            Self::Cosine => Some(SimilarityKind::Cosine),
            Self::Dot => Some(SimilarityKind::Dot),
            Self::NegEuclidean => Some(SimilarityKind::NegEuclidean),
            Self::Custom(_) => None,
        }
    }
}

fn cosine(x: &Tensor, y: &Tensor) -> Result<f32> {
    let dot = x.mul(y)?.sum_all()?.to_scalar::<f32>()?;
    let norm_x = x.sqr()?.sum_all()?.sqrt()?.to_scalar::<f32>()?;
    let norm_y = y.sqr()?.sum_all()?.sqrt()?.to_scalar::<f32>()?;
    let denom = norm_x * norm_y;
    if denom == 0.0 {
        tracing::warn!(norm_x, norm_y, "cosine similarity of a zero-norm embedding");
        return Err(Error::Degenerate(
            "cosine similarity undefined for a zero-norm embedding".into(),
        ));
    }
    Ok(dot / denom)
}

/// Serializable name of a built-in similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    #[default]
    Cosine,
    Dot,
    NegEuclidean,
}

impl From<SimilarityKind> for Similarity {
    fn from(kind: SimilarityKind) -> Self {
        match kind {
            SimilarityKind::Cosine => Self::Cosine,
            SimilarityKind::Dot => Self::Dot,
            SimilarityKind::NegEuclidean => Self::NegEuclidean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn vec(v: &[f32]) -> Tensor {
        Tensor::new(v, &Device::Cpu).unwrap()
    }

    #[test]
    fn test_cosine_orthogonal() {
        let s = Similarity::Cosine
            .score(&vec(&[1.0, 0.0]), &vec(&[0.0, 1.0]))
            .unwrap();
        assert!(s.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_scale_invariant() {
        let s = Similarity::Cosine
            .score(&vec(&[1.0, 2.0, 3.0]), &vec(&[2.0, 4.0, 6.0]))
            .unwrap();
        assert!((s - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let s = Similarity::Cosine
            .score(&vec(&[1.0, -1.0]), &vec(&[-1.0, 1.0]))
            .unwrap();
        assert!((s + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let result = Similarity::Cosine.score(&vec(&[0.0, 0.0]), &vec(&[1.0, 1.0]));
        assert!(matches!(result, Err(Error::Degenerate(_))));
    }

    #[test]
    fn test_dot() {
        let s = Similarity::Dot
            .score(&vec(&[1.0, 2.0]), &vec(&[3.0, 4.0]))
            .unwrap();
        assert!((s - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_neg_euclidean() {
        let s = Similarity::NegEuclidean
            .score(&vec(&[0.0, 0.0]), &vec(&[3.0, 4.0]))
            .unwrap();
        assert!((s + 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_custom() {
        // L1 distance, negated
        let sim = Similarity::custom(|x, y| x.sub(y)?.abs()?.sum_all()?.neg());
        let s = sim.score(&vec(&[1.0, 1.0]), &vec(&[0.0, 3.0])).unwrap();
        assert!((s + 3.0).abs() < 1e-6);
        assert!(sim.kind().is_none());
    }

    #[test]
    fn test_custom_must_be_scalar() {
        let sim = Similarity::custom(|x, y| x.mul(y));
        let result = sim.score(&vec(&[1.0, 1.0]), &vec(&[0.0, 3.0]));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_shape_mismatch() {
        let result = Similarity::Dot.score(&vec(&[1.0, 1.0]), &vec(&[1.0]));
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&SimilarityKind::NegEuclidean).unwrap();
        assert_eq!(json, "\"neg_euclidean\"");
        let kind: SimilarityKind = serde_json::from_str("\"cosine\"").unwrap();
        assert_eq!(kind, SimilarityKind::Cosine);
        assert!(matches!(Similarity::from(kind), Similarity::Cosine));
    }
}
