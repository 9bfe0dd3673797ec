//! Task heads over precomputed embeddings.
//!
//! | Head | Forward | Output |
//! |------|---------|--------|
//! | [`NodeClassifier`] | node id | softmax over classes |
//! | [`NodeMatching`] | two node ids | similarity |
//! | [`LinkPrediction`] | (h, r, t) | distance of every candidate head and tail |
//! | [`RelationPrediction`] | (h, t) | distance of every relation |
//!
//! The translational heads use TransE distances (`‖h + r - t‖`), so for
//! those **lower is better**. Ranking helpers return 1-based ranks sorted
//! ascending by distance.

mod classifier;
mod link;
mod matching;
mod relation;

pub use classifier::{ClassPrediction, NodeClassifier};
pub use link::{LinkPrediction, LinkScores};
pub use matching::{Match, NodeMatching};
pub use relation::RelationPrediction;

use crate::error::{Error, Result};
use candle_core::{Tensor, D};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registered head types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadKind {
    #[serde(alias = "NodedClassifier")]
    NodeClassifier,
    NodeMatching,
    #[serde(alias = "LinkPreiction")]
    LinkPrediction,
    RelationPrediction,
}

impl HeadKind {
    /// Every registered head, in registration order.
    pub const ALL: [HeadKind; 4] = [
        HeadKind::NodeClassifier,
        HeadKind::NodeMatching,
        HeadKind::LinkPrediction,
        HeadKind::RelationPrediction,
    ];

    /// Canonical registry name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NodeClassifier => "NodeClassifier",
            Self::NodeMatching => "NodeMatching",
            Self::LinkPrediction => "LinkPrediction",
            Self::RelationPrediction => "RelationPrediction",
        }
    }

    /// Whether the head needs a relation embedding table.
    pub fn needs_relations(&self) -> bool {
        matches!(self, Self::LinkPrediction | Self::RelationPrediction)
    }
}

impl fmt::Display for HeadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HeadKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NodeClassifier" | "NodedClassifier" => Ok(Self::NodeClassifier),
            "NodeMatching" => Ok(Self::NodeMatching),
            "LinkPrediction" | "LinkPreiction" => Ok(Self::LinkPrediction),
            "RelationPrediction" => Ok(Self::RelationPrediction),
            other => Err(Error::UnknownHead(other.to_string())),
        }
    }
}

/// A constructed head of any kind.
#[derive(Debug)]
pub enum Head {
    NodeClassifier(NodeClassifier),
    NodeMatching(NodeMatching),
    LinkPrediction(LinkPrediction),
    RelationPrediction(RelationPrediction),
}

impl Head {
    /// Registry kind of this head.
    pub fn kind(&self) -> HeadKind {
        match self {
            Self::NodeClassifier(_) => HeadKind::NodeClassifier,
            Self::NodeMatching(_) => HeadKind::NodeMatching,
            Self::LinkPrediction(_) => HeadKind::LinkPrediction,
            Self::RelationPrediction(_) => HeadKind::RelationPrediction,
        }
    }
}

/// Norm used for translational distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    /// Manhattan distance.
    L1,
    /// Euclidean distance.
    #[default]
    L2,
}

impl Norm {
    /// Reduce the last axis of `diff` to a distance.
    pub fn distance(&self, diff: &Tensor) -> Result<Tensor> {
        let d = match self {
            Self::L1 => diff.abs()?.sum(D::Minus1)?,
            Self::L2 => diff.sqr()?.sum(D::Minus1)?.sqrt()?,
        };
        Ok(d)
    }
}

/// One entry of a ranking by TransE distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked {
    /// Entity or relation id.
    pub id: usize,
    /// Distance (lower = more plausible).
    pub distance: f32,
    /// Rank (1 = best).
    pub rank: usize,
}

/// Ranked candidate entity.
pub type RankedEntity = Ranked;

/// Ranked candidate relation.
pub type RankedRelation = Ranked;

/// Sort a `(n,)` distance vector ascending and keep the first `k`.
pub(crate) fn rank_ascending(distances: &Tensor, k: usize) -> Result<Vec<Ranked>> {
    // candle's sort panics on an empty last axis
    if distances.elem_count() == 0 || k == 0 {
        return Ok(Vec::new());
    }
    let (_, indices) = distances.sort_last_dim(true)?;
    let indices = indices.to_vec1::<u32>()?;
    let values = distances.to_vec1::<f32>()?;

    Ok(indices
        .iter()
        .take(k)
        .enumerate()
        .map(|(pos, &i)| Ranked {
            id: i as usize,
            distance: values[i as usize],
            rank: pos + 1,
        })
        .collect())
}

/// 1-based rank of `id` in a distance vector: strictly closer entries + 1.
pub(crate) fn rank_of(distances: &Tensor, id: usize) -> Result<usize> {
    let values = distances.to_vec1::<f32>()?;
    let target = values.get(id).copied().ok_or(Error::IndexOutOfRange {
        kind: "candidate",
        index: id,
        len: values.len(),
    })?;
    Ok(values.iter().filter(|&&d| d < target).count() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in HeadKind::ALL {
            assert_eq!(kind.name().parse::<HeadKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn test_legacy_aliases() {
        assert_eq!(
            "NodedClassifier".parse::<HeadKind>().unwrap(),
            HeadKind::NodeClassifier
        );
        assert_eq!(
            "LinkPreiction".parse::<HeadKind>().unwrap(),
            HeadKind::LinkPrediction
        );
        let kind: HeadKind = serde_json::from_str("\"LinkPreiction\"").unwrap();
        assert_eq!(kind, HeadKind::LinkPrediction);
    }

    #[test]
    fn test_unknown_kind() {
        assert!(matches!(
            "GraphSAGE".parse::<HeadKind>(),
            Err(Error::UnknownHead(_))
        ));
    }

    #[test]
    fn test_needs_relations() {
        assert!(!HeadKind::NodeClassifier.needs_relations());
        assert!(!HeadKind::NodeMatching.needs_relations());
        assert!(HeadKind::LinkPrediction.needs_relations());
        assert!(HeadKind::RelationPrediction.needs_relations());
    }

    #[test]
    fn test_norms() {
        let diff = Tensor::new(&[[3.0f32, -4.0], [1.0, 1.0]], &Device::Cpu).unwrap();
        let l2 = Norm::L2.distance(&diff).unwrap().to_vec1::<f32>().unwrap();
        let l1 = Norm::L1.distance(&diff).unwrap().to_vec1::<f32>().unwrap();
        assert!((l2[0] - 5.0).abs() < 1e-6);
        assert!((l2[1] - 2.0f32.sqrt()).abs() < 1e-6);
        assert!((l1[0] - 7.0).abs() < 1e-6);
        assert!((l1[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_rank_ascending() {
        let d = Tensor::new(&[0.5f32, 0.1, 2.0, 0.3], &Device::Cpu).unwrap();
        let ranked = rank_ascending(&d, 3).unwrap();
        let ids: Vec<usize> = ranked.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 0]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
        assert!((ranked[1].distance - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_rank_ascending_empty() {
        let d = Tensor::zeros(0, candle_core::DType::F32, &Device::Cpu).unwrap();
        assert!(rank_ascending(&d, 3).unwrap().is_empty());
    }

    #[test]
    fn test_rank_ascending_k_zero() {
        let d = Tensor::new(&[0.5f32, 0.1], &Device::Cpu).unwrap();
        assert!(rank_ascending(&d, 0).unwrap().is_empty());
    }

    #[test]
    fn test_rank_ascending_k_larger_than_n() {
        let d = Tensor::new(&[0.5f32, 0.1, 2.0], &Device::Cpu).unwrap();
        let ranked = rank_ascending(&d, 10).unwrap();
        let ids: Vec<usize> = ranked.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 0, 2]);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_rank_of() {
        let d = Tensor::new(&[0.5f32, 0.1, 2.0, 0.3], &Device::Cpu).unwrap();
        assert_eq!(rank_of(&d, 1).unwrap(), 1);
        assert_eq!(rank_of(&d, 0).unwrap(), 3);
        assert_eq!(rank_of(&d, 2).unwrap(), 4);
        assert!(rank_of(&d, 9).is_err());
    }
}
