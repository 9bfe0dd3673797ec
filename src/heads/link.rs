//! Link prediction with TransE distances.
//!
//! TransE ([Bordes et al. 2013](https://papers.nips.cc/paper/2013/hash/1cecc7a77928ca8133fa24680a88d2f9-Abstract.html))
//! treats relations as translations:
//!
//! ```text
//! h + r ≈ t  (if the triple is true)
//! ```
//!
//! For a query `(h, r, t)` the head scores every node as a replacement
//! for the head and for the tail:
//!
//! ```text
//! head_scores[i] = ||e_i + r - t||
//! tail_scores[i] = ||h + r - e_i||
//! ```
//!
//! Lower distance = more plausible.

use super::{rank_ascending, rank_of, Norm, RankedEntity};
use crate::embeddings::EmbeddingTable;
use crate::error::Result;
use candle_core::Tensor;

/// Distances of every candidate head and tail for one query.
#[derive(Debug, Clone)]
pub struct LinkScores {
    /// `(num_nodes,)` distance with node `i` as head.
    pub head_scores: Tensor,
    /// `(num_nodes,)` distance with node `i` as tail.
    pub tail_scores: Tensor,
}

impl LinkScores {
    /// 1-based rank of `id` among candidate heads.
    pub fn head_rank(&self, id: usize) -> Result<usize> {
        rank_of(&self.head_scores, id)
    }

    /// 1-based rank of `id` among candidate tails.
    pub fn tail_rank(&self, id: usize) -> Result<usize> {
        rank_of(&self.tail_scores, id)
    }
}

/// TransE link prediction head.
#[derive(Debug, Clone)]
pub struct LinkPrediction {
    nodes: EmbeddingTable,
    relations: EmbeddingTable,
    norm: Norm,
}

impl LinkPrediction {
    /// Both tables must share an embedding dimension.
    pub fn new(nodes: EmbeddingTable, relations: EmbeddingTable) -> Result<Self> {
        nodes.check_compatible(&relations)?;
        tracing::debug!(
            nodes = nodes.len(),
            relations = relations.len(),
            dim = nodes.dim(),
            "built link prediction head"
        );
        Ok(Self {
            nodes,
            relations,
            norm: Norm::L2,
        })
    }

    /// Use `norm` for distances (default: L2).
    pub fn with_norm(mut self, norm: Norm) -> Self {
        self.norm = norm;
        self
    }

    /// Score every node as head and as tail of `(head_id, relation_id, tail_id)`.
    pub fn forward(
        &self,
        head_id: usize,
        relation_id: usize,
        tail_id: usize,
    ) -> Result<LinkScores> {
        tracing::trace!(head_id, relation_id, tail_id, "link prediction forward");
        Ok(LinkScores {
            head_scores: self.head_distances(relation_id, tail_id)?,
            tail_scores: self.tail_distances(head_id, relation_id)?,
        })
    }

    /// Distance of a single triple.
    pub fn score(&self, head_id: usize, relation_id: usize, tail_id: usize) -> Result<f32> {
        let h = self.nodes.row(head_id)?;
        let r = self.relations.row(relation_id)?;
        let t = self.nodes.row(tail_id)?;
        let diff = h.add(&r)?.sub(&t)?;
        Ok(self.norm.distance(&diff)?.to_scalar::<f32>()?)
    }

    /// Top-`k` heads for `(?, relation_id, tail_id)`.
    pub fn rank_heads(
        &self,
        relation_id: usize,
        tail_id: usize,
        k: usize,
    ) -> Result<Vec<RankedEntity>> {
        rank_ascending(&self.head_distances(relation_id, tail_id)?, k)
    }

    /// Top-`k` tails for `(head_id, relation_id, ?)`.
    pub fn rank_tails(
        &self,
        head_id: usize,
        relation_id: usize,
        k: usize,
    ) -> Result<Vec<RankedEntity>> {
        rank_ascending(&self.tail_distances(head_id, relation_id)?, k)
    }

    // ||e_i + (r - t)|| for all i
    fn head_distances(&self, relation_id: usize, tail_id: usize) -> Result<Tensor> {
        let r = self.relations.row(relation_id)?;
        let t = self.nodes.row(tail_id)?;
        let offset = r.sub(&t)?.unsqueeze(0)?;
        let diff = self.nodes.tensor().broadcast_add(&offset)?;
        self.norm.distance(&diff)
    }

    // ||(h + r) - e_i|| for all i
    fn tail_distances(&self, head_id: usize, relation_id: usize) -> Result<Tensor> {
        let h = self.nodes.row(head_id)?;
        let r = self.relations.row(relation_id)?;
        let hr = h.add(&r)?.unsqueeze(0)?;
        let diff = hr.broadcast_sub(self.nodes.tensor())?;
        self.norm.distance(&diff)
    }

    /// Distance norm in use.
    pub fn norm(&self) -> Norm {
        self.norm
    }

    /// Number of candidate entities.
    pub fn num_entities(&self) -> usize {
        self.nodes.len()
    }

    /// Number of relations.
    pub fn num_relations(&self) -> usize {
        self.relations.len()
    }

    /// Embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.nodes.dim()
    }
}
