//! Relation prediction: which edge type best translates `h` onto `t`.
//!
//! ```text
//! scores[j] = ||h + r_j - t||   for every relation j
//! ```

use super::{rank_ascending, Norm, RankedRelation};
use crate::embeddings::EmbeddingTable;
use crate::error::Result;
use candle_core::Tensor;

/// TransE relation prediction head.
#[derive(Debug, Clone)]
pub struct RelationPrediction {
    nodes: EmbeddingTable,
    relations: EmbeddingTable,
    norm: Norm,
}

impl RelationPrediction {
    /// Both tables must share an embedding dimension.
    pub fn new(nodes: EmbeddingTable, relations: EmbeddingTable) -> Result<Self> {
        nodes.check_compatible(&relations)?;
        tracing::debug!(
            nodes = nodes.len(),
            relations = relations.len(),
            dim = nodes.dim(),
            "built relation prediction head"
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

    /// Distance of `(head_id, r_j, tail_id)` for every relation, shape `(num_relations,)`.
    pub fn forward(&self, head_id: usize, tail_id: usize) -> Result<Tensor> {
        tracing::trace!(head_id, tail_id, "relation prediction forward");
        let h = self.nodes.row(head_id)?;
        let t = self.nodes.row(tail_id)?;
        let offset = h.sub(&t)?.unsqueeze(0)?;
        let diff = self.relations.tensor().broadcast_add(&offset)?;
        self.norm.distance(&diff)
    }

    /// Distance of one explicit triple.
    pub fn score_relation(
        &self,
        head_id: usize,
        relation_id: usize,
        tail_id: usize,
    ) -> Result<f32> {
        let h = self.nodes.row(head_id)?;
        let r = self.relations.row(relation_id)?;
        let t = self.nodes.row(tail_id)?;
        let diff = h.add(&r)?.sub(&t)?;
        Ok(self.norm.distance(&diff)?.to_scalar::<f32>()?)
    }

    /// Top-`k` relations for `(head_id, ?, tail_id)`.
    pub fn rank_relations(
        &self,
        head_id: usize,
        tail_id: usize,
        k: usize,
    ) -> Result<Vec<RankedRelation>> {
        rank_ascending(&self.forward(head_id, tail_id)?, k)
    }

    /// Distance norm in use.
    pub fn norm(&self) -> Norm {
        self.norm
    }

    /// Number of entities.
    pub fn num_entities(&self) -> usize {
        self.nodes.len()
    }

    /// Number of candidate relations.
    pub fn num_relations(&self) -> usize {
        self.relations.len()
    }
}
