//! Node matching: similarity between two node embeddings.

use crate::embeddings::EmbeddingTable;
use crate::error::{Error, Result};
use crate::similarity::Similarity;
use serde::{Deserialize, Serialize};

/// A node returned by [`NodeMatching::most_similar`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: usize,
    /// Similarity to the query (higher = more similar).
    pub similarity: f32,
}

/// Similarity head over precomputed node embeddings.
#[derive(Debug, Clone)]
pub struct NodeMatching {
    embeddings: EmbeddingTable,
    similarity: Similarity,
}

impl NodeMatching {
    /// Cosine-similarity matcher.
    pub fn new(embeddings: EmbeddingTable) -> Self {
        Self::with_similarity(embeddings, Similarity::Cosine)
    }

    /// Matcher with an explicit similarity function.
    pub fn with_similarity(embeddings: EmbeddingTable, similarity: Similarity) -> Self {
        tracing::debug!(
            nodes = embeddings.len(),
            dim = embeddings.dim(),
            similarity = ?similarity,
            "built node matcher"
        );
        Self {
            embeddings,
            similarity,
        }
    }

    /// Similarity of two nodes.
    pub fn forward(&self, id_1: usize, id_2: usize) -> Result<f32> {
        tracing::trace!(id_1, id_2, "node matching forward");
        let a = self.embeddings.row(id_1)?;
        let b = self.embeddings.row(id_2)?;
        self.similarity.score(&a, &b)
    }

    /// The `k` nodes most similar to `id`, excluding `id` itself.
    ///
    /// Nodes whose similarity is undefined (e.g. zero vectors under cosine)
    /// are skipped.
    pub fn most_similar(&self, id: usize, k: usize) -> Result<Vec<Match>> {
        let query = self.embeddings.row(id)?;
        let mut matches = Vec::with_capacity(self.embeddings.len().saturating_sub(1));
        for other in 0..self.embeddings.len() {
            if other == id {
                continue;
            }
            let candidate = self.embeddings.row(other)?;
            match self.similarity.score(&query, &candidate) {
                Ok(similarity) => matches.push(Match {
                    id: other,
                    similarity,
                }),
                Err(Error::Degenerate(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(k);
        Ok(matches)
    }

    /// Similarity in use.
    pub fn similarity(&self) -> &Similarity {
        &self.similarity
    }

    /// Node embeddings being matched.
    pub fn embeddings(&self) -> &EmbeddingTable {
        &self.embeddings
    }
}
