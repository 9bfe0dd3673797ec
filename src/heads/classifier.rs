//! Node classification: a linear layer over node embeddings followed by a
//! softmax over the class axis.
//!
//! ```text
//! p(class | node) = softmax(W e_node + b)
//! ```

use crate::embeddings::EmbeddingTable;
use crate::error::{Error, Result};
use candle_core::{Tensor, D};
use candle_nn::{linear, Linear, Module, VarBuilder};
use serde::{Deserialize, Serialize};

/// Most likely class for a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassPrediction {
    /// Class index.
    pub class: usize,
    /// Softmax probability of that class.
    pub probability: f32,
}

/// Linear classifier over precomputed node embeddings.
#[derive(Debug)]
pub struct NodeClassifier {
    embeddings: EmbeddingTable,
    classifier: Linear,
    num_classes: usize,
}

impl NodeClassifier {
    /// Create a classifier with a fresh `dim -> num_classes` linear layer.
    ///
    /// Weights come from `vb`: a `VarMap`-backed builder gives trainable,
    /// randomly initialised parameters.
    pub fn new(embeddings: EmbeddingTable, num_classes: usize, vb: VarBuilder) -> Result<Self> {
        if num_classes == 0 {
            return Err(Error::InvalidConfig(
                "node classifier needs at least one class".into(),
            ));
        }
        let classifier = linear(embeddings.dim(), num_classes, vb)?;
        tracing::debug!(
            nodes = embeddings.len(),
            dim = embeddings.dim(),
            num_classes,
            "built node classifier"
        );
        Ok(Self {
            embeddings,
            classifier,
            num_classes,
        })
    }

    /// Create a classifier around an existing linear layer.
    pub fn from_linear(embeddings: EmbeddingTable, classifier: Linear) -> Result<Self> {
        let (num_classes, in_features) = classifier.weight().dims2()?;
        if in_features != embeddings.dim() {
            return Err(Error::DimensionMismatch {
                expected: embeddings.dim(),
                got: in_features,
            });
        }
        if num_classes == 0 {
            return Err(Error::InvalidConfig(
                "node classifier needs at least one class".into(),
            ));
        }
        Ok(Self {
            embeddings,
            classifier,
            num_classes,
        })
    }

    /// Pre-softmax class scores, shape `(num_classes,)`.
    pub fn logits(&self, node_id: usize) -> Result<Tensor> {
        // Linear needs a batch axis
        let x = self.embeddings.row(node_id)?.unsqueeze(0)?;
        Ok(self.classifier.forward(&x)?.squeeze(0)?)
    }

    /// Class probabilities for one node, shape `(num_classes,)`.
    pub fn forward(&self, node_id: usize) -> Result<Tensor> {
        tracing::trace!(node_id, "node classifier forward");
        let logits = self.logits(node_id)?;
        Ok(candle_nn::ops::softmax(&logits, D::Minus1)?)
    }

    /// Class probabilities for several nodes, shape `(n, num_classes)`.
    pub fn forward_batch(&self, node_ids: &[usize]) -> Result<Tensor> {
        let x = self.embeddings.rows(node_ids)?;
        let logits = self.classifier.forward(&x)?;
        Ok(candle_nn::ops::softmax(&logits, D::Minus1)?)
    }

    /// Argmax class for one node.
    pub fn predict(&self, node_id: usize) -> Result<ClassPrediction> {
        let probs = self.forward(node_id)?.to_vec1::<f32>()?;
        probs
            .into_iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(class, probability)| ClassPrediction { class, probability })
            .ok_or_else(|| Error::Degenerate("classifier produced no classes".into()))
    }

    /// Number of output classes.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Node embeddings being classified.
    pub fn embeddings(&self) -> &EmbeddingTable {
        &self.embeddings
    }

    /// The underlying linear layer.
    pub fn linear(&self) -> &Linear {
        &self.classifier
    }
}
