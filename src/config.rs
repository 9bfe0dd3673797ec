//! Config-driven head construction.
//!
//! ```rust,ignore
//! use lattix_heads::{build_head, HeadConfig};
//!
//! let config = HeadConfig::from_json(r#"{ "kind": "LinkPrediction", "norm": "l1" }"#)?;
//! let head = build_head(&config, nodes, Some(relations), vb)?;
//! ```

use crate::embeddings::EmbeddingTable;
use crate::error::{Error, Result};
use crate::heads::{
    Head, HeadKind, LinkPrediction, NodeClassifier, NodeMatching, Norm, RelationPrediction,
};
use crate::similarity::SimilarityKind;
use candle_nn::VarBuilder;
use serde::{Deserialize, Serialize};

/// Head configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadConfig {
    /// Which head to build.
    pub kind: HeadKind,
    /// Output classes (classifier only).
    #[serde(default)]
    pub num_classes: Option<usize>,
    /// Similarity for node matching (default: cosine).
    #[serde(default)]
    pub similarity: SimilarityKind,
    /// Distance norm for translational heads (default: l2).
    #[serde(default)]
    pub norm: Norm,
}

impl HeadConfig {
    /// Config for `kind` with default similarity and norm.
    pub fn new(kind: HeadKind) -> Self {
        Self {
            kind,
            num_classes: None,
            similarity: SimilarityKind::default(),
            norm: Norm::default(),
        }
    }

    /// Set the classifier output width.
    pub fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = Some(num_classes);
        self
    }

    /// Set the node matching similarity.
    pub fn with_similarity(mut self, similarity: SimilarityKind) -> Self {
        self.similarity = similarity;
        self
    }

    /// Set the translational distance norm.
    pub fn with_norm(mut self, norm: Norm) -> Self {
        self.norm = norm;
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check fields required by `kind`.
    pub fn validate(&self) -> Result<()> {
        if self.kind == HeadKind::NodeClassifier {
            match self.num_classes {
                None => {
                    return Err(Error::InvalidConfig(
                        "NodeClassifier requires num_classes".into(),
                    ))
                }
                Some(0) => {
                    return Err(Error::InvalidConfig(
                        "num_classes must be positive".into(),
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Build the head described by `config`.
///
/// `relations` is required for link and relation prediction and ignored
/// otherwise. `vb` supplies the classifier weights.
pub fn build_head(
    config: &HeadConfig,
    nodes: EmbeddingTable,
    relations: Option<EmbeddingTable>,
    vb: VarBuilder,
) -> Result<Head> {
    config.validate()?;
    tracing::debug!(kind = %config.kind, "building head from config");

    let head = match (config.kind, relations) {
        (HeadKind::NodeClassifier, _) => {
            let num_classes = config.num_classes.unwrap_or_default();
            Head::NodeClassifier(NodeClassifier::new(nodes, num_classes, vb)?)
        }
        (HeadKind::NodeMatching, _) => {
            Head::NodeMatching(NodeMatching::with_similarity(nodes, config.similarity.into()))
        }
        (HeadKind::LinkPrediction, Some(relations)) => {
            Head::LinkPrediction(LinkPrediction::new(nodes, relations)?.with_norm(config.norm))
        }
        (HeadKind::RelationPrediction, Some(relations)) => Head::RelationPrediction(
            RelationPrediction::new(nodes, relations)?.with_norm(config.norm),
        ),
        (kind, None) => {
            return Err(Error::InvalidConfig(format!(
                "{kind} requires relation embeddings"
            )))
        }
    };
    Ok(head)
}
