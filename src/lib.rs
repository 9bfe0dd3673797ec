//! Task heads over precomputed knowledge graph embeddings.
//!
//! A KGE model (TransE, trained in PyKEEN, PyG or a candle loop) leaves
//! behind two matrices: one row per entity and one row per relation. The
//! heads in this crate turn those matrices into answers for downstream
//! tasks:
//!
//! | Task | Head | Scoring |
//! |------|------|---------|
//! | Node classification | [`NodeClassifier`] | softmax(W e + b) |
//! | Node matching | [`NodeMatching`] | cosine (pluggable) |
//! | Link prediction | [`LinkPrediction`] | ‖h + r - t‖ over all heads/tails |
//! | Relation prediction | [`RelationPrediction`] | ‖h + r - t‖ over all relations |
//!
//! ## TransE distances
//!
//! If (h, r, t) is true then h + r ≈ t, so the translational heads report
//! a **distance** (lower = more plausible), not a negated score.
//!
//! ```text
//!   h ----r----> t
//!  [0.2, 0.5] + [0.3, 0.1] ≈ [0.5, 0.6]
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lattix_heads::{EmbeddingKind, EmbeddingTable, LinkPrediction};
//! use candle_core::Device;
//!
//! let device = Device::Cpu;
//! let nodes =
//!     EmbeddingTable::from_vecs(&node_data, num_nodes, dim, EmbeddingKind::Node, &device)?;
//! let relations =
//!     EmbeddingTable::from_vecs(&rel_data, num_rels, dim, EmbeddingKind::Relation, &device)?;
//!
//! let head = LinkPrediction::new(nodes, relations)?;
//! let scores = head.forward(einstein, won, nobel_prize)?;
//! let rank = scores.tail_rank(nobel_prize)?;
//! let top = head.rank_tails(einstein, won, 10)?;
//! ```
//!
//! Heads can also be built from a JSON [`HeadConfig`] via [`build_head`].

pub mod config;
pub mod embeddings;
pub mod error;
pub mod heads;
pub mod similarity;

pub use config::{build_head, HeadConfig};
pub use embeddings::{EmbeddingKind, EmbeddingTable};
pub use error::{Error, Result};
pub use heads::{
    ClassPrediction, Head, HeadKind, LinkPrediction, LinkScores, Match, NodeClassifier,
    NodeMatching, Norm, Ranked, RankedEntity, RankedRelation, RelationPrediction,
};
pub use similarity::{Similarity, SimilarityFn, SimilarityKind};
