//! Error types for lattix-heads.

use thiserror::Error;

/// Error type for head construction and scoring.
#[derive(Debug, Error)]
pub enum Error {
    /// Candle tensor error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// JSON (config) error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Row id outside an embedding table.
    #[error("{kind} id {index} out of range (table has {len} rows)")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    /// Invalid configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Head name not present in the registry.
    #[error("unknown head: {0}")]
    UnknownHead(String),

    /// Score is undefined for the given inputs (e.g. cosine of a zero vector).
    #[error("degenerate input: {0}")]
    Degenerate(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
