//! Error types for Neuroscreen

use thiserror::Error;

/// Errors that can occur while processing observations or scoring sessions
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Vision analysis failed: {0}")]
    VisionError(String),

    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Insufficient training data: {0}")]
    InsufficientTraining(String),

    #[error("No trained ensemble artifact available")]
    ModelUnavailable,
}
