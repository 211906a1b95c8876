//! Error types for field detection

use thiserror::Error;

/// Result type for detection operations
pub type Result<T> = std::result::Result<T, DetectError>;

/// Errors raised while loading or running a detection model
#[derive(Debug, Error)]
pub enum DetectError {
    /// Model file missing or rejected by the runtime
    #[error("Failed to load model {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    /// Runtime failure or unexpected output layout
    #[error("Inference error: {0}")]
    Inference(String),

    /// Input image could not be turned into a tensor
    #[error("Preprocessing error: {0}")]
    Preprocessing(String),
}

impl DetectError {
    #[must_use]
    pub fn is_model_load(&self) -> bool {
        matches!(self, DetectError::ModelLoad { .. })
    }
}
