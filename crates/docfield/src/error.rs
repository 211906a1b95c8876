//! Engine error type

use docfield_detect::DetectError;
use docfield_pdfium::PdfError;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, FieldError>;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Detect(#[from] DetectError),

    /// Input is neither a PDF nor a decodable image
    #[error("Unsupported input: {0}")]
    Format(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FieldError {
    /// Errors that make every remaining page of a document unusable
    #[must_use]
    pub fn is_fatal_for_document(&self) -> bool {
        match self {
            FieldError::Pdf(err) => err.is_fatal_for_document(),
            FieldError::Detect(err) => err.is_model_load(),
            FieldError::Format(_) | FieldError::Config(_) => true,
        }
    }
}
