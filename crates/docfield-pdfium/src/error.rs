//! Error types for docfield-pdfium

use thiserror::Error;

/// Result type for page binding operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors reported by the page binding.
///
/// Native error codes never leave this crate: every backend translates its
/// failures into one of these variants at the binding boundary.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Document bytes could not be parsed
    #[error("Unparseable or corrupt document: {reason}")]
    Format { reason: String },

    /// Encrypted document opened with a wrong or missing password
    #[error("Document is encrypted and the password is missing or wrong")]
    Password,

    /// Document file could not be found or read
    #[error("File not found or unreadable: {path}")]
    File { path: String },

    /// Operation on a document or page that has already been closed
    #[error("{resource} has already been closed")]
    ClosedResource { resource: &'static str },

    /// Page index outside the document
    #[error("Page index {index} out of range (document has {count} pages)")]
    OutOfRange { index: usize, count: usize },

    /// Native library reported a non-specific failure
    #[error("Native library failure: {context}")]
    Unknown { context: String },

    /// The PDFium shared library could not be located or bound
    #[error("PDFium library unavailable: {reason}")]
    LibraryUnavailable { reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PdfError {
    /// Whether this error applies to the whole document rather than a single page.
    ///
    /// A batch over pages keeps going after page-level failures but must stop
    /// on these.
    #[must_use]
    pub fn is_fatal_for_document(&self) -> bool {
        matches!(
            self,
            PdfError::Password | PdfError::ClosedResource { .. } | PdfError::LibraryUnavailable { .. }
        )
    }

    pub(crate) fn closed(resource: &'static str) -> Self {
        PdfError::ClosedResource { resource }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = PdfError::OutOfRange { index: 7, count: 3 };
        assert_eq!(
            err.to_string(),
            "Page index 7 out of range (document has 3 pages)"
        );
    }

    #[test]
    fn test_closed_resource_display() {
        let err = PdfError::closed("Page");
        assert_eq!(err.to_string(), "Page has already been closed");
    }

    #[test]
    fn test_password_is_fatal() {
        assert!(PdfError::Password.is_fatal_for_document());
        assert!(PdfError::closed("Document").is_fatal_for_document());
    }

    #[test]
    fn test_page_errors_are_not_fatal() {
        assert!(!PdfError::OutOfRange { index: 1, count: 1 }.is_fatal_for_document());
        assert!(!PdfError::Unknown {
            context: "render".to_string()
        }
        .is_fatal_for_document());
        assert!(!PdfError::Format {
            reason: "bad xref".to_string()
        }
        .is_fatal_for_document());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PdfError = io.into();
        assert!(matches!(err, PdfError::Io(_)));
    }
}
