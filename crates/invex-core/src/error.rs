//! Error types for the invex-core library.

use thiserror::Error;

/// Message surfaced when a PDF yields no text at all (scanned or image-only).
pub const NO_TEXT_MESSAGE: &str = "No text could be extracted from this PDF.";

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// The uploaded file was rejected before processing.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the PDF layout engine.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The file could not be read from disk.
    #[error("failed to open PDF: {0}")]
    Open(#[from] std::io::Error),

    /// Failed to parse the PDF structure.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// The error alternative to an extracted invoice record.
///
/// Every failure of a single extraction request ends up here; the `Display`
/// output is the message shown to the caller.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The layout engine could not open or decode the file.
    #[error("{0}")]
    Unreadable(#[from] PdfError),

    /// The document parsed but carried no text.
    #[error("{}", NO_TEXT_MESSAGE)]
    NoText,

    /// Any other failure caught at the request boundary.
    #[error("{0}")]
    Unexpected(String),
}

impl ExtractionError {
    /// Human-readable message for the `{error: ...}` response body.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unexpected failure during extraction".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_text_message() {
        assert_eq!(
            ExtractionError::NoText.message(),
            "No text could be extracted from this PDF."
        );
    }

    #[test]
    fn test_unreadable_surfaces_engine_message() {
        let err = ExtractionError::from(PdfError::Parse("bad xref".to_string()));
        assert_eq!(err.message(), "failed to parse PDF: bad xref");
    }
}
