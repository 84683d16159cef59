//! Document error types
//!
//! Errors raised while decoding uploads, opening documents and talking to
//! the page renderer.

use thiserror::Error;

/// Unified document error type
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Payload is neither a PDF nor base64-encoded PDF
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Payload looked like base64 but did not decode
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    /// MuPDF could not open the document
    #[error("Failed to open document: {0}")]
    Open(String),

    /// Page index outside the document
    #[error("Page index {index} not found (document has {count} pages)")]
    PageNotFound { index: usize, count: usize },

    /// Rendering a page failed
    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    /// Extracting text from a page failed
    #[error("Failed to extract text from page {page}: {message}")]
    TextExtraction { page: usize, message: String },

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Blocking task panicked or was cancelled
    #[error("Task join error: {0}")]
    Task(String),

    /// MuPDF error without page context
    #[error("MuPDF error: {0}")]
    MuPdf(String),
}

/// Result type alias for document operations
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

impl From<mupdf::Error> for DocumentError {
    fn from(err: mupdf::Error) -> Self {
        DocumentError::MuPdf(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DocumentError {
    fn from(err: tokio::task::JoinError) -> Self {
        DocumentError::Task(err.to_string())
    }
}
