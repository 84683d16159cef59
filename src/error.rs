//! Error types for the HTTP boundary

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::document::DocumentError;
use crate::session::CacheError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported format: {0}")]
    Format(String),

    #[error("Document too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("Session not found or expired: {0}")]
    SessionNotFound(String),

    #[error("Start marker not found in document: '{0}'")]
    MarkerNotFound(String),

    #[error("Page {page} out of range (valid: 1-{total_pages})")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Format(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::SessionNotFound(_) | AppError::MarkerNotFound(_) => StatusCode::NOT_FOUND,
            AppError::PageOutOfRange { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Render { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Format(_) => "unsupported_format",
            AppError::TooLarge { .. } => "too_large",
            AppError::SessionNotFound(_) => "session_not_found",
            AppError::MarkerNotFound(_) => "marker_not_found",
            AppError::PageOutOfRange { .. } => "page_out_of_range",
            AppError::Render { .. } => "render_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::UnsupportedFormat(msg) => AppError::Format(msg),
            DocumentError::InvalidBase64(msg) => {
                AppError::Format(format!("Invalid base64 PDF payload: {}", msg))
            }
            DocumentError::Open(msg) => AppError::Format(format!("Could not open PDF: {}", msg)),
            DocumentError::PageNotFound { index, count } => AppError::PageOutOfRange {
                page: index + 1,
                total_pages: count,
            },
            DocumentError::Render { page, message } => AppError::Render { page, message },
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::TooLarge { size, limit } => AppError::TooLarge { size, limit },
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.error_code(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
