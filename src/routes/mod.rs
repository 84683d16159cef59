//! HTTP routes
//!
//! - `/health`: liveness probe
//! - `/api/v1/pdf/sessions`: upload once, then render and classify by session id
//! - `/api/v1/pdf/sessions/:id/{text,section}`: text and section extraction
//! - `/api/v1/pdf/classify`: one-shot classification of an uploaded body
//! - `/api/v1/pdf/cache/stats`: session cache occupancy

pub mod classify;
pub mod extract;
pub mod health;
pub mod sessions;

use std::sync::Arc;

use axum::{body::Bytes, extract::DefaultBodyLimit, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::MIN_DPI;
use crate::document::{decode_upload, PageSource};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_body = state.config().server.max_body_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .nest("/api/v1/pdf", pdf_router())
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Routes mounted under `/api/v1/pdf`
pub fn pdf_router() -> Router<AppState> {
    Router::new()
        .merge(sessions::router())
        .merge(extract::router())
        .merge(classify::router())
}

/// A decoded and opened upload
pub(crate) struct LoadedDocument {
    pub bytes: Arc<Vec<u8>>,
    pub source: Arc<dyn PageSource>,
}

/// Decode a request body (raw or base64 PDF) and open it
///
/// With `max_bytes` set, oversized documents are rejected before MuPDF
/// ever sees them.
pub(crate) async fn load_upload(
    state: &AppState,
    body: Bytes,
    max_bytes: Option<u64>,
) -> Result<LoadedDocument> {
    let loader = state.loader();

    // Base64 decoding and opening are both CPU-bound
    tokio::task::spawn_blocking(move || -> Result<LoadedDocument> {
        let bytes = Arc::new(decode_upload(&body)?);
        drop(body);

        if let Some(limit) = max_bytes {
            let size = bytes.len() as u64;
            if size > limit {
                return Err(AppError::TooLarge { size, limit });
            }
        }

        let source = loader.load(Arc::clone(&bytes))?;
        Ok(LoadedDocument { bytes, source })
    })
    .await
    .map_err(|e| AppError::Internal(format!("Upload task failed: {}", e)))?
}

/// Reopen bytes that are already known to be a valid PDF
pub(crate) async fn open_cached(state: &AppState, bytes: Arc<Vec<u8>>) -> Result<Arc<dyn PageSource>> {
    let loader = state.loader();

    tokio::task::spawn_blocking(move || loader.load(bytes).map_err(AppError::from))
        .await
        .map_err(|e| AppError::Internal(format!("Open task failed: {}", e)))?
}

/// Requested DPI, or the configured default, checked against the allowed range
pub(crate) fn resolve_dpi(state: &AppState, requested: Option<u32>) -> Result<u32> {
    let render = &state.config().render;
    let dpi = requested.unwrap_or(render.default_dpi);

    if !(MIN_DPI..=render.max_dpi).contains(&dpi) {
        return Err(AppError::BadRequest(format!(
            "DPI must be between {} and {}, got {}",
            MIN_DPI, render.max_dpi, dpi
        )));
    }

    Ok(dpi)
}
