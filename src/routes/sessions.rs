//! Session endpoints
//!
//! Upload a PDF once, then render pages and classify it by session id:
//! - Upload (optionally classifying in the same call)
//! - Render a single page as binary or base64
//! - Batch render several pages
//! - Extract page text and marker-delimited sections
//! - Delete a session and inspect cache stats

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use super::{load_upload, open_cached, resolve_dpi, LoadedDocument};
use crate::classifier::ClassificationResult;
use crate::document::{ImageFormat, PageSource};
use crate::error::{AppError, Result};
use crate::session::{CacheEntry, CacheStats};
use crate::state::AppState;

/// Renders in flight for one batch request
const BATCH_RENDER_CONCURRENCY: usize = 4;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Upload response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub total_pages: usize,
    pub expires_in_seconds: u64,
    /// Expiry if the session is not accessed again
    pub expires_at: DateTime<Utc>,
}

/// Upload + classify response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClassifyResponse {
    #[serde(flatten)]
    pub session: SessionResponse,
    pub classification: ClassificationResult,
}

/// Classification of an existing session
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedClassifyResponse {
    pub session_id: String,
    pub classification: ClassificationResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub session_id: String,
    pub deleted: bool,
}

/// How a single page image is returned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageEncoding {
    /// Raw image body with metadata in headers
    #[default]
    Binary,
    /// JSON with the image as base64
    Base64,
}

/// Query parameters for page rendering
#[derive(Debug, Deserialize)]
pub struct PageRenderQuery {
    /// Render resolution; defaults to the configured DPI
    pub dpi: Option<u32>,
    #[serde(default)]
    pub encoding: PageEncoding,
    /// Output format (png, jpeg)
    #[serde(default)]
    pub format: String,
}

/// Query parameters for batch page rendering
#[derive(Debug, Deserialize)]
pub struct BatchRenderQuery {
    /// Comma-separated page numbers (e.g. "1,3,5"); all pages when absent
    pub pages: Option<String>,
    pub dpi: Option<u32>,
    #[serde(default)]
    pub format: String,
}

/// A rendered page, base64-encoded
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageImageResponse {
    pub page: usize,
    pub total_pages: usize,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub image_base64: String,
}

/// Batch render response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRenderResponse {
    pub session_id: String,
    pub total_pages: usize,
    pub images: Vec<PageImageResponse>,
    /// Pages that were out of range or failed to render
    pub errors: Vec<BatchPageError>,
}

/// Error for individual page in batch
#[derive(Debug, Serialize)]
pub struct BatchPageError {
    pub page: usize,
    pub error: String,
}

struct RenderedPage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(upload_session))
        .route("/sessions/classify", post(upload_and_classify))
        .route("/sessions/:id", delete(delete_session))
        .route("/sessions/:id/classify", post(classify_session))
        .route("/sessions/:id/pages", get(batch_render_pages))
        .route("/sessions/:id/pages/:page", get(render_page))
        .route("/cache/stats", get(cache_stats))
}

// ============================================================================
// Helpers
// ============================================================================

pub(super) fn session_or_not_found(state: &AppState, id: &str) -> Result<CacheEntry> {
    state
        .sessions()
        .get(id)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
}

fn check_page(page: usize, total_pages: usize) -> Result<()> {
    if page == 0 || page > total_pages {
        return Err(AppError::PageOutOfRange { page, total_pages });
    }
    Ok(())
}

/// Decode, open and cache an upload
async fn store_upload(state: &AppState, body: Bytes) -> Result<(LoadedDocument, SessionResponse)> {
    let cache = state.sessions();
    let limit = cache.config().effective_entry_limit();

    let document = load_upload(state, body, Some(limit)).await?;
    let total_pages = document.source.page_count();
    let session_id = cache.store(document.bytes.clone(), total_pages)?;

    let ttl = cache.config().ttl;
    let response = SessionResponse {
        session_id,
        total_pages,
        expires_in_seconds: ttl.as_secs(),
        expires_at: Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64),
    };

    Ok((document, response))
}

/// Render one page (1-indexed) and encode it
async fn render_encoded(
    source: &dyn PageSource,
    page: usize,
    dpi: u32,
    format: ImageFormat,
) -> Result<RenderedPage> {
    let raster = source.render_page(page - 1, dpi).await?;
    let (width, height) = (raster.width, raster.height);

    let data = tokio::task::spawn_blocking(move || raster.encode(format))
        .await
        .map_err(|e| AppError::Internal(format!("Encode task failed: {}", e)))??;

    Ok(RenderedPage {
        width,
        height,
        data,
    })
}

/// Render pages (1-indexed) as base64 images, preserving request order
///
/// Out-of-range and failed pages end up in the error list.
pub(super) async fn render_batch(
    source: &dyn PageSource,
    page_numbers: Vec<usize>,
    total_pages: usize,
    dpi: u32,
    format: ImageFormat,
) -> (Vec<PageImageResponse>, Vec<BatchPageError>) {
    let results: Vec<(usize, Result<RenderedPage>)> = stream::iter(page_numbers)
        .map(|page| async move {
            let rendered = match check_page(page, total_pages) {
                Ok(()) => render_encoded(source, page, dpi, format).await,
                Err(e) => Err(e),
            };
            (page, rendered)
        })
        .buffered(BATCH_RENDER_CONCURRENCY)
        .collect()
        .await;

    let mut images = Vec::with_capacity(results.len());
    let mut errors = Vec::new();

    for (page, rendered) in results {
        match rendered {
            Ok(rendered) => images.push(PageImageResponse {
                page,
                total_pages,
                width: rendered.width,
                height: rendered.height,
                format,
                image_base64: BASE64.encode(&rendered.data),
            }),
            Err(e) => errors.push(BatchPageError {
                page,
                error: e.to_string(),
            }),
        }
    }

    (images, errors)
}

/// Parse "1, 3,5" into page numbers; blank items are skipped
fn parse_page_list(pages: &str) -> Result<Vec<usize>> {
    pages
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| AppError::BadRequest(format!("Invalid page number: '{}'", s)))
        })
        .collect()
}

// ============================================================================
// Handlers
// ============================================================================

/// Upload a PDF and open a session
async fn upload_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SessionResponse>> {
    let (_, response) = store_upload(&state, body).await?;
    Ok(Json(response))
}

/// Upload a PDF, open a session and classify its pages
async fn upload_and_classify(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SessionClassifyResponse>> {
    let (document, session) = store_upload(&state, body).await?;
    let classification = state.classifier().classify(document.source.as_ref()).await;

    Ok(Json(SessionClassifyResponse {
        session,
        classification,
    }))
}

/// Classify a cached document
async fn classify_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CachedClassifyResponse>> {
    let entry = session_or_not_found(&state, &id)?;
    let source = open_cached(&state, entry.pdf_bytes).await?;
    let classification = state.classifier().classify(source.as_ref()).await;

    Ok(Json(CachedClassifyResponse {
        session_id: id,
        classification,
    }))
}

/// Render a page of a cached document
async fn render_page(
    State(state): State<AppState>,
    Path((id, page)): Path<(String, usize)>,
    Query(query): Query<PageRenderQuery>,
) -> Result<Response> {
    let dpi = resolve_dpi(&state, query.dpi)?;
    let format = ImageFormat::from_str_lossy(&query.format);

    let entry = session_or_not_found(&state, &id)?;
    check_page(page, entry.total_pages)?;

    let source = open_cached(&state, entry.pdf_bytes).await?;
    let rendered = render_encoded(source.as_ref(), page, dpi, format).await?;

    tracing::debug!(
        session_id = %id,
        page,
        dpi,
        bytes = rendered.data.len(),
        "Rendered page"
    );

    match query.encoding {
        PageEncoding::Base64 => Ok(Json(PageImageResponse {
            page,
            total_pages: entry.total_pages,
            width: rendered.width,
            height: rendered.height,
            format,
            image_base64: BASE64.encode(&rendered.data),
        })
        .into_response()),
        PageEncoding::Binary => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, format.content_type())
            .header("X-Page", page)
            .header("X-Total-Pages", entry.total_pages)
            .header("X-Image-Width", rendered.width)
            .header("X-Image-Height", rendered.height)
            .body(Body::from(rendered.data))
            .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e))),
    }
}

/// Render several pages of a cached document
///
/// Out-of-range and failed pages are reported in `errors` instead of
/// failing the whole request.
async fn batch_render_pages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<BatchRenderQuery>,
) -> Result<Json<BatchRenderResponse>> {
    let dpi = resolve_dpi(&state, query.dpi)?;
    let format = ImageFormat::from_str_lossy(&query.format);

    let entry = session_or_not_found(&state, &id)?;
    let total_pages = entry.total_pages;

    let page_numbers = match query.pages.as_deref() {
        Some(list) => parse_page_list(list)?,
        None => (1..=total_pages).collect(),
    };

    let source = open_cached(&state, entry.pdf_bytes).await?;
    let (images, errors) =
        render_batch(source.as_ref(), page_numbers, total_pages, dpi, format).await;

    tracing::info!(
        session_id = %id,
        rendered = images.len(),
        failed = errors.len(),
        "Batch rendered pages"
    );

    Ok(Json(BatchRenderResponse {
        session_id: id,
        total_pages,
        images,
        errors,
    }))
}

/// Delete a session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.sessions().delete(&id) {
        return Err(AppError::SessionNotFound(id));
    }

    Ok(Json(DeleteResponse {
        session_id: id,
        deleted: true,
    }))
}

/// Session cache statistics
async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.sessions().stats())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_list() {
        assert_eq!(parse_page_list("1,3, 5").unwrap(), vec![1, 3, 5]);
        assert_eq!(parse_page_list(" 2 ,, ").unwrap(), vec![2]);
        assert!(parse_page_list("").unwrap().is_empty());
        assert!(matches!(
            parse_page_list("1,two"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_check_page() {
        assert!(check_page(1, 3).is_ok());
        assert!(check_page(3, 3).is_ok());
        assert!(matches!(
            check_page(0, 3),
            Err(AppError::PageOutOfRange { page: 0, total_pages: 3 })
        ));
        assert!(check_page(4, 3).is_err());
    }

    #[test]
    fn test_page_query_defaults() {
        let query: PageRenderQuery = serde_urlencoded_from("dpi=96");
        assert_eq!(query.dpi, Some(96));
        assert_eq!(query.encoding, PageEncoding::Binary);

        let query: PageRenderQuery = serde_urlencoded_from("encoding=base64&format=jpeg");
        assert_eq!(query.encoding, PageEncoding::Base64);
        assert_eq!(ImageFormat::from_str_lossy(&query.format), ImageFormat::Jpeg);
    }

    fn serde_urlencoded_from<T: serde::de::DeserializeOwned>(qs: &str) -> T {
        let uri: axum::http::Uri = format!("/?{}", qs).parse().unwrap();
        Query::<T>::try_from_uri(&uri).unwrap().0
    }
}
