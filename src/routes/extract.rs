//! Text extraction endpoints for cached sessions
//!
//! - Page text, optionally limited to the first pages (table of contents)
//! - Text between a start and an optional end marker
//! - The pages spanning such a section, rendered as images

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{open_cached, resolve_dpi};
use super::sessions::{render_batch, session_or_not_found, BatchPageError, PageImageResponse};
use crate::document::ImageFormat;
use crate::error::{AppError, Result};
use crate::extract::{join_pages, page_texts, section_pages, section_text};
use crate::state::AppState;

/// Query parameters for text extraction
#[derive(Debug, Deserialize)]
pub struct TextQuery {
    /// Only read the first `limit` pages
    pub limit: Option<usize>,
}

/// Query parameters selecting a section
#[derive(Debug, Deserialize)]
pub struct SectionQuery {
    pub start: String,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SectionImagesQuery {
    pub start: String,
    pub end: Option<String>,
    pub dpi: Option<u32>,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResponse {
    pub session_id: String,
    pub total_pages: usize,
    pub pages_extracted: usize,
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResponse {
    pub session_id: String,
    pub section_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionImagesResponse {
    pub session_id: String,
    pub total_pages: usize,
    pub start_page: usize,
    pub end_page: usize,
    pub images: Vec<PageImageResponse>,
    pub errors: Vec<BatchPageError>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/:id/text", get(extract_text))
        .route("/sessions/:id/section", get(extract_section))
        .route("/sessions/:id/section/pages", get(render_section))
}

fn check_start_marker(start: &str) -> Result<()> {
    if start.is_empty() {
        return Err(AppError::BadRequest("Start marker must not be empty".to_string()));
    }
    Ok(())
}

/// Text of a cached document
async fn extract_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<TextQuery>,
) -> Result<Json<TextResponse>> {
    if query.limit == Some(0) {
        return Err(AppError::BadRequest("limit must be at least 1".to_string()));
    }

    let entry = session_or_not_found(&state, &id)?;
    let source = open_cached(&state, entry.pdf_bytes).await?;

    let pages = page_texts(source.as_ref(), query.limit).await;

    Ok(Json(TextResponse {
        session_id: id,
        total_pages: entry.total_pages,
        pages_extracted: pages.len(),
        text: join_pages(&pages),
    }))
}

/// Text between two markers of a cached document
async fn extract_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SectionQuery>,
) -> Result<Json<SectionResponse>> {
    check_start_marker(&query.start)?;

    let entry = session_or_not_found(&state, &id)?;
    let source = open_cached(&state, entry.pdf_bytes).await?;

    let text = join_pages(&page_texts(source.as_ref(), None).await);
    let section = section_text(&text, &query.start, query.end.as_deref())
        .ok_or_else(|| AppError::MarkerNotFound(query.start.clone()))?;

    tracing::debug!(session_id = %id, chars = section.len(), "Extracted section");

    Ok(Json(SectionResponse {
        session_id: id,
        section_text: section.to_string(),
    }))
}

/// Render the pages spanned by a section of a cached document
async fn render_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SectionImagesQuery>,
) -> Result<Json<SectionImagesResponse>> {
    check_start_marker(&query.start)?;
    let dpi = resolve_dpi(&state, query.dpi)?;
    let format = ImageFormat::from_str_lossy(&query.format);

    let entry = session_or_not_found(&state, &id)?;
    let total_pages = entry.total_pages;
    let source = open_cached(&state, entry.pdf_bytes).await?;

    let pages = page_texts(source.as_ref(), None).await;
    let span = section_pages(&pages, &query.start, query.end.as_deref())
        .ok_or_else(|| AppError::MarkerNotFound(query.start.clone()))?;
    let (start_page, end_page) = (*span.start(), *span.end());

    let (images, errors) =
        render_batch(source.as_ref(), span.collect(), total_pages, dpi, format).await;

    tracing::info!(
        session_id = %id,
        start_page,
        end_page,
        rendered = images.len(),
        "Rendered section pages"
    );

    Ok(Json(SectionImagesResponse {
        session_id: id,
        total_pages,
        start_page,
        end_page,
        images,
        errors,
    }))
}
