//! One-shot classification endpoint

use axum::{body::Bytes, extract::State, routing::post, Json, Router};

use super::load_upload;
use crate::classifier::ClassificationResult;
use crate::error::Result;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/classify", post(classify_document))
}

/// Classify the pages of an uploaded PDF without caching it
async fn classify_document(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ClassificationResult>> {
    let document = load_upload(&state, body, None).await?;

    tracing::info!(
        size_bytes = document.bytes.len(),
        total_pages = document.source.page_count(),
        "Classifying uploaded document"
    );

    let result = state.classifier().classify(document.source.as_ref()).await;
    Ok(Json(result))
}
