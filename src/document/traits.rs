//! Page renderer traits
//!
//! The classifier and the HTTP layer only ever see these traits; the MuPDF
//! implementation lives in `crate::mupdf`.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::DocumentResult;
use super::types::PageRaster;

/// An opened document that can produce page text and page rasters.
///
/// Page indices are 0-based.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Extract plain text from a page
    async fn page_text(&self, page_index: usize) -> DocumentResult<String>;

    /// Render a page to an RGB raster at the given resolution
    async fn render_page(&self, page_index: usize, dpi: u32) -> DocumentResult<PageRaster>;
}

/// Opens raw document bytes into a [`PageSource`].
///
/// Invalid or corrupt documents are rejected here, before any
/// classification or rendering happens.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, data: Arc<Vec<u8>>) -> DocumentResult<Arc<dyn PageSource>>;
}
