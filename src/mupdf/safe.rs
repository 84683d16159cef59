//! Thread-safe document wrapper for MuPDF
//!
//! MuPDF's `fz_context` is not thread-safe, so no MuPDF object is ever
//! shared. The wrapper only keeps the raw bytes; every operation opens a
//! fresh `mupdf::Document`, uses it inside a closure and drops it before
//! returning. Two operations on the same bytes may therefore run on two
//! blocking threads at once.

use std::sync::Arc;

use mupdf::Document;

use crate::document::{DocumentError, DocumentResult};

const PDF_MIME: &str = "application/pdf";

/// Immutable PDF bytes plus the page count computed when they were opened
#[derive(Clone)]
pub struct SafeDocument {
    data: Arc<Vec<u8>>,
    page_count: usize,
}

impl SafeDocument {
    /// Open the bytes once to validate them and count pages
    pub fn from_bytes(data: Arc<Vec<u8>>) -> DocumentResult<Self> {
        let doc = Document::from_bytes(&data, PDF_MIME)
            .map_err(|e| DocumentError::Open(e.to_string()))?;
        let page_count = doc
            .page_count()
            .map_err(|e| DocumentError::Open(e.to_string()))?;

        Ok(Self {
            data,
            page_count: page_count.max(0) as usize,
        })
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Execute a closure against a freshly opened document
    ///
    /// ```ignore
    /// let bounds = safe_doc.with_doc(|doc| {
    ///     let page = doc.load_page(0)?;
    ///     Ok(page.bounds()?)
    /// })?;
    /// ```
    pub fn with_doc<F, R>(&self, f: F) -> DocumentResult<R>
    where
        F: FnOnce(&Document) -> DocumentResult<R>,
    {
        let doc = Document::from_bytes(&self.data, PDF_MIME)?;
        f(&doc)
    }

    /// Same as [`with_doc`](Self::with_doc) after checking the page index
    pub fn with_page<F, R>(&self, page_index: usize, f: F) -> DocumentResult<R>
    where
        F: FnOnce(&mupdf::Page) -> DocumentResult<R>,
    {
        if page_index >= self.page_count {
            return Err(DocumentError::PageNotFound {
                index: page_index,
                count: self.page_count,
            });
        }

        self.with_doc(|doc| {
            let page = doc.load_page(page_index as i32)?;
            f(&page)
        })
    }
}
