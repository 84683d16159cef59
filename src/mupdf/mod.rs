//! Low-level MuPDF wrapper
//!
//! Implements [`DocumentLoader`](crate::document::DocumentLoader) and
//! [`PageSource`](crate::document::PageSource) on top of the `mupdf` crate.
//!
//! # Thread Safety
//!
//! MuPDF's `fz_context` is **NOT thread-safe**. [`SafeDocument`] keeps only the
//! raw bytes and opens a fresh document per operation on a blocking thread,
//! so page renders for the same upload can proceed in parallel.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bms_pdf_server::mupdf::MupdfLoader;
//!
//! let doc = MupdfLoader.load(Arc::new(pdf_bytes))?;
//! let text = doc.page_text(0).await?;
//! let raster = doc.render_page(0, 150).await?;
//! ```

mod backend;
mod safe;

pub use backend::MupdfLoader;
pub use safe::SafeDocument;
