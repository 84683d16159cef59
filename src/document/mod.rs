//! Document abstraction
//!
//! Everything the session cache, the classifier and the HTTP layer need from
//! a PDF engine, expressed as traits so the engine stays swappable and the
//! core can be tested without real documents.
//!
//! # Architecture
//!
//! ```text
//!   upload body ──► payload::decode_upload ──► Vec<u8> (PDF bytes)
//!                                                  │
//!                                                  ▼
//!                                    DocumentLoader::load (MuPDF)
//!                                                  │
//!                                                  ▼
//!                      PageSource ── page_text() / render_page()
//!                          │                         │
//!                          ▼                         ▼
//!                    PageClassifier            page image routes
//! ```

mod error;
mod payload;
mod traits;
mod types;

pub use error::{DocumentError, DocumentResult};
pub use payload::decode_upload;
pub use traits::{DocumentLoader, PageSource};
pub use types::{dpi_to_scale, ImageFormat, PageRaster, PDF_BASE64_PREFIX, PDF_MAGIC};
