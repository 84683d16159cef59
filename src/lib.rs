//! BMS PDF Server Library
//!
//! Session-cached PDF page rendering and drawing-set page classification.
//! The server binary is in main.rs.
//!
//! # Modules
//!
//! - `session`: TTL and size-bounded in-memory cache of uploaded PDFs
//! - `classifier`: Three-tier page classifier (index, title, visual)
//! - `extract`: Page text and marker-delimited sections
//! - `document`: Page renderer abstraction and upload decoding
//! - `mupdf`: MuPDF-backed renderer
//! - `routes`: axum HTTP surface

pub mod classifier;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod mupdf;
pub mod routes;
pub mod session;
pub mod state;

pub use classifier::{ClassificationResult, PageClassifier};
pub use config::Config;
pub use session::SessionCache;
pub use state::AppState;
