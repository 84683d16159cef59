//! Classification types

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Pages scanned for a drawing index
pub const INDEX_SCAN_PAGES: usize = 5;

/// Resolution used by the visual fallback (unscaled)
pub const VISUAL_DPI: u32 = 72;

/// Renders in flight during the visual fallback
pub const VISUAL_CONCURRENCY: usize = 4;

// ============================================================================
// Page Types
// ============================================================================

/// What a page (or an index entry) depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    /// Piping and instrumentation diagram / schematic
    Pid,
    /// Plan, elevation or general arrangement
    Layout,
    /// Drawing index / table of contents
    Index,
    /// Symbol legend
    Legend,
    Unknown,
}

/// One line item of a drawing index, e.g. `M602 MECHANICAL PIPEWORK SCHEMATICS`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingEntry {
    /// Drawing code (`M602`)
    pub number: String,
    /// Drawing title
    pub name: String,
    pub page_type: PageType,
}

// ============================================================================
// Results
// ============================================================================

/// Cascade tier that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMethod {
    Index,
    Title,
    Visual,
}

impl ClassificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationMethod::Index => "index",
            ClassificationMethod::Title => "title",
            ClassificationMethod::Visual => "visual",
        }
    }
}

/// Page lists per category (1-indexed page numbers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub total_pages: usize,
    pub index_page: Option<usize>,
    pub pid_pages: Vec<usize>,
    pub layout_pages: Vec<usize>,
    pub unknown_pages: Vec<usize>,
    pub method_used: ClassificationMethod,
    pub processing_time_ms: f64,
}

impl ClassificationResult {
    pub(super) fn new(total_pages: usize, method_used: ClassificationMethod) -> Self {
        Self {
            total_pages,
            index_page: None,
            pid_pages: Vec::new(),
            layout_pages: Vec::new(),
            unknown_pages: Vec::new(),
            method_used,
            processing_time_ms: 0.0,
        }
    }

    /// File a page under its category; index and legend pages are not listed
    pub(super) fn push(&mut self, page_number: usize, page_type: PageType) {
        match page_type {
            PageType::Pid => self.pid_pages.push(page_number),
            PageType::Layout => self.layout_pages.push(page_number),
            PageType::Unknown => self.unknown_pages.push(page_number),
            PageType::Index | PageType::Legend => {}
        }
    }

    /// Number of pages that ended up in one of the three lists
    pub fn classified_count(&self) -> usize {
        self.pid_pages.len() + self.layout_pages.len() + self.unknown_pages.len()
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Classifier tuning
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Leading pages searched for a drawing index
    pub index_scan_pages: usize,
    /// Render resolution for the visual fallback
    pub visual_dpi: u32,
    /// Concurrent renders in the visual fallback
    pub visual_concurrency: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            index_scan_pages: INDEX_SCAN_PAGES,
            visual_dpi: VISUAL_DPI,
            visual_concurrency: VISUAL_CONCURRENCY,
        }
    }
}
