//! Page classification
//!
//! Decides for every page of a drawing set whether it is a schematic
//! (P&ID), a layout, or unknown, using a three-tier cascade:
//!
//! ```text
//!   1. index  ── drawing index in the first pages? ── yes ──► done (index)
//!                       │ no
//!   2. title  ── keywords on each page, any pid/layout? ── yes ──► done (title)
//!                       │ no
//!   3. visual ── render at 72 DPI, colourful pages are layouts ──► done (visual)
//! ```
//!
//! Only one tier's result is ever returned. The classifier holds no mutable
//! state and can serve any number of requests concurrently.

mod index;
mod rules;
mod types;
mod visual;

use std::time::Instant;

use futures::stream::{self, StreamExt};

use crate::document::PageSource;

pub use index::{classify_from_index, parse_index_text};
pub use rules::{
    classify_entry_name, classify_page_text, is_index_text, resolve, KeywordRule, RULES,
};
pub use types::{
    ClassificationMethod, ClassificationResult, ClassifierConfig, DrawingEntry, PageType,
    INDEX_SCAN_PAGES, VISUAL_CONCURRENCY, VISUAL_DPI,
};
pub use visual::{colorful_ratio, is_colorful, COLORFUL_RATIO_THRESHOLD};

/// Three-tier page classifier
#[derive(Debug, Clone, Default)]
pub struct PageClassifier {
    config: ClassifierConfig,
}

impl PageClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify every page of `source`
    ///
    /// Never fails: pages whose text or image cannot be produced are
    /// classified from whatever signal remains.
    pub async fn classify(&self, source: &dyn PageSource) -> ClassificationResult {
        let start = Instant::now();
        let total_pages = source.page_count();

        let mut result = match self.find_index(source).await {
            Some((index_page, entries)) => classify_from_index(total_pages, index_page, &entries),
            None => {
                let by_title = self.classify_by_titles(source).await;
                if !by_title.pid_pages.is_empty() || !by_title.layout_pages.is_empty() {
                    by_title
                } else {
                    tracing::debug!("No title keywords found, falling back to visual analysis");
                    self.classify_by_visual(source).await
                }
            }
        };

        result.processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            method = result.method_used.as_str(),
            total_pages,
            pid = result.pid_pages.len(),
            layout = result.layout_pages.len(),
            unknown = result.unknown_pages.len(),
            elapsed_ms = result.processing_time_ms,
            "Classified document"
        );

        result
    }

    /// First leading page that is an index and yields at least one entry
    async fn find_index(&self, source: &dyn PageSource) -> Option<(usize, Vec<DrawingEntry>)> {
        let scan = self.config.index_scan_pages.min(source.page_count());

        for page_index in 0..scan {
            let text = page_text_upper(source, page_index).await;
            if !is_index_text(&text) {
                continue;
            }

            let entries = parse_index_text(&text);
            if !entries.is_empty() {
                tracing::info!(
                    page = page_index + 1,
                    entries = entries.len(),
                    "Found drawing index"
                );
                return Some((page_index + 1, entries));
            }
        }

        None
    }

    async fn classify_by_titles(&self, source: &dyn PageSource) -> ClassificationResult {
        let total_pages = source.page_count();
        let mut result = ClassificationResult::new(total_pages, ClassificationMethod::Title);

        for page_index in 0..total_pages {
            let text = page_text_upper(source, page_index).await;
            let page_number = page_index + 1;

            match classify_page_text(&text) {
                // Several index-like pages: the last one wins
                PageType::Index => result.index_page = Some(page_number),
                page_type => result.push(page_number, page_type),
            }
        }

        result
    }

    async fn classify_by_visual(&self, source: &dyn PageSource) -> ClassificationResult {
        let total_pages = source.page_count();
        let dpi = self.config.visual_dpi;
        let mut result = ClassificationResult::new(total_pages, ClassificationMethod::Visual);

        // `buffered` yields in page order even when renders finish out of order
        let page_types: Vec<PageType> = stream::iter(0..total_pages)
            .map(|page_index| async move {
                match source.render_page(page_index, dpi).await {
                    Ok(raster) if is_colorful(&raster) => PageType::Layout,
                    Ok(_) => PageType::Unknown,
                    Err(e) => {
                        tracing::warn!(
                            page = page_index + 1,
                            error = %e,
                            "Render failed during visual classification"
                        );
                        PageType::Unknown
                    }
                }
            })
            .buffered(self.config.visual_concurrency.max(1))
            .collect()
            .await;

        for (page_index, page_type) in page_types.into_iter().enumerate() {
            result.push(page_index + 1, page_type);
        }

        result
    }
}

/// Upper-cased page text; extraction failures read as a blank page
async fn page_text_upper(source: &dyn PageSource, page_index: usize) -> String {
    match source.page_text(page_index).await {
        Ok(text) => text.to_uppercase(),
        Err(e) => {
            tracing::debug!(
                page = page_index + 1,
                error = %e,
                "Text extraction failed, treating page as blank"
            );
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::document::{DocumentError, DocumentResult, PageRaster};

    #[derive(Clone)]
    struct FakePage {
        text: Option<String>,
        raster: Option<PageRaster>,
    }

    struct FakeDocument {
        pages: Vec<FakePage>,
        stagger_renders: bool,
    }

    impl FakeDocument {
        fn new(pages: Vec<FakePage>) -> Self {
            Self {
                pages,
                stagger_renders: false,
            }
        }

        fn from_texts(texts: &[&str]) -> Self {
            Self::new(texts.iter().map(|t| text_page(t)).collect())
        }
    }

    #[async_trait]
    impl PageSource for FakeDocument {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        async fn page_text(&self, page_index: usize) -> DocumentResult<String> {
            self.pages[page_index]
                .text
                .clone()
                .ok_or_else(|| DocumentError::TextExtraction {
                    page: page_index + 1,
                    message: "no text layer".to_string(),
                })
        }

        async fn render_page(&self, page_index: usize, _dpi: u32) -> DocumentResult<PageRaster> {
            if self.stagger_renders {
                // Later pages finish first
                let delay = (self.pages.len() - page_index) as u64 * 5;
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            self.pages[page_index]
                .raster
                .clone()
                .ok_or_else(|| DocumentError::Render {
                    page: page_index + 1,
                    message: "corrupt content stream".to_string(),
                })
        }
    }

    fn text_page(text: &str) -> FakePage {
        FakePage {
            text: Some(text.to_string()),
            raster: Some(white_raster()),
        }
    }

    fn image_page(raster: Option<PageRaster>) -> FakePage {
        FakePage {
            text: Some(String::new()),
            raster,
        }
    }

    fn solid_raster(rgb: [u8; 3]) -> PageRaster {
        PageRaster::from_rgb(40, 30, rgb.repeat(40 * 30))
    }

    fn white_raster() -> PageRaster {
        solid_raster([255, 255, 255])
    }

    fn colorful_raster() -> PageRaster {
        solid_raster([20, 140, 210])
    }

    fn assert_partition(result: &ClassificationResult) {
        let all: Vec<usize> = result
            .pid_pages
            .iter()
            .chain(&result.layout_pages)
            .chain(&result.unknown_pages)
            .copied()
            .collect();
        let distinct: HashSet<_> = all.iter().collect();

        assert_eq!(distinct.len(), all.len(), "duplicate page in {result:?}");
        assert!(all.iter().all(|p| (1..=result.total_pages).contains(p)));
    }

    async fn classify(doc: &FakeDocument) -> ClassificationResult {
        let result = PageClassifier::default().classify(doc).await;
        assert_partition(&result);
        result
    }

    #[tokio::test]
    async fn test_index_tier_maps_entries_to_following_pages() {
        let doc = FakeDocument::from_texts(&[
            "Drawing Index\n\
             M601 Mechanical Pipework Schematics\n\
             M602 Ground Floor Plan\n\
             M603 First Floor Plan\n\
             M604 Roof Plan View",
            "",
            "",
            "",
            "",
        ]);

        let result = classify(&doc).await;

        assert_eq!(result.method_used, ClassificationMethod::Index);
        assert_eq!(result.index_page, Some(1));
        assert_eq!(result.pid_pages, vec![2]);
        assert_eq!(result.layout_pages, vec![3, 4, 5]);
        assert!(result.unknown_pages.is_empty());
        assert!(result.processing_time_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_index_tier_skips_legend_entries() {
        let doc = FakeDocument::from_texts(&[
            "COVER",
            "DRAWING LIST\nM500 SYMBOLS AND LEGEND\nM501 CHILLER SCHEMATIC\nM502 COVER NOTES TEXT",
            "",
            "",
            "",
        ]);

        let result = classify(&doc).await;

        assert_eq!(result.index_page, Some(2));
        assert_eq!(result.pid_pages, vec![4]);
        assert_eq!(result.unknown_pages, vec![5]);
        assert!(!result.layout_pages.contains(&3));
    }

    #[tokio::test]
    async fn test_index_page_without_entries_keeps_scanning() {
        let doc = FakeDocument::from_texts(&[
            "CONTENTS",
            "DRAWING INDEX\nM100 CHILLER SCHEMATIC",
            "",
        ]);

        let result = classify(&doc).await;

        assert_eq!(result.method_used, ClassificationMethod::Index);
        assert_eq!(result.index_page, Some(2));
        assert_eq!(result.pid_pages, vec![3]);
    }

    #[tokio::test]
    async fn test_index_beyond_scan_window_is_ignored() {
        let mut texts = vec!["notes"; 5];
        texts.push("DRAWING INDEX\nM601 BOILER SCHEMATIC");
        texts.push("BOILER SCHEMATIC");
        let doc = FakeDocument::from_texts(&texts);

        let result = classify(&doc).await;

        assert_eq!(result.method_used, ClassificationMethod::Title);
        assert_eq!(result.index_page, Some(6));
        assert_eq!(result.pid_pages, vec![7]);
        assert_eq!(result.unknown_pages, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_title_tier_general_arrangement_is_layout() {
        let doc = FakeDocument::from_texts(&[
            "General Arrangement - Level 1",
            "notes",
            "P&ID chilled water",
            "plantroom schematic",
        ]);

        let result = classify(&doc).await;

        assert_eq!(result.method_used, ClassificationMethod::Title);
        assert_eq!(result.index_page, None);
        assert_eq!(result.layout_pages, vec![1]);
        assert_eq!(result.pid_pages, vec![3, 4]);
        assert_eq!(result.unknown_pages, vec![2]);
    }

    #[tokio::test]
    async fn test_title_tier_last_index_page_wins() {
        let doc = FakeDocument::from_texts(&["CONTENTS", "boiler schematic", "INDEX"]);

        let result = classify(&doc).await;

        assert_eq!(result.method_used, ClassificationMethod::Title);
        assert_eq!(result.index_page, Some(3));
        assert_eq!(result.pid_pages, vec![2]);
        assert!(result.unknown_pages.is_empty());
    }

    #[tokio::test]
    async fn test_visual_tier_colourful_page_is_layout() {
        let doc = FakeDocument::new(vec![
            image_page(Some(colorful_raster())),
            image_page(Some(white_raster())),
            image_page(Some(solid_raster([0, 0, 0]))),
        ]);

        let result = classify(&doc).await;

        assert_eq!(result.method_used, ClassificationMethod::Visual);
        assert_eq!(result.index_page, None);
        assert_eq!(result.layout_pages, vec![1]);
        assert_eq!(result.unknown_pages, vec![2, 3]);
        assert!(result.pid_pages.is_empty());
    }

    #[tokio::test]
    async fn test_visual_tier_render_failure_is_unknown() {
        let doc = FakeDocument::new(vec![
            image_page(None),
            image_page(Some(colorful_raster())),
        ]);

        let result = classify(&doc).await;

        assert_eq!(result.layout_pages, vec![2]);
        assert_eq!(result.unknown_pages, vec![1]);
    }

    #[tokio::test]
    async fn test_text_failure_reads_as_blank() {
        let doc = FakeDocument::new(vec![FakePage {
            text: None,
            raster: Some(colorful_raster()),
        }]);

        let result = classify(&doc).await;

        assert_eq!(result.method_used, ClassificationMethod::Visual);
        assert_eq!(result.layout_pages, vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_visual_tier_preserves_page_order() {
        let pages = (0..10)
            .map(|i| {
                image_page(Some(if i % 2 == 0 {
                    colorful_raster()
                } else {
                    white_raster()
                }))
            })
            .collect();
        let mut doc = FakeDocument::new(pages);
        doc.stagger_renders = true;

        let result = classify(&doc).await;

        assert_eq!(result.layout_pages, vec![1, 3, 5, 7, 9]);
        assert_eq!(result.unknown_pages, vec![2, 4, 6, 8, 10]);
    }

    #[tokio::test]
    async fn test_empty_document() {
        let doc = FakeDocument::new(Vec::new());

        let result = classify(&doc).await;

        assert_eq!(result.total_pages, 0);
        assert_eq!(result.method_used, ClassificationMethod::Visual);
        assert_eq!(result.classified_count(), 0);
    }

    #[tokio::test]
    async fn test_custom_scan_window() {
        let doc = FakeDocument::from_texts(&[
            "cover",
            "DRAWING INDEX\nM601 BOILER SCHEMATIC",
            "",
        ]);
        let classifier = PageClassifier::new(ClassifierConfig {
            index_scan_pages: 1,
            ..Default::default()
        });

        let result = classifier.classify(&doc).await;

        assert_eq!(result.method_used, ClassificationMethod::Visual);
        assert_partition(&result);
    }
}
