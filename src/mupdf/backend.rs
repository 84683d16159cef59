//! MuPDF implementation of the page renderer traits

use std::sync::Arc;

use async_trait::async_trait;
use mupdf::{Colorspace, Matrix};

use crate::document::{
    dpi_to_scale, DocumentError, DocumentLoader, DocumentResult, PageRaster, PageSource,
};

use super::safe::SafeDocument;

/// Opens PDF bytes with MuPDF
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfLoader;

impl DocumentLoader for MupdfLoader {
    fn load(&self, data: Arc<Vec<u8>>) -> DocumentResult<Arc<dyn PageSource>> {
        let doc = SafeDocument::from_bytes(data)?;
        Ok(Arc::new(doc))
    }
}

#[async_trait]
impl PageSource for SafeDocument {
    fn page_count(&self) -> usize {
        SafeDocument::page_count(self)
    }

    async fn page_text(&self, page_index: usize) -> DocumentResult<String> {
        let doc = self.clone();

        // Offload to blocking task since MuPDF operations are CPU-bound
        tokio::task::spawn_blocking(move || {
            doc.with_page(page_index, |page| {
                page.to_text().map_err(|e| DocumentError::TextExtraction {
                    page: page_index + 1,
                    message: e.to_string(),
                })
            })
        })
        .await?
    }

    async fn render_page(&self, page_index: usize, dpi: u32) -> DocumentResult<PageRaster> {
        let doc = self.clone();
        let scale = dpi_to_scale(dpi);

        tokio::task::spawn_blocking(move || {
            doc.with_page(page_index, |page| {
                let render_err = |e: mupdf::Error| DocumentError::Render {
                    page: page_index + 1,
                    message: e.to_string(),
                };

                let matrix = Matrix::new_scale(scale, scale);
                let colorspace = Colorspace::device_rgb();
                let pixmap = page
                    .to_pixmap(&matrix, &colorspace, false, true)
                    .map_err(render_err)?;

                Ok(pixmap_to_raster(&pixmap))
            })
        })
        .await?
    }
}

fn pixmap_to_raster(pixmap: &mupdf::Pixmap) -> PageRaster {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let channels = pixmap.n() as u8;
    let expected = width as usize * height as usize * channels as usize;

    let samples = pixmap.samples();
    let samples = samples[..expected.min(samples.len())].to_vec();

    PageRaster {
        width,
        height,
        channels,
        samples,
    }
}
