//! Core document types

use std::io::Cursor;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::error::{DocumentError, DocumentResult};

/// PDF magic bytes
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Standard base64 encoding of `%PDF-`
pub const PDF_BASE64_PREFIX: &str = "JVBERi";

/// PDF user space resolution (1 point = 1/72 inch)
pub const POINTS_PER_INCH: f32 = 72.0;

/// Output image format for rendered pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Parse format from a query string value
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Self::Jpeg,
            _ => Self::Png,
        }
    }

    /// MIME content type
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Raw page pixels as produced by the renderer
///
/// `samples` is row-major with `channels` bytes per pixel and no row padding.
#[derive(Debug, Clone)]
pub struct PageRaster {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub samples: Vec<u8>,
}

impl PageRaster {
    /// Build a raster from packed RGB samples
    pub fn from_rgb(width: u32, height: u32, samples: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels: 3,
            samples,
        }
    }

    /// Number of pixels in the raster
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Encode the raster into the requested image format
    pub fn encode(&self, format: ImageFormat) -> DocumentResult<Vec<u8>> {
        let n = self.channels as usize;
        if n < 3 {
            return Err(DocumentError::Image(format!(
                "Unsupported channel count: {}",
                self.channels
            )));
        }

        let mut rgb = Vec::with_capacity(self.pixel_count() * 3);
        for pixel in self.samples.chunks_exact(n).take(self.pixel_count()) {
            rgb.extend_from_slice(&pixel[..3]);
        }

        let img = image::RgbImage::from_raw(self.width, self.height, rgb)
            .ok_or_else(|| DocumentError::Image("Failed to create image buffer".to_string()))?;
        let dynamic_img = DynamicImage::ImageRgb8(img);

        let target = match format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        };

        let mut output = Vec::new();
        dynamic_img
            .write_to(&mut Cursor::new(&mut output), target)
            .map_err(|e| DocumentError::Image(e.to_string()))?;

        Ok(output)
    }
}

/// Scale factor MuPDF needs for a target resolution
pub fn dpi_to_scale(dpi: u32) -> f32 {
    dpi as f32 / POINTS_PER_INCH
}
