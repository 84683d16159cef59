//! Colourfulness heuristic
//!
//! Schematics are drawn mostly in black on white while plans carry coloured
//! fills. A page counts as colourful when enough of a strided pixel sample
//! is saturated and neither near-black nor near-white.

use crate::document::PageRaster;

/// Upper bound on pixels inspected per page
const TARGET_SAMPLES: usize = 1000;

/// Minimum `max - min` channel spread for a saturated pixel
const MIN_CHANNEL_SPREAD: u8 = 50;

/// Exclusive bounds on the brightest channel
const MIN_BRIGHTNESS: u8 = 30;
const MAX_BRIGHTNESS: u8 = 230;

/// Share of colourful samples above which a page is a layout
pub const COLORFUL_RATIO_THRESHOLD: f64 = 0.15;

/// Fraction of sampled pixels that are colourful
///
/// `None` when nothing could be sampled (empty raster or fewer than three
/// channels).
pub fn colorful_ratio(raster: &PageRaster) -> Option<f64> {
    let channels = raster.channels as usize;
    if channels < 3 {
        return None;
    }

    let samples = &raster.samples;
    let step = (raster.pixel_count() / TARGET_SAMPLES).max(1);

    let mut colorful = 0usize;
    let mut checked = 0usize;

    for i in (0..samples.len()).step_by(channels * step) {
        if i + 2 >= samples.len() {
            break;
        }

        if is_colorful_pixel(samples[i], samples[i + 1], samples[i + 2]) {
            colorful += 1;
        }
        checked += 1;
    }

    (checked > 0).then(|| colorful as f64 / checked as f64)
}

/// Does the raster look like a coloured plan?
pub fn is_colorful(raster: &PageRaster) -> bool {
    colorful_ratio(raster).is_some_and(|ratio| ratio > COLORFUL_RATIO_THRESHOLD)
}

#[inline]
fn is_colorful_pixel(r: u8, g: u8, b: u8) -> bool {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    max - min > MIN_CHANNEL_SPREAD && max > MIN_BRIGHTNESS && max < MAX_BRIGHTNESS
}
