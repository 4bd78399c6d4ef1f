//! Scan-line sampling
//!
//! Collapses a horizontal strip through the middle of a frame into one
//! averaged color per column.

use image::RgbImage;

use crate::color::Rgb;
use crate::error::ScanError;

/// Default strip height as a fraction of frame height
pub const DEFAULT_BAND_FRACTION: f64 = 0.20;

/// Read access to a 2D grid of RGB pixels
pub trait PixelGrid {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Pixel at (x, y); callers stay within `width` x `height`
    fn pixel(&self, x: u32, y: u32) -> Rgb;
}

impl PixelGrid for RgbImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    #[inline]
    fn pixel(&self, x: u32, y: u32) -> Rgb {
        let p = self.get_pixel(x, y);
        Rgb::new(p[0], p[1], p[2])
    }
}

/// Rows covered by the centered strip, as `start..end`
pub fn strip_rows(height: u32, band_fraction: f64) -> Result<std::ops::Range<u32>, ScanError> {
    if !(band_fraction > 0.0 && band_fraction <= 1.0) {
        return Err(ScanError::InvalidBandFraction(band_fraction));
    }

    let strip_height = (height as f64 * band_fraction).round() as u32;
    if strip_height == 0 {
        return Err(ScanError::InsufficientResolution {
            height,
            fraction: band_fraction,
        });
    }

    let start = (height as f64 / 2.0 - strip_height as f64 / 2.0).round() as u32;
    let start = start.min(height - strip_height);
    Ok(start..start + strip_height)
}

/// Average a centered horizontal strip column by column
///
/// Returns exactly `grid.width()` colors, left to right.
pub fn sample<G: PixelGrid + ?Sized>(grid: &G, band_fraction: f64) -> Result<Vec<Rgb>, ScanError> {
    let rows = strip_rows(grid.height(), band_fraction)?;
    let count = rows.len() as f64;

    let columns = (0..grid.width())
        .map(|x| {
            let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
            for y in rows.clone() {
                let p = grid.pixel(x, y);
                r += p.r as u64;
                g += p.g as u64;
                b += p.b as u64;
            }
            Rgb::from_f64_clamped(r as f64 / count, g as f64 / count, b as f64 / count)
        })
        .collect();

    Ok(columns)
}
