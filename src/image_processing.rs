//! Frame scanning and swatch rendering
//!
//! - Decode an uploaded frame
//! - Sample the center strip, classify each column, segment and decode
//! - Render band swatches as an indexed PNG

use std::io::Cursor;

use image::RgbImage;
use png::{BitDepth, ColorType, Encoder};

use crate::decode::{self, DecodedResistance};
use crate::error::{AppError, ScanError};
use crate::palette::{PaletteClassifier, PaletteEntry};
use crate::sampler::{self, PixelGrid};
use crate::segment::{self, ScanResult};
use crate::text;

/// Swatch cell size
const SWATCH_SIZE: u32 = 80;

/// Space between swatches and around the edge
const SWATCH_GAP: u32 = 12;

/// Height reserved under each swatch for its label
const LABEL_HEIGHT: u32 = 28;

/// Most swatches drawn in one strip
pub const MAX_SWATCHES: usize = 12;

/// Fixed indices ahead of the per-band colors
const BACKGROUND_INDEX: u8 = 0;
const INK_INDEX: u8 = 1;
const BACKGROUND_RGB: [u8; 3] = [240, 240, 236];
const INK_RGB: [u8; 3] = [24, 24, 24];

/// Everything one scan produced
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub width: u32,
    pub height: u32,
    pub result: ScanResult<'static>,
    /// Mean L*a*b* distance between columns and their matched colors
    pub mean_distance: f64,
    /// Decoding outcome; failures here are recoverable
    pub decoded: Result<DecodedResistance, ScanError>,
}

/// Decode image bytes (PNG or JPEG) to RGB
pub fn decode_frame(image_data: &[u8]) -> Result<RgbImage, AppError> {
    let img = image::load_from_memory(image_data)
        .map_err(|e| AppError::ImageProcessing(format!("Failed to decode image: {}", e)))?;
    Ok(img.to_rgb8())
}

/// Run the full scan over a frame
///
/// 1. Average the centered strip per column
/// 2. Classify each column against the resistor palette
/// 3. Segment into body and bands
/// 4. Decode the bands
pub fn scan_frame<G: PixelGrid + ?Sized>(
    grid: &G,
    band_fraction: f64,
) -> Result<ScanReport, ScanError> {
    let columns = sampler::sample(grid, band_fraction)?;
    let samples = PaletteClassifier::resistor().classify_all(&columns);

    let mean_distance = if samples.is_empty() {
        0.0
    } else {
        samples.iter().map(|s| s.distance).sum::<f64>() / samples.len() as f64
    };

    let result = segment::segment(&samples);
    let decoded = decode::decode(&result.bands);

    tracing::debug!(
        "Scanned {}x{}: body={:?}, {} significant runs, {} bands",
        grid.width(),
        grid.height(),
        result.body_name(),
        result.significant_runs.len(),
        result.bands.len()
    );

    Ok(ScanReport {
        width: grid.width(),
        height: grid.height(),
        result,
        mean_distance,
        decoded,
    })
}

/// Render one labelled swatch per entry, left to right, as an indexed PNG
pub fn render_swatches(entries: &[&PaletteEntry]) -> Result<Vec<u8>, AppError> {
    if entries.is_empty() || entries.len() > MAX_SWATCHES {
        return Err(AppError::InvalidPath(format!(
            "expected 1 to {} colors, got {}",
            MAX_SWATCHES,
            entries.len()
        )));
    }

    let count = entries.len() as u32;
    let width = SWATCH_GAP + count * (SWATCH_SIZE + SWATCH_GAP);
    let height = SWATCH_GAP + SWATCH_SIZE + LABEL_HEIGHT + SWATCH_GAP;
    let mut indexed = vec![BACKGROUND_INDEX; (width * height) as usize];

    let mut png_palette = Vec::with_capacity(3 * (entries.len() + 2));
    png_palette.extend_from_slice(&BACKGROUND_RGB);
    png_palette.extend_from_slice(&INK_RGB);

    for (i, entry) in entries.iter().enumerate() {
        let color_index = i as u8 + 2;
        png_palette.extend_from_slice(&[entry.rgb.r, entry.rgb.g, entry.rgb.b]);

        let left = SWATCH_GAP + i as u32 * (SWATCH_SIZE + SWATCH_GAP);
        for y in SWATCH_GAP..SWATCH_GAP + SWATCH_SIZE {
            for x in left..left + SWATCH_SIZE {
                // 1px outline so dark and light swatches both read against the background
                let edge = x == left
                    || x == left + SWATCH_SIZE - 1
                    || y == SWATCH_GAP
                    || y == SWATCH_GAP + SWATCH_SIZE - 1;
                indexed[(y * width + x) as usize] = if edge { INK_INDEX } else { color_index };
            }
        }

        text::draw_label_centered(
            &mut indexed,
            width,
            entry.name,
            left + SWATCH_SIZE / 2,
            SWATCH_GAP + SWATCH_SIZE + 4,
            INK_INDEX,
        );
    }

    encode_indexed_png(&indexed, width, height, png_palette)
}

/// Encode indexed pixel data as PNG with the given RGB palette
fn encode_indexed_png(
    indexed: &[u8],
    width: u32,
    height: u32,
    palette: Vec<u8>,
) -> Result<Vec<u8>, AppError> {
    let mut output = Vec::new();

    {
        let mut encoder = Encoder::new(Cursor::new(&mut output), width, height);
        encoder.set_color(ColorType::Indexed);
        encoder.set_depth(BitDepth::Eight);
        encoder.set_palette(palette);

        let mut writer = encoder
            .write_header()
            .map_err(|e| AppError::ImageProcessing(format!("PNG header error: {}", e)))?;

        writer
            .write_image_data(indexed)
            .map_err(|e| AppError::ImageProcessing(format!("PNG write error: {}", e)))?;
    }

    Ok(output)
}
