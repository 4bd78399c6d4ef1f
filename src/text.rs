//! Label rendering for swatch images
//!
//! Renders text onto indexed images using the font located at build time.
//! When no font was available the build embeds an empty file and labels
//! are skipped.

use std::sync::LazyLock;

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};

/// Font found at build time via fontconfig (see build.rs)
const FONT_DATA: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/font.ttf"));

/// Label font size steps (largest to smallest)
const LABEL_SIZES: &[f32] = &[18.0, 16.0, 14.0, 12.0];

/// Widest a label may get before stepping down a size
const MAX_LABEL_WIDTH: f32 = 84.0;

static FONT: LazyLock<Option<FontRef<'static>>> = LazyLock::new(|| {
    let font = FontRef::try_from_slice(FONT_DATA).ok();
    if font.is_none() {
        tracing::warn!("No label font embedded, swatch labels disabled");
    }
    font
});

/// Draw `text` horizontally centered on `center_x`, top edge at `y`
pub fn draw_label_centered(
    indexed: &mut [u8],
    width: u32,
    text: &str,
    center_x: u32,
    y: u32,
    color: u8,
) {
    let Some(font) = FONT.as_ref() else {
        return;
    };

    let scale = fit_text_size(font, text, MAX_LABEL_WIDTH, LABEL_SIZES);
    let text_width = measure_text_width(font, text, scale);
    let x = (center_x as f32 - text_width / 2.0).max(0.0) as u32;

    draw_text_indexed(indexed, width, font, text, scale, x, y, color);
}

/// Find the largest font size that fits the text within max_width
fn fit_text_size(font: &FontRef, text: &str, max_width: f32, sizes: &[f32]) -> PxScale {
    sizes
        .iter()
        .map(|&size| PxScale::from(size))
        .find(|&scale| measure_text_width(font, text, scale) <= max_width)
        .unwrap_or_else(|| PxScale::from(sizes.last().copied().unwrap_or(12.0)))
}

/// Measure the width of text at a given scale
fn measure_text_width(font: &FontRef, text: &str, scale: PxScale) -> f32 {
    let scaled_font = font.as_scaled(scale);
    text.chars()
        .map(|c| scaled_font.h_advance(font.glyph_id(c)))
        .sum()
}

/// Draw text at a specific position onto indexed buffer
#[allow(clippy::too_many_arguments)]
fn draw_text_indexed(
    indexed: &mut [u8],
    width: u32,
    font: &FontRef,
    text: &str,
    scale: PxScale,
    x: u32,
    y: u32,
    color: u8,
) {
    let scaled_font = font.as_scaled(scale);
    let mut cursor_x = x as f32;
    let height = indexed.len() as u32 / width;

    for c in text.chars() {
        let glyph_id = font.glyph_id(c);
        let glyph = glyph_id
            .with_scale_and_position(scale, ab_glyph::point(cursor_x, y as f32 + scale.y * 0.8));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;

                // Hard edge threshold keeps the palette to two ink levels
                if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height && coverage > 0.5 {
                    let idx = (py as u32 * width + px as u32) as usize;
                    if idx < indexed.len() {
                        indexed[idx] = color;
                    }
                }
            });
        }

        cursor_x += scaled_font.h_advance(glyph_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_stays_inside_buffer() {
        let width = 40;
        let mut indexed = vec![0u8; (width * 30) as usize];
        draw_label_centered(&mut indexed, width, "Violet", 5, 2, 1);
        assert_eq!(indexed.len(), (width * 30) as usize);
        if FONT.is_some() {
            assert!(indexed.contains(&1));
        }
    }
}
