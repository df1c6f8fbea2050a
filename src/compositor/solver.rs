//! Font size search.

use tracing::debug;

use super::RenderOptions;
use super::fonts::FaceProvider;
use super::shaper::{GlyphClass, Shaper, classify};
use crate::error::MemeError;

/// Largest size worth trying on a canvas: half the width or a third of the height.
pub fn max_font_size(width: u32, height: u32) -> u32 {
    (width / 2).min(height / 3)
}

/// One shrink step, floored.
pub fn shrink(font_size: u32, ratio: f64) -> u32 {
    (f64::from(font_size) * ratio).floor() as u32
}

/// Width a caption may occupy once the side margins are taken out.
pub fn available_width(width: u32, options: &RenderOptions) -> f64 {
    let margin = f64::from(width) * options.horizontal_margin_percent;
    f64::from(width) - 2.0 * margin
}

/// Finds the largest size on the shrink sequence whose summed glyph widths fit.
///
/// Scans down from [max_font_size] by [RenderOptions::shrink_ratio] and settles on the
/// floor size when nothing fits; overflow is accepted rather than reported.
pub fn solve_font_size(
    faces: &dyn FaceProvider,
    caption: &str,
    width: u32,
    height: u32,
    options: &RenderOptions,
) -> Result<u32, MemeError> {
    if caption.is_empty() {
        return Ok(options.default_font_size);
    }

    let mut max_size = max_font_size(width, height);
    if faces.text_face(max_size)?.is_default() {
        debug!("Platform default face in use, capping size at {}", options.default_font_size);
        max_size = options.default_font_size;
    }

    let available = available_width(width, options);
    let upper = caption.to_uppercase();
    let needs_symbol = upper.chars().any(|ch| classify(ch) == GlyphClass::Symbol);
    let mut font_size = max_size;
    while font_size > options.min_font_size {
        let text = faces.text_face(font_size)?;
        let symbol = if needs_symbol {
            faces.symbol_face(font_size)
        } else {
            None
        };
        let run = Shaper::new(text.as_ref(), symbol.as_deref()).shape_uppercased(&upper);
        let total = run.total_width();
        if total as f64 <= available {
            debug!("Caption fits at {}px ({} <= {})", font_size, total, available);
            return Ok(font_size);
        }
        let next = shrink(font_size, options.shrink_ratio);
        if next >= font_size {
            debug!("Shrink ratio {} makes no progress at {}px", options.shrink_ratio, font_size);
            break;
        }
        font_size = next;
    }

    debug!(
        "Caption does not fit above {}px, using the floor size",
        options.min_font_size
    );
    Ok(font_size.max(options.min_font_size))
}

/// The single size both captions are drawn at.
pub fn combined_font_size(
    top: (&str, u32),
    bottom: (&str, u32),
    options: &RenderOptions,
) -> u32 {
    let (top_text, top_size) = top;
    let (bottom_text, bottom_size) = bottom;
    if !top_text.is_empty() && !bottom_text.is_empty() {
        top_size.min(bottom_size)
    } else {
        top_size.max(bottom_size).max(options.default_font_size)
    }
}
