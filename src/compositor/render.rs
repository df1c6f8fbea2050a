//! Caption placement, outlined drawing and PNG encoding.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

use super::fonts::{GlyphBitmap, GlyphFace};
use super::shaper::{Shaper, text_bounds};
use super::{Placement, RenderOptions};
use crate::error::MemeError;

/// Where one caption goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedCaption {
    /// Upper-cased caption text
    pub text: String,
    /// Which edge the caption hugs
    pub placement: Placement,
    /// Left edge of the caption box
    pub x: i32,
    /// Top edge of the caption box
    pub y: i32,
    /// Row of the ascender line glyphs are drawn from
    pub ascender_y: i32,
    /// Width of the caption box
    pub width: i32,
    /// Height of the caption box
    pub height: i32,
}

/// Solved layout for one image; nothing in here changes while drawing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderPlan {
    /// Size both captions are drawn at
    pub font_size: u32,
    /// Outline thickness in pixels
    pub outline_width: u32,
    /// Top caption, if any
    pub top: Option<PlacedCaption>,
    /// Bottom caption, if any
    pub bottom: Option<PlacedCaption>,
}

impl RenderPlan {
    /// Captions in drawing order.
    pub fn captions(&self) -> impl Iterator<Item = &PlacedCaption> {
        self.top.iter().chain(self.bottom.iter())
    }
}

/// `max(font_size / 20, 3)`
pub fn outline_width(font_size: u32, options: &RenderOptions) -> u32 {
    (font_size / options.outline_divisor.max(1)).max(options.min_outline_width)
}

/// Gap between a caption and its edge.
pub fn vertical_margin(height: u32, options: &RenderOptions) -> i32 {
    let proportional = (f64::from(height) * options.vertical_margin_percent) as i32;
    proportional.max(options.min_vertical_margin as i32)
}

/// Centers a caption horizontally and anchors it to its edge.
pub fn place_caption(
    face: &dyn GlyphFace,
    caption: &str,
    placement: Placement,
    canvas: (u32, u32),
    options: &RenderOptions,
) -> PlacedCaption {
    let (width, height) = canvas;
    let text = caption.to_uppercase();
    let bounds = text_bounds(face, &text);
    let x = (width as i32 - bounds.width()).div_euclid(2);
    let margin = vertical_margin(height, options);
    let y = match placement {
        Placement::Top => margin,
        Placement::Bottom => height as i32 - bounds.height() - margin,
    };
    PlacedCaption {
        text,
        placement,
        x,
        y,
        ascender_y: y - bounds.top,
        width: bounds.width(),
        height: bounds.height(),
    }
}

/// Draws one caption a character at a time: outline stamps first, then the fill.
/// Symbol-face glyphs get a single fill stamp and no outline.
pub fn draw_caption(
    canvas: &mut RgbImage,
    caption: &PlacedCaption,
    shaper: &Shaper<'_>,
    outline_width: u32,
    options: &RenderOptions,
) {
    let reach = outline_width as i32;
    let run = shaper.shape_uppercased(&caption.text);
    let mut cursor = caption.x;

    for glyph in &run.glyphs {
        let face = shaper.face_for(glyph);
        let origin_x = cursor - face.glyph_box(glyph.ch).left;
        let bitmap = face.rasterize(glyph.ch);

        if !glyph.on_symbol_face {
            for dx in -reach..=reach {
                for dy in -reach..=reach {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    stamp(
                        canvas,
                        &bitmap,
                        (origin_x + dx, caption.ascender_y + dy),
                        options.outline_color,
                    );
                }
            }
        }
        stamp(
            canvas,
            &bitmap,
            (origin_x, caption.ascender_y),
            options.fill_color,
        );

        cursor += glyph.advance as i32;
    }
}

/// Blends a coverage mask onto the canvas in a solid color, clipping at the edges.
fn stamp(canvas: &mut RgbImage, bitmap: &GlyphBitmap, origin: (i32, i32), color: Rgb<u8>) {
    let (canvas_width, canvas_height) = (canvas.width() as i32, canvas.height() as i32);
    let left = origin.0 + bitmap.left;
    let top = origin.1 + bitmap.top;

    for (row, line) in bitmap
        .coverage
        .chunks(bitmap.width.max(1))
        .take(bitmap.height)
        .enumerate()
    {
        let py = top + row as i32;
        if py < 0 || py >= canvas_height {
            continue;
        }
        for (column, &alpha) in line.iter().enumerate() {
            let px = left + column as i32;
            if alpha == 0 || px < 0 || px >= canvas_width {
                continue;
            }
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            for (dst, src) in pixel.0.iter_mut().zip(color.0) {
                *dst = blend(src, *dst, alpha);
            }
        }
    }
}

fn blend(src: u8, dst: u8, alpha: u8) -> u8 {
    let alpha = u32::from(alpha);
    ((u32::from(src) * alpha + u32::from(dst) * (255 - alpha) + 127) / 255) as u8
}

/// Encodes the canvas as PNG.
pub fn encode_png(canvas: &RgbImage) -> Result<Vec<u8>, MemeError> {
    let mut bytes = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| MemeError::RenderError(err.to_string()))?;
    Ok(bytes)
}
