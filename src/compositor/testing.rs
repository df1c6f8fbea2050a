//! Synthetic faces with exact, font-free metrics for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::fonts::{FaceProvider, GlyphBitmap, GlyphBox, GlyphFace};
use crate::error::MemeError;

/// Every visible glyph is a solid block `width` wide, inked from `px / 5` down to `px`.
/// Spaces are `px / 3` wide and blank.
#[derive(Clone, Debug)]
pub(crate) struct BlockFace {
    pixel_size: u32,
    width_num: u32,
    width_den: u32,
    is_default: bool,
    kerning: bool,
}

impl BlockFace {
    /// Letters are three fifths of the pixel size wide.
    pub(crate) fn text(pixel_size: u32) -> Self {
        Self {
            pixel_size,
            width_num: 3,
            width_den: 5,
            is_default: false,
            kerning: false,
        }
    }

    /// Square glyphs.
    pub(crate) fn symbol(pixel_size: u32) -> Self {
        Self {
            width_num: 1,
            width_den: 1,
            ..Self::text(pixel_size)
        }
    }

    /// Stands in for the platform default: fixed at 11px whatever was asked for.
    pub(crate) fn platform_default() -> Self {
        Self {
            is_default: true,
            ..Self::text(11)
        }
    }

    /// Pulls `V` towards a preceding `A` by a tenth of the pixel size.
    pub(crate) fn with_kerning(mut self) -> Self {
        self.kerning = true;
        self
    }

    fn glyph_width(&self, ch: char) -> u32 {
        if ch == ' ' {
            self.pixel_size / 3
        } else {
            self.pixel_size * self.width_num / self.width_den
        }
    }

    fn ink(&self) -> (i32, i32) {
        ((self.pixel_size / 5) as i32, self.pixel_size as i32)
    }
}

impl GlyphFace for BlockFace {
    fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    fn is_default(&self) -> bool {
        self.is_default
    }

    fn glyph_box(&self, ch: char) -> GlyphBox {
        GlyphBox {
            left: 0,
            right: self.glyph_width(ch) as i32,
            ink: (ch != ' ').then(|| self.ink()),
        }
    }

    fn advance(&self, ch: char) -> f32 {
        self.glyph_width(ch) as f32
    }

    fn kern(&self, left: char, right: char) -> f32 {
        if self.kerning && left == 'A' && right == 'V' {
            -((self.pixel_size / 10) as f32)
        } else {
            0.0
        }
    }

    fn rasterize(&self, ch: char) -> GlyphBitmap {
        if ch == ' ' {
            return GlyphBitmap::default();
        }
        let (top, bottom) = self.ink();
        let width = self.glyph_width(ch) as usize;
        let height = (bottom - top) as usize;
        GlyphBitmap {
            left: 0,
            top,
            width,
            height,
            coverage: vec![255; width * height],
        }
    }
}

/// Hands out [BlockFace]s and counts text face loads.
#[derive(Debug, Default)]
pub(crate) struct BlockFaces {
    symbol: bool,
    platform_default_only: bool,
    kerning: bool,
    unavailable: bool,
    text_loads: AtomicUsize,
}

impl BlockFaces {
    /// Text faces only, no symbol face.
    pub(crate) fn text_only() -> Self {
        Self::default()
    }

    /// Text faces plus square symbol faces.
    pub(crate) fn with_symbols() -> Self {
        Self {
            symbol: true,
            ..Self::default()
        }
    }

    /// Every text request lands on the fixed-size platform default.
    pub(crate) fn platform_default_only() -> Self {
        Self {
            platform_default_only: true,
            ..Self::default()
        }
    }

    /// Text faces with `AV` kerning.
    pub(crate) fn kerned() -> Self {
        Self {
            kerning: true,
            ..Self::default()
        }
    }

    /// Nothing loads at all.
    pub(crate) fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// How many text faces were requested so far.
    pub(crate) fn text_loads(&self) -> usize {
        self.text_loads.load(Ordering::Relaxed)
    }
}

impl FaceProvider for BlockFaces {
    fn text_face(&self, pixel_size: u32) -> Result<Arc<dyn GlyphFace>, MemeError> {
        self.text_loads.fetch_add(1, Ordering::Relaxed);
        if self.unavailable {
            return Err(MemeError::FontUnavailable("no faces in tests".to_string()));
        }
        let face = if self.platform_default_only {
            BlockFace::platform_default()
        } else if self.kerning {
            BlockFace::text(pixel_size).with_kerning()
        } else {
            BlockFace::text(pixel_size)
        };
        Ok(Arc::new(face))
    }

    fn symbol_face(&self, pixel_size: u32) -> Option<Arc<dyn GlyphFace>> {
        self.symbol
            .then(|| Arc::new(BlockFace::symbol(pixel_size)) as Arc<dyn GlyphFace>)
    }
}
