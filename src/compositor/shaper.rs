//! Glyph classification and measurement.

use std::ops::RangeInclusive;

use super::fonts::GlyphFace;

/// Codepoints routed to the symbol face.
pub const SYMBOL_RANGES: [RangeInclusive<u32>; 9] = [
    0x1F600..=0x1F64F, // emoticons
    0x1F300..=0x1F5FF, // symbols & pictographs
    0x1F680..=0x1F6FF, // transport & map
    0x1F1E0..=0x1F1FF, // regional indicators
    0x2600..=0x26FF,   // misc symbols
    0x2700..=0x27BF,   // dingbats
    0xFE00..=0xFE0F,   // variation selectors
    0x1F900..=0x1F9FF, // supplemental symbols & pictographs
    0x1F018..=0x1F270, // enclosed characters
];

/// How a character is measured and drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphClass {
    /// Drawn from the text face with an outline
    Standard,
    /// Drawn from the symbol face without an outline
    Symbol,
}

/// Classifies a character by codepoint.
pub fn classify(ch: char) -> GlyphClass {
    let code = u32::from(ch);
    if SYMBOL_RANGES.iter().any(|range| range.contains(&code)) {
        GlyphClass::Symbol
    } else {
        GlyphClass::Standard
    }
}

/// One measured character of a caption.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapedGlyph {
    /// The (upper-cased) character
    pub ch: char,
    /// Classification by codepoint
    pub class: GlyphClass,
    /// True when the symbol face measured it; false means the text face did
    pub on_symbol_face: bool,
    /// Width of its tight box in the face that measured it
    pub advance: u32,
}

/// The measured characters of one caption at one size.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphRun {
    /// Characters in drawing order
    pub glyphs: Vec<ShapedGlyph>,
}

impl GlyphRun {
    /// Sum of per-character widths. This is what the size search compares against the
    /// available width, and it deliberately ignores kerning.
    pub fn total_width(&self) -> u64 {
        self.glyphs.iter().map(|glyph| u64::from(glyph.advance)).sum()
    }
}

/// Routes characters between a text face and an optional symbol face.
pub struct Shaper<'a> {
    text: &'a dyn GlyphFace,
    symbol: Option<&'a dyn GlyphFace>,
}

impl<'a> Shaper<'a> {
    /// A shaper over the given faces.
    pub fn new(text: &'a dyn GlyphFace, symbol: Option<&'a dyn GlyphFace>) -> Self {
        Self { text, symbol }
    }

    /// The face a glyph was measured with, and must be drawn with.
    pub fn face_for(&self, glyph: &ShapedGlyph) -> &'a dyn GlyphFace {
        match (glyph.on_symbol_face, self.symbol) {
            (true, Some(symbol)) => symbol,
            _ => self.text,
        }
    }

    /// Upper-cases a caption and measures it.
    pub fn shape(&self, caption: &str) -> GlyphRun {
        self.shape_uppercased(&caption.to_uppercase())
    }

    /// Measures text that is already upper-cased.
    pub fn shape_uppercased(&self, text: &str) -> GlyphRun {
        let glyphs = text
            .chars()
            .map(|ch| {
                let class = classify(ch);
                let symbol = match class {
                    GlyphClass::Symbol => self.symbol,
                    GlyphClass::Standard => None,
                };
                let face = symbol.unwrap_or(self.text);
                ShapedGlyph {
                    ch,
                    class,
                    on_symbol_face: symbol.is_some(),
                    advance: face.glyph_box(ch).width(),
                }
            })
            .collect();
        GlyphRun { glyphs }
    }
}

/// Box of a whole string laid out in one face with kerning, relative to the pen origin
/// of its first glyph on the ascender line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBounds {
    /// Leftmost column
    pub left: i32,
    /// Topmost inked row
    pub top: i32,
    /// One past the rightmost column
    pub right: i32,
    /// One past the lowest inked row
    pub bottom: i32,
}

impl TextBounds {
    /// Width of the box.
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height of the box.
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Measures `text` as a single run in `face`.
///
/// Unlike [GlyphRun::total_width] this applies kerning and pen advances, so the two can
/// disagree. Centering uses this one.
pub fn text_bounds(face: &dyn GlyphFace, text: &str) -> TextBounds {
    let mut pen = 0.0_f32;
    let mut left = 0;
    let mut right = 0;
    let mut ink: Option<(i32, i32)> = None;
    let mut previous = None;

    for ch in text.chars() {
        if let Some(prev) = previous {
            pen += face.kern(prev, ch);
        }
        let origin = pen.round() as i32;
        let glyph = face.glyph_box(ch);
        left = left.min(origin + glyph.left);
        right = right.max(origin + glyph.right);
        if let Some((top, bottom)) = glyph.ink {
            ink = Some(match ink {
                Some((t, b)) => (t.min(top), b.max(bottom)),
                None => (top, bottom),
            });
        }
        pen += face.advance(ch);
        previous = Some(ch);
    }

    right = right.max(pen.round() as i32);
    let (top, bottom) = ink.unwrap_or_default();
    TextBounds {
        left,
        top,
        right,
        bottom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::testing::BlockFace;

    #[test]
    fn classification_covers_range_edges() {
        assert_eq!(classify('\u{1F600}'), GlyphClass::Symbol);
        assert_eq!(classify('\u{1F64F}'), GlyphClass::Symbol);
        assert_eq!(classify('\u{2600}'), GlyphClass::Symbol);
        assert_eq!(classify('\u{27BF}'), GlyphClass::Symbol);
        assert_eq!(classify('\u{FE0F}'), GlyphClass::Symbol);
        assert_eq!(classify('\u{1F1E6}'), GlyphClass::Symbol);
        assert_eq!(classify('\u{1F018}'), GlyphClass::Symbol);
        assert_eq!(classify('\u{1F270}'), GlyphClass::Symbol);

        assert_eq!(classify('\u{25FF}'), GlyphClass::Standard);
        assert_eq!(classify('\u{27C0}'), GlyphClass::Standard);
        assert_eq!(classify('\u{1F017}'), GlyphClass::Standard);
        assert_eq!(classify('\u{1FA00}'), GlyphClass::Standard);
        assert_eq!(classify('A'), GlyphClass::Standard);
        assert_eq!(classify('é'), GlyphClass::Standard);
    }

    #[test]
    fn shaping_upper_cases_and_sums_widths() {
        let face = BlockFace::text(50);
        let shaper = Shaper::new(&face, None);
        let run = shaper.shape("hi there");
        let chars: String = run.glyphs.iter().map(|glyph| glyph.ch).collect();
        assert_eq!(chars, "HI THERE");
        // seven letters at 30px and one space at 16px
        assert_eq!(run.total_width(), 7 * 30 + 16);
    }

    #[test]
    fn symbols_use_the_symbol_face_when_present() {
        let text = BlockFace::text(50);
        let symbol = BlockFace::symbol(50);
        let shaper = Shaper::new(&text, Some(&symbol));
        let run = shaper.shape("a\u{1F600}");
        assert_eq!(run.glyphs[0].advance, 30);
        assert!(!run.glyphs[0].on_symbol_face);
        assert_eq!(run.glyphs[1].class, GlyphClass::Symbol);
        assert!(run.glyphs[1].on_symbol_face);
        assert_eq!(run.glyphs[1].advance, 50);
        assert_eq!(run.total_width(), 80);
    }

    #[test]
    fn symbols_degrade_to_the_text_face() {
        let text = BlockFace::text(50);
        let shaper = Shaper::new(&text, None);
        let run = shaper.shape("\u{1F600}");
        assert_eq!(run.glyphs[0].class, GlyphClass::Symbol);
        assert!(!run.glyphs[0].on_symbol_face);
        assert_eq!(run.glyphs[0].advance, 30);
    }

    #[test]
    fn whole_string_bounds_apply_kerning_but_the_run_does_not() {
        let face = BlockFace::text(50).with_kerning();
        let shaper = Shaper::new(&face, None);
        let run = shaper.shape("AV");
        assert_eq!(run.total_width(), 60);

        let bounds = text_bounds(&face, "AV");
        assert_eq!(bounds.width(), 55);
        assert_eq!(bounds.top, 10);
        assert_eq!(bounds.height(), 40);
    }

    #[test]
    fn blank_text_has_no_height() {
        let face = BlockFace::text(50);
        let bounds = text_bounds(&face, "   ");
        assert_eq!(bounds.width(), 48);
        assert_eq!(bounds.height(), 0);
    }
}
