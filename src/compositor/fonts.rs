//! Font faces and the prioritized font resolution list.
//!
//! Everything that measures or draws goes through [GlyphFace], so the solver and the
//! renderer never care whether a face came from a TrueType file, the platform default
//! or a synthetic face in tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock, RwLock};

use fontdue::{Font, FontSettings};
use tracing::{debug, warn};

use crate::config::FontManifest;
use crate::constants::{DEFAULT_FACE_PIXEL_SIZE, FACE_CACHE_CAPACITY};
use crate::error::MemeError;

/// Which job a face is loaded for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontRole {
    /// Captions, drawn with an outline
    Text,
    /// Emoji and pictographs, drawn without an outline
    Symbol,
}

/// Tight box of one glyph, relative to its pen origin on the ascender line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphBox {
    /// Leftmost pixel column, never right of the pen origin
    pub left: i32,
    /// One past the rightmost column, never short of the advance
    pub right: i32,
    /// Inked rows as `(top, bottom)`, `None` for blank glyphs such as spaces
    pub ink: Option<(i32, i32)>,
}

impl GlyphBox {
    /// Horizontal extent of the box, which is what we use as the glyph's advance width.
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0).unsigned_abs()
    }
}

/// Coverage mask for one glyph, offset from its pen origin on the ascender line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// Column of the first mask pixel
    pub left: i32,
    /// Row of the first mask pixel
    pub top: i32,
    /// Mask width
    pub width: usize,
    /// Mask height
    pub height: usize,
    /// Row-major coverage, 0 transparent to 255 solid
    pub coverage: Vec<u8>,
}

/// A font face loaded at one pixel size.
pub trait GlyphFace: Send + Sync {
    /// Pixel size the face measures and draws at.
    fn pixel_size(&self) -> u32;

    /// True for the degraded platform default face, whose metrics ignore the requested size.
    fn is_default(&self) -> bool {
        false
    }

    /// Tight box of a single glyph.
    fn glyph_box(&self, ch: char) -> GlyphBox;

    /// Pen advance used when laying out a whole string.
    fn advance(&self, ch: char) -> f32;

    /// Kerning adjustment between a pair of glyphs.
    fn kern(&self, _left: char, _right: char) -> f32 {
        0.0
    }

    /// Rasterizes a glyph into a coverage mask.
    fn rasterize(&self, ch: char) -> GlyphBitmap;
}

/// Supplies text and symbol faces at a requested pixel size.
pub trait FaceProvider: Send + Sync {
    /// The caption face. Only fails when not even the platform default exists.
    fn text_face(&self, pixel_size: u32) -> Result<Arc<dyn GlyphFace>, MemeError>;

    /// The emoji face, or `None` when no candidate loaded.
    fn symbol_face(&self, pixel_size: u32) -> Option<Arc<dyn GlyphFace>>;
}

/// Parses font data once; the result serves every pixel size.
pub fn parse_font(data: &[u8], collection_index: u32) -> Result<Font, MemeError> {
    let settings = FontSettings {
        collection_index,
        ..FontSettings::default()
    };
    Font::from_bytes(data, settings).map_err(|err| MemeError::FontUnavailable(err.to_string()))
}

/// Bytes and collection index of the platform's bold sans-serif face, found through fontdb.
pub fn system_default_data() -> Option<(Vec<u8>, u32)> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let families = [fontdb::Family::SansSerif];
    let query = fontdb::Query {
        families: &families,
        weight: fontdb::Weight::BOLD,
        ..Default::default()
    };
    let Some(id) = db.query(&query) else {
        warn!("No system sans-serif face found");
        return None;
    };
    db.with_face_data(id, |data, index| (data.to_vec(), index))
}

/// A parsed fontdue font viewed at one pixel size. Cheap to build; the font is shared.
pub struct FontdueFace {
    font: Arc<Font>,
    pixel_size: u32,
    ascent: i32,
    is_default: bool,
}

impl FontdueFace {
    /// A view of `font` at `pixel_size`.
    pub fn new(font: Arc<Font>, pixel_size: u32, is_default: bool) -> Self {
        let px = pixel_size as f32;
        let ascent = font
            .horizontal_line_metrics(px)
            .map(|metrics| metrics.ascent)
            .unwrap_or(px)
            .round() as i32;
        Self {
            font,
            pixel_size,
            ascent,
            is_default,
        }
    }

    fn px(&self) -> f32 {
        self.pixel_size as f32
    }
}

impl GlyphFace for FontdueFace {
    fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    fn is_default(&self) -> bool {
        self.is_default
    }

    fn glyph_box(&self, ch: char) -> GlyphBox {
        let metrics = self.font.metrics(ch, self.px());
        let advance = metrics.advance_width.round() as i32;
        let ink_right = metrics.xmin + metrics.width as i32;
        let ink = (metrics.width > 0 && metrics.height > 0).then(|| {
            (
                self.ascent - (metrics.ymin + metrics.height as i32),
                self.ascent - metrics.ymin,
            )
        });
        GlyphBox {
            left: metrics.xmin.min(0),
            right: advance.max(ink_right),
            ink,
        }
    }

    fn advance(&self, ch: char) -> f32 {
        self.font.metrics(ch, self.px()).advance_width
    }

    fn kern(&self, left: char, right: char) -> f32 {
        self.font
            .horizontal_kern(left, right, self.px())
            .unwrap_or(0.0)
    }

    fn rasterize(&self, ch: char) -> GlyphBitmap {
        let (metrics, coverage) = self.font.rasterize(ch, self.px());
        GlyphBitmap {
            left: metrics.xmin,
            top: self.ascent - (metrics.ymin + metrics.height as i32),
            width: metrics.width,
            height: metrics.height,
            coverage,
        }
    }
}

/// One entry of a resolution list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// A font file on disk
    File(PathBuf),
    /// The platform's sans-serif face, loaded at a fixed size
    SystemDefault,
}

/// The winning candidate for a role, parsed once.
struct LoadedFont {
    font: Arc<Font>,
    is_default: bool,
}

type FaceCache = HashMap<(FontRole, u32), Arc<dyn GlyphFace>>;

/// Resolves faces by trying each candidate in order.
///
/// Each role's font is read and parsed at most once. Faces are cached by
/// `(role, pixel_size)` up to [FACE_CACHE_CAPACITY] entries, after which the cache starts over.
pub struct FontResolver {
    text: Vec<FontSource>,
    symbol: Vec<FontSource>,
    text_font: OnceLock<Option<LoadedFont>>,
    symbol_font: OnceLock<Option<LoadedFont>>,
    faces: RwLock<FaceCache>,
}

impl FontResolver {
    /// Builds the resolution lists from a manifest.
    pub fn new(manifest: &FontManifest) -> Self {
        let mut text: Vec<FontSource> = manifest
            .text
            .iter()
            .cloned()
            .map(FontSource::File)
            .collect();
        if manifest.system_default {
            text.push(FontSource::SystemDefault);
        }
        let symbol = manifest
            .symbol
            .iter()
            .cloned()
            .map(FontSource::File)
            .collect();
        Self::from_sources(text, symbol)
    }

    /// Builds a resolver from explicit resolution lists.
    pub fn from_sources(text: Vec<FontSource>, symbol: Vec<FontSource>) -> Self {
        Self {
            text,
            symbol,
            text_font: OnceLock::new(),
            symbol_font: OnceLock::new(),
            faces: RwLock::new(HashMap::new()),
        }
    }

    /// The resolution list for a role.
    pub fn sources(&self, role: FontRole) -> &[FontSource] {
        match role {
            FontRole::Text => &self.text,
            FontRole::Symbol => &self.symbol,
        }
    }

    /// First candidate for `role` that loads, viewed at `pixel_size`.
    pub fn resolve(&self, role: FontRole, pixel_size: u32) -> Option<Arc<dyn GlyphFace>> {
        let key = (role, pixel_size);
        if let Ok(faces) = self.faces.read()
            && let Some(hit) = faces.get(&key)
        {
            return Some(hit.clone());
        }

        let Some(loaded) = self.font(role) else {
            debug!("No {:?} face resolved at {}px", role, pixel_size);
            return None;
        };
        let face_size = if loaded.is_default {
            DEFAULT_FACE_PIXEL_SIZE
        } else {
            pixel_size
        };
        let face: Arc<dyn GlyphFace> = Arc::new(FontdueFace::new(
            loaded.font.clone(),
            face_size,
            loaded.is_default,
        ));

        if let Ok(mut faces) = self.faces.write() {
            if faces.len() >= FACE_CACHE_CAPACITY {
                debug!("Face cache full, starting over");
                faces.clear();
            }
            faces.insert(key, face.clone());
        }
        Some(face)
    }

    fn font(&self, role: FontRole) -> Option<&LoadedFont> {
        let slot = match role {
            FontRole::Text => &self.text_font,
            FontRole::Symbol => &self.symbol_font,
        };
        slot.get_or_init(|| self.sources(role).iter().find_map(load))
            .as_ref()
    }
}

fn load(source: &FontSource) -> Option<LoadedFont> {
    let font = match source {
        FontSource::File(path) => {
            let data = match std::fs::read(path) {
                Ok(data) => data,
                Err(err) => {
                    debug!("Font candidate {} unavailable: {}", path.display(), err);
                    return None;
                }
            };
            parse_font(&data, 0).map_err(|err| {
                warn!("Font candidate {} failed to parse: {}", path.display(), err);
                err
            })
        }
        FontSource::SystemDefault => {
            let (data, index) = system_default_data()?;
            debug!("Falling back to the platform default face");
            parse_font(&data, index)
        }
    };
    font.ok().map(|font| LoadedFont {
        font: Arc::new(font),
        is_default: *source == FontSource::SystemDefault,
    })
}

impl FaceProvider for FontResolver {
    fn text_face(&self, pixel_size: u32) -> Result<Arc<dyn GlyphFace>, MemeError> {
        self.resolve(FontRole::Text, pixel_size).ok_or_else(|| {
            MemeError::FontUnavailable(format!(
                "none of {} text font candidates could be loaded",
                self.text.len()
            ))
        })
    }

    fn symbol_face(&self, pixel_size: u32) -> Option<Arc<dyn GlyphFace>> {
        self.resolve(FontRole::Symbol, pixel_size)
    }
}
