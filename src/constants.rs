//! Shared constants/setters for things
//!

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

/// The default place we look for bundled fonts
pub static FONT_DIR: LazyLock<PathBuf> = LazyLock::new(|| PathBuf::from("./media/fonts"));

/// Text font files tried inside the font directory, in order.
pub const TEXT_FONT_FILES: [&str; 2] = ["unicode.impact.ttf", "impact.ttf"];

/// System-wide text fonts tried after the font directory.
pub const SYSTEM_TEXT_FONTS: [&str; 2] = [
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVu-Sans-Bold.ttf",
];

/// Symbol font files tried inside the font directory, in order.
pub const SYMBOL_FONT_FILES: [&str; 2] = ["NotoEmoji-Regular.ttf", "symbola.ttf"];

/// System-wide symbol fonts tried after the font directory.
pub const SYSTEM_SYMBOL_FONTS: [&str; 2] = [
    "/usr/share/fonts/truetype/noto/NotoEmoji-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
];

/// Pixel size the platform default face is always loaded at, whatever was asked for.
pub const DEFAULT_FACE_PIXEL_SIZE: u32 = 11;

/// Most `(role, pixel_size)` faces a font resolver keeps before starting over.
pub const FACE_CACHE_CAPACITY: usize = 64;

/// Size used for empty captions and whenever the degraded default face is in play.
pub const DEFAULT_FONT_SIZE: u32 = 40;

/// The shrink search never goes below this.
pub const MIN_FONT_SIZE: u32 = 20;

/// Each shrink step multiplies the candidate size by this and floors.
pub const FONT_SHRINK_RATIO: f64 = 0.9;

/// Fraction of the canvas width kept clear on each side of a caption.
pub const HORIZONTAL_MARGIN_PERCENT: f64 = 0.10;

/// Fraction of the canvas height between a caption and its edge.
pub const VERTICAL_MARGIN_PERCENT: f64 = 0.05;

/// Smallest vertical margin in pixels.
pub const MIN_VERTICAL_MARGIN: u32 = 20;

/// Outline width is `font_size / OUTLINE_DIVISOR`, but never thinner than [MIN_OUTLINE_WIDTH].
pub const OUTLINE_DIVISOR: u32 = 20;

/// Thinnest outline we draw.
pub const MIN_OUTLINE_WIDTH: u32 = 3;

/// Longest caption a request may carry, in characters.
pub const MAX_CAPTION_CHARS: usize = 100;

/// Global timeout for fetching a source image.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Redirects followed when fetching a source image.
pub const FETCH_MAX_REDIRECTS: u32 = 10;

/// Largest source image body we are willing to read.
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Shape of the gamma-distributed delay used to simulate a slow upstream.
pub const DELAY_GAMMA_SHAPE: f64 = 2.0;

/// Scale of the gamma-distributed delay; one unit of the distribution is this long.
pub const DELAY_GAMMA_SCALE: Duration = Duration::from_secs(2);

/// User agent sent when fetching source images.
pub static USER_AGENT: LazyLock<String> =
    LazyLock::new(|| format!("memegen/{}", env!("CARGO_PKG_VERSION")));
