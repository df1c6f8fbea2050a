//! The meme compositor: image bytes and two captions in, PNG bytes out.
//!
//! The work happens in four stages, each in its own module:
//! [normalize] decodes and flattens the source, [solver] picks a font size using the
//! widths measured by [shaper], and [render] draws the outlined captions and encodes
//! the result. Nothing here touches the network or storage.

pub mod fonts;
pub mod normalize;
pub mod render;
pub mod shaper;
pub mod solver;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::{Arc, LazyLock};

use image::{Rgb, RgbImage};
use tracing::{debug, info, instrument};

use crate::config::FontManifest;
use crate::constants::{
    DEFAULT_FONT_SIZE, FONT_SHRINK_RATIO, HORIZONTAL_MARGIN_PERCENT, MIN_FONT_SIZE,
    MIN_OUTLINE_WIDTH, MIN_VERTICAL_MARGIN, OUTLINE_DIVISOR, VERTICAL_MARGIN_PERCENT,
};
use crate::error::MemeError;
use fonts::{FaceProvider, FontResolver};
use render::{PlacedCaption, RenderPlan};
use shaper::{GlyphClass, Shaper, classify};

/// Which edge a caption is anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Near the top edge
    Top,
    /// Near the bottom edge
    Bottom,
}

/// A caption and where it goes. Empty text means no caption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptionSpec {
    /// Caption text, any case
    pub text: String,
    /// Edge the caption is anchored to
    pub placement: Placement,
}

impl CaptionSpec {
    /// A top caption.
    pub fn top(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            placement: Placement::Top,
        }
    }

    /// A bottom caption.
    pub fn bottom(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            placement: Placement::Bottom,
        }
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Layout and color tunables. The defaults are the classic meme look.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Fraction of the width kept clear on each side when sizing
    pub horizontal_margin_percent: f64,
    /// Fraction of the height between a caption and its edge
    pub vertical_margin_percent: f64,
    /// Smallest vertical margin in pixels
    pub min_vertical_margin: u32,
    /// Size for empty captions and the cap when the default face is in use
    pub default_font_size: u32,
    /// The shrink search stops here
    pub min_font_size: u32,
    /// Ratio applied on each shrink step
    pub shrink_ratio: f64,
    /// Outline is `font_size / outline_divisor`...
    pub outline_divisor: u32,
    /// ...but at least this thick
    pub min_outline_width: u32,
    /// Caption fill
    pub fill_color: Rgb<u8>,
    /// Caption outline
    pub outline_color: Rgb<u8>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            horizontal_margin_percent: HORIZONTAL_MARGIN_PERCENT,
            vertical_margin_percent: VERTICAL_MARGIN_PERCENT,
            min_vertical_margin: MIN_VERTICAL_MARGIN,
            default_font_size: DEFAULT_FONT_SIZE,
            min_font_size: MIN_FONT_SIZE,
            shrink_ratio: FONT_SHRINK_RATIO,
            outline_divisor: OUTLINE_DIVISOR,
            min_outline_width: MIN_OUTLINE_WIDTH,
            fill_color: Rgb([255, 255, 255]),
            outline_color: Rgb([0, 0, 0]),
        }
    }
}

impl RenderOptions {
    /// Rejects tunables the size search or outline maths cannot work with.
    pub fn validate(&self) -> Result<(), MemeError> {
        if !(self.shrink_ratio > 0.0 && self.shrink_ratio < 1.0) {
            return Err(MemeError::RenderError(format!(
                "shrink ratio must be between 0 and 1, got {}",
                self.shrink_ratio
            )));
        }
        if self.outline_divisor == 0 {
            return Err(MemeError::RenderError(
                "outline divisor must be at least 1".to_string(),
            ));
        }
        if self.min_font_size == 0 {
            return Err(MemeError::RenderError(
                "minimum font size must be at least 1".to_string(),
            ));
        }
        if !(0.0..0.5).contains(&self.horizontal_margin_percent) {
            return Err(MemeError::RenderError(format!(
                "horizontal margin must be in [0, 0.5), got {}",
                self.horizontal_margin_percent
            )));
        }
        if !(self.vertical_margin_percent.is_finite() && self.vertical_margin_percent >= 0.0) {
            return Err(MemeError::RenderError(format!(
                "vertical margin must be a non-negative fraction, got {}",
                self.vertical_margin_percent
            )));
        }
        Ok(())
    }
}

/// Burns captions into images using faces from a [FaceProvider].
#[derive(Clone)]
pub struct Compositor {
    faces: Arc<dyn FaceProvider>,
    options: RenderOptions,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// A compositor with default options.
    pub fn new(faces: Arc<dyn FaceProvider>) -> Self {
        Self {
            faces,
            options: RenderOptions::default(),
        }
    }

    /// A compositor resolving fonts from a manifest.
    pub fn from_manifest(manifest: &FontManifest) -> Self {
        Self::new(Arc::new(FontResolver::new(manifest)))
    }

    /// Replaces the render options, refusing values that would stall or break rendering.
    pub fn with_options(mut self, options: RenderOptions) -> Result<Self, MemeError> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// The render options in use.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Solves font size and caption placement for a canvas of the given size.
    pub fn plan(
        &self,
        canvas: (u32, u32),
        top: &CaptionSpec,
        bottom: &CaptionSpec,
    ) -> Result<RenderPlan, MemeError> {
        let (width, height) = canvas;
        let faces = self.faces.as_ref();
        let top_size = solver::solve_font_size(faces, &top.text, width, height, &self.options)?;
        let bottom_size =
            solver::solve_font_size(faces, &bottom.text, width, height, &self.options)?;
        let font_size = solver::combined_font_size(
            (&top.text, top_size),
            (&bottom.text, bottom_size),
            &self.options,
        );
        debug!(
            "Solved sizes: top {}px, bottom {}px, drawing at {}px",
            top_size, bottom_size, font_size
        );

        let mut plan = RenderPlan {
            font_size,
            outline_width: render::outline_width(font_size, &self.options),
            top: None,
            bottom: None,
        };
        if top.is_empty() && bottom.is_empty() {
            return Ok(plan);
        }

        let face = faces.text_face(font_size)?;
        let place = |caption: &CaptionSpec| -> Option<PlacedCaption> {
            (!caption.is_empty()).then(|| {
                render::place_caption(
                    face.as_ref(),
                    &caption.text,
                    caption.placement,
                    canvas,
                    &self.options,
                )
            })
        };
        plan.top = place(top);
        plan.bottom = place(bottom);
        Ok(plan)
    }

    /// Draws the captions of `plan` onto `canvas`.
    pub fn draw(&self, canvas: &mut RgbImage, plan: &RenderPlan) -> Result<(), MemeError> {
        if plan.top.is_none() && plan.bottom.is_none() {
            return Ok(());
        }
        let text = self.faces.text_face(plan.font_size)?;
        let needs_symbol = plan
            .captions()
            .any(|caption| caption.text.chars().any(|ch| classify(ch) == GlyphClass::Symbol));
        let symbol = if needs_symbol {
            self.faces.symbol_face(plan.font_size)
        } else {
            None
        };
        debug!(
            "Drawing at {}px with a {}px text face{}",
            plan.font_size,
            text.pixel_size(),
            if symbol.is_some() { " and a symbol face" } else { "" }
        );
        let shaper = Shaper::new(text.as_ref(), symbol.as_deref());
        for caption in plan.captions() {
            render::draw_caption(canvas, caption, &shaper, plan.outline_width, &self.options);
        }
        Ok(())
    }

    /// Captions an already-normalized canvas in place and returns the plan used.
    pub fn caption_canvas(
        &self,
        canvas: &mut RgbImage,
        top_text: &str,
        bottom_text: &str,
    ) -> Result<RenderPlan, MemeError> {
        let plan = self.plan(
            canvas.dimensions(),
            &CaptionSpec::top(top_text),
            &CaptionSpec::bottom(bottom_text),
        )?;
        self.draw(canvas, &plan)?;
        Ok(plan)
    }

    /// Decodes `image_bytes`, burns in the captions and returns PNG bytes.
    #[instrument(skip_all, fields(top = %top_text, bottom = %bottom_text, bytes = image_bytes.len()))]
    pub fn render_caption_image(
        &self,
        image_bytes: &[u8],
        top_text: &str,
        bottom_text: &str,
    ) -> Result<Vec<u8>, MemeError> {
        let mut canvas = normalize::normalize(image_bytes)?;
        let plan = self.caption_canvas(&mut canvas, top_text, bottom_text)?;
        let png = render::encode_png(&canvas)?;
        info!(
            "Rendered {}x{} meme at {}px ({} bytes)",
            canvas.width(),
            canvas.height(),
            plan.font_size,
            png.len()
        );
        Ok(png)
    }
}

static DEFAULT_COMPOSITOR: LazyLock<Compositor> =
    LazyLock::new(|| Compositor::from_manifest(&FontManifest::default()));

/// Renders with the default font environment; see [Compositor::render_caption_image].
pub fn render_caption_image(
    image_bytes: &[u8],
    top_text: &str,
    bottom_text: &str,
) -> Result<Vec<u8>, MemeError> {
    DEFAULT_COMPOSITOR.render_caption_image(image_bytes, top_text, bottom_text)
}
