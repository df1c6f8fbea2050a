//! A meme request: where the image comes from and what it should say.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use url::Url;

use crate::compositor::Compositor;
use crate::constants::MAX_CAPTION_CHARS;
use crate::error::MemeError;
use crate::fetch::{ImageSource, is_remote};

/// Inputs for one meme.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemeRequest {
    /// HTTP(S) URL or local path of the source image
    pub image_url: String,
    /// Caption along the top edge, may be empty
    #[serde(default)]
    pub top_text: String,
    /// Caption along the bottom edge, may be empty
    #[serde(default)]
    pub bottom_text: String,
}

impl MemeRequest {
    /// Builds a request, trimming surrounding whitespace from every field.
    pub fn new(image_url: &str, top_text: &str, bottom_text: &str) -> Self {
        Self {
            image_url: image_url.trim().to_string(),
            top_text: top_text.trim().to_string(),
            bottom_text: bottom_text.trim().to_string(),
        }
    }

    /// True when the image has to be fetched over HTTP.
    pub fn is_remote(&self) -> bool {
        is_remote(&self.image_url)
    }

    /// Checks the request before anything is fetched.
    pub fn validate(&self) -> Result<(), MemeError> {
        if self.image_url.is_empty() {
            return Err(MemeError::InvalidRequest(
                "Image URL is required.".to_string(),
            ));
        }
        if self.is_remote() {
            let url = Url::parse(&self.image_url)?;
            if !url.has_host() {
                return Err(MemeError::InvalidRequest(
                    "Please enter a valid URL.".to_string(),
                ));
            }
        }
        for (label, text) in [("Top", &self.top_text), ("Bottom", &self.bottom_text)] {
            if text.chars().count() > MAX_CAPTION_CHARS {
                return Err(MemeError::InvalidRequest(format!(
                    "{label} text must be {MAX_CAPTION_CHARS} characters or less."
                )));
            }
        }
        Ok(())
    }

    /// Validates, fetches the source image and renders the meme as PNG bytes.
    #[instrument(skip_all, fields(image_url = %self.image_url))]
    pub fn generate(
        &self,
        source: &dyn ImageSource,
        compositor: &Compositor,
    ) -> Result<Vec<u8>, MemeError> {
        self.validate()?;
        let image_bytes = source.fetch(&self.image_url)?;
        let png = compositor.render_caption_image(&image_bytes, &self.top_text, &self.bottom_text)?;
        info!("Generated meme from {}", self.image_url);
        Ok(png)
    }
}
