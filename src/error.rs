//! Error handling

use tracing::debug;

/// Errors raised while fetching, decoding or compositing a meme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemeError {
    /// The image source could not be retrieved (non-2xx, transport failure, timeout)
    FetchError(String),
    /// The bytes could not be decoded as a supported raster image
    DecodeError(String),
    /// No usable text face could be produced, not even the platform default
    FontUnavailable(String),
    /// Something unexpected went wrong while rendering or encoding
    RenderError(String),
    /// The request failed validation before anything was fetched
    InvalidRequest(String),
}

impl std::fmt::Display for MemeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchError(msg) => write!(f, "Failed to fetch image: {msg}"),
            Self::DecodeError(msg) => write!(f, "Failed to decode image: {msg}"),
            Self::FontUnavailable(msg) => write!(f, "No usable font face: {msg}"),
            Self::RenderError(msg) => write!(f, "Failed to render meme: {msg}"),
            Self::InvalidRequest(msg) => write!(f, "Invalid request: {msg}"),
        }
    }
}

impl std::error::Error for MemeError {}

impl From<image::ImageError> for MemeError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decoding(_) | image::ImageError::Unsupported(_) => {
                MemeError::DecodeError(err.to_string())
            }
            other => MemeError::RenderError(other.to_string()),
        }
    }
}

impl From<ureq::Error> for MemeError {
    fn from(err: ureq::Error) -> Self {
        debug!("HTTP fetch error: {:?}", err);
        MemeError::FetchError(err.to_string())
    }
}

impl From<url::ParseError> for MemeError {
    fn from(err: url::ParseError) -> Self {
        MemeError::InvalidRequest(err.to_string())
    }
}
