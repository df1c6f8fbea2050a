//! CLI parser
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::FontManifest;
use crate::constants::{DELAY_GAMMA_SCALE, DELAY_GAMMA_SHAPE, FETCH_TIMEOUT, FONT_DIR};
use crate::error::MemeError;
use crate::fetch::DelayPolicy;

#[derive(Parser, Debug)]
#[command(name = "memegen", about = "Burn top and bottom captions into an image")]
/// CLI Options
pub struct CliOptions {
    /// Image URL (http or https) or a local file path
    pub source: String,

    #[clap(long, short, default_value = "")]
    /// Caption along the top edge
    pub top: String,

    #[clap(long, short, default_value = "")]
    /// Caption along the bottom edge
    pub bottom: String,

    #[clap(long, short, default_value = "meme.png", env = "MEMEGEN_OUTPUT")]
    /// Where to write the PNG, defaults to `meme.png`.
    /// Env: MEMEGEN_OUTPUT
    pub output: PathBuf,

    #[clap(long, env = "MEMEGEN_FONT_DIR")]
    /// Directory holding bundled fonts, defaults to `./media/fonts`.
    /// Env: MEMEGEN_FONT_DIR
    pub font_dir: Option<PathBuf>,

    #[clap(long, env = "MEMEGEN_FONT_MANIFEST", conflicts_with = "font_dir")]
    /// JSON file listing text and symbol font candidates, eg `/etc/memegen/fonts.json`.
    /// Env: MEMEGEN_FONT_MANIFEST
    pub font_manifest: Option<PathBuf>,

    #[clap(long, default_value_t = FETCH_TIMEOUT.as_secs(), env = "MEMEGEN_TIMEOUT_SECS")]
    /// Timeout for fetching the source image, in seconds.
    /// Env: MEMEGEN_TIMEOUT_SECS
    pub timeout_secs: u64,

    #[clap(long, env = "MEMEGEN_DELAY_HOST")]
    /// Delay requests to hosts containing this string, eg `imgflip.com`.
    /// Env: MEMEGEN_DELAY_HOST
    pub delay_host: Option<String>,

    #[clap(long, default_value_t = 0)]
    /// Shortest injected delay in milliseconds
    pub delay_min_ms: u64,

    #[clap(long, default_value_t = 0)]
    /// Longest injected delay in milliseconds
    pub delay_max_ms: u64,

    #[clap(long, env = "MEMEGEN_DELAY_GAMMA")]
    /// Draw delays from a gamma distribution instead of the uniform `[min, max]` range.
    /// Env: MEMEGEN_DELAY_GAMMA
    pub delay_gamma: bool,

    #[clap(long, default_value_t = DELAY_GAMMA_SHAPE)]
    /// Shape of the gamma delay distribution
    pub delay_shape: f64,

    #[clap(long, default_value_t = DELAY_GAMMA_SCALE.as_millis() as u64)]
    /// Scale of the gamma delay distribution, in milliseconds
    pub delay_scale_ms: u64,

    #[clap(long, help = "Enable debug logging", env = "MEMEGEN_DEBUG")]
    /// Enable debug logging. Env: MEMEGEN_DEBUG
    pub debug: bool,
}

impl CliOptions {
    /// Font candidates from the manifest file, the font directory, or the stock list.
    pub fn font_manifest(&self) -> Result<FontManifest, MemeError> {
        match (&self.font_manifest, &self.font_dir) {
            (Some(path), _) => FontManifest::from_file(path),
            (None, Some(dir)) => Ok(FontManifest::with_font_dir(dir)),
            (None, None) => Ok(FontManifest::with_font_dir(&FONT_DIR)),
        }
    }

    /// Fetch timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The delay policy, if a host to delay was given.
    pub fn delay_policy(&self) -> DelayPolicy {
        match &self.delay_host {
            Some(host) if !host.is_empty() && self.delay_gamma => DelayPolicy::Gamma {
                host_contains: host.clone(),
                shape: self.delay_shape,
                scale: Duration::from_millis(self.delay_scale_ms),
            },
            Some(host) if !host.is_empty() => DelayPolicy::Jitter {
                host_contains: host.clone(),
                min: Duration::from_millis(self.delay_min_ms),
                max: Duration::from_millis(self.delay_max_ms),
            },
            _ => DelayPolicy::None,
        }
    }
}
