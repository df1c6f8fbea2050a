//! Where source images come from.
//!
//! The compositor only ever sees bytes; these sources produce them. Failures of any kind
//! come back as [MemeError::FetchError] and are never retried here.

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use rand_distr::{Distribution, Gamma};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::constants::{FETCH_MAX_REDIRECTS, MAX_IMAGE_BYTES, USER_AGENT};
use crate::error::MemeError;

/// Provides the raw bytes of a source image.
pub trait ImageSource: Send + Sync {
    /// Fetches the image at `location`.
    fn fetch(&self, location: &str) -> Result<Vec<u8>, MemeError>;
}

/// True when `location` should be fetched over HTTP rather than read from disk.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Artificial latency injected before requests, for exercising slow upstreams.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DelayPolicy {
    /// Requests go out immediately
    #[default]
    None,
    /// Hosts containing `host_contains` wait a uniformly random time in `[min, max]`
    Jitter {
        /// Substring matched against the request host
        host_contains: String,
        /// Shortest wait
        min: Duration,
        /// Longest wait
        max: Duration,
    },
    /// Hosts containing `host_contains` wait a gamma-distributed time, `scale` per unit
    Gamma {
        /// Substring matched against the request host
        host_contains: String,
        /// Gamma shape parameter
        shape: f64,
        /// Gamma scale parameter
        scale: Duration,
    },
}

fn host_matches(url: &Url, host_contains: &str) -> bool {
    url.host_str()
        .is_some_and(|host| host.contains(host_contains))
}

impl DelayPolicy {
    /// The wait before requesting `url`, if any.
    pub fn delay_for(&self, url: &Url) -> Option<Duration> {
        match self {
            DelayPolicy::None => None,
            DelayPolicy::Jitter {
                host_contains,
                min,
                max,
            } => {
                if !host_matches(url, host_contains) {
                    return None;
                }
                let low = min.as_millis() as u64;
                let high = (max.as_millis() as u64).max(low);
                Some(Duration::from_millis(rand::rng().random_range(low..=high)))
            }
            DelayPolicy::Gamma {
                host_contains,
                shape,
                scale,
            } => {
                if !host_matches(url, host_contains) {
                    return None;
                }
                let gamma = match Gamma::new(*shape, scale.as_secs_f64()) {
                    Ok(gamma) => gamma,
                    Err(err) => {
                        warn!("Ignoring gamma delay (shape {}, scale {:?}): {}", shape, scale, err);
                        return None;
                    }
                };
                Duration::try_from_secs_f64(gamma.sample(&mut rand::rng())).ok()
            }
        }
    }
}

/// Fetches images over HTTP(S) with an injected agent.
#[derive(Clone)]
pub struct HttpImageSource {
    agent: ureq::Agent,
    delay: DelayPolicy,
    max_bytes: u64,
}

impl std::fmt::Debug for HttpImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpImageSource")
            .field("delay", &self.delay)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

impl HttpImageSource {
    /// Wraps an agent; timeouts and redirects are whatever the agent was built with.
    pub fn new(agent: ureq::Agent) -> Self {
        Self {
            agent,
            delay: DelayPolicy::None,
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    /// An agent with a global timeout that follows redirects.
    pub fn default_agent(timeout: Duration) -> ureq::Agent {
        ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .max_redirects(FETCH_MAX_REDIRECTS)
            .build()
            .into()
    }

    /// Sets the delay policy.
    pub fn with_delay(mut self, delay: DelayPolicy) -> Self {
        self.delay = delay;
        self
    }

    /// Caps the response body size.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

impl ImageSource for HttpImageSource {
    #[instrument(skip(self))]
    fn fetch(&self, location: &str) -> Result<Vec<u8>, MemeError> {
        let url = Url::parse(location)
            .map_err(|err| MemeError::FetchError(format!("invalid url {location}: {err}")))?;

        if let Some(delay) = self.delay.delay_for(&url) {
            debug!("Delaying request to {} by {:?}", url, delay);
            std::thread::sleep(delay);
        }

        let mut response = self
            .agent
            .get(url.as_str())
            .header("User-Agent", USER_AGENT.as_str())
            .call()?;
        let status = response.status();
        if !status.is_success() {
            return Err(MemeError::FetchError(format!("{status} from {url}")));
        }

        let bytes = response
            .body_mut()
            .with_config()
            .limit(self.max_bytes)
            .read_to_vec()?;
        info!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

/// Reads images from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileImageSource;

impl ImageSource for FileImageSource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, MemeError> {
        let path = Path::new(location);
        let bytes = std::fs::read(path).map_err(|err| {
            MemeError::FetchError(format!("failed to read {}: {}", path.display(), err))
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(bytes)
    }
}
