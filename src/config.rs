//! Config handling

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::log::LevelFilter;

use crate::constants::{
    FONT_DIR, SYMBOL_FONT_FILES, SYSTEM_SYMBOL_FONTS, SYSTEM_TEXT_FONTS, TEXT_FONT_FILES,
};
use crate::error::MemeError;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("ureq", LevelFilter::Info)
            .with_module_level("ureq_proto", LevelFilter::Warn);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

fn default_true() -> bool {
    true
}

/// Ordered font candidates for each role.
///
/// Relative paths in a manifest file are taken relative to the file itself.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FontManifest {
    /// Caption fonts, best first
    #[serde(default)]
    pub text: Vec<PathBuf>,
    /// Emoji/pictograph fonts, best first
    #[serde(default)]
    pub symbol: Vec<PathBuf>,
    /// Fall back to the platform sans-serif when no text font loads
    #[serde(default = "default_true")]
    pub system_default: bool,
}

impl Default for FontManifest {
    fn default() -> Self {
        Self::with_font_dir(&FONT_DIR)
    }
}

impl FontManifest {
    /// The stock candidate list: bundled fonts in `font_dir` first, then system fonts.
    pub fn with_font_dir(font_dir: &Path) -> Self {
        let text = TEXT_FONT_FILES
            .iter()
            .map(|name| font_dir.join(name))
            .chain(SYSTEM_TEXT_FONTS.iter().map(PathBuf::from))
            .collect();
        let symbol = SYMBOL_FONT_FILES
            .iter()
            .map(|name| font_dir.join(name))
            .chain(SYSTEM_SYMBOL_FONTS.iter().map(PathBuf::from))
            .collect();
        Self {
            text,
            symbol,
            system_default: true,
        }
    }

    /// Parses a JSON manifest, resolving relative paths against `base_dir`.
    pub fn from_json(raw: &str, base_dir: &Path) -> Result<Self, MemeError> {
        let mut manifest: FontManifest = serde_json::from_str(raw)
            .map_err(|err| MemeError::FontUnavailable(format!("invalid font manifest: {err}")))?;
        for path in manifest.text.iter_mut().chain(manifest.symbol.iter_mut()) {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }
        Ok(manifest)
    }

    /// Reads a JSON manifest from disk.
    pub fn from_file(path: &Path) -> Result<Self, MemeError> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            MemeError::FontUnavailable(format!(
                "failed to read font manifest {}: {}",
                path.display(),
                err
            ))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&raw, base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn stock_manifest_prefers_bundled_fonts() {
        let manifest = FontManifest::with_font_dir(Path::new("/srv/fonts"));
        assert_eq!(
            manifest.text.first(),
            Some(&PathBuf::from("/srv/fonts/unicode.impact.ttf"))
        );
        assert_eq!(
            manifest.text.last(),
            Some(&PathBuf::from(
                "/usr/share/fonts/truetype/dejavu/DejaVu-Sans-Bold.ttf"
            ))
        );
        assert_eq!(
            manifest.symbol.first(),
            Some(&PathBuf::from("/srv/fonts/NotoEmoji-Regular.ttf"))
        );
        assert!(manifest.system_default);
    }

    #[test]
    fn json_manifest_resolves_relative_paths() {
        let raw = r#"{"text": ["impact.ttf", "/abs/bold.ttf"], "system_default": false}"#;
        let manifest = FontManifest::from_json(raw, Path::new("/etc/memegen")).expect("parse");
        assert_eq!(
            manifest.text,
            vec![
                PathBuf::from("/etc/memegen/impact.ttf"),
                PathBuf::from("/abs/bold.ttf"),
            ]
        );
        assert!(manifest.symbol.is_empty());
        assert!(!manifest.system_default);
    }

    #[test]
    fn manifest_file_is_read_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("create manifest");
        file.write_all(br#"{"symbol": ["emoji.ttf"]}"#)
            .expect("write manifest");
        let manifest = FontManifest::from_file(file.path()).expect("read manifest");
        let parent = file.path().parent().expect("temp file has a parent");
        assert_eq!(manifest.symbol, vec![parent.join("emoji.ttf")]);
        assert!(manifest.system_default);
    }

    #[test]
    fn broken_manifests_are_font_errors() {
        assert!(matches!(
            FontManifest::from_json("{not json", Path::new(".")),
            Err(MemeError::FontUnavailable(ref msg)) if msg.starts_with("invalid font manifest")
        ));
        assert!(matches!(
            FontManifest::from_json(r#"{"text": "not a list"}"#, Path::new(".")),
            Err(MemeError::FontUnavailable(_))
        ));
        assert!(matches!(
            FontManifest::from_file(Path::new("/nonexistent/fonts.json")),
            Err(MemeError::FontUnavailable(_))
        ));
    }
}
