//! Where a badge image comes from: a local file, an http(s) URL or an inline
//! `data:` URL.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::Engine as Base64Engine;
use url::Url;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    File(PathBuf),
    Url(Url),
    /// Already-fetched bytes (from a `data:` URL or an in-memory buffer)
    Data(Vec<u8>),
}

impl ImageSource {
    /// Classify a user-supplied string.
    ///
    /// `data:` URLs are decoded eagerly, `http://` and `https://` become URL
    /// sources and everything else is treated as a path.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::SelectionError("empty image source".into()));
        }
        if trimmed.starts_with("data:") {
            return decode_data_url(trimmed).map(ImageSource::Data);
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = Url::parse(trimmed)
                .map_err(|e| Error::LoadError(format!("Invalid URL {}: {}", trimmed, e)))?;
            return Ok(ImageSource::Url(url));
        }
        Ok(ImageSource::File(PathBuf::from(trimmed)))
    }

    /// Resolve a catalog entry, which may be relative, against a base.
    ///
    /// The base is either a URL (`https://host/assets/`) or a directory.
    /// Absolute entries are returned as-is.
    pub fn resolve(entry: &str, base: Option<&str>) -> Result<Self> {
        let parsed = Self::parse(entry)?;
        let (ImageSource::File(rel), Some(base)) = (&parsed, base) else {
            return Ok(parsed);
        };
        if rel.is_absolute() {
            return Ok(parsed);
        }
        if base.starts_with("http://") || base.starts_with("https://") {
            let mut base_url = Url::parse(base)
                .map_err(|e| Error::ConfigError(format!("Invalid base URL {}: {}", base, e)))?;
            // Url::join drops the last segment unless the base ends in '/'
            if !base_url.path().ends_with('/') {
                let path = format!("{}/", base_url.path());
                base_url.set_path(&path);
            }
            let joined = base_url
                .join(entry)
                .map_err(|e| Error::ConfigError(format!("Cannot resolve {} against {}: {}", entry, base, e)))?;
            return Ok(ImageSource::Url(joined));
        }
        Ok(ImageSource::File(Path::new(base).join(rel)))
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::File(p) => write!(f, "{}", p.display()),
            ImageSource::Url(u) => write!(f, "{}", u),
            ImageSource::Data(bytes) => write!(f, "<{} inline bytes>", bytes.len()),
        }
    }
}

fn decode_data_url(s: &str) -> Result<Vec<u8>> {
    let (header, payload) = s
        .split_once(',')
        .ok_or_else(|| Error::LoadError("data URL is missing ','".into()))?;
    if !header.ends_with(";base64") {
        return Err(Error::LoadError(
            "only base64-encoded data URLs are supported".into(),
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::LoadError(format!("Invalid base64 in data URL: {}", e)))
}
