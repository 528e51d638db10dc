//! Logo asset probing.
//!
//! A card's logo is rendered as an `<img>` pointing below the configured logo
//! path. A probe decides ahead of time whether that asset would load; cards
//! whose asset fails get the placeholder glyph, same as the page's image
//! `onerror` handler would give them in a browser.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use rayon::prelude::*;
use url::Url;

use super::fetch::{fetch_url, is_remote, FetchError};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum LogoError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot resolve {src} against {base}: {source}")]
    Resolve {
        src: String,
        base: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("cannot decode {src}: {source}")]
    Decode {
        src: String,
        #[source]
        source: image::ImageError,
    },
}

/// Decides whether a logo reference (logo path + file name, without the
/// cache-busting query) can be loaded.
pub trait LogoProbe: Send + Sync {
    fn probe(&self, src: &str) -> Result<(), LogoError>;
}

impl<F> LogoProbe for F
where
    F: Fn(&str) -> Result<(), LogoError> + Send + Sync,
{
    fn probe(&self, src: &str) -> Result<(), LogoError> {
        self(src)
    }
}

/// Root the logo references are resolved against.
#[derive(Debug, Clone)]
pub enum LogoBase {
    Dir(PathBuf),
    Url(Url),
}

impl LogoBase {
    pub fn parse(location: &str) -> Result<Self, url::ParseError> {
        if is_remote(location) {
            Url::parse(location).map(LogoBase::Url)
        } else {
            Ok(LogoBase::Dir(PathBuf::from(location)))
        }
    }
}

/// Probe that loads the asset and decodes it with the `image` crate.
pub struct AssetProbe {
    base: LogoBase,
}

impl AssetProbe {
    pub fn new(base: LogoBase) -> Self {
        Self { base }
    }

    fn load_bytes(&self, src: &str) -> Result<Vec<u8>, LogoError> {
        match &self.base {
            LogoBase::Dir(dir) => {
                let path = dir.join(src);
                std::fs::read(&path).map_err(|source| LogoError::Io { path, source })
            }
            LogoBase::Url(base) => {
                let url = base.join(src).map_err(|source| LogoError::Resolve {
                    src: src.to_string(),
                    base: base.to_string(),
                    source,
                })?;
                Ok(fetch_url(url.as_str(), PROBE_TIMEOUT)?.body)
            }
        }
    }
}

impl LogoProbe for AssetProbe {
    fn probe(&self, src: &str) -> Result<(), LogoError> {
        let bytes = self.load_bytes(src)?;
        image::load_from_memory(&bytes).map_err(|source| LogoError::Decode {
            src: src.to_string(),
            source,
        })?;
        Ok(())
    }
}

/// Probe every distinct reference in parallel and return the ones that failed.
pub fn failed_logos(probe: &dyn LogoProbe, srcs: &[String]) -> BTreeSet<String> {
    let distinct: BTreeSet<&String> = srcs.iter().collect();
    distinct
        .into_par_iter()
        .filter_map(|src| match probe.probe(src) {
            Ok(()) => None,
            Err(e) => {
                log::debug!("Logo {} failed to load: {}", src, e);
                Some(src.clone())
            }
        })
        .collect()
}
