//! Image loading: the boundary between the compositor and the outside world.
//!
//! Loads are asynchronous and may run concurrently. `load_all` joins them with
//! all-or-nothing semantics and hands results back in request order,
//! regardless of which load finished first.

use std::future::Future;
use std::time::Duration;

use futures::future::try_join_all;
use log::{debug, warn};

use crate::{CompositorConfig, Error, ImageSource, RasterImage, Result};

/// Something that can turn an `ImageSource` into a decoded `RasterImage`.
pub trait ImageLoader: Send + Sync {
    /// Fetch and decode one source. Fails with `Error::LoadError` when the
    /// source is unreachable or not a decodable image.
    fn load<'a>(&'a self, source: &'a ImageSource) -> impl Future<Output = Result<RasterImage>> + Send + 'a;

    /// Optional per-load timeout; `None` waits indefinitely.
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

/// Load every source concurrently and return them in request order.
///
/// The first failure (or timeout) fails the whole call; no partial list is
/// ever returned.
pub async fn load_all<L: ImageLoader>(loader: &L, sources: &[ImageSource]) -> Result<Vec<RasterImage>> {
    let timeout = loader.timeout();
    try_join_all(sources.iter().map(|src| load_one(loader, src, timeout))).await
}

async fn load_one<L: ImageLoader>(loader: &L, src: &ImageSource, timeout: Option<Duration>) -> Result<RasterImage> {
    let res = match timeout {
        Some(limit) => tokio::time::timeout(limit, loader.load(src))
            .await
            .map_err(|_| Error::Timeout(limit.as_millis() as u64))
            .and_then(|r| r),
        None => loader.load(src).await,
    };
    match &res {
        Ok(img) => debug!("Loaded {} ({}x{})", src, img.width(), img.height()),
        Err(e) => warn!("Failed to load {}: {}", src, e),
    }
    res
}

/// Loader for files, `data:` URLs and (with the `http` feature) http(s) URLs.
pub struct DefaultLoader {
    #[cfg(feature = "http")]
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl DefaultLoader {
    pub fn new(config: &CompositorConfig) -> Result<Self> {
        let timeout = (config.load_timeout_ms > 0).then(|| Duration::from_millis(config.load_timeout_ms));

        #[cfg(feature = "http")]
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            #[cfg(feature = "http")]
            client,
            timeout,
        })
    }

    async fn fetch_bytes(&self, source: &ImageSource) -> Result<Vec<u8>> {
        match source {
            ImageSource::File(path) => tokio::fs::read(path)
                .await
                .map_err(|e| Error::LoadError(format!("Failed to read {}: {}", path.display(), e))),
            ImageSource::Data(bytes) => Ok(bytes.clone()),
            ImageSource::Url(url) => self.fetch_url(url).await,
        }
    }

    #[cfg(feature = "http")]
    async fn fetch_url(&self, url: &url::Url) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::LoadError(format!("Failed to fetch {}: {}", url, e)))?;
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::LoadError(format!("Failed to read response body from {}: {}", url, e)))?;
        Ok(body.to_vec())
    }

    #[cfg(not(feature = "http"))]
    async fn fetch_url(&self, url: &url::Url) -> Result<Vec<u8>> {
        Err(Error::LoadError(format!(
            "Cannot fetch {}: built without the `http` feature",
            url
        )))
    }
}

impl ImageLoader for DefaultLoader {
    fn load<'a>(&'a self, source: &'a ImageSource) -> impl Future<Output = Result<RasterImage>> + Send + 'a {
        async move {
            let bytes = self.fetch_bytes(source).await?;
            RasterImage::decode(&bytes)
                .map_err(|e| Error::LoadError(format!("{} is not a decodable image: {}", source, e)))
        }
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
