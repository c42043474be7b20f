//! Badge Compositor
//!
//! Loads two or three badge images (plus an optional fixed logo), scales them
//! into a shared square tile size and places them side by side in a single
//! PNG ready to be saved.
//!
//! # Features
//!
//! - **Ordered, all-or-nothing loading**: every source is decoded concurrently;
//!   one failure aborts the whole composite
//! - **Aspect-preserving tiles**: non-anchor images are letterboxed and
//!   centred on white, never cropped
//! - **Anchor image**: an optional logo keeps its native size and sits leftmost
//! - **HTTP sources** (default `http` feature): badges may be addressed by URL
//!
//! # Example
//!
//! ```no_run
//! use badgecomp::{Compositor, CompositorConfig, DefaultLoader, ImageSource};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let compositor = Compositor::new(CompositorConfig::default());
//! let loader = DefaultLoader::new(&CompositorConfig::default())?;
//! let selection = vec![
//!     ImageSource::parse("badges/ozpert-gold.png")?,
//!     ImageSource::parse("badges/empathize.png")?,
//! ];
//! let result = compositor.composite_sources(&loader, &selection, None).await?;
//! println!("{}x{}", result.width, result.height);
//! compositor.export_as_download(".")?;
//! # Ok(())
//! # }
//! ```

use image::{Rgba, RgbaImage};
use serde::Deserialize;

pub mod error;
pub use error::{Error, Result};

pub mod catalog;
pub mod compositor;
pub mod loader;
pub mod placeholder;
pub mod rendering;
pub mod source;

pub use catalog::Catalog;
pub use compositor::{Compositor, CompositorState};
pub use loader::{load_all, DefaultLoader, ImageLoader};
pub use rendering::raster::CompositeResult;
pub use source::ImageSource;

/// Default name of the exported composite
pub const DEFAULT_OUTPUT_FILENAME: &str = "combined_badges.png";

/// Configuration for a `Compositor` and its loader
///
/// The defaults reproduce the behaviour of the original browser tool: white
/// padding, bilinear scaling, no load timeout and `combined_badges.png` as the
/// saved file name.
///
/// # Examples
///
/// ```
/// let cfg = badgecomp::CompositorConfig::default();
/// assert_eq!(cfg.output_filename, "combined_badges.png");
/// assert_eq!(cfg.load_timeout_ms, 0);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// File name used by `Compositor::export_as_download`
    pub output_filename: String,
    /// Per-source load timeout in milliseconds (0 => wait indefinitely)
    pub load_timeout_ms: u64,
    /// User agent string sent when fetching URL sources
    pub user_agent: String,
    /// Sampling filter used when scaling images into tiles
    pub resize_filter: ResizeFilter,
    /// Fill colour for the canvas and tile padding
    pub background: [u8; 4],
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            load_timeout_ms: 0,
            user_agent: concat!("badgecomp/", env!("CARGO_PKG_VERSION")).to_string(),
            resize_filter: ResizeFilter::default(),
            background: [255, 255, 255, 255],
        }
    }
}

/// Sampling filter for tile scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<ResizeFilter> for image::imageops::FilterType {
    fn from(f: ResizeFilter) -> Self {
        match f {
            ResizeFilter::Nearest => image::imageops::FilterType::Nearest,
            ResizeFilter::Triangle => image::imageops::FilterType::Triangle,
            ResizeFilter::CatmullRom => image::imageops::FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// A decoded bitmap
///
/// Owned RGBA pixels; never mutated once decoded. Zero-sized images can be
/// represented so that geometry checks can reject them explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// A single-colour image, handy for tests and placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba(rgba)),
        }
    }

    /// Decode any format the `image` crate recognises.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self {
            pixels: img.to_rgba8(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn has_zero_dimension(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}
