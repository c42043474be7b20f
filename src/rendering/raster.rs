//! PNG encoding of a finished surface

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// One encoded composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeResult {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl CompositeResult {
    /// Hex SHA-256 of the PNG bytes; identical selections give identical digests.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}

pub fn encode_png(pixels: &RgbaImage) -> Result<CompositeResult> {
    let (width, height) = pixels.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::GeometryError(format!(
            "cannot encode a {}x{} surface",
            width, height
        )));
    }
    let mut png_data = Vec::new();
    PngEncoder::new(&mut png_data)
        .write_image(pixels.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|e| Error::EncodeError(e.to_string()))?;
    Ok(CompositeResult {
        width,
        height,
        png_data,
    })
}
