//! Offline generator for the catalog's placeholder badge images.
//!
//! Each badge is a 200x200 square of solid colour with its label in white
//! 20px DejaVu Sans Bold, word-wrapped and centred. The anchor logo
//! placeholder is a plain 40x40 square.

mod text;

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use log::{info, warn};

use crate::catalog::{ANCHOR_FILE, TIER_BADGES, VALUE_BADGES};
use crate::rendering::encode_png;
use text::draw_line_centered;
use crate::{Error, RasterImage, Result};

pub const BADGE_SIZE: u32 = 200;
pub const LOGO_SIZE: u32 = 40;
pub const LOGO_COLOR: &str = "#1F2A44";

/// Lines are packed while `current + next word` stays under this many chars.
pub const MAX_LINE_CHARS: usize = 15;
pub const LINE_PITCH: i32 = 30;
pub const HALF_LINE: i32 = 15;

const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Greedy word wrap. The separating space is not counted against the limit.
pub fn wrap_badge_text(text: &str) -> Vec<String> {
    let mut words = text.split(' ');
    let mut current = words.next().unwrap_or_default().to_string();
    let mut lines = Vec::new();
    for word in words {
        if current.len() + word.len() < MAX_LINE_CHARS {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    lines.push(current);
    lines
}

/// Vertical centre of each line so the block is centred on `center_y`.
pub fn line_centers(line_count: usize, center_y: i32) -> Vec<i32> {
    let offset = (line_count as i32 - 1).max(0) * HALF_LINE;
    (0..line_count as i32)
        .map(|i| center_y - offset + i * LINE_PITCH)
        .collect()
}

/// Parse `#RRGGBB` into opaque RGBA.
pub fn parse_hex_color(s: &str) -> Result<[u8; 4]> {
    let digits = s.trim().trim_start_matches('#');
    let bytes = hex::decode(digits).map_err(|e| Error::ConfigError(format!("Invalid colour {}: {}", s, e)))?;
    match bytes.as_slice() {
        [r, g, b] => Ok([*r, *g, *b, 255]),
        _ => Err(Error::ConfigError(format!("Invalid colour {}: expected #RRGGBB", s))),
    }
}

/// Render one badge placeholder.
pub fn render_placeholder(text: &str, color: &str) -> Result<RasterImage> {
    let mut img = RgbaImage::from_pixel(BADGE_SIZE, BADGE_SIZE, Rgba(parse_hex_color(color)?));
    let lines = wrap_badge_text(text);
    let center = (BADGE_SIZE / 2) as i32;
    for (line, cy) in lines.iter().zip(line_centers(lines.len(), center)) {
        let width = draw_line_centered(&mut img, line, center, cy, TEXT_COLOR);
        if width > BADGE_SIZE {
            warn!("Label line {:?} is {}px wide and will be clipped", line, width);
        }
    }
    Ok(RasterImage::from_rgba(img))
}

/// Write every catalog placeholder (and the logo) into `dir`.
pub fn generate_placeholders(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for (_, label, color, file) in TIER_BADGES.iter().chain(VALUE_BADGES) {
        let badge = render_placeholder(label, color)?;
        written.push(write_png(dir, file, &badge)?);
    }

    let logo = RasterImage::solid(LOGO_SIZE, LOGO_SIZE, parse_hex_color(LOGO_COLOR)?);
    written.push(write_png(dir, ANCHOR_FILE, &logo)?);

    info!("Wrote {} placeholder images to {}", written.len(), dir.display());
    Ok(written)
}

fn write_png(dir: &Path, file: &str, img: &RasterImage) -> Result<PathBuf> {
    let encoded = encode_png(img.pixels())?;
    let path = dir.join(file);
    std::fs::write(&path, &encoded.png_data)?;
    Ok(path)
}
