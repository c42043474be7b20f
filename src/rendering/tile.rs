//! Tile resizer: scale an image into a fixed box without cropping, centre it
//! and pad the remainder with the background colour.

use image::{imageops, RgbaImage};

use super::layout::Rect;
use super::paint::{PaintCommand, Surface};
use crate::{Error, RasterImage, ResizeFilter, Result};

/// Unrounded placement of scaled content inside a target box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentFit {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ContentFit {
    /// Snap to whole pixels. Content is at least 1px and never larger than
    /// the target box.
    pub fn to_rect(&self, target_width: u32, target_height: u32) -> Rect {
        let w = (self.width.round() as u32).max(1).min(target_width);
        let h = (self.height.round() as u32).max(1).min(target_height);
        Rect {
            x: ((target_width - w) / 2) as i32,
            y: ((target_height - h) / 2) as i32,
            width: w,
            height: h,
        }
    }
}

/// A letterboxed copy of a source image at exactly the target size.
#[derive(Debug, Clone)]
pub struct Tile {
    pub image: RgbaImage,
    /// Where the scaled content sits inside the tile
    pub content: Rect,
}

/// Fit a `src_w x src_h` image into `target_w x target_h`, preserving the
/// aspect ratio. Whichever side is relatively wider is the constrained one.
pub fn fit_content(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> Result<ContentFit> {
    if src_w == 0 || src_h == 0 {
        return Err(Error::GeometryError(format!(
            "source image is {}x{}",
            src_w, src_h
        )));
    }
    if target_w == 0 || target_h == 0 {
        return Err(Error::GeometryError(format!(
            "target tile is {}x{}",
            target_w, target_h
        )));
    }

    let img_ratio = src_w as f64 / src_h as f64;
    let target_ratio = target_w as f64 / target_h as f64;
    let (width, height) = if img_ratio > target_ratio {
        (target_w as f64, target_w as f64 / img_ratio)
    } else {
        (target_h as f64 * img_ratio, target_h as f64)
    };

    Ok(ContentFit {
        width,
        height,
        offset_x: (target_w as f64 - width) / 2.0,
        offset_y: (target_h as f64 - height) / 2.0,
    })
}

/// Resize `image` into a `target_w x target_h` tile.
pub fn resize(
    image: &RasterImage,
    target_w: u32,
    target_h: u32,
    filter: ResizeFilter,
    background: [u8; 4],
) -> Result<Tile> {
    let content = fit_content(image.width(), image.height(), target_w, target_h)?.to_rect(target_w, target_h);

    let scaled;
    let src = if content.width == image.width() && content.height == image.height() {
        image.pixels()
    } else {
        scaled = imageops::resize(image.pixels(), content.width, content.height, filter.into());
        &scaled
    };

    let mut surface = Surface::new(target_w, target_h);
    surface.paint(&[
        PaintCommand::SolidRect {
            x: 0,
            y: 0,
            width: target_w,
            height: target_h,
            rgba: background,
        },
        PaintCommand::Image {
            x: content.x,
            y: content.y,
            image: src,
        },
    ]);

    Ok(Tile {
        image: surface.into_pixels(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn wide_image_is_letterboxed_top_and_bottom() {
        let img = RasterImage::solid(150, 100, [33, 150, 243, 255]);
        let tile = resize(&img, 150, 150, ResizeFilter::Triangle, WHITE).unwrap();
        assert_eq!(tile.image.dimensions(), (150, 150));
        assert_eq!(tile.content, Rect { x: 0, y: 25, width: 150, height: 100 });
        assert_eq!(tile.image.get_pixel(75, 10).0, WHITE);
        assert_eq!(tile.image.get_pixel(75, 75).0, [33, 150, 243, 255]);
        assert_eq!(tile.image.get_pixel(75, 140).0, WHITE);
    }

    #[test]
    fn square_image_fills_square_tile() {
        let img = RasterImage::solid(100, 100, [205, 127, 50, 255]);
        let tile = resize(&img, 150, 150, ResizeFilter::Triangle, WHITE).unwrap();
        assert_eq!(tile.content, Rect { x: 0, y: 0, width: 150, height: 150 });
        assert_eq!(tile.image.get_pixel(0, 0).0, [205, 127, 50, 255]);
        assert_eq!(tile.image.get_pixel(149, 149).0, [205, 127, 50, 255]);
    }

    #[test]
    fn tall_image_is_pillarboxed() {
        let fit = fit_content(50, 200, 100, 100).unwrap();
        assert_eq!((fit.width, fit.height), (25.0, 100.0));
        assert_eq!(fit.offset_x, 37.5);
        let tile = resize(&RasterImage::solid(50, 200, [0, 0, 0, 255]), 100, 100, ResizeFilter::Nearest, WHITE).unwrap();
        assert_eq!(tile.image.get_pixel(5, 50).0, WHITE);
        assert_eq!(tile.image.get_pixel(50, 50).0, [0, 0, 0, 255]);
    }

    #[test]
    fn transparent_content_shows_white_padding() {
        let img = RasterImage::solid(10, 10, [0, 0, 0, 0]);
        let tile = resize(&img, 20, 20, ResizeFilter::Triangle, WHITE).unwrap();
        assert!(tile.image.pixels().all(|p| p.0 == WHITE));
    }

    #[test]
    fn fit_preserves_ratio_and_stays_inside() {
        for &(w, h) in &[(1u32, 1u32), (3, 7), (640, 480), (1, 999), (999, 1), (150, 100)] {
            for &t in &[1u32, 64, 150, 1000] {
                let fit = fit_content(w, h, t, t).unwrap();
                let r = w as f64 / h as f64;
                assert!((fit.width / fit.height - r).abs() < 1e-9 * r.max(1.0));
                assert!(fit.width <= t as f64 + 1e-9);
                assert!(fit.height <= t as f64 + 1e-9);
                assert!(fit.width.is_finite() && fit.height.is_finite());
                let rect = fit.to_rect(t, t);
                assert!(rect.width <= t && rect.height <= t);
            }
        }
    }

    #[test]
    fn zero_dimensions_are_geometry_errors() {
        assert!(matches!(fit_content(0, 10, 10, 10), Err(Error::GeometryError(_))));
        assert!(matches!(fit_content(10, 0, 10, 10), Err(Error::GeometryError(_))));
        assert!(matches!(fit_content(10, 10, 0, 10), Err(Error::GeometryError(_))));
        let img = RasterImage::solid(5, 0, WHITE);
        assert!(matches!(resize(&img, 10, 10, ResizeFilter::Triangle, WHITE), Err(Error::GeometryError(_))));
    }
}
