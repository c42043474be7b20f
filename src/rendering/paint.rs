//! Minimal paint command set and the surface that executes it

use image::{imageops, Rgba, RgbaImage};

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand<'a> {
    /// Opaque fill, replaces whatever is underneath
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: [u8; 4],
    },
    /// Alpha-composite an image with its top-left corner at (x, y)
    Image { x: i32, y: i32, image: &'a RgbaImage },
}

/// An RGBA drawing surface. Draws outside the bounds are clipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// A 0x0 surface.
    pub fn empty() -> Self {
        Self::new(0, 0)
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

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    pub fn execute(&mut self, cmd: &PaintCommand<'_>) {
        match *cmd {
            PaintCommand::SolidRect {
                x,
                y,
                width,
                height,
                rgba,
            } => self.fill_rect(x, y, width, height, Rgba(rgba)),
            PaintCommand::Image { x, y, image } => {
                imageops::overlay(&mut self.pixels, image, x as i64, y as i64);
            }
        }
    }

    pub fn paint(&mut self, cmds: &[PaintCommand<'_>]) {
        for cmd in cmds {
            self.execute(cmd);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) {
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + width as i64).min(self.width() as i64);
        let y1 = (y as i64 + height as i64).min(self.height() as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.pixels.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_rect_is_clipped() {
        let mut s = Surface::new(4, 4);
        s.execute(&PaintCommand::SolidRect {
            x: 2,
            y: -1,
            width: 10,
            height: 2,
            rgba: [255, 0, 0, 255],
        });
        assert_eq!(s.pixels().get_pixel(3, 0).0, [255, 0, 0, 255]);
        assert_eq!(s.pixels().get_pixel(1, 0).0, [0, 0, 0, 0]);
        assert_eq!(s.pixels().get_pixel(3, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn image_is_composited_over_background() {
        let mut s = Surface::new(3, 1);
        let mut top = RgbaImage::new(2, 1);
        top.put_pixel(0, 0, Rgba([0, 0, 255, 255]));
        // second pixel fully transparent
        s.paint(&[
            PaintCommand::SolidRect {
                x: 0,
                y: 0,
                width: 3,
                height: 1,
                rgba: [255, 255, 255, 255],
            },
            PaintCommand::Image { x: 1, y: 0, image: &top },
        ]);
        assert_eq!(s.pixels().get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(s.pixels().get_pixel(1, 0).0, [0, 0, 255, 255]);
        assert_eq!(s.pixels().get_pixel(2, 0).0, [255, 255, 255, 255]);
    }
}
