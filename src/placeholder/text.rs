//! Label rasterisation with `cosmic-text` and the bundled DejaVu Sans Bold face.
//!
//! The font system is built once and shared; every label line is shaped into
//! its own buffer and alpha-blended straight into the badge's `RgbaImage`.

use std::sync::{Mutex, PoisonError};

use cosmic_text::{fontdb, Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache, Weight};
use image::{Rgba, RgbaImage};

use super::LINE_PITCH;

static FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

pub const FONT_FAMILY: &str = "DejaVu Sans";
pub const FONT_SIZE: f32 = 20.0;

/// Lazily initialised on first use; only the embedded face is loaded so output
/// does not depend on the fonts installed on the host.
static FONT_SYSTEM: Mutex<Option<FontSystem>> = Mutex::new(None);

fn with_font_system<R>(f: impl FnOnce(&mut FontSystem) -> R) -> R {
    let mut guard = FONT_SYSTEM.lock().unwrap_or_else(PoisonError::into_inner);
    let font_system = guard.get_or_insert_with(|| {
        let mut db = fontdb::Database::new();
        db.load_font_data(FONT_DATA.to_vec());
        FontSystem::new_with_locale_and_db("en-US".to_string(), db)
    });
    f(font_system)
}

fn shape_line(font_system: &mut FontSystem, text: &str) -> Buffer {
    let mut buffer = Buffer::new(font_system, Metrics::new(FONT_SIZE, LINE_PITCH as f32));
    buffer.set_size(font_system, None, None);
    let attrs = Attrs::new().family(Family::Name(FONT_FAMILY)).weight(Weight::BOLD);
    buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);
    buffer
}

fn buffer_width(buffer: &Buffer) -> f32 {
    buffer.layout_runs().map(|run| run.line_w).fold(0.0, f32::max)
}

/// Draw one line of text with its line box centred on (`cx`, `cy`).
///
/// Returns the shaped advance width in whole pixels.
pub fn draw_line_centered(img: &mut RgbaImage, text: &str, cx: i32, cy: i32, color: Rgba<u8>) -> u32 {
    with_font_system(|font_system| {
        let buffer = shape_line(font_system, text);
        let width = buffer_width(&buffer);
        let left = cx - (width / 2.0).round() as i32;
        let top = cy - LINE_PITCH / 2;
        let [r, g, b, _] = color.0;
        let mut swash_cache = SwashCache::new();
        buffer.draw(
            font_system,
            &mut swash_cache,
            Color::rgb(r, g, b),
            |x, y, w, h, c| {
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        blend(img, left + x + dx, top + y + dy, c);
                    }
                }
            },
        );
        width.ceil() as u32
    })
}

// glyph coverage arrives in the alpha channel; the badge itself stays opaque
fn blend(img: &mut RgbaImage, x: i32, y: i32, c: Color) {
    if x < 0 || y < 0 || x as u32 >= img.width() || y as u32 >= img.height() {
        return;
    }
    let a = c.a() as u32;
    if a == 0 {
        return;
    }
    let px = img.get_pixel_mut(x as u32, y as u32);
    for (dst, src) in px.0.iter_mut().zip([c.r(), c.g(), c.b()]) {
        *dst = ((src as u32 * a + *dst as u32 * (255 - a) + 127) / 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn wider_text_reports_wider_advance() {
        let mut img = RgbaImage::from_pixel(200, 40, Rgba([0, 0, 0, 255]));
        let short = draw_line_centered(&mut img, "Gold", 100, 20, WHITE);
        let long = draw_line_centered(&mut img, "Gold Platinum", 100, 20, WHITE);
        assert!(short > 0);
        assert!(long > short);
    }

    #[test]
    fn empty_line_draws_nothing() {
        let mut img = RgbaImage::from_pixel(50, 50, Rgba([9, 9, 9, 255]));
        assert_eq!(draw_line_centered(&mut img, "", 25, 25, WHITE), 0);
        assert!(img.pixels().all(|p| p.0 == [9, 9, 9, 255]));
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut img = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        draw_line_centered(&mut img, "Evolve Constantly", 10, 10, WHITE);
        assert!(img.pixels().all(|p| p.0[3] == 255));
    }
}
