//! The glyph rasterizer and the shared cell-painting pass.

use image::{imageops, Rgba, RgbaImage};
use tracing::debug;

use crate::cell::Cell;
use crate::error::{RenderError, Result};
use crate::font::Font;
use crate::palette::Palette;

/// Upper bound on output pixels (width * height). Dimensions are computed
/// from untrusted headers, so an absurd product is a decode error rather
/// than a multi-gigabyte allocation.
pub const MAX_PIXELS: i64 = 1 << 26;

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Allocate the output buffer, pre-filled with `fill`. Dimensions come from
/// decode passes over untrusted input and may be zero or negative.
pub fn new_canvas(width: i64, height: i64, fill: Rgba<u8>) -> Result<RgbaImage> {
    // the product itself can exceed i64 for header-driven dimensions
    let pixels = width.checked_mul(height);
    if width <= 0 || height <= 0 || pixels.map_or(true, |p| p > MAX_PIXELS) {
        return Err(RenderError::AllocationLimit { width, height });
    }
    debug!(width, height, "allocating canvas");
    Ok(RgbaImage::from_pixel(width as u32, height as u32, fill))
}

/// Draw one character cell: fill the cell rectangle with `bg`, then set
/// every pixel whose glyph bit is on to `fg`. Bits are tested most
/// significant first. With 9-pixel cells, glyphs 192-223 replicate column 7
/// into the invented 9th column so box drawing stays contiguous.
///
/// Pixels outside the image are skipped; callers may legitimately place
/// cells beyond the canvas (negative cursor rows, binary tails past the
/// computed height).
pub fn draw_char(
    image: &mut RgbaImage,
    font: &Font,
    bits: u32,
    font_height: usize,
    column: i32,
    row: i32,
    bg: Rgba<u8>,
    fg: Rgba<u8>,
    glyph: u8,
) {
    let x0 = column as i64 * bits as i64;
    let y0 = row as i64 * font_height as i64;

    for line in 0..font_height as i64 {
        for dx in 0..bits as i64 {
            put_pixel(image, x0 + dx, y0 + line, bg);
        }
    }

    for line in 0..font_height {
        let byte = font
            .data
            .get(glyph as usize * font_height + line)
            .copied()
            .unwrap_or(0);
        for col in 0..bits.min(8) {
            if byte & (0x80 >> col) != 0 {
                put_pixel(image, x0 + col as i64, y0 + line as i64, fg);
                if bits == 9 && col == 7 && (192..224).contains(&glyph) {
                    put_pixel(image, x0 + 8, y0 + line as i64, fg);
                }
            }
        }
    }
}

fn put_pixel(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

/// Paint a decoded cell sequence, resolving palette indices and 24-bit
/// overrides. Cells are painted in append order.
pub fn paint(image: &mut RgbaImage, cells: &[Cell], font: &Font, bits: u32, palette: &Palette) {
    for cell in cells {
        let bg = cell.bg_rgb.unwrap_or_else(|| palette.color(cell.bg));
        let fg = cell.fg_rgb.unwrap_or_else(|| palette.color(cell.fg));
        draw_char(
            image,
            font,
            bits,
            font.height,
            cell.column,
            cell.row,
            bg,
            fg,
            cell.glyph,
        );
    }
}

/// Nearest-neighbor resize by a uniform factor; factor 1.0 is a no-op.
pub fn scale(image: RgbaImage, factor: f32) -> RgbaImage {
    if factor == 1.0 {
        return image;
    }
    let width = (image.width() as f32 * factor) as u32;
    let height = (image.height() as f32 * factor) as u32;
    imageops::resize(
        &image,
        width.max(1),
        height.max(1),
        imageops::FilterType::Nearest,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn solid_font() -> Font {
        // one glyph slot repeated: 0xFF rows make every pixel foreground
        Font::embedded(&[0xFF; 256 * 8], 8)
    }

    #[test]
    fn canvas_rejects_bad_dimensions() {
        assert!(new_canvas(0, 16, BLACK).is_err());
        assert!(new_canvas(640, -16, BLACK).is_err());
        assert!(new_canvas(1 << 20, 1 << 20, BLACK).is_err());
        // dimensions whose product overflows i64 must fail, not wrap
        assert!(new_canvas(1 << 40, 1 << 40, BLACK).is_err());
        assert!(new_canvas(i64::MAX, 2, BLACK).is_err());
        assert!(new_canvas(8, 16, BLACK).is_ok());
    }

    #[test]
    fn draw_fills_background_and_foreground() {
        let font = Font::embedded(&vec![0xF0u8; 256 * 8], 8);
        let mut img = new_canvas(8, 8, BLACK).unwrap();
        let red = Rgba([255, 0, 0, 255]);
        let blue = Rgba([0, 0, 255, 255]);
        draw_char(&mut img, &font, 8, 8, 0, 0, blue, red, b'A');
        assert_eq!(*img.get_pixel(0, 0), red); // MSB = leftmost
        assert_eq!(*img.get_pixel(3, 0), red);
        assert_eq!(*img.get_pixel(4, 0), blue);
        assert_eq!(*img.get_pixel(7, 7), blue);
    }

    #[test]
    fn ninth_column_replicates_for_box_glyphs() {
        let font = Font::embedded(&vec![0x01u8; 256 * 8], 8);
        let mut img = new_canvas(9, 8, BLACK).unwrap();
        let fg = Rgba([255, 255, 255, 255]);
        draw_char(&mut img, &font, 9, 8, 0, 0, BLACK, fg, 200);
        assert_eq!(*img.get_pixel(7, 0), fg);
        assert_eq!(*img.get_pixel(8, 0), fg);

        let mut img = new_canvas(9, 8, BLACK).unwrap();
        draw_char(&mut img, &font, 9, 8, 0, 0, BLACK, fg, b'A');
        assert_eq!(*img.get_pixel(7, 0), fg);
        assert_eq!(*img.get_pixel(8, 0), BLACK); // not in 192..224
    }

    #[test]
    fn out_of_bounds_cells_are_clipped() {
        let font = solid_font();
        let mut img = new_canvas(8, 8, BLACK).unwrap();
        let fg = Rgba([255, 255, 255, 255]);
        // must not panic
        draw_char(&mut img, &font, 8, 8, -1, 0, BLACK, fg, b'A');
        draw_char(&mut img, &font, 8, 8, 0, -3, BLACK, fg, b'A');
        draw_char(&mut img, &font, 8, 8, 500, 500, BLACK, fg, b'A');
    }

    #[test]
    fn overrides_win_over_palette() {
        let font = solid_font();
        let mut img = new_canvas(8, 8, BLACK).unwrap();
        let mut cell = Cell::indexed(0, 0, b'A', 1, 0);
        cell.fg_rgb = Some(Rgba([1, 2, 3, 255]));
        paint(&mut img, &[cell], &font, 8, &crate::palette::ANSI);
        assert_eq!(*img.get_pixel(0, 0), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn scale_is_nearest_neighbor() {
        let mut img = new_canvas(2, 1, BLACK).unwrap();
        let red = Rgba([255, 0, 0, 255]);
        img.put_pixel(1, 0, red);
        let scaled = scale(img, 2.0);
        assert_eq!(scaled.dimensions(), (4, 2));
        assert_eq!(*scaled.get_pixel(0, 0), BLACK);
        assert_eq!(*scaled.get_pixel(3, 1), red);
    }
}
