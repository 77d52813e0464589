//! Raw binary art: a flat sequence of (character, attribute) pairs with a
//! caller-supplied column count (the format has no header at all).

use image::RgbaImage;
use tracing::debug;

use crate::cell::{Cell, CellBuffer};
use crate::error::Result;
use crate::options::Options;
use crate::palette;
use crate::reader::ByteCursor;
use crate::render;

/// Split an attribute byte into (background, foreground) nibbles.
pub fn split_attribute(attribute: u8) -> (u8, u8) {
    ((attribute >> 4) & 0x0F, attribute & 0x0F)
}

/// Without ice colors a "bright" background above 8 drops back to the dim
/// half, emulating the blink bit. Exactly above: 8 itself stays.
pub fn dim_background(bg: u8, ice_colors: bool) -> u8 {
    if bg > 8 && !ice_colors {
        bg - 8
    } else {
        bg
    }
}

pub fn decode(data: &[u8], options: &Options) -> Result<RgbaImage> {
    let columns = options.columns as i32;
    let rows = (data.len() as i64 / 2) / columns.max(1) as i64;
    debug!(columns, rows, "binary decoded");

    let mut image = render::new_canvas(
        columns as i64 * options.bits as i64,
        rows * options.font.height as i64,
        render::BLACK,
    )?;

    let mut cells = CellBuffer::new();
    let mut cur = ByteCursor::new(data);
    let (mut column, mut row) = (0i32, 0i32);

    while let (Some(glyph), Some(attribute)) = (cur.peek(0), cur.peek(1)) {
        if column == columns {
            column = 0;
            row += 1;
        }
        let (bg, fg) = split_attribute(attribute);
        cells.push(Cell::indexed(
            column,
            row,
            glyph,
            fg,
            dim_background(bg, options.ice_colors),
        ));
        column += 1;
        cur.advance(2);
    }

    render::paint(
        &mut image,
        cells.cells(),
        &options.font,
        options.bits,
        &palette::BINARY,
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn options(columns: u32) -> Options {
        Options {
            columns,
            ..Options::default()
        }
    }

    #[test]
    fn pairs_fill_rows_left_to_right() {
        // two pairs, two columns, one row
        let image = decode(&[0x41, 0x00, 0x42, 0x00], &options(2)).unwrap();
        assert_eq!(image.dimensions(), (16, 16));
    }

    #[test]
    fn wraps_at_the_configured_column_count() {
        let data = [b'a', 0x07, b'b', 0x07, b'c', 0x07, b'd', 0x07];
        let image = decode(&data, &options(2)).unwrap();
        assert_eq!(image.dimensions(), (16, 32));
    }

    #[test]
    fn attribute_nibbles() {
        assert_eq!(split_attribute(0x1F), (1, 15));
        assert_eq!(split_attribute(0xF0), (15, 0));
    }

    #[test]
    fn ice_colors_keep_bright_backgrounds() {
        assert_eq!(dim_background(12, false), 4);
        assert_eq!(dim_background(12, true), 12);
        // 8 is not "above 8": it survives even without ice colors
        assert_eq!(dim_background(8, false), 8);
        assert_eq!(dim_background(7, false), 7);
    }

    #[test]
    fn background_color_lands_in_pixels() {
        // glyph 0 is blank; attribute 0x40 = red background in EGA order
        let image = decode(&[0x00, 0x40, 0x00, 0x40], &options(2)).unwrap();
        assert_eq!(*image.get_pixel(0, 0), Rgba([170, 0, 0, 255]));
        assert_eq!(*image.get_pixel(15, 15), Rgba([170, 0, 0, 255]));
    }

    #[test]
    fn empty_input_is_an_allocation_error() {
        assert!(decode(&[], &options(2)).is_err());
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        let image = decode(&[b'a', 0x07, b'b'], &options(1)).unwrap();
        assert_eq!(image.dimensions(), (8, 16));
    }
}
