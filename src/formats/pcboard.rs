//! PCBoard `@`-code art: a text stream with in-band color, clear-screen and
//! column-positioning codes, rendered over the EGA palette.

use image::RgbaImage;
use tracing::debug;

use crate::cell::{Cell, CellBuffer};
use crate::error::Result;
use crate::options::Options;
use crate::palette;
use crate::reader::ByteCursor;
use crate::render;

const COLUMNS: i32 = 80;

/// `@X` color codes use one hex digit per channel, uppercase only.
fn hex_digit(byte: u8) -> u8 {
    if byte >= b'A' {
        byte.wrapping_sub(55)
    } else {
        byte.wrapping_sub(b'0')
    }
}

pub fn decode(data: &[u8], options: &Options) -> Result<RgbaImage> {
    let mut cells = CellBuffer::new();
    let mut cur = ByteCursor::new(data);

    let (mut column, mut row) = (0i32, 0i32);
    let (mut fg, mut bg) = (7u8, 0u8);

    while let Some(current) = cur.peek(0) {
        let next = cur.peek(1).unwrap_or(0);

        if column == COLUMNS {
            row += 1;
            column = 0;
        }

        if current == 13 && next == 10 {
            row += 1;
            column = 0;
            cur.advance(1);
        }
        if current == 10 {
            row += 1;
            column = 0;
        }
        if current == 9 {
            column += 8;
        }
        if current == 26 {
            break;
        }

        if current == b'@' && next == b'X' {
            // @Xbf: one hex digit each for background and foreground
            let (Some(b), Some(f)) = (cur.peek(2), cur.peek(3)) else {
                break;
            };
            bg = hex_digit(b);
            // the blink bit folds back to the dim half unless ice colors
            // are on; note the threshold is 7 here, not 8
            if bg > 7 && !options.ice_colors {
                bg -= 8;
            }
            fg = hex_digit(f);
            cur.advance(3);
        } else if current == b'@'
            && next == b'C'
            && cur.peek(2) == Some(b'L')
            && cur.peek(3) == Some(b'S')
        {
            // home the cursor and forget the extents; cells already
            // emitted still render (and can be overpainted)
            row = 0;
            column = 0;
            cells.reset_extents();
            cur.advance(4);
        } else if current == b'@'
            && next == b'P'
            && cur.peek(2) == Some(b'O')
            && cur.peek(3) == Some(b'S')
            && cur.peek(4) == Some(b':')
        {
            // @POS:n@ or @POS:nn@, column is 1-based. The "digit" bytes
            // are not validated; arithmetic wraps in the byte domain, so
            // junk bytes give a junk column, never a panic
            let (Some(d1), Some(after)) = (cur.peek(5), cur.peek(6)) else {
                break;
            };
            if after == b'@' {
                column = d1.wrapping_sub(b'0') as i32 - 1;
                cur.advance(5);
            } else {
                column = 10u8
                    .wrapping_mul(d1.wrapping_sub(b'0'))
                    .wrapping_add(after.wrapping_sub(b'0')) as i32
                    - 1;
                cur.advance(6);
            }
        } else if current != 10 && current != 13 && current != 9 {
            cells.push(Cell::indexed(column, row, current, fg, bg));
            column += 1;
        }
        cur.advance(1);
    }

    debug!(
        rows = cells.rows_used(),
        count = cells.cells().len(),
        "pcboard decoded"
    );
    let mut image = render::new_canvas(
        COLUMNS as i64 * options.bits as i64,
        cells.rows_used() as i64 * options.font.height as i64,
        render::BLACK,
    )?;
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

    fn run(data: &[u8]) -> (RgbaImage, Options) {
        let options = Options::default();
        (decode(data, &options).unwrap(), options)
    }

    #[test]
    fn hex_digits_cover_both_ranges() {
        assert_eq!(hex_digit(b'0'), 0);
        assert_eq!(hex_digit(b'9'), 9);
        assert_eq!(hex_digit(b'A'), 10);
        assert_eq!(hex_digit(b'F'), 15);
    }

    #[test]
    fn color_code_sets_attributes() {
        // @X1F then Z: bg 1, fg 15 at (0,0)
        let (image, _) = run(b"@X1FZ");
        assert_eq!(image.dimensions(), (640, 16));
        // background pixels use EGA entry 1 (blue)
        assert_eq!(*image.get_pixel(7, 0), Rgba([0, 0, 170, 255]));
    }

    #[test]
    fn cls_homes_the_cursor_but_keeps_painted_cells() {
        // @CLS consumes an extra byte after the code (legacy behavior), so
        // pad one before the glyph that follows. Earlier cells are not
        // dropped: the Z overpaints the first q, the second q survives
        let (image, _) = run(b"@X4Fqq@CLS Z");
        assert_eq!(image.dimensions(), (640, 16));
        assert_eq!(*image.get_pixel(0, 0), Rgba([170, 0, 0, 255]));
        assert_eq!(*image.get_pixel(8, 0), Rgba([170, 0, 0, 255]));
    }

    #[test]
    fn cls_alone_shrinks_the_extents_to_one_row() {
        // three rows drawn, then @CLS: the image height comes from the
        // reset extent tracker, not from the rows already painted
        let (image, _) = run(b"a\r\nb\r\nc@CLS");
        assert_eq!(image.dimensions(), (640, 16));
    }

    #[test]
    fn pos_moves_the_column() {
        // @POS:9@ is 1-based; its trailing @ is re-read, prints at column
        // 8 and the Z lands at column 9
        let (image, _) = run(b"@X0F@POS:9@Z");
        let white = Rgba([255, 255, 255, 255]);
        // columns 0..8 stay untouched canvas
        assert!((0..64).all(|x| (0..16).all(|y| *image.get_pixel(x, y) == render::BLACK)));
        // the re-read @ leaves ink in cell 8
        assert!((64..72).any(|x| (0..16).any(|y| *image.get_pixel(x, y) == white)));
        // and Z in cell 9
        assert!((72..80).any(|x| (0..16).any(|y| *image.get_pixel(x, y) == white)));
    }

    #[test]
    fn ice_colors_gate_bright_background() {
        let options = Options {
            ice_colors: true,
            ..Options::default()
        };
        let image = decode(b"@X9F Z", &options).unwrap();
        // bright blue background survives with ice colors on
        assert_eq!(*image.get_pixel(0, 0), Rgba([85, 85, 255, 255]));

        let image = decode(b"@X9F Z", &Options::default()).unwrap();
        assert_eq!(*image.get_pixel(0, 0), Rgba([0, 0, 170, 255]));
    }

    #[test]
    fn newlines_and_sub() {
        let (image, _) = run(b"A\r\nB\x1aC");
        assert_eq!(image.dimensions(), (640, 32));
    }

    #[test]
    fn pos_tolerates_non_digit_bytes() {
        // byte arithmetic wraps: 0x00 - '0' = 208, so the column is just
        // far off-canvas, never a panic
        let (image, _) = run(b"@POS:\x00@A");
        assert_eq!(image.dimensions(), (640, 16));
        let (image, _) = run(b"@POS:ZZ@A");
        assert_eq!(image.dimensions(), (640, 16));
        let options = Options::default();
        assert!(decode(b"@POS:\xff\xff@", &options).is_ok());
    }

    #[test]
    fn truncated_color_code_stops_cleanly() {
        let options = Options::default();
        // @X with one digit and nothing after: decoder stops, renders 'A'
        let image = decode(b"A@X1", &options).unwrap();
        assert_eq!(image.dimensions(), (640, 16));
    }
}
