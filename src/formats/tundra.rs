//! TundraDraw TND: a 24-bit color format. An opcode stream mixes glyphs
//! with cursor jumps and RGB color changes, so cells here always carry
//! explicit colors instead of palette indices.
//!
//! Decoding runs twice: a bounds pass that only tracks the cursor to learn
//! the row count, then the render pass. The bounds pass wraps at the
//! historical 80 columns while the render pass wraps at the configured
//! column count; the asymmetry is kept for compatibility.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::cell::{Cell, CellBuffer};
use crate::error::{RenderError, Result};
use crate::options::Options;
use crate::palette;
use crate::reader::ByteCursor;
use crate::render;

const VERSION: u8 = 24;
const BODY_OFFSET: usize = 9;

const OP_JUMP: u8 = 1;
const OP_FOREGROUND: u8 = 2;
const OP_BACKGROUND: u8 = 4;
const OP_BOTH: u8 = 6;

fn is_opcode(byte: u8) -> bool {
    matches!(byte, OP_JUMP | OP_FOREGROUND | OP_BACKGROUND | OP_BOTH)
}

/// Count the rows the opcode stream touches, wrapping at 80 columns.
///
/// The opcode checks are deliberately sequential rather than exclusive: a
/// color record whose glyph byte is itself a later opcode value re-enters
/// the next check and decodes a second record from the advanced offset.
/// See the matching structure in [`decode`].
fn bounds(data: &[u8]) -> i64 {
    let mut cur = ByteCursor::at(data, BODY_OFFSET);
    let (mut x, mut y) = (0i64, 0i64);
    while let Some(op) = cur.peek(0) {
        if x == 80 {
            x = 0;
            y += 1;
        }
        let mut character = op;
        if character == OP_JUMP {
            let (Some(ny), Some(nx)) = (cur.peek_u32_be(1), cur.peek_u32_be(5)) else {
                break;
            };
            y = ny as i64;
            x = nx as i64;
            cur.advance(8);
        }
        if character == OP_FOREGROUND {
            let Some(glyph) = cur.peek(1) else { break };
            character = glyph;
            cur.advance(5);
        }
        if character == OP_BACKGROUND {
            let Some(glyph) = cur.peek(1) else { break };
            character = glyph;
            cur.advance(5);
        }
        if character == OP_BOTH {
            let Some(glyph) = cur.peek(1) else { break };
            character = glyph;
            cur.advance(9);
        }
        // whatever remains after the chain: an opcode value never moves
        // the cursor, anything else is a glyph position
        if !is_opcode(character) {
            x += 1;
        }
        cur.advance(1);
    }
    y + 1
}

pub fn decode(data: &[u8], options: &Options) -> Result<RgbaImage> {
    if data.is_empty() {
        return Err(RenderError::TruncatedInput("tundra file"));
    }
    if data[0] != VERSION {
        return Err(RenderError::MalformedHeader {
            format: "tundra",
            reason: format!("unsupported version byte {}", data[0]),
        });
    }

    let rows = bounds(data);
    let columns = options.columns as i64;
    debug!(rows, columns, "tundra bounds");
    let mut image = render::new_canvas(
        columns * options.bits as i64,
        rows * options.font.height as i64,
        render::BLACK,
    )?;

    let mut cells = CellBuffer::new();
    let mut cur = ByteCursor::at(data, BODY_OFFSET);
    let (mut x, mut y) = (0i64, 0i64);
    // colors start transparent and are painted verbatim until set
    let mut fg = Rgba([0, 0, 0, 0]);
    let mut bg = Rgba([0, 0, 0, 0]);

    let rgb = |cur: &ByteCursor, k: usize| -> Option<Rgba<u8>> {
        Some(Rgba([cur.peek(k)?, cur.peek(k + 1)?, cur.peek(k + 2)?, 255]))
    };

    // sequential checks, same chaining as in `bounds`: a glyph byte equal
    // to a later opcode value decodes a second record in the same step
    while let Some(op) = cur.peek(0) {
        if x == columns {
            x = 0;
            y += 1;
        }
        let mut character = op;
        if character == OP_JUMP {
            let (Some(ny), Some(nx)) = (cur.peek_u32_be(1), cur.peek_u32_be(5)) else {
                break;
            };
            y = ny as i64;
            x = nx as i64;
            cur.advance(8);
        }
        if character == OP_FOREGROUND {
            let (Some(glyph), Some(color)) = (cur.peek(1), rgb(&cur, 3)) else {
                break;
            };
            character = glyph;
            fg = color;
            cur.advance(5);
        }
        if character == OP_BACKGROUND {
            let (Some(glyph), Some(color)) = (cur.peek(1), rgb(&cur, 3)) else {
                break;
            };
            character = glyph;
            bg = color;
            cur.advance(5);
        }
        if character == OP_BOTH {
            let (Some(glyph), Some(f), Some(b)) = (cur.peek(1), rgb(&cur, 3), rgb(&cur, 7))
            else {
                break;
            };
            character = glyph;
            fg = f;
            bg = b;
            cur.advance(9);
        }
        if !is_opcode(character) {
            let mut cell = Cell::indexed(x as i32, y as i32, character, 0, 0);
            cell.fg_rgb = Some(fg);
            cell.bg_rgb = Some(bg);
            cells.push(cell);
            x += 1;
        }
        cur.advance(1);
    }

    render::paint(
        &mut image,
        cells.cells(),
        &options.font,
        options.bits,
        &palette::ANSI,
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(body: &[u8]) -> Vec<u8> {
        let mut data = vec![VERSION];
        data.extend(b"TUNDRA24");
        data.extend(body);
        data
    }

    #[test]
    fn version_byte_is_checked() {
        let err = decode(&[23, 0, 0], &Options::default()).unwrap_err();
        assert!(matches!(err, RenderError::MalformedHeader { .. }));
        assert!(decode(&[], &Options::default()).is_err());
    }

    #[test]
    fn both_colors_record_draws_the_glyph() {
        // opcode 6: glyph with explicit fg and bg
        let body = [OP_BOTH, b'Z', 0, 10, 20, 30, 0, 40, 50, 60];
        let image = decode(&build(&body), &Options::default()).unwrap();
        assert_eq!(image.dimensions(), (160 * 8, 16));
        // top row of the glyph cell is background
        assert_eq!(*image.get_pixel(0, 0), Rgba([40, 50, 60, 255]));
    }

    #[test]
    fn colors_persist_for_following_glyphs() {
        let mut body = vec![OP_BACKGROUND, b' ', 0, 200, 0, 0];
        body.push(b'!');
        let image = decode(&build(&body), &Options::default()).unwrap();
        // the plain '!' after the record keeps the red background
        assert_eq!(*image.get_pixel(8, 0), Rgba([200, 0, 0, 255]));
    }

    #[test]
    fn unset_colors_paint_transparent_pixels() {
        let image = decode(&build(b"A"), &Options::default()).unwrap();
        assert_eq!(*image.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        // untouched cells keep the opaque black fill
        assert_eq!(*image.get_pixel(8, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn color_record_with_opcode_glyph_chains_into_the_next_block() {
        // a foreground record whose glyph byte is 4 falls through into the
        // background check, which decodes a second record from the already
        // advanced offset: 11 bytes total, setting both colors, then
        // drawing the inner glyph
        let body = [
            OP_FOREGROUND,
            OP_BACKGROUND,
            0,
            10,
            20,
            30,
            b'Q',
            0,
            40,
            50,
            60,
            b'R',
        ];
        let image = decode(&build(&body), &Options::default()).unwrap();
        // Q at (0,0) and the following plain R at (1,0), both on the
        // chained background
        assert_eq!(*image.get_pixel(0, 0), Rgba([40, 50, 60, 255]));
        assert_eq!(*image.get_pixel(8, 0), Rgba([40, 50, 60, 255]));
    }

    #[test]
    fn chained_record_advances_the_bounds_cursor_once() {
        // the 11-byte chained record yields exactly one glyph position, so
        // 80 plain glyphs after it wrap into a second row
        let mut body = vec![OP_FOREGROUND, OP_BACKGROUND, 0, 10, 20, 30, b'Q', 0, 40, 50, 60];
        body.extend(std::iter::repeat(b'x').take(80));
        assert_eq!(bounds(&build(&body)), 2);
        // one glyph fewer stays on the first row
        let mut body = vec![OP_FOREGROUND, OP_BACKGROUND, 0, 10, 20, 30, b'Q', 0, 40, 50, 60];
        body.extend(std::iter::repeat(b'x').take(79));
        assert_eq!(bounds(&build(&body)), 1);
    }

    #[test]
    fn jump_opcode_positions_the_cursor() {
        let body = [OP_JUMP, 0, 0, 0, 3, 0, 0, 0, 5, b'A'];
        let image = decode(&build(&body), &Options::default()).unwrap();
        // rows = y + 1 = 4
        assert_eq!(image.height(), 64);
    }

    #[test]
    fn bounds_wrap_at_80_but_rendering_wraps_at_columns() {
        let body: Vec<u8> = std::iter::repeat(b'x').take(81).collect();
        let image = decode(&build(&body), &Options::default()).unwrap();
        // the bounds pass wrapped into a second row; the render pass (160
        // columns by default) kept everything on the first
        assert_eq!(image.dimensions(), (1280, 32));
    }

    #[test]
    fn truncated_record_stops_cleanly() {
        let body = [OP_BOTH, b'Z', 0, 10];
        assert!(decode(&build(&body), &Options::default()).is_ok());
        assert_eq!(bounds(&build(&[OP_JUMP, 0, 0])), 1);
    }
}
