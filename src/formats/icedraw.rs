//! iCEDraw IDF: an RLE-compressed pair stream framed by a 12-byte header
//! and a 4096-byte font plus 48-byte palette at the very end of the file.

use image::RgbaImage;
use tracing::debug;

use crate::cell::{Cell, CellBuffer};
use crate::error::{RenderError, Result};
use crate::font::Font;
use crate::formats::binary::split_attribute;
use crate::options::Options;
use crate::palette::Palette;
use crate::reader::ByteCursor;
use crate::render;

const HEADER_SIZE: usize = 12;
const FONT_SIZE: usize = 4096;
const PALETTE_SIZE: usize = 48;
const TRAILER_SIZE: usize = FONT_SIZE + PALETTE_SIZE;

/// Expand the RLE stream to a flat (character, attribute) byte sequence.
/// A run marker is the little-endian word 1: the next word's low byte is the
/// repeat count for the pair that follows. Anything else is a literal pair.
fn expand_rle(body: &[u8]) -> Vec<u8> {
    let mut pairs = Vec::new();
    let mut cur = ByteCursor::new(body);
    while let Some(marker) = cur.peek_u16_le(0) {
        if marker == 1 {
            let (Some(count), Some(glyph), Some(attribute)) =
                (cur.peek_u16_le(2), cur.peek(4), cur.peek(5))
            else {
                break;
            };
            for _ in 0..count & 255 {
                pairs.push(glyph);
                pairs.push(attribute);
            }
            cur.advance(6);
        } else {
            pairs.push(body[cur.pos()]);
            pairs.push(body[cur.pos() + 1]);
            cur.advance(2);
        }
    }
    pairs
}

pub fn decode(data: &[u8], _options: &Options) -> Result<RgbaImage> {
    if data.len() < HEADER_SIZE + TRAILER_SIZE {
        return Err(RenderError::TruncatedInput("icedraw file"));
    }

    // the header carries the rightmost column index; width follows from it
    let right = u16::from_le_bytes([data[8], data[9]]) as i32;
    let columns = right + 1;

    let trailer = data.len() - TRAILER_SIZE;
    let font = Font::embedded(&data[trailer..trailer + FONT_SIZE], 16);
    let palette = Palette::from_packed(&data[trailer + FONT_SIZE..])?;

    let pairs = expand_rle(&data[HEADER_SIZE..trailer]);
    debug!(columns, bytes = pairs.len(), "icedraw expanded");

    // row count has always divided by 80 here, whatever the real width is
    let rows = (pairs.len() as i64 / 2) / 80;
    let mut image = render::new_canvas(
        columns as i64 * 8,
        rows * font.height as i64,
        render::BLACK,
    )?;

    let mut cells = CellBuffer::new();
    let (mut column, mut row) = (0i32, 0i32);
    for pair in pairs.chunks_exact(2) {
        if column == columns {
            column = 0;
            row += 1;
        }
        let (bg, fg) = split_attribute(pair[1]);
        cells.push(Cell::indexed(column, row, pair[0], fg, bg));
        column += 1;
    }

    render::paint(&mut image, cells.cells(), &font, 8, &palette);
    Ok(image)
}
