//! Artworx ADF: a version byte, a 192-byte palette, a 4096-byte 8x16 font,
//! then (character, attribute) pairs at a fixed 80 columns.

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

const COLUMNS: i32 = 80;
const PALETTE_SIZE: usize = 192;
const FONT_SIZE: usize = 4096;
const BODY_OFFSET: usize = 1 + PALETTE_SIZE + FONT_SIZE;

pub fn decode(data: &[u8], _options: &Options) -> Result<RgbaImage> {
    if data.len() < BODY_OFFSET {
        return Err(RenderError::TruncatedInput("artworx header"));
    }
    debug!(version = data[0], "artworx header");

    let palette = Palette::from_artworx(data)?;
    let font = Font::embedded(&data[1 + PALETTE_SIZE..BODY_OFFSET], 16);

    // the font always draws 8 wide here, whatever bits was asked for
    let rows = ((data.len() - PALETTE_SIZE - FONT_SIZE - 1) as i64 / 2) / COLUMNS as i64;
    let mut image = render::new_canvas(
        COLUMNS as i64 * 8,
        rows * font.height as i64,
        render::BLACK,
    )?;

    let mut cells = CellBuffer::new();
    let mut cur = ByteCursor::at(data, BODY_OFFSET);
    let (mut column, mut row) = (0i32, 0i32);

    while let (Some(glyph), Some(attribute)) = (cur.peek(0), cur.peek(1)) {
        if column == COLUMNS {
            column = 0;
            row += 1;
        }
        let (bg, fg) = split_attribute(attribute);
        cells.push(Cell::indexed(column, row, glyph, fg, bg));
        column += 1;
        cur.advance(2);
    }

    render::paint(&mut image, cells.cells(), &font, 8, &palette);
    Ok(image)
}
