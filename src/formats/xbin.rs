//! XBin: the only legacy format with a real header. Declares its own size
//! and optionally carries a palette, a font (256 or 512 glyphs) and an
//! RLE-compressed body.

use image::RgbaImage;
use tracing::debug;

use crate::cell::{Cell, CellBuffer};
use crate::error::{RenderError, Result};
use crate::font::{self, Font};
use crate::formats::binary::split_attribute;
use crate::options::Options;
use crate::palette::{self, Palette};
use crate::reader::ByteCursor;
use crate::render;

const FLAG_PALETTE: u8 = 0x01;
const FLAG_FONT: u8 = 0x02;
const FLAG_COMPRESS: u8 = 0x04;
const FLAG_512CHARS: u8 = 0x10;

struct Header {
    width: i32,
    height: i32,
    font_size: u8,
    flags: u8,
}

fn read_header(cur: &mut ByteCursor) -> Result<Header> {
    let magic = cur
        .take(5)
        .ok_or(RenderError::TruncatedInput("xbin header"))?;
    if &magic[..4] != b"XBIN" || magic[4] != 0x1A {
        return Err(RenderError::MalformedHeader {
            format: "xbin",
            reason: "bad magic".into(),
        });
    }
    let width = cur.peek_u16_le(0);
    let height = cur.peek_u16_le(2);
    let (Some(width), Some(height), Some(font_size), Some(flags)) =
        (width, height, cur.peek(4), cur.peek(5))
    else {
        return Err(RenderError::TruncatedInput("xbin header"));
    };
    cur.advance(6);
    Ok(Header {
        width: width as i32,
        height: height as i32,
        font_size,
        flags,
    })
}

pub fn decode(data: &[u8], _options: &Options) -> Result<RgbaImage> {
    let mut cur = ByteCursor::new(data);
    let header = read_header(&mut cur)?;
    debug!(
        width = header.width,
        height = header.height,
        flags = format_args!("{:#04x}", header.flags),
        "xbin header"
    );

    let palette = if header.flags & FLAG_PALETTE != 0 {
        let block = cur
            .take(48)
            .ok_or(RenderError::TruncatedInput("xbin palette"))?;
        Palette::from_packed(block)?
    } else {
        palette::BINARY
    };

    let font = if header.flags & FLAG_FONT != 0 {
        let chars = if header.flags & FLAG_512CHARS != 0 {
            512
        } else {
            256
        };
        let table = cur
            .take(header.font_size as usize * chars)
            .ok_or(RenderError::TruncatedInput("xbin font"))?;
        Font::embedded(table, header.font_size as usize)
    } else {
        font::select(font::DEFAULT_FONT)?
    };

    let mut image = render::new_canvas(
        header.width as i64 * 8,
        header.height as i64 * font.height as i64,
        render::BLACK,
    )?;

    let mut cells = CellBuffer::new();
    if header.flags & FLAG_COMPRESS != 0 {
        expand_compressed(&mut cur, &header, &mut cells);
    } else {
        let (mut column, mut row) = (0i32, 0i32);
        while let (Some(glyph), Some(attribute)) = (cur.peek(0), cur.peek(1)) {
            let (bg, fg) = split_attribute(attribute);
            cells.push(Cell::indexed(column, row, glyph, fg, bg));
            column += 1;
            if column == header.width {
                column = 0;
                row += 1;
            }
            cur.advance(2);
        }
    }

    render::paint(&mut image, cells.cells(), &font, 8, &palette);
    Ok(image)
}

/// Four run types, picked by the top two bits of each counter byte: repeat
/// nothing, repeat the character, repeat the attribute, or repeat both.
fn expand_compressed(cur: &mut ByteCursor, header: &Header, cells: &mut CellBuffer) {
    let (mut column, mut row) = (0i32, 0i32);
    while row != header.height {
        let Some(counter) = cur.peek(0) else { break };
        cur.advance(1);
        let run_type = counter & 0xC0;
        let length = (counter & 0x3F) as usize + 1;

        let mut glyph = None;
        let mut attribute = None;
        if run_type == 0x40 || run_type == 0xC0 {
            glyph = cur.peek(0);
            cur.advance(1);
        }
        if run_type == 0x80 || run_type == 0xC0 {
            attribute = cur.peek(0);
            cur.advance(1);
        }

        for _ in 0..length {
            let g = match glyph {
                Some(g) => g,
                None => {
                    let Some(g) = cur.peek(0) else { return };
                    cur.advance(1);
                    g
                }
            };
            let a = match attribute {
                Some(a) => a,
                None => {
                    let Some(a) = cur.peek(0) else { return };
                    cur.advance(1);
                    a
                }
            };
            let (bg, fg) = split_attribute(a);
            cells.push(Cell::indexed(column, row, g, fg, bg));
            column += 1;
            if column == header.width {
                column = 0;
                row += 1;
            }
        }
    }
}
