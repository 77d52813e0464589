//! The ANSi escape-sequence interpreter.
//!
//! A single forward pass over the byte stream, maintaining cursor state and
//! appending cells. The quirks of the classic renderers are preserved on
//! purpose: the wrap column is hard-coded to 80 whatever the output width,
//! escape parameters that fail to parse count as 0 (so `ESC[;5H` really
//! does move to row -1), SGR color arithmetic is never re-clamped, and a
//! sequence with no recognized terminator within 15 bytes is abandoned with
//! only the ESC byte consumed, leaving `[` and the parameters to render as
//! glyphs.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::cell::{Cell, CellBuffer};
use crate::error::Result;
use crate::options::{FileType, Options, RenderMode};
use crate::palette;
use crate::reader::ByteCursor;
use crate::render;

/// Longest escape sequence the interpreter will scan for a terminator.
const SEQUENCE_WINDOW: usize = 15;

/// Hard wrap column of the classic renderers, independent of output width.
const WRAP_COLUMN: i32 = 80;

const CED_BACKGROUND: Rgba<u8> = Rgba([170, 170, 170, 255]);
const CED_FOREGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Numeric parameter parsing in the spirit of the original: anything that
/// is not a clean integer counts as 0.
fn atoi(bytes: &[u8]) -> i32 {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Cursor-motion parameters default to 1 only when exactly 0; a negative
/// value passes through untouched.
fn motion(bytes: &[u8]) -> i32 {
    match atoi(bytes) {
        0 => 1,
        n => n,
    }
}

#[derive(Debug)]
struct Interpreter {
    column: i32,
    row: i32,
    saved_column: i32,
    saved_row: i32,
    fg: i32,
    bg: i32,
    bold: bool,
    italic: bool,
    underline: bool,
    blink: bool,
    fg_rgb: Option<Rgba<u8>>,
    bg_rgb: Option<Rgba<u8>>,
    cells: CellBuffer,
}

impl Interpreter {
    fn new() -> Self {
        Self {
            column: 0,
            row: 0,
            saved_column: 0,
            saved_row: 0,
            fg: 7,
            bg: 0,
            bold: false,
            italic: false,
            underline: false,
            blink: false,
            fg_rgb: None,
            bg_rgb: None,
            cells: CellBuffer::new(),
        }
    }

    fn run(&mut self, data: &[u8], options: &Options) {
        let workbench = options.mode == RenderMode::Workbench;
        let mut cur = ByteCursor::new(data);

        while let Some(current) = cur.peek(0) {
            let next = cur.peek(1).unwrap_or(0);

            if self.column == WRAP_COLUMN {
                self.row += 1;
                self.column = 0;
            }

            if current == 13 && next == 10 {
                self.row += 1;
                self.column = 0;
                cur.advance(1);
            }
            if current == 10 {
                self.row += 1;
                self.column = 0;
            }
            if current == 9 {
                self.column += 8;
            }
            if current == 26 {
                break;
            }

            if current == 27 && next == 91 {
                self.escape_sequence(&mut cur, options, workbench);
            } else if current != 10 && current != 13 && current != 9 {
                self.print(current, options);
            }
            cur.advance(1);
        }
    }

    /// Scan up to [`SEQUENCE_WINDOW`] bytes past `ESC [` for a terminator
    /// and apply it. On success the cursor is left on the terminator (the
    /// main loop consumes it). Without a terminator nothing but the ESC is
    /// consumed.
    fn escape_sequence(&mut self, cur: &mut ByteCursor, options: &Options, workbench: bool) {
        for scan in 0..SEQUENCE_WINDOW {
            let Some(terminator) = cur.peek(2 + scan) else {
                return;
            };
            let params = cur.peek_slice(2, 2 + scan);

            match terminator {
                b'H' | b'f' => {
                    let parts: Vec<&[u8]> = params.split(|&b| b == b';').collect();
                    if parts.len() > 1 {
                        self.row = atoi(parts[0]) - 1;
                        self.column = atoi(parts[1]) - 1;
                    } else {
                        self.row = 0;
                        self.column = 0;
                    }
                }
                b'A' => self.row -= motion(params),
                b'B' => self.row += motion(params),
                b'C' => {
                    self.column += motion(params);
                    if self.column > WRAP_COLUMN {
                        self.column = WRAP_COLUMN;
                    }
                }
                b'D' => {
                    self.column -= motion(params);
                    if self.column < 0 {
                        self.column = 0;
                    }
                }
                b's' => {
                    self.saved_row = self.row;
                    self.saved_column = self.column;
                }
                b'u' => {
                    self.row = self.saved_row;
                    self.column = self.saved_column;
                }
                b'J' => {
                    if atoi(params) == 2 {
                        self.column = 0;
                        self.row = 0;
                        self.cells.clear();
                    }
                }
                b'm' => {
                    for part in params.split(|&b| b == b';') {
                        self.graphic_rendition(atoi(part), options, workbench);
                    }
                }
                b't' => {
                    let parts: Vec<&[u8]> = params.split(|&b| b == b';').collect();
                    if parts.len() == 4 {
                        let rgb = Rgba([
                            atoi(parts[1]) as u8,
                            atoi(parts[2]) as u8,
                            atoi(parts[3]) as u8,
                            255,
                        ]);
                        match parts[0] {
                            b"0" => self.bg_rgb = Some(rgb),
                            b"1" => self.fg_rgb = Some(rgb),
                            _ => {}
                        }
                    }
                }
                // cursor visibility, set mode, reset mode: recognized, no-op
                b'p' | b'h' | b'l' => {}
                _ => continue,
            }
            cur.advance(scan + 2);
            return;
        }
    }

    fn graphic_rendition(&mut self, value: i32, options: &Options, workbench: bool) {
        match value {
            0 => {
                self.bg = 0;
                self.fg = 7;
                self.bold = false;
                self.underline = false;
                self.italic = false;
                self.blink = false;
            }
            1 => {
                if !workbench {
                    self.fg += 8;
                }
                self.bold = true;
            }
            3 => self.italic = true,
            4 => self.underline = true,
            5 => {
                if !workbench {
                    self.bg += 8;
                }
                self.blink = true;
            }
            30..=37 => {
                self.fg = value - 30;
                if self.bold {
                    self.fg += 8;
                }
            }
            40..=47 => {
                self.bg = value - 40;
                if self.blink && options.ice_colors {
                    self.bg += 8;
                }
            }
            _ => {}
        }
    }

    fn print(&mut self, glyph: u8, options: &Options) {
        self.cells.note_position(self.column, self.row);

        // the Amiga font families never render 12/13 as glyphs
        if options.font.is_amiga && (glyph == 12 || glyph == 13) {
            return;
        }
        self.cells.push(Cell {
            column: self.column,
            row: self.row,
            glyph,
            fg: self.fg as u8,
            bg: self.bg as u8,
            fg_rgb: self.fg_rgb,
            bg_rgb: self.bg_rgb,
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
        });
        self.fg_rgb = None;
        self.bg_rgb = None;
        self.column += 1;
    }
}

/// Decode an ANSi (or plain text) stream and paint it.
pub fn decode(data: &[u8], options: &Options) -> Result<RgbaImage> {
    let mut interp = Interpreter::new();
    interp.run(data, options);

    let columns = match options.mode {
        RenderMode::Ced => 78,
        _ if options.file_type == FileType::Diz => interp.cells.columns_used().min(80),
        _ => 80,
    };
    let rows = interp.cells.rows_used();
    debug!(columns, rows, cells = interp.cells.cells().len(), "ansi decoded");

    let font = &options.font;
    let fill = match options.mode {
        RenderMode::Ced => CED_BACKGROUND,
        RenderMode::Transparent => render::TRANSPARENT,
        _ => render::BLACK,
    };
    let mut image = new_canvas_for(columns, rows, options, fill)?;

    if options.mode == RenderMode::Ced {
        for cell in interp.cells.cells() {
            render::draw_char(
                &mut image,
                font,
                options.bits,
                font.height,
                cell.column,
                cell.row,
                CED_BACKGROUND,
                CED_FOREGROUND,
                cell.glyph,
            );
        }
    } else {
        let pal = if options.mode == RenderMode::Workbench {
            &palette::WORKBENCH
        } else {
            &palette::ANSI
        };
        render::paint(&mut image, interp.cells.cells(), font, options.bits, pal);
    }
    Ok(image)
}

fn new_canvas_for(
    columns: i32,
    rows: i32,
    options: &Options,
    fill: Rgba<u8>,
) -> Result<RgbaImage> {
    render::new_canvas(
        columns as i64 * options.bits as i64,
        rows as i64 * options.font.height as i64,
        fill,
    )
}
