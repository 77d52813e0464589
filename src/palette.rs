//! 16-color palettes shared by all decoders.
//!
//! Three fixed tables cover the text-mode formats: the ANSi interpreter's
//! SGR ordering, the EGA/VGA attribute ordering used by the raw binary
//! formats, and the Amiga Workbench scheme. Formats with an embedded palette
//! (Artworx, iCEDraw, XBin) store 6-bit RGB triples that get widened to
//! 8 bits on load.

use image::Rgba;

use crate::error::{RenderError, Result};

/// An immutable table of exactly 16 RGBA entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette([Rgba<u8>; 16]);

const fn c(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Standard 16-color table in SGR order (1 = red), used by the ANSi decoder.
pub const ANSI: Palette = Palette([
    c(0, 0, 0),
    c(170, 0, 0),
    c(0, 170, 0),
    c(170, 85, 0),
    c(0, 0, 170),
    c(170, 0, 170),
    c(0, 170, 170),
    c(170, 170, 170),
    c(85, 85, 85),
    c(255, 85, 85),
    c(85, 255, 85),
    c(255, 255, 85),
    c(85, 85, 255),
    c(255, 85, 255),
    c(85, 255, 255),
    c(255, 255, 255),
]);

/// The same 16 colors in EGA attribute order (1 = blue), used by the
/// pair-oriented binary formats and PCBoard.
pub const BINARY: Palette = Palette([
    c(0, 0, 0),
    c(0, 0, 170),
    c(0, 170, 0),
    c(0, 170, 170),
    c(170, 0, 0),
    c(170, 0, 170),
    c(170, 85, 0),
    c(170, 170, 170),
    c(85, 85, 85),
    c(85, 85, 255),
    c(85, 255, 85),
    c(85, 255, 255),
    c(255, 85, 85),
    c(255, 85, 255),
    c(255, 255, 85),
    c(255, 255, 255),
]);

/// Amiga Workbench 16-color table for `-m workbench`.
pub const WORKBENCH: Palette = Palette([
    c(170, 170, 170),
    c(0, 0, 0),
    c(255, 255, 255),
    c(102, 136, 187),
    c(0, 0, 255),
    c(255, 0, 255),
    c(0, 255, 255),
    c(255, 255, 255),
    c(170, 170, 170),
    c(0, 0, 0),
    c(255, 255, 255),
    c(102, 136, 187),
    c(0, 0, 255),
    c(255, 0, 255),
    c(0, 255, 255),
    c(255, 255, 255),
]);

/// Artworx stores 64 palette entries; these are the 16 the format displays.
pub const ARTWORX_REMAP: [usize; 16] = [0, 1, 2, 3, 4, 5, 20, 7, 56, 57, 58, 59, 60, 61, 62, 63];

/// Widens a 6-bit DAC component to 8 bits.
pub fn expand_6bit(v: u8) -> u8 {
    v << 2 | v >> 4
}

impl Palette {
    /// 16 packed 6-bit RGB triples (48 bytes), as found in iCEDraw trailers
    /// and XBin headers.
    pub fn from_packed(bytes: &[u8]) -> Result<Palette> {
        if bytes.len() < 48 {
            return Err(RenderError::TruncatedInput("palette block"));
        }
        let mut colors = [c(0, 0, 0); 16];
        for (i, entry) in colors.iter_mut().enumerate() {
            *entry = Rgba([
                expand_6bit(bytes[i * 3]),
                expand_6bit(bytes[i * 3 + 1]),
                expand_6bit(bytes[i * 3 + 2]),
                255,
            ]);
        }
        Ok(Palette(colors))
    }

    /// The Artworx palette: triples addressed through [`ARTWORX_REMAP`]
    /// at `remap * 3 + 1` within the file buffer (the version byte shifts
    /// everything by one).
    pub fn from_artworx(data: &[u8]) -> Result<Palette> {
        let mut colors = [c(0, 0, 0); 16];
        for (i, entry) in colors.iter_mut().enumerate() {
            let index = ARTWORX_REMAP[i] * 3 + 1;
            let rgb = data
                .get(index..index + 3)
                .ok_or(RenderError::TruncatedInput("artworx palette"))?;
            *entry = Rgba([
                expand_6bit(rgb[0]),
                expand_6bit(rgb[1]),
                expand_6bit(rgb[2]),
                255,
            ]);
        }
        Ok(Palette(colors))
    }

    /// Entry lookup. Indices are masked to 4 bits: the ANSi decoder is
    /// allowed to accumulate an index past 15 (repeated bold codes) and the
    /// overflow must not panic here.
    pub fn color(&self, index: u8) -> Rgba<u8> {
        self.0[(index & 0x0F) as usize]
    }
}
