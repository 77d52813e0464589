//! Bitmap fonts and the name registry.
//!
//! A font is a flat glyph table: glyph `N`'s row `r` lives at byte
//! `N * height + r`, one bit per pixel column, most significant bit first.
//! Two CP437 fonts are compiled in; anything else can be loaded from a raw
//! glyph-table file with `-f <path>`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::error::{RenderError, Result};

/// Default font name used by the CLI and [`Options::default`](crate::Options).
pub const DEFAULT_FONT: &str = "80x25";

const CP437_8X16: &[u8] = include_bytes!("fonts/cp437_8x16.bin");
const CP437_8X8: &[u8] = include_bytes!("fonts/cp437_8x8.bin");

/// A resolved bitmap font.
#[derive(Debug, Clone)]
pub struct Font {
    /// Glyph table, `chars * height` bytes.
    pub data: Cow<'static, [u8]>,
    /// Pixel rows per glyph.
    pub height: usize,
    /// Amiga font families never print bytes 12 and 13 as glyphs.
    pub is_amiga: bool,
}

impl Font {
    /// Font embedded in an input file (Artworx, iCEDraw, XBin).
    pub fn embedded(data: &[u8], height: usize) -> Self {
        Self {
            data: Cow::Owned(data.to_vec()),
            height,
            is_amiga: false,
        }
    }

    pub fn chars(&self) -> usize {
        if self.height == 0 {
            0
        } else {
            self.data.len() / self.height
        }
    }

    /// Row `line` of glyph `glyph`, or 0 when the table is short.
    pub fn row(&self, glyph: u8, line: usize) -> u8 {
        self.data
            .get(glyph as usize * self.height + line)
            .copied()
            .unwrap_or(0)
    }
}

impl Default for Font {
    fn default() -> Self {
        select(DEFAULT_FONT).expect("built-in default font")
    }
}

struct Entry {
    data: &'static [u8],
    height: usize,
    is_amiga: bool,
}

static REGISTRY: Lazy<HashMap<&'static str, Entry>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let vga16 = |name| {
        (
            name,
            Entry {
                data: CP437_8X16,
                height: 16,
                is_amiga: false,
            },
        )
    };
    let vga8 = |name| {
        (
            name,
            Entry {
                data: CP437_8X8,
                height: 8,
                is_amiga: false,
            },
        )
    };
    m.extend([
        vga16("80x25"),
        vga16("cp437"),
        vga16("vga"),
        vga8("80x50"),
        vga8("vga50"),
    ]);
    m
});

/// Registered font names, sorted, for error messages and `--help`.
pub fn names() -> Vec<&'static str> {
    let mut v: Vec<_> = REGISTRY.keys().copied().collect();
    v.sort_unstable();
    v
}

/// Resolve a font by registry name or file path.
///
/// A path loads a raw glyph table (length must be a multiple of 256; the
/// glyph height follows from the length). An `amiga:` prefix on a path marks
/// the loaded font as an Amiga variant.
pub fn select(name: &str) -> Result<Font> {
    if let Some(entry) = REGISTRY.get(name) {
        return Ok(Font {
            data: Cow::Borrowed(entry.data),
            height: entry.height,
            is_amiga: entry.is_amiga,
        });
    }

    let (is_amiga, path) = match name.strip_prefix("amiga:") {
        Some(rest) => (true, rest),
        None => (false, name),
    };
    if Path::new(path).is_file() {
        let data = std::fs::read(path)?;
        if data.is_empty() || data.len() % 256 != 0 {
            return Err(RenderError::InvalidFont(format!(
                "{path}: length {} is not a multiple of 256",
                data.len()
            )));
        }
        let height = data.len() / 256;
        if height > 32 {
            return Err(RenderError::InvalidFont(format!(
                "{path}: glyph height {height} exceeds 32"
            )));
        }
        return Ok(Font {
            data: Cow::Owned(data),
            height,
            is_amiga,
        });
    }

    Err(RenderError::UnknownFont(name.to_string(), names().join(", ")))
}
