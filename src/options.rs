//! Rendering options and file-type dispatch tags.

use std::path::Path;
use std::str::FromStr;

use crate::font::Font;

/// ANSi rendering mode (`-m`). The modes are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Default,
    /// Black on gray, 78 columns.
    Ced,
    /// Transparent background instead of opaque black.
    Transparent,
    /// Amiga Workbench palette.
    Workbench,
}

impl FromStr for RenderMode {
    type Err = std::convert::Infallible;

    /// Unrecognized mode strings select the default, matching the
    /// permissive front-end behavior this tool inherits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ced" => RenderMode::Ced,
            "transparent" => RenderMode::Transparent,
            "workbench" => RenderMode::Workbench,
            _ => RenderMode::Default,
        })
    }
}

/// Which decoder handles the input. Derived from the file extension;
/// anything unrecognized renders as ANSi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    #[default]
    Ansi,
    /// `.diz` sidecar files render as ANSi but cap the output width at the
    /// columns actually used.
    Diz,
    PcBoard,
    Binary,
    Artworx,
    IceDraw,
    XBin,
    Tundra,
}

impl FileType {
    pub fn from_path(path: &Path) -> FileType {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pcb" => FileType::PcBoard,
            "bin" => FileType::Binary,
            "adf" => FileType::Artworx,
            "idf" => FileType::IceDraw,
            "xb" => FileType::XBin,
            "tnd" => FileType::Tundra,
            "diz" => FileType::Diz,
            _ => FileType::Ansi,
        }
    }
}

/// Options shared by every decoder. The font has already been resolved by
/// the registry; decoders treat it as read-only input.
#[derive(Debug, Clone)]
pub struct Options {
    pub font: Font,
    /// Cell width in pixels: 8, or 9 for the VGA 9-dot text mode.
    pub bits: u32,
    /// Column count for the raw binary and Tundra formats.
    pub columns: u32,
    pub mode: RenderMode,
    /// Reinterpret the blink attribute as background intensity.
    pub ice_colors: bool,
    pub file_type: FileType,
    /// Uniform nearest-neighbor scale applied to the finished image.
    pub scale: f32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            font: Font::default(),
            bits: 8,
            columns: 160,
            mode: RenderMode::Default,
            ice_colors: false,
            file_type: FileType::Ansi,
            scale: 1.0,
        }
    }
}
