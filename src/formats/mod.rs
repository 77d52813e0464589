//! One decoder per input format, all producing an [`RgbaImage`].

use image::RgbaImage;
use tracing::debug;

use crate::error::Result;
use crate::options::{FileType, Options};

pub mod ansi;
pub mod artworx;
pub mod binary;
pub mod icedraw;
pub mod pcboard;
pub mod tundra;
pub mod xbin;

/// Decode `data` with the format selected in `options`.
pub fn decode(data: &[u8], options: &Options) -> Result<RgbaImage> {
    debug!(file_type = ?options.file_type, bytes = data.len(), "decoding");
    match options.file_type {
        FileType::Ansi | FileType::Diz => ansi::decode(data, options),
        FileType::PcBoard => pcboard::decode(data, options),
        FileType::Binary => binary::decode(data, options),
        FileType::Artworx => artworx::decode(data, options),
        FileType::IceDraw => icedraw::decode(data, options),
        FileType::XBin => xbin::decode(data, options),
        FileType::Tundra => tundra::decode(data, options),
    }
}
