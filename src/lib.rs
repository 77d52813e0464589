//! Renders ANSi and BBS-era art files to RGBA images.
//!
//! Seven input formats are supported: plain ANSi (and `.diz` sidecars),
//! PCBoard `@`-codes, raw binary pairs, Artworx ADF, iCEDraw IDF, XBin and
//! TundraDraw TND. Any SAUCE metadata trailer is stripped before decoding.
//!
//! ```no_run
//! use ansiart2png::{render, Options};
//!
//! let data = std::fs::read("art.ans")?;
//! let image = render(&data, &Options::default())?;
//! image.save("art.ans.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cell;
pub mod error;
pub mod font;
pub mod formats;
pub mod options;
pub mod palette;
pub mod reader;
pub mod render;
pub mod sauce;

pub use error::{RenderError, Result};
pub use options::{FileType, Options, RenderMode};

use image::RgbaImage;

/// Render an art file to an image: strip the SAUCE trailer, decode with the
/// format selected in `options`, then apply the scale factor.
pub fn render(data: &[u8], options: &Options) -> Result<RgbaImage> {
    let art = &data[..sauce::effective_length(data)];
    let image = formats::decode(art, options)?;
    Ok(render::scale(image, options.scale))
}
