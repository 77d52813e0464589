//! Error types reported by the decoders and the CLI.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

/// Everything that can go wrong while turning an art file into pixels.
///
/// Unrecognized file extensions are *not* an error; they fall back to the
/// ANSi interpreter. Truncation in the middle of a format body is not an
/// error either — decoders render what they accumulated. These variants
/// cover structural failures detected before allocation, plus I/O and
/// encoding failures from the binary front end.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A format-defining magic value or version tag failed validation.
    #[error("not a valid {format} file: {reason}")]
    MalformedHeader {
        format: &'static str,
        reason: String,
    },

    /// The header promised more bytes than the file contains.
    #[error("input truncated while reading {0}")]
    TruncatedInput(&'static str),

    /// Computed output dimensions are empty or implausibly large.
    #[error("refusing to allocate a {width}x{height} pixel image")]
    AllocationLimit { width: i64, height: i64 },

    /// Font name is not in the registry and is not a readable file.
    #[error("unknown font `{0}` (try one of: {1})")]
    UnknownFont(String, String),

    /// A font bitmap file had a length that is not a whole glyph table.
    #[error("invalid font bitmap: {0}")]
    InvalidFont(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}
