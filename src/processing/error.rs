//! # Error Types
//!
//! [`StegoError`] covers every failure the codec raises. Validation errors
//! (bit width, capacity, shape) are returned before any sample is written,
//! so a failed call never hands back a partially modified grid.
//!
//! Some conditions are deliberately *not* errors: a missing terminator on
//! extraction, mismatched bit widths between embed and extract, and payloads
//! containing a zero byte all degrade silently into truncated or garbage output.

use thiserror::Error;

use crate::processing::grid::GridShape;

#[derive(Debug, Error)]
pub enum StegoError {
    /// Bit width outside the supported 1..=4 range.
    #[error("bit width must be between 1 and 4, got {0}")]
    InvalidBitWidth(u8),

    /// The framed payload does not fit in the grid at the chosen bit width.
    #[error("message too large: needs {required_bits} bits, max capacity is {available_bits} bits")]
    CapacityExceeded {
        required_bits: usize,
        available_bits: usize,
    },

    /// Fidelity comparison between grids of different dimensions.
    #[error("cannot compare grids of different shapes: {original} vs {modified}")]
    ShapeMismatch {
        original: GridShape,
        modified: GridShape,
    },

    /// Grid dimensions are zero or disagree with the sample buffer length.
    #[error("invalid grid: {0}")]
    InvalidShape(String),

    /// A text character whose code point does not fit in a single byte.
    #[error("character {character:?} at position {position} cannot be embedded (code point above 255)")]
    UnsupportedCharacter { character: char, position: usize },

    /// Failure decoding or encoding an image file.
    #[error("image I/O error: {0}")]
    ImageIo(#[from] image::ImageError),
}
