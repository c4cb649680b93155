//! # Image Processing and Steganography
//!
//! The LSB codec, leaf first:
//!
//! - [`bitstream`]: payload ⇄ framed bit sequence with a zero-byte terminator
//! - [`capacity`]: how many bits and characters a grid can carry
//! - [`embed`]: writes a framed payload into a copy of a grid
//! - [`extract`]: reads it back until the terminator
//! - [`fidelity`]: MSE, PSNR and changed-sample ratio between two grids
//!
//! [`steganography`] wires these to image files and in-memory image buffers.

pub mod bitstream;
pub mod capacity;
pub mod embed;
pub mod error;
pub mod extract;
pub mod fidelity;
pub mod grid;
pub mod steganography;

// Re-export main functions for convenience
pub use bitstream::{frame, unframe};
pub use capacity::{capacity, CapacityReport};
pub use embed::embed;
pub use error::StegoError;
pub use extract::extract;
pub use fidelity::{compare, FidelityReport};
pub use grid::{BitWidth, GridShape, PixelGrid};
pub use steganography::{
    compare_bytes, compare_files, decode_file, embed_text_bytes, encode_file, extract_text_bytes,
    info_bytes, info_file, EncodeSummary,
};
