//! # Extraction Engine
//!
//! Reads the low `bit_width` bits of each sample in linearization order and
//! reassembles them into bytes until the all-zero terminator byte appears.
//!
//! Extraction cannot fail. A grid with no hidden message, or one read with
//! the wrong bit width, still produces bytes; they are just garbage. If no
//! terminator is found the whole grid is consumed and every complete byte is
//! returned.

use log::debug;

use crate::processing::bitstream::{Assembled, ByteAssembler};
use crate::processing::grid::{BitWidth, PixelGrid};

/// Recover the payload hidden in `grid` at `bit_width` bits per sample.
pub fn extract(grid: &PixelGrid, bit_width: BitWidth) -> Vec<u8> {
    let mask = bit_width.value_mask();
    let mut assembler = ByteAssembler::new();

    for (index, &sample) in grid.samples().iter().enumerate() {
        if assembler.push_group(sample & mask, bit_width.get()) == Assembled::Terminator {
            debug!("Terminator found at sample {} of {}", index, grid.len());
            return assembler.into_payload();
        }
    }

    debug!("No terminator found in {} samples", grid.len());
    assembler.into_payload()
}
