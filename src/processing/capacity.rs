//! # Capacity Planner
//!
//! How much payload a grid of a given shape can carry at a given bit width.
//!
//! ```text
//! bits       = height * width * channels * bit_width
//! bytes      = bits / 8
//! characters = bytes - 1      (one byte reserved for the terminator)
//! ```
//!
//! Example: an 800x600 RGB image at 1 bit per sample holds 180,000 bytes,
//! so 179,999 characters.

use serde::Serialize;

use crate::processing::grid::{BitWidth, GridShape};

/// Read-only capacity summary for a grid shape and bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityReport {
    /// Total embeddable bits.
    pub bits: usize,
    /// `bits / 8`, rounded down.
    pub bytes: usize,
    /// Largest payload that still leaves room for the terminator.
    pub characters: usize,
    /// `(width, height)` of the grid.
    pub dimensions: (usize, usize),
    pub channels: usize,
    pub bit_width: BitWidth,
}

/// Compute the capacity of a grid shape at `bit_width`.
///
/// `characters` saturates at zero for grids that cannot hold a single byte.
pub fn capacity(shape: GridShape, bit_width: BitWidth) -> CapacityReport {
    let bits = capacity_bits(shape, bit_width);
    let bytes = bits / 8;

    CapacityReport {
        bits,
        bytes,
        characters: bytes.saturating_sub(1),
        dimensions: (shape.width, shape.height),
        channels: shape.channels,
        bit_width,
    }
}

/// Embeddable bits only; the check the embedding engine performs.
pub fn capacity_bits(shape: GridShape, bit_width: BitWidth) -> usize {
    shape.sample_count() * bit_width.get() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_800x600() {
        let report = capacity(GridShape::new(600, 800, 3), BitWidth::new(1).unwrap());
        assert_eq!(report.bits, 1_440_000);
        assert_eq!(report.bytes, 180_000);
        assert_eq!(report.characters, 179_999);
        assert_eq!(report.dimensions, (800, 600));
        assert_eq!(report.channels, 3);
    }

    #[test]
    fn test_capacity_relations_hold_for_every_width() {
        let shapes = [
            GridShape::new(3, 3, 3),
            GridShape::new(7, 5, 3),
            GridShape::new(1, 1, 4),
            GridShape::new(64, 48, 1),
        ];
        for shape in shapes {
            for bits in 1..=4 {
                let width = BitWidth::new(bits).unwrap();
                let report = capacity(shape, width);
                assert_eq!(report.bits, shape.sample_count() * bits as usize);
                assert_eq!(report.bytes, report.bits / 8);
                if report.bytes > 0 {
                    assert_eq!(report.characters, report.bytes - 1);
                }
            }
        }
    }

    #[test]
    fn test_tiny_grid_has_no_characters() {
        let report = capacity(GridShape::new(1, 1, 3), BitWidth::new(2).unwrap());
        assert_eq!(report.bits, 6);
        assert_eq!(report.bytes, 0);
        assert_eq!(report.characters, 0);
    }
}
