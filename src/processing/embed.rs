//! # Embedding Engine
//!
//! Writes a framed payload into the low-order bits of a grid.
//!
//! ## Algorithm
//! 1. Frame the payload (see [`bitstream::frame`])
//! 2. Reject it if the framed length exceeds `samples * bit_width`
//! 3. Walk the samples in linearization order; for each one:
//!    - Clear its low `bit_width` bits
//!    - OR in the next `bit_width` framed bits, MSB first
//!    - A short final group is padded on the right with zero bits
//! 4. Stop once every framed bit is written; later samples keep their values
//!
//! The caller's grid is never modified: the engine works on a copy.

use log::debug;

use crate::processing::bitstream;
use crate::processing::capacity::capacity_bits;
use crate::processing::error::StegoError;
use crate::processing::grid::{BitWidth, PixelGrid};

/// Hide `payload` in a copy of `grid` using `bit_width` bits per sample.
///
/// # Errors
/// [`StegoError::CapacityExceeded`] if the framed payload needs more bits
/// than the grid offers. A payload that fills the grid exactly is accepted.
///
/// # Example
/// ```
/// use pixel_stego::processing::{embed, extract, BitWidth, GridShape, PixelGrid};
///
/// let cover = PixelGrid::new(GridShape::new(3, 3, 3)).unwrap();
/// let width = BitWidth::new(1).unwrap();
/// let stego = embed(&cover, b"A", width).unwrap();
/// assert_eq!(extract(&stego, width), b"A".to_vec());
/// ```
pub fn embed(grid: &PixelGrid, payload: &[u8], bit_width: BitWidth) -> Result<PixelGrid, StegoError> {
    let framed = bitstream::frame(payload);
    let available_bits = capacity_bits(grid.shape(), bit_width);

    if framed.len() > available_bits {
        return Err(StegoError::CapacityExceeded {
            required_bits: framed.len(),
            available_bits,
        });
    }

    let width = bit_width.get() as usize;
    let clear = bit_width.clear_mask();
    let mut output = grid.clone();

    for (sample, group) in output.samples_mut().iter_mut().zip(framed.chunks(width)) {
        let value = group
            .iter()
            .fold(0u8, |acc, &bit| (acc << 1) | bit as u8)
            << (width - group.len());
        *sample = (*sample & clear) | value;
    }

    debug!(
        "Embedded {} payload bytes ({} bits) into {} grid at {} bit(s) per sample",
        payload.len(),
        framed.len(),
        grid.shape(),
        bit_width
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::grid::GridShape;

    fn zero_grid(h: usize, w: usize, c: usize) -> PixelGrid {
        PixelGrid::new(GridShape::new(h, w, c)).unwrap()
    }

    #[test]
    fn test_2x2_grid_too_small_for_one_byte() {
        let grid = zero_grid(2, 2, 3);
        let err = embed(&grid, &[65], BitWidth::new(1).unwrap()).unwrap_err();
        match err {
            StegoError::CapacityExceeded {
                required_bits,
                available_bits,
            } => {
                assert_eq!(required_bits, 16);
                assert_eq!(available_bits, 12);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_3x3_grid_single_byte_layout() {
        let grid = zero_grid(3, 3, 3);
        let stego = embed(&grid, &[65], BitWidth::new(1).unwrap()).unwrap();
        let framed = bitstream::frame(&[65]);

        let samples = stego.samples();
        for (i, &bit) in framed.iter().enumerate() {
            assert_eq!(samples[i] & 1, bit as u8, "sample {i}");
        }
        assert!(samples[16..].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_only_low_bits_change() {
        let samples: Vec<u8> = (0..48).map(|i| (i * 37 % 256) as u8).collect();
        let grid = PixelGrid::from_raw(GridShape::new(4, 4, 3), samples).unwrap();
        for bits in 1..=4 {
            let width = BitWidth::new(bits).unwrap();
            let stego = embed(&grid, b"Hi", width).unwrap();
            for (a, b) in grid.samples().iter().zip(stego.samples()) {
                assert_eq!(a & width.clear_mask(), b & width.clear_mask());
            }
        }
    }

    #[test]
    fn test_short_final_group_is_right_padded() {
        // 16 framed bits at width 3: the sixth group holds one bit plus two pad zeros
        let samples = vec![0xFF; 27];
        let grid = PixelGrid::from_raw(GridShape::new(3, 3, 3), samples).unwrap();
        let stego = embed(&grid, &[0xFF], BitWidth::new(3).unwrap()).unwrap();

        // 11111111 00000000 -> 111 111 110 000 000 0(00)
        let expected_low = [0b111, 0b111, 0b110, 0b000, 0b000, 0b000];
        for (i, &low) in expected_low.iter().enumerate() {
            assert_eq!(stego.samples()[i] & 0b111, low, "sample {i}");
            assert_eq!(stego.samples()[i] & 0b1111_1000, 0b1111_1000);
        }
        assert!(stego.samples()[6..].iter().all(|&s| s == 0xFF));
    }

    #[test]
    fn test_input_grid_not_mutated() {
        let grid = zero_grid(3, 3, 3);
        let before = grid.clone();
        let _ = embed(&grid, &[0x7F], BitWidth::new(1).unwrap()).unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_deterministic() {
        let grid = zero_grid(5, 5, 3);
        let width = BitWidth::new(2).unwrap();
        assert_eq!(
            embed(&grid, b"same", width).unwrap(),
            embed(&grid, b"same", width).unwrap()
        );
    }
}
