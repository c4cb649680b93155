//! # Pixel Grid and Bit Width
//!
//! A [`PixelGrid`] is a `height × width × channels` block of 8-bit samples.
//! For embedding it is always walked as one flat sequence in row, then
//! column, then channel order. Embed and extract both rely on
//! [`PixelGrid::samples`] for that order, so it must never change.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::processing::error::StegoError;

/// Dimensions of a [`PixelGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl GridShape {
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }

    /// Number of samples in the linearized grid.
    pub fn sample_count(&self) -> usize {
        self.height * self.width * self.channels
    }

    fn validate(&self) -> Result<(), StegoError> {
        if self.height == 0 || self.width == 0 || self.channels == 0 {
            return Err(StegoError::InvalidShape(format!(
                "dimensions must be positive, got {}",
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}

/// Number of low-order bits per sample used to carry payload, always 1..=4.
///
/// There is no way to build an out-of-range value, so every operation taking
/// a `BitWidth` has already passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub struct BitWidth(u8);

impl BitWidth {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(bits: u8) -> Result<Self, StegoError> {
        if (Self::MIN..=Self::MAX).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(StegoError::InvalidBitWidth(bits))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Mask selecting the payload bits of a sample: `(1 << w) - 1`.
    pub fn value_mask(self) -> u8 {
        (1u8 << self.0) - 1
    }

    /// Mask keeping everything but the payload bits: `0xFF << w`, truncated to 8 bits.
    pub fn clear_mask(self) -> u8 {
        !self.value_mask()
    }
}

impl Default for BitWidth {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u8> for BitWidth {
    type Error = StegoError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<BitWidth> for u8 {
    fn from(width: BitWidth) -> u8 {
        width.0
    }
}

impl<'de> Deserialize<'de> for BitWidth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        BitWidth::new(bits).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owned 3-D grid of 8-bit samples stored in linearization order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    shape: GridShape,
    samples: Vec<u8>,
}

impl PixelGrid {
    /// Create a grid with every sample set to zero.
    pub fn new(shape: GridShape) -> Result<Self, StegoError> {
        shape.validate()?;
        Ok(Self {
            shape,
            samples: vec![0; shape.sample_count()],
        })
    }

    /// Wrap an existing sample buffer laid out row, column, channel.
    pub fn from_raw(shape: GridShape, samples: Vec<u8>) -> Result<Self, StegoError> {
        shape.validate()?;
        if samples.len() != shape.sample_count() {
            return Err(StegoError::InvalidShape(format!(
                "{} grid needs {} samples, got {}",
                shape,
                shape.sample_count(),
                samples.len()
            )));
        }
        Ok(Self { shape, samples })
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn index(&self, row: usize, col: usize, channel: usize) -> usize {
        assert!(
            row < self.shape.height && col < self.shape.width && channel < self.shape.channels,
            "sample ({row}, {col}, {channel}) out of bounds for {} grid",
            self.shape
        );
        (row * self.shape.width + col) * self.shape.channels + channel
    }

    pub fn get(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.samples[self.index(row, col, channel)]
    }

    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: u8) {
        let idx = self.index(row, col, channel);
        self.samples[idx] = value;
    }

    /// Samples in linearization order.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_width_range() {
        for bits in 1..=4 {
            assert_eq!(BitWidth::new(bits).unwrap().get(), bits);
        }
        assert!(matches!(BitWidth::new(0), Err(StegoError::InvalidBitWidth(0))));
        assert!(matches!(BitWidth::new(5), Err(StegoError::InvalidBitWidth(5))));
    }

    #[test]
    fn test_bit_width_masks() {
        let w = BitWidth::new(3).unwrap();
        assert_eq!(w.value_mask(), 0b0000_0111);
        assert_eq!(w.clear_mask(), 0b1111_1000);
        assert_eq!(BitWidth::default().clear_mask(), 0xFE);
    }

    #[test]
    fn test_bit_width_deserialize_rejects_out_of_range() {
        let ok: BitWidth = serde_json::from_str("2").unwrap();
        assert_eq!(ok.get(), 2);
        assert!(serde_json::from_str::<BitWidth>("7").is_err());
    }

    #[test]
    fn test_linearization_order() {
        let shape = GridShape::new(2, 3, 3);
        let samples: Vec<u8> = (0..18).collect();
        let grid = PixelGrid::from_raw(shape, samples).unwrap();

        // (row, col, channel) -> (row * width + col) * channels + channel
        assert_eq!(grid.get(0, 0, 0), 0);
        assert_eq!(grid.get(0, 0, 2), 2);
        assert_eq!(grid.get(0, 1, 0), 3);
        assert_eq!(grid.get(1, 0, 0), 9);
        assert_eq!(grid.get(1, 2, 2), 17);
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(matches!(
            PixelGrid::new(GridShape::new(0, 4, 3)),
            Err(StegoError::InvalidShape(_))
        ));
        assert!(matches!(
            PixelGrid::from_raw(GridShape::new(2, 2, 3), vec![0; 11]),
            Err(StegoError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_set_get() {
        let mut grid = PixelGrid::new(GridShape::new(2, 2, 3)).unwrap();
        grid.set(1, 1, 2, 200);
        assert_eq!(grid.get(1, 1, 2), 200);
        assert_eq!(grid.samples()[11], 200);
    }
}
