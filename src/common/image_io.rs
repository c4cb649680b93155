//! # Image I/O
//!
//! Bridges image files and [`PixelGrid`]s using the `image` crate.
//!
//! Decoded images are always converted to 8-bit RGB so the codec sees a fixed
//! 3-channel grid regardless of the source format. An `image::RgbImage` buffer
//! is already laid out row, column, channel, so it maps onto a grid without
//! reordering.

use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, RgbImage, RgbaImage};
use log::{debug, warn};
use std::io::Cursor;
use std::path::Path;

use crate::processing::error::StegoError;
use crate::processing::grid::{GridShape, PixelGrid};

/// Formats whose compression would destroy the low-order bits.
const LOSSY_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "webp"];

/// Open an image file and convert it to a 3-channel grid.
pub fn load_grid<P: AsRef<Path>>(path: P) -> Result<PixelGrid, StegoError> {
    let path = path.as_ref();
    let img = image::open(path)?;
    debug!("Loaded {} ({:?})", path.display(), img.color());
    grid_from_image(img)
}

/// Decode an in-memory image (any format the `image` crate supports).
pub fn decode_grid(bytes: &[u8]) -> Result<PixelGrid, StegoError> {
    let img = image::load_from_memory(bytes)?;
    grid_from_image(img)
}

fn grid_from_image(img: DynamicImage) -> Result<PixelGrid, StegoError> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let shape = GridShape::new(height as usize, width as usize, 3);
    PixelGrid::from_raw(shape, rgb.into_raw())
}

/// Save a grid, inferring the format from the file extension.
///
/// Saving to a lossy format logs a warning: the hidden payload will not survive.
pub fn save_grid<P: AsRef<Path>>(grid: &PixelGrid, path: P) -> Result<(), StegoError> {
    let path = path.as_ref();
    let is_lossy = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| LOSSY_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if is_lossy {
        warn!(
            "Saving to lossy format {}: embedded data will likely be destroyed",
            path.display()
        );
    }

    image_from_grid(grid)?.save(path)?;
    debug!("Saved {} grid to {}", grid.shape(), path.display());
    Ok(())
}

/// Encode a grid as PNG bytes.
pub fn encode_png(grid: &PixelGrid) -> Result<Vec<u8>, StegoError> {
    let mut output_bytes = Vec::new();
    image_from_grid(grid)?.write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png)?;
    Ok(output_bytes)
}

fn image_from_grid(grid: &PixelGrid) -> Result<DynamicImage, StegoError> {
    let shape = grid.shape();
    let width = u32::try_from(shape.width)
        .map_err(|_| StegoError::InvalidShape(format!("width {} too large", shape.width)))?;
    let height = u32::try_from(shape.height)
        .map_err(|_| StegoError::InvalidShape(format!("height {} too large", shape.height)))?;
    let samples = grid.samples().to_vec();

    let img = match shape.channels {
        1 => ImageBuffer::from_raw(width, height, samples).map(|b: GrayImage| DynamicImage::ImageLuma8(b)),
        3 => ImageBuffer::from_raw(width, height, samples).map(|b: RgbImage| DynamicImage::ImageRgb8(b)),
        4 => ImageBuffer::from_raw(width, height, samples).map(|b: RgbaImage| DynamicImage::ImageRgba8(b)),
        n => {
            return Err(StegoError::InvalidShape(format!(
                "cannot build an image with {} channels",
                n
            )))
        }
    };

    img.ok_or_else(|| StegoError::InvalidShape(format!("sample buffer does not fit a {} image", shape)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_round_trip_preserves_samples() {
        let shape = GridShape::new(4, 5, 3);
        let samples: Vec<u8> = (0..shape.sample_count()).map(|i| (i * 7) as u8).collect();
        let grid = PixelGrid::from_raw(shape, samples).unwrap();

        let png = encode_png(&grid).unwrap();
        let decoded = decode_grid(&png).unwrap();
        assert_eq!(decoded, grid);
    }

    #[test]
    fn test_rgba_input_becomes_rgb() {
        let shape = GridShape::new(2, 2, 4);
        let grid = PixelGrid::from_raw(shape, vec![9; 16]).unwrap();
        let decoded = decode_grid(&encode_png(&grid).unwrap()).unwrap();
        assert_eq!(decoded.shape(), GridShape::new(2, 2, 3));
        assert!(decoded.samples().iter().all(|&s| s == 9));
    }

    #[test]
    fn test_unsupported_channel_count() {
        let grid = PixelGrid::new(GridShape::new(2, 2, 2)).unwrap();
        assert!(matches!(encode_png(&grid), Err(StegoError::InvalidShape(_))));
    }

    #[test]
    fn test_garbage_bytes_are_image_errors() {
        assert!(matches!(
            decode_grid(b"definitely not an image"),
            Err(StegoError::ImageIo(_))
        ));
    }
}
