//! # LSB Steganography on Image Files
//!
//! File and byte-buffer level operations built from the codec engines:
//!
//! ### Encoding
//! 1. Decode the cover image into a 3-channel grid
//! 2. Convert the message to payload bytes (one byte per character)
//! 3. Embed into a copy of the grid at the requested bit width
//! 4. Save the result, then re-read it and compare against the cover
//!
//! ### Decoding
//! 1. Decode the image into a grid
//! 2. Extract bytes until the terminator
//! 3. Convert the bytes back to text
//!
//! Output should go to a lossless format (PNG, BMP, TIFF). The bit width is
//! not stored in the image; decoding must use the same width as encoding.

use log::info;
use serde::Serialize;
use std::path::Path;

use crate::common::image_io::{decode_grid, encode_png, load_grid, save_grid};
use crate::common::text::{payload_to_text, text_to_payload};
use crate::processing::capacity::{capacity, CapacityReport};
use crate::processing::embed::embed;
use crate::processing::error::StegoError;
use crate::processing::extract::extract;
use crate::processing::fidelity::{compare, FidelityReport};
use crate::processing::grid::BitWidth;

/// What an [`encode_file`] call did to the cover image.
#[derive(Debug, Clone, Serialize)]
pub struct EncodeSummary {
    pub output: String,
    pub payload_bytes: usize,
    pub capacity: CapacityReport,
    pub fidelity: FidelityReport,
}

/// Hide `message` in the image at `input` and write the result to `output`.
///
/// # Errors
/// - Image can't be opened or saved
/// - Message contains a character above U+00FF
/// - Message is too large for the image at this bit width
pub fn encode_file<P, Q>(
    input: P,
    output: Q,
    message: &str,
    bit_width: BitWidth,
) -> Result<EncodeSummary, StegoError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output = output.as_ref();

    let cover = load_grid(input)?;
    let payload = text_to_payload(message)?;
    let stego = embed(&cover, &payload, bit_width)?;
    save_grid(&stego, output)?;

    // Compare against what actually landed on disk, so lossy formats show up
    let written = load_grid(output)?;
    let fidelity = compare(&cover, &written)?;

    info!(
        "Encoded {} bytes from {} into {} ({} bit(s), PSNR {:.2} dB)",
        payload.len(),
        input.display(),
        output.display(),
        bit_width,
        fidelity.psnr
    );

    Ok(EncodeSummary {
        output: output.display().to_string(),
        payload_bytes: payload.len(),
        capacity: capacity(cover.shape(), bit_width),
        fidelity,
    })
}

/// Read the message hidden in the image at `input`.
pub fn decode_file<P: AsRef<Path>>(input: P, bit_width: BitWidth) -> Result<String, StegoError> {
    let input = input.as_ref();
    let grid = load_grid(input)?;
    let payload = extract(&grid, bit_width);
    info!(
        "Decoded {} bytes from {} ({} bit(s))",
        payload.len(),
        input.display(),
        bit_width
    );
    Ok(payload_to_text(&payload))
}

/// Capacity of the image at `input` at the given bit width.
pub fn info_file<P: AsRef<Path>>(input: P, bit_width: BitWidth) -> Result<CapacityReport, StegoError> {
    let grid = load_grid(input)?;
    Ok(capacity(grid.shape(), bit_width))
}

/// Distortion between two image files of the same dimensions.
pub fn compare_files<P, Q>(original: P, modified: Q) -> Result<FidelityReport, StegoError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let original = load_grid(original)?;
    let modified = load_grid(modified)?;
    compare(&original, &modified)
}

/// Embed `text` into an in-memory image and return PNG bytes.
///
/// # Example
/// ```ignore
/// let image_data = std::fs::read("input.jpg")?;
/// let stego = embed_text_bytes(&image_data, "Secret message", BitWidth::new(2)?)?;
/// std::fs::write("output.png", stego)?;
/// ```
pub fn embed_text_bytes(image_bytes: &[u8], text: &str, bit_width: BitWidth) -> Result<Vec<u8>, StegoError> {
    let cover = decode_grid(image_bytes)?;
    let payload = text_to_payload(text)?;
    let stego = embed(&cover, &payload, bit_width)?;
    encode_png(&stego)
}

/// Extract text from an in-memory image.
pub fn extract_text_bytes(image_bytes: &[u8], bit_width: BitWidth) -> Result<String, StegoError> {
    let grid = decode_grid(image_bytes)?;
    Ok(payload_to_text(&extract(&grid, bit_width)))
}

/// Capacity of an in-memory image.
pub fn info_bytes(image_bytes: &[u8], bit_width: BitWidth) -> Result<CapacityReport, StegoError> {
    let grid = decode_grid(image_bytes)?;
    Ok(capacity(grid.shape(), bit_width))
}

/// Distortion between two in-memory images.
pub fn compare_bytes(original: &[u8], modified: &[u8]) -> Result<FidelityReport, StegoError> {
    compare(&decode_grid(original)?, &decode_grid(modified)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::grid::{GridShape, PixelGrid};

    fn cover_png() -> Vec<u8> {
        let shape = GridShape::new(10, 10, 3);
        let samples = (0..shape.sample_count()).map(|i| (i % 251) as u8).collect();
        encode_png(&PixelGrid::from_raw(shape, samples).unwrap()).unwrap()
    }

    #[test]
    fn test_bytes_round_trip() {
        let cover = cover_png();
        let width = BitWidth::new(2).unwrap();
        let stego = embed_text_bytes(&cover, "hidden café", width).unwrap();
        assert_eq!(extract_text_bytes(&stego, width).unwrap(), "hidden café");
    }

    #[test]
    fn test_bytes_compare_reports_changes() {
        let cover = cover_png();
        let stego = embed_text_bytes(&cover, "x", BitWidth::new(1).unwrap()).unwrap();
        let report = compare_bytes(&cover, &stego).unwrap();
        assert_eq!(report.total_samples, 300);
        assert!(report.changed_sample_count <= 16);
        assert!(report.mse <= 1.0);
    }

    #[test]
    fn test_bytes_capacity_exceeded() {
        let cover = cover_png();
        let message = "a".repeat(40);
        // 300 samples * 1 bit = 300 bits < 41 * 8
        assert!(matches!(
            embed_text_bytes(&cover, &message, BitWidth::new(1).unwrap()),
            Err(StegoError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_info_bytes() {
        let report = info_bytes(&cover_png(), BitWidth::new(4).unwrap()).unwrap();
        assert_eq!(report.bits, 1200);
        assert_eq!(report.characters, 149);
    }
}
