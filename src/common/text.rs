//! # Text Payloads
//!
//! Text is embedded one byte per character, using the character's code point
//! as the byte value (not UTF-8). Only code points 0..=255 are representable;
//! anything above is rejected rather than silently mangled.

use crate::processing::error::StegoError;

/// Convert text to payload bytes, one byte per character.
///
/// # Errors
/// [`StegoError::UnsupportedCharacter`] for the first character above U+00FF.
pub fn text_to_payload(text: &str) -> Result<Vec<u8>, StegoError> {
    text.chars()
        .enumerate()
        .map(|(position, character)| {
            u8::try_from(u32::from(character))
                .map_err(|_| StegoError::UnsupportedCharacter { character, position })
        })
        .collect()
}

/// Convert payload bytes back to text, each byte read as a code point.
pub fn payload_to_text(payload: &[u8]) -> String {
    payload.iter().map(|&b| char::from(b)).collect()
}
