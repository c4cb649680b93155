//! # BitStream Codec
//!
//! Converts a payload into the bit sequence that gets hidden in the image,
//! and back.
//!
//! ## Framing
//! Each payload byte becomes 8 bits, most significant bit first, followed by
//! a single terminator byte of eight zero bits:
//!
//! ```text
//! "A"  ->  01000001 00000000
//! ```
//!
//! The terminator is a sentinel, not a length prefix. A payload containing a
//! literal zero byte is cut short at that byte when it is read back.

/// Bits appended after the payload to mark the end of the message.
pub const TERMINATOR_BITS: usize = 8;

/// Frame a payload: each byte MSB first, then the all-zero terminator byte.
pub fn frame(payload: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity((payload.len() + 1) * 8);
    for &byte in payload {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
    bits.extend(std::iter::repeat(false).take(TERMINATOR_BITS));
    bits
}

/// Number of bits [`frame`] produces for a payload of `payload_len` bytes.
pub fn framed_len(payload_len: usize) -> usize {
    payload_len * 8 + TERMINATOR_BITS
}

/// Recover a payload from a bit sequence.
///
/// Reads 8-bit groups until the first all-zero group, which is dropped. With
/// no terminator every complete byte is returned; a trailing group shorter
/// than 8 bits is discarded instead of being decoded as a value of its own.
/// Never fails.
pub fn unframe(bits: &[bool]) -> Vec<u8> {
    let mut assembler = ByteAssembler::new();
    for &bit in bits {
        if assembler.push_bit(bit) == Assembled::Terminator {
            break;
        }
    }
    assembler.into_payload()
}

/// Result of feeding bits into a [`ByteAssembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assembled {
    /// Still inside a byte, or a payload byte was completed.
    Pending,
    /// The byte just completed was the all-zero terminator.
    Terminator,
}

/// Incremental bit-to-byte accumulator shared by [`unframe`] and extraction.
///
/// Bytes are aligned on absolute 8-bit boundaries of the stream, independent
/// of how many bits are pushed at a time.
#[derive(Debug, Default)]
pub struct ByteAssembler {
    current: u8,
    filled: u8,
    payload: Vec<u8>,
}

impl ByteAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_bit(&mut self, bit: bool) -> Assembled {
        self.current = (self.current << 1) | bit as u8;
        self.filled += 1;
        if self.filled < 8 {
            return Assembled::Pending;
        }

        let byte = self.current;
        self.current = 0;
        self.filled = 0;
        if byte == 0 {
            Assembled::Terminator
        } else {
            self.payload.push(byte);
            Assembled::Pending
        }
    }

    /// Push the low `width` bits of `group`, most significant first.
    ///
    /// Stops at the terminator; any bits of `group` after it are ignored.
    pub fn push_group(&mut self, group: u8, width: u8) -> Assembled {
        for shift in (0..width).rev() {
            if self.push_bit((group >> shift) & 1 == 1) == Assembled::Terminator {
                return Assembled::Terminator;
            }
        }
        Assembled::Pending
    }

    /// Completed payload bytes; a partially filled byte is dropped rather
    /// than read as one more short character.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}
