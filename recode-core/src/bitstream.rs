//! Bit-level access to coded byte streams.
//!
//! MSB-first reader and writer, used for parsing elementary-stream headers
//! (and for synthesizing them in tests). Fixed-width fields only; exotic
//! entropy codings live in the codec libraries, not here.

use crate::error::{BitstreamError, Result};

/// A bounded MSB-first bitstream reader.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    /// Create a new bit reader over a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Current bit position in the stream.
    pub fn position(&self) -> usize {
        self.byte_pos * 8 + self.bit_pos as usize
    }

    /// Number of bits left to read.
    pub fn remaining_bits(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.position())
    }

    /// Check if the reader is at a byte boundary.
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_pos == 0
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.byte_pos >= self.data.len() {
            return Err(BitstreamError::UnexpectedEnd.into());
        }

        let bit = (self.data[self.byte_pos] >> (7 - self.bit_pos)) & 1;
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }

        Ok(bit != 0)
    }

    /// Read up to 32 bits as an unsigned integer.
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(crate::error::Error::InvalidParameter(
                "Cannot read more than 32 bits at once".into(),
            ));
        }
        if self.remaining_bits() < n as usize {
            return Err(BitstreamError::UnexpectedEnd.into());
        }

        let mut value: u32 = 0;
        for _ in 0..n {
            value = (value << 1) | (self.read_bit()? as u32);
        }

        Ok(value)
    }

    /// Read a marker bit that must be 1.
    pub fn read_marker(&mut self) -> Result<()> {
        let position = self.position();
        if self.read_bit()? {
            Ok(())
        } else {
            Err(BitstreamError::InvalidMarker { position }.into())
        }
    }

    /// Skip a number of bits.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if self.remaining_bits() < n {
            return Err(BitstreamError::UnexpectedEnd.into());
        }

        let new_pos = self.position() + n;
        self.byte_pos = new_pos / 8;
        self.bit_pos = (new_pos % 8) as u8;

        Ok(())
    }

    /// Peek at the next n bits without consuming them.
    pub fn peek_bits(&self, n: u8) -> Result<u32> {
        let mut clone = self.clone();
        clone.read_bits(n)
    }

    /// Skip forward to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        if self.bit_pos != 0 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
    }
}

/// An MSB-first bitstream writer.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    bit_pos: u8,
}

impl BitWriter {
    /// Create a new bit writer.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            bit_pos: 0,
        }
    }

    /// Number of bits written so far.
    pub fn position(&self) -> usize {
        if self.bit_pos == 0 {
            self.data.len() * 8
        } else {
            (self.data.len() - 1) * 8 + self.bit_pos as usize
        }
    }

    /// Check if the writer is at a byte boundary.
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_pos == 0
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        if self.bit_pos == 0 {
            self.data.push(0);
        }

        if bit {
            let idx = self.data.len() - 1;
            self.data[idx] |= 1 << (7 - self.bit_pos);
        }

        self.bit_pos = (self.bit_pos + 1) % 8;
    }

    /// Write the low n bits of a value, most significant first.
    pub fn write_bits(&mut self, value: u32, n: u8) {
        for i in (0..n).rev() {
            self.write_bit((value >> i) & 1 != 0);
        }
    }

    /// Write a marker bit (always 1).
    pub fn write_marker(&mut self) {
        self.write_bit(true);
    }

    /// Pad with zero bits to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        while self.bit_pos != 0 {
            self.write_bit(false);
        }
    }

    /// Consume the writer and return the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bits() {
        let data = [0b1011_0010, 0b0100_0000];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1011);
        assert_eq!(reader.read_bits(6).unwrap(), 0b001001);
        assert_eq!(reader.position(), 10);
    }

    #[test]
    fn test_read_past_end() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        assert!(reader.read_bits(8).is_ok());
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn test_marker_bit() {
        let data = [0b1000_0000];
        let mut reader = BitReader::new(&data);
        assert!(reader.read_marker().is_ok());
        // Next bit is 0, so the marker check must fail.
        assert!(reader.read_marker().is_err());
    }

    #[test]
    fn test_skip_and_peek() {
        let data = [0x12, 0x34];
        let mut reader = BitReader::new(&data);
        reader.skip(8).unwrap();
        assert_eq!(reader.peek_bits(8).unwrap(), 0x34);
        assert_eq!(reader.read_bits(8).unwrap(), 0x34);
    }

    #[test]
    fn test_writer_round_trip() {
        let mut writer = BitWriter::new();
        writer.write_bits(0x12, 8);
        writer.write_bits(0x3, 2);
        writer.write_marker();
        writer.align_to_byte();
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(8).unwrap(), 0x12);
        assert_eq!(reader.read_bits(2).unwrap(), 0x3);
        assert!(reader.read_marker().is_ok());
    }

    #[test]
    fn test_writer_position() {
        let mut writer = BitWriter::new();
        assert!(writer.is_byte_aligned());
        writer.write_bits(0b101, 3);
        assert_eq!(writer.position(), 3);
        writer.align_to_byte();
        assert_eq!(writer.position(), 8);
    }
}
