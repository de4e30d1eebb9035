//! Property-based tests for bitstream operations.
//!
//! Uses proptest to verify round-trip correctness of BitReader/BitWriter
//! and the marker-bit handling used by elementary-stream header parsers.

use proptest::prelude::*;
use recode_core::bitstream::{BitReader, BitWriter};

// =============================================================================
// BitReader/BitWriter Round-Trip Tests
// =============================================================================

proptest! {
    /// Test that writing and reading a full byte produces the same value.
    #[test]
    fn roundtrip_bits_u8(value in 0u8..=255) {
        let mut writer = BitWriter::new();
        writer.write_bits(value as u32, 8);

        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        let read_value = reader.read_bits(8).unwrap() as u8;

        prop_assert_eq!(value, read_value);
    }

    /// Test that writing and reading arbitrary bit widths works correctly.
    #[test]
    fn roundtrip_bits_variable_width(value in 0u32..=0xFFFF, width in 1u8..=16) {
        // Mask value to the actual width
        let masked_value = value & ((1u32 << width) - 1);

        let mut writer = BitWriter::new();
        writer.write_bits(masked_value, width);
        writer.align_to_byte();

        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        let read_value = reader.read_bits(width).unwrap();

        prop_assert_eq!(masked_value, read_value);
    }

    /// Test that writing and reading 32-bit values works correctly.
    #[test]
    fn roundtrip_bits_u32(value in any::<u32>()) {
        let mut writer = BitWriter::new();
        writer.write_bits(value, 32);

        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        let read_value = reader.read_bits(32).unwrap();

        prop_assert_eq!(value, read_value);
    }

    /// Test that writing and reading multiple values works correctly.
    #[test]
    fn roundtrip_multiple_values(
        v1 in 0u32..=0xFF,
        v2 in 0u32..=0xF,
        v3 in 0u32..=0x3F,
        v4 in 0u32..=0x1
    ) {
        let mut writer = BitWriter::new();
        writer.write_bits(v1, 8);
        writer.write_bits(v2, 4);
        writer.write_bits(v3, 6);
        writer.write_bits(v4, 1);
        writer.align_to_byte();

        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(reader.read_bits(8).unwrap(), v1);
        prop_assert_eq!(reader.read_bits(4).unwrap(), v2);
        prop_assert_eq!(reader.read_bits(6).unwrap(), v3);
        prop_assert_eq!(reader.read_bits(1).unwrap(), v4);
    }

    /// Test that individual bits round-trip correctly.
    #[test]
    fn roundtrip_individual_bits(bits in prop::collection::vec(any::<bool>(), 1..100)) {
        let mut writer = BitWriter::new();
        for &bit in &bits {
            writer.write_bit(bit);
        }
        writer.align_to_byte();

        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        for (i, &expected_bit) in bits.iter().enumerate() {
            let read_bit = reader.read_bit().unwrap();
            prop_assert_eq!(expected_bit, read_bit, "Mismatch at bit {}", i);
        }
    }
}

// =============================================================================
// Marker Bit Tests
// =============================================================================

proptest! {
    /// Test fields interleaved with marker bits, as sequence headers lay
    /// them out.
    #[test]
    fn roundtrip_fields_with_markers(
        fields in prop::collection::vec((0u32..0x4000, 1u8..=14), 1..12)
    ) {
        let mut writer = BitWriter::new();
        for &(value, width) in &fields {
            let masked = value & ((1u32 << width) - 1);
            writer.write_bits(masked, width);
            writer.write_marker();
        }
        writer.align_to_byte();

        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        for (i, &(value, width)) in fields.iter().enumerate() {
            let masked = value & ((1u32 << width) - 1);
            let read_value = reader.read_bits(width).unwrap();
            prop_assert_eq!(masked, read_value, "Field mismatch at index {}", i);
            prop_assert!(reader.read_marker().is_ok(), "Marker missing after field {}", i);
        }
    }

    /// Test that a zero bit where a marker is expected is rejected.
    #[test]
    fn marker_zero_bit_rejected(prefix in 0u8..8) {
        let mut writer = BitWriter::new();
        for _ in 0..prefix {
            writer.write_bit(true);
        }
        writer.write_bit(false);
        writer.align_to_byte();

        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        reader.skip(prefix as usize).unwrap();

        prop_assert!(reader.read_marker().is_err());
    }
}

// =============================================================================
// BitReader Position and State Tests
// =============================================================================

proptest! {
    /// Test that bit position tracking is accurate.
    #[test]
    fn bit_position_tracking(bits_to_read in 1usize..64, data_len in 8usize..32) {
        let data: Vec<u8> = (0..data_len as u8).collect();
        let mut reader = BitReader::new(&data);

        let total_bits = data_len * 8;
        let bits_to_read = bits_to_read.min(total_bits);

        prop_assert_eq!(reader.position(), 0);
        prop_assert_eq!(reader.remaining_bits(), total_bits);

        // Read some bits
        for _ in 0..bits_to_read {
            reader.read_bit().ok();
        }

        prop_assert_eq!(reader.position(), bits_to_read);
        prop_assert_eq!(reader.remaining_bits(), total_bits - bits_to_read);
    }

    /// Test byte alignment behavior.
    #[test]
    fn byte_alignment(initial_bits in 0u8..8, data in prop::collection::vec(any::<u8>(), 2..10)) {
        let mut reader = BitReader::new(&data);

        // Read some initial bits
        for _ in 0..initial_bits {
            let _ = reader.read_bit();
        }

        // Check alignment
        if initial_bits == 0 {
            prop_assert!(reader.is_byte_aligned());
        } else {
            prop_assert!(!reader.is_byte_aligned());
        }

        // Align to byte
        reader.align_to_byte();
        prop_assert!(reader.is_byte_aligned());
        prop_assert_eq!(reader.position() % 8, 0);
    }

    /// Test skip functionality.
    #[test]
    fn skip_bits(skip_count in 1usize..32, data in prop::collection::vec(any::<u8>(), 8..16)) {
        let mut reader = BitReader::new(&data);
        let total_bits = data.len() * 8;
        let skip_count = skip_count.min(total_bits);

        reader.skip(skip_count).unwrap();

        prop_assert_eq!(reader.position(), skip_count);
        prop_assert_eq!(reader.remaining_bits(), total_bits - skip_count);
    }

    /// Test that peeking matches the subsequent read and consumes nothing.
    #[test]
    fn peek_matches_read(data in prop::collection::vec(any::<u8>(), 2..16), n in 1u8..=16) {
        let mut reader = BitReader::new(&data);

        let peeked = reader.peek_bits(n).unwrap();
        prop_assert_eq!(reader.position(), 0);

        let read_value = reader.read_bits(n).unwrap();
        prop_assert_eq!(peeked, read_value);
        prop_assert_eq!(reader.position(), n as usize);
    }

    /// Test that reading past the end fails without moving the cursor.
    #[test]
    fn read_past_end_fails_cleanly(
        data in prop::collection::vec(any::<u8>(), 0..4),
        extra in 1u8..=8
    ) {
        let mut reader = BitReader::new(&data);
        let n = data.len() as u8 * 8 + extra;

        prop_assert!(reader.read_bits(n).is_err());
        prop_assert_eq!(reader.position(), 0);
        prop_assert_eq!(reader.remaining_bits(), data.len() * 8);
    }
}

// =============================================================================
// BitWriter State Tests
// =============================================================================

proptest! {
    /// Test BitWriter byte alignment.
    #[test]
    fn writer_byte_alignment(bits in 1u8..8) {
        let mut writer = BitWriter::new();

        prop_assert!(writer.is_byte_aligned());

        // Write some bits
        for _ in 0..bits {
            writer.write_bit(true);
        }
        prop_assert!(!writer.is_byte_aligned());

        // Align to byte
        writer.align_to_byte();
        prop_assert!(writer.is_byte_aligned());
    }

    /// Test that the writer's position advances by exactly the bits written.
    #[test]
    fn writer_position_tracking(widths in prop::collection::vec(1u8..=24, 1..10)) {
        let mut writer = BitWriter::new();
        let mut expected = 0usize;

        for &width in &widths {
            writer.write_bits(0, width);
            expected += width as usize;
            prop_assert_eq!(writer.position(), expected);
        }

        writer.align_to_byte();
        prop_assert_eq!(writer.position() % 8, 0);
        prop_assert!(writer.position() >= expected);
    }

    /// Test that alignment padding is all zero bits.
    #[test]
    fn align_pads_with_zeros(bits in 1u8..8) {
        let mut writer = BitWriter::new();
        for _ in 0..bits {
            writer.write_bit(true);
        }
        writer.align_to_byte();

        let bytes = writer.into_bytes();
        prop_assert_eq!(bytes.len(), 1);
        prop_assert_eq!(bytes[0], 0xFFu8 << (8 - bits));
    }
}

// =============================================================================
// Non-proptest Unit Tests for Edge Cases
// =============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_zero_width_read() {
        let data = [0xAB];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_oversized_read_rejected() {
        let data = [0u8; 16];
        let mut reader = BitReader::new(&data);
        assert!(reader.read_bits(33).is_err());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_empty_reader() {
        let mut reader = BitReader::new(&[]);
        assert_eq!(reader.remaining_bits(), 0);
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn test_empty_writer() {
        let writer = BitWriter::new();
        assert!(writer.is_byte_aligned());
        assert!(writer.into_bytes().is_empty());
    }

    #[test]
    fn test_write_bits_ignores_high_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFFFF_FFFF, 4);
        writer.align_to_byte();
        assert_eq!(writer.into_bytes(), vec![0xF0]);
    }

    #[test]
    fn test_marker_consumes_one_bit() {
        let mut writer = BitWriter::new();
        writer.write_marker();
        writer.align_to_byte();

        let bytes = writer.into_bytes();
        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_marker().is_ok());
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_peek_bits_does_not_consume() {
        let data = [0b1011_0100, 0b1100_1010];
        let reader = BitReader::new(&data);

        let peek1 = reader.peek_bits(8).unwrap();
        let peek2 = reader.peek_bits(8).unwrap();
        assert_eq!(peek1, peek2);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_align_when_already_aligned() {
        let data = [0x12, 0x34];
        let mut reader = BitReader::new(&data);
        reader.align_to_byte();
        assert_eq!(reader.position(), 0);

        let mut writer = BitWriter::new();
        writer.write_bits(0xAB, 8);
        writer.align_to_byte();
        assert_eq!(writer.position(), 8);
    }
}
