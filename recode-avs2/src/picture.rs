//! Pixel plane staging between frame buffers and codec picture memory.
//!
//! Both sides of the exchange use their own strides, so planes move row by
//! row. The widening path covers 8-bit input handed to a 10-bit encoder
//! build, which stores one sample per little-endian u16.

use recode_core::{Error, Result};

/// Copy `rows` rows of `row_bytes` bytes between planes with independent
/// strides.
///
/// Works in either direction: staging host frames into codec buffers and
/// exporting decoded pictures back out.
pub fn copy_plane_rows(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    row_bytes: usize,
    rows: usize,
) -> Result<()> {
    if rows == 0 || row_bytes == 0 {
        return Ok(());
    }
    if src_stride < row_bytes || dst_stride < row_bytes {
        return Err(Error::InvalidParameter(
            "Plane stride is smaller than the row size".into(),
        ));
    }

    let needed_src = (rows - 1) * src_stride + row_bytes;
    if src.len() < needed_src {
        return Err(Error::BufferTooSmall {
            needed: needed_src,
            available: src.len(),
        });
    }
    let needed_dst = (rows - 1) * dst_stride + row_bytes;
    if dst.len() < needed_dst {
        return Err(Error::BufferTooSmall {
            needed: needed_dst,
            available: dst.len(),
        });
    }

    for row in 0..rows {
        let src_off = row * src_stride;
        let dst_off = row * dst_stride;
        dst[dst_off..dst_off + row_bytes].copy_from_slice(&src[src_off..src_off + row_bytes]);
    }

    Ok(())
}

/// Widen `rows` rows of `width` 8-bit samples into little-endian u16
/// samples shifted left by `shift`.
///
/// Each destination row is zeroed across its full stride before the
/// samples are written, so stride padding never carries stale data.
pub fn widen_plane_rows(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    width: usize,
    rows: usize,
    shift: u32,
) -> Result<()> {
    if rows == 0 || width == 0 {
        return Ok(());
    }
    if src_stride < width || dst_stride < width * 2 {
        return Err(Error::InvalidParameter(
            "Plane stride is smaller than the row size".into(),
        ));
    }

    let needed_src = (rows - 1) * src_stride + width;
    if src.len() < needed_src {
        return Err(Error::BufferTooSmall {
            needed: needed_src,
            available: src.len(),
        });
    }
    let needed_dst = rows * dst_stride;
    if dst.len() < needed_dst {
        return Err(Error::BufferTooSmall {
            needed: needed_dst,
            available: dst.len(),
        });
    }

    for row in 0..rows {
        let src_row = &src[row * src_stride..row * src_stride + width];
        let dst_row = &mut dst[row * dst_stride..(row + 1) * dst_stride];
        dst_row.fill(0);
        for (i, &sample) in src_row.iter().enumerate() {
            let widened = (sample as u16) << shift;
            dst_row[i * 2..i * 2 + 2].copy_from_slice(&widened.to_le_bytes());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_respects_both_strides() {
        // Two rows of 4 bytes, source stride 6, destination stride 8.
        let src = [1, 2, 3, 4, 0xAA, 0xAA, 5, 6, 7, 8, 0xAA, 0xAA];
        let mut dst = [0xFFu8; 16];

        copy_plane_rows(&mut dst, 8, &src, 6, 4, 2).unwrap();

        assert_eq!(&dst[0..4], &[1, 2, 3, 4]);
        assert_eq!(&dst[8..12], &[5, 6, 7, 8]);
        // Stride padding in the destination is untouched.
        assert_eq!(&dst[4..8], &[0xFF; 4]);
    }

    #[test]
    fn test_copy_rejects_short_buffers() {
        let src = [0u8; 8];
        let mut dst = [0u8; 4];

        let err = copy_plane_rows(&mut dst, 8, &src, 8, 8, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                needed: 8,
                available: 4
            }
        ));

        let mut dst = [0u8; 64];
        let err = copy_plane_rows(&mut dst, 8, &src, 8, 8, 2).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { needed: 16, .. }));
    }

    #[test]
    fn test_copy_rejects_undersized_stride() {
        let src = [0u8; 32];
        let mut dst = [0u8; 32];
        assert!(copy_plane_rows(&mut dst, 4, &src, 8, 8, 2).is_err());
    }

    #[test]
    fn test_copy_zero_rows_is_noop() {
        let src = [1u8; 4];
        let mut dst = [9u8; 4];
        copy_plane_rows(&mut dst, 4, &src, 4, 4, 0).unwrap();
        assert_eq!(dst, [9; 4]);
    }

    #[test]
    fn test_widen_shifts_into_le_u16() {
        let src = [1, 2, 3, 4, 5, 6];
        let mut dst = [0xFFu8; 16];

        // Two rows of 3 samples, source stride 3, destination stride 8.
        widen_plane_rows(&mut dst, 8, &src, 3, 3, 2, 2).unwrap();

        let row0: Vec<u16> = dst[0..6]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(row0, vec![4, 8, 12]);

        let row1: Vec<u16> = dst[8..14]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(row1, vec![16, 20, 24]);

        // All stride padding is zeroed, not left stale.
        assert_eq!(&dst[6..8], &[0, 0]);
        assert_eq!(&dst[14..16], &[0, 0]);
    }

    #[test]
    fn test_widen_rejects_short_destination() {
        let src = [0u8; 8];
        let mut dst = [0u8; 8];
        let err = widen_plane_rows(&mut dst, 8, &src, 4, 4, 2, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                needed: 16,
                available: 8
            }
        ));
    }

    #[test]
    fn test_widen_rejects_narrow_stride() {
        let src = [0u8; 8];
        let mut dst = [0u8; 32];
        // Destination stride must hold width * 2 bytes.
        assert!(widen_plane_rows(&mut dst, 6, &src, 4, 4, 2, 2).is_err());
    }
}
