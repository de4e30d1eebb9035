//! AVS2 elementary stream parser.
//!
//! Scans for start codes and extracts stream metadata from sequence
//! headers. This is the part of the crate that works without the native
//! libraries; the decoder also uses it to pre-populate stream info from
//! incoming packets.

use recode_core::bitstream::BitReader;
use recode_core::Rational;

use crate::types::{
    AspectRatio, ChromaFormat, FrameRateCode, Profile, SequenceHeader, StreamInfo,
};
use crate::{
    Avs2Error, Result, INTER_PICTURE_CODE, INTRA_PICTURE_CODE, SEQUENCE_HEADER_CODE,
    SLICE_START_CODE_MAX, SLICE_START_CODE_MIN,
};

/// AVS2 elementary stream parser.
///
/// # Example
///
/// ```rust,ignore
/// use recode_avs2::Avs2Parser;
///
/// let mut parser = Avs2Parser::new();
/// if let Ok(seq) = parser.parse_sequence_header(&data) {
///     println!("Resolution: {}x{}", seq.horizontal_size, seq.vertical_size);
/// }
/// ```
#[derive(Debug, Default)]
pub struct Avs2Parser {
    /// Last parsed sequence header.
    sequence_header: Option<SequenceHeader>,
}

impl Avs2Parser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self {
            sequence_header: None,
        }
    }

    /// Reset the parser state.
    pub fn reset(&mut self) {
        self.sequence_header = None;
    }

    /// Find the next start code in the data.
    ///
    /// Start codes are 0x000001XX patterns; returns the prefix offset
    /// and the code byte.
    pub fn find_start_code(&self, data: &[u8]) -> Option<(usize, u8)> {
        if data.len() < 4 {
            return None;
        }

        for i in 0..data.len() - 3 {
            if data[i] == 0x00 && data[i + 1] == 0x00 && data[i + 2] == 0x01 {
                return Some((i, data[i + 3]));
            }
        }

        None
    }

    /// Find the offset of the next sequence header start code.
    pub fn find_sequence_header(&self, data: &[u8]) -> Option<usize> {
        if data.len() < 4 {
            return None;
        }

        (0..data.len() - 3).find(|&i| {
            data[i] == 0x00
                && data[i + 1] == 0x00
                && data[i + 2] == 0x01
                && data[i + 3] == SEQUENCE_HEADER_CODE
        })
    }

    /// Parse a sequence header. `data` must begin at its start code.
    pub fn parse_sequence_header(&mut self, data: &[u8]) -> Result<SequenceHeader> {
        if data.len() < 4
            || data[0] != 0x00
            || data[1] != 0x00
            || data[2] != 0x01
            || data[3] != SEQUENCE_HEADER_CODE
        {
            return Err(Avs2Error::InvalidSequenceHeader(
                "missing sequence header start code".into(),
            ));
        }

        let mut reader = BitReader::new(&data[4..]);

        let profile = Profile::from_code(reader.read_bits(8)? as u8);
        let level_id = reader.read_bits(8)? as u8;
        let progressive_sequence = reader.read_bit()?;
        let field_coded_sequence = reader.read_bit()?;

        let horizontal_size = reader.read_bits(14)? as u16;
        let vertical_size = reader.read_bits(14)? as u16;
        if horizontal_size == 0 || vertical_size == 0 {
            return Err(Avs2Error::InvalidSequenceHeader(
                "zero frame dimensions".into(),
            ));
        }

        let chroma_code = reader.read_bits(2)? as u8;
        let chroma_format = ChromaFormat::from_code(chroma_code).ok_or_else(|| {
            Avs2Error::InvalidSequenceHeader(format!("reserved chroma format {}", chroma_code))
        })?;

        let sample_precision = reader.read_bits(3)? as u8;
        if !(1..=2).contains(&sample_precision) {
            return Err(Avs2Error::InvalidSequenceHeader(format!(
                "reserved sample precision {}",
                sample_precision
            )));
        }

        // The Main-10 profile carries a separate encoding precision.
        let encoding_precision = if profile == Profile::Main10 {
            let code = reader.read_bits(3)? as u8;
            if !(1..=2).contains(&code) {
                return Err(Avs2Error::InvalidSequenceHeader(format!(
                    "reserved encoding precision {}",
                    code
                )));
            }
            Some(code)
        } else {
            None
        };

        let aspect_ratio = AspectRatio::from_code(reader.read_bits(4)? as u8);
        let frame_rate_code = FrameRateCode::from_code(reader.read_bits(4)? as u8);

        let bit_rate_lower = reader.read_bits(18)?;
        reader.read_marker()?;
        let bit_rate_upper = reader.read_bits(12)? as u16;
        let low_delay = reader.read_bit()?;

        let header = SequenceHeader {
            profile,
            level_id,
            progressive_sequence,
            field_coded_sequence,
            horizontal_size,
            vertical_size,
            chroma_format,
            sample_precision,
            encoding_precision,
            aspect_ratio,
            frame_rate_code,
            bit_rate_lower,
            bit_rate_upper,
            low_delay,
        };

        self.sequence_header = Some(header.clone());
        Ok(header)
    }

    /// Get the last parsed sequence header.
    pub fn sequence_header(&self) -> Option<&SequenceHeader> {
        self.sequence_header.as_ref()
    }

    /// Stream info derived from the cached sequence header, if any.
    pub fn stream_info(&self) -> Option<StreamInfo> {
        let header = self.sequence_header.as_ref()?;
        let pixel_format = header.pixel_format()?;
        Some(StreamInfo {
            width: header.horizontal_size as u32,
            height: header.vertical_size as u32,
            pixel_format,
            frame_rate: header.frame_rate_code.rational(),
            bit_rate: header.bit_rate_bps(),
            low_delay: header.low_delay,
        })
    }

    /// Check if a start code marks a slice (0x00 through 0xAF).
    pub fn is_slice_code(code: u8) -> bool {
        (SLICE_START_CODE_MIN..=SLICE_START_CODE_MAX).contains(&code)
    }

    /// Check if a start code begins an intra or inter picture unit.
    pub fn is_picture_code(code: u8) -> bool {
        code == INTRA_PICTURE_CODE || code == INTER_PICTURE_CODE
    }
}

/// Detect AVS2 video in data.
///
/// Returns true if a sequence header start code appears within the
/// first kilobyte.
pub fn detect_avs2(data: &[u8]) -> bool {
    let search_len = data.len().min(1024);
    if search_len < 4 {
        return false;
    }

    for i in 0..search_len - 3 {
        if data[i] == 0x00
            && data[i + 1] == 0x00
            && data[i + 2] == 0x01
            && data[i + 3] == SEQUENCE_HEADER_CODE
        {
            return true;
        }
    }

    false
}

/// Extract the sequence header unit from a buffer.
///
/// Returns the unit bytes including its start code, ending at the next
/// start code or at the end of the data.
pub fn extract_sequence_header(data: &[u8]) -> Option<&[u8]> {
    if data.len() < 4 {
        return None;
    }

    let start = (0..data.len() - 3).find(|&i| {
        data[i] == 0x00
            && data[i + 1] == 0x00
            && data[i + 2] == 0x01
            && data[i + 3] == SEQUENCE_HEADER_CODE
    })?;

    let body = &data[start + 4..];
    let end = if body.len() < 3 {
        None
    } else {
        (0..body.len() - 2)
            .find(|&i| body[i] == 0x00 && body[i + 1] == 0x00 && body[i + 2] == 0x01)
    };

    match end {
        Some(offset) => Some(&data[start..start + 4 + offset]),
        None => Some(&data[start..]),
    }
}

/// Probe a buffer for stream info.
///
/// Finds and parses the first sequence header.
pub fn stream_info(data: &[u8]) -> Result<StreamInfo> {
    let mut parser = Avs2Parser::new();
    let pos = parser
        .find_sequence_header(data)
        .ok_or_else(|| Avs2Error::InvalidSequenceHeader("no sequence header found".into()))?;
    parser.parse_sequence_header(&data[pos..])?;
    parser.stream_info().ok_or_else(|| {
        Avs2Error::InvalidSequenceHeader("unrepresentable stream parameters".into())
    })
}

/// Frame rate from a header code, falling back to a reported float for
/// out-of-table codes.
pub(crate) fn frame_rate_from_code(code: u8, reported_fps: f64) -> Rational {
    let table = FrameRateCode::from_code(code);
    if table != FrameRateCode::Forbidden {
        return table.rational();
    }
    if reported_fps <= 0.0 {
        return Rational::ZERO;
    }
    Rational::new((reported_fps * 1000.0).round() as i64, 1000).reduced()
}

#[cfg(test)]
mod tests {
    use super::*;
    use recode_core::bitstream::BitWriter;
    use recode_core::PixelFormat;

    fn build_header(
        profile: u8,
        width: u16,
        height: u16,
        precision: u8,
        enc_precision: Option<u8>,
        frame_rate_code: u8,
        good_marker: bool,
    ) -> Vec<u8> {
        let mut w = BitWriter::new();
        w.write_bits(profile as u32, 8);
        w.write_bits(0x42, 8); // level
        w.write_bit(true); // progressive_sequence
        w.write_bit(false); // field_coded_sequence
        w.write_bits(width as u32, 14);
        w.write_bits(height as u32, 14);
        w.write_bits(1, 2); // chroma 4:2:0
        w.write_bits(precision as u32, 3);
        if let Some(code) = enc_precision {
            w.write_bits(code as u32, 3);
        }
        w.write_bits(2, 4); // aspect 4:3
        w.write_bits(frame_rate_code as u32, 4);
        w.write_bits(12500, 18); // bit_rate_lower
        w.write_bit(good_marker);
        w.write_bits(1, 12); // bit_rate_upper
        w.write_bit(false); // low_delay
        w.align_to_byte();

        let mut data = vec![0x00, 0x00, 0x01, SEQUENCE_HEADER_CODE];
        data.extend(w.into_bytes());
        data
    }

    #[test]
    fn test_find_start_code() {
        let parser = Avs2Parser::new();

        let data = [0x00, 0x00, 0x01, 0xB0];
        assert_eq!(parser.find_start_code(&data), Some((0, 0xB0)));

        let data = [0xFF, 0x00, 0x00, 0x01, 0xB6];
        assert_eq!(parser.find_start_code(&data), Some((1, 0xB6)));

        let data = [0x00, 0x00, 0x02, 0xB0];
        assert_eq!(parser.find_start_code(&data), None);
    }

    #[test]
    fn test_slice_and_picture_codes() {
        assert!(Avs2Parser::is_slice_code(0x00));
        assert!(Avs2Parser::is_slice_code(0xAF));
        assert!(!Avs2Parser::is_slice_code(0xB0));
        assert!(Avs2Parser::is_picture_code(0xB3));
        assert!(Avs2Parser::is_picture_code(0xB6));
        assert!(!Avs2Parser::is_picture_code(0xB1));
    }

    #[test]
    fn test_parse_main_profile_header() {
        let data = build_header(0x20, 1920, 1080, 1, None, 3, true);
        let mut parser = Avs2Parser::new();
        let header = parser.parse_sequence_header(&data).unwrap();

        assert_eq!(header.profile, Profile::Main);
        assert_eq!(header.level_id, 0x42);
        assert!(header.progressive_sequence);
        assert_eq!(header.horizontal_size, 1920);
        assert_eq!(header.vertical_size, 1080);
        assert_eq!(header.chroma_format, ChromaFormat::Yuv420);
        assert_eq!(header.bit_depth(), 8);
        assert_eq!(header.frame_rate_code, FrameRateCode::Fps25);
        assert_eq!(header.aspect_ratio, AspectRatio::Dar4_3);
        assert_eq!(header.bit_rate_bps(), ((1u64 << 18) | 12500) * 400);
        assert!(parser.sequence_header().is_some());
    }

    #[test]
    fn test_parse_main10_header() {
        let data = build_header(0x22, 3840, 2160, 1, Some(2), 8, true);
        let mut parser = Avs2Parser::new();
        let header = parser.parse_sequence_header(&data).unwrap();

        assert_eq!(header.profile, Profile::Main10);
        assert_eq!(header.encoding_precision, Some(2));
        assert_eq!(header.bit_depth(), 10);
        assert_eq!(header.pixel_format(), Some(PixelFormat::Yuv420p10le));
    }

    #[test]
    fn test_parse_rejects_bad_marker() {
        let data = build_header(0x20, 1920, 1080, 1, None, 3, false);
        let mut parser = Avs2Parser::new();
        assert!(parser.parse_sequence_header(&data).is_err());
    }

    #[test]
    fn test_parse_rejects_truncated_and_foreign_data() {
        let mut parser = Avs2Parser::new();
        assert!(parser.parse_sequence_header(&[0x00, 0x00, 0x01]).is_err());
        assert!(parser
            .parse_sequence_header(&[0x00, 0x00, 0x01, 0xB3, 0xFF])
            .is_err());

        let truncated = &build_header(0x20, 1920, 1080, 1, None, 3, true)[..8];
        assert!(parser.parse_sequence_header(truncated).is_err());
    }

    #[test]
    fn test_detect_avs2() {
        let mut data = vec![0xFF; 16];
        data.extend(build_header(0x20, 640, 480, 1, None, 2, true));
        assert!(detect_avs2(&data));
        assert!(!detect_avs2(&[0x00, 0x00, 0x00, 0x00]));
        assert!(!detect_avs2(&[]));
    }

    #[test]
    fn test_extract_sequence_header() {
        let header = build_header(0x20, 640, 480, 1, None, 2, true);
        let mut stream = vec![0xAA, 0xBB];
        stream.extend(&header);
        stream.extend([0x00, 0x00, 0x01, 0xB3, 0x12, 0x34]);

        let unit = extract_sequence_header(&stream).unwrap();
        assert_eq!(unit, &header[..]);

        // Without a following unit the header runs to the end.
        let alone = extract_sequence_header(&header).unwrap();
        assert_eq!(alone, &header[..]);

        assert!(extract_sequence_header(&[0x00, 0x00, 0x01, 0xB3]).is_none());
    }

    #[test]
    fn test_stream_info_probe() {
        let mut data = vec![0x11, 0x22, 0x33];
        data.extend(build_header(0x20, 1280, 720, 1, None, 6, true));

        let info = stream_info(&data).unwrap();
        assert_eq!(info.width, 1280);
        assert_eq!(info.height, 720);
        assert_eq!(info.pixel_format, PixelFormat::Yuv420p);
        assert_eq!(info.frame_rate, Rational::new(50, 1));
        assert!(!info.low_delay);

        assert!(stream_info(&[0x00; 32]).is_err());
    }

    #[test]
    fn test_frame_rate_fallback() {
        assert_eq!(frame_rate_from_code(3, 0.0), Rational::new(25, 1));
        assert_eq!(frame_rate_from_code(15, 23.976), Rational::new(2997, 125));
        assert_eq!(frame_rate_from_code(0, 0.0), Rational::ZERO);
    }

    #[test]
    fn test_parser_reset() {
        let data = build_header(0x20, 640, 480, 1, None, 2, true);
        let mut parser = Avs2Parser::new();
        parser.parse_sequence_header(&data).unwrap();
        assert!(parser.stream_info().is_some());

        parser.reset();
        assert!(parser.sequence_header().is_none());
        assert!(parser.stream_info().is_none());
    }
}
