//! AVS2 data types.

use std::fmt;

use recode_core::{PixelFormat, Rational};

/// AVS2 frame rate code, as carried in the sequence header.
///
/// Codes 1..=8 are the rates the xavs2 encoder accepts; codes 9..=13
/// appear in the standard and are recognized when parsing streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameRateCode {
    /// Forbidden (0).
    Forbidden = 0,
    /// 23.976 fps (24000/1001).
    Fps23_976 = 1,
    /// 24 fps.
    Fps24 = 2,
    /// 25 fps.
    Fps25 = 3,
    /// 29.97 fps (30000/1001).
    Fps29_97 = 4,
    /// 30 fps.
    Fps30 = 5,
    /// 50 fps.
    Fps50 = 6,
    /// 59.94 fps (60000/1001).
    Fps59_94 = 7,
    /// 60 fps.
    Fps60 = 8,
    /// 100 fps.
    Fps100 = 9,
    /// 120 fps.
    Fps120 = 10,
    /// 200 fps.
    Fps200 = 11,
    /// 240 fps.
    Fps240 = 12,
    /// 300 fps.
    Fps300 = 13,
}

/// The codes the encoder is allowed to marshal, in ascending rate order.
const ENCODER_CODES: [FrameRateCode; 8] = [
    FrameRateCode::Fps23_976,
    FrameRateCode::Fps24,
    FrameRateCode::Fps25,
    FrameRateCode::Fps29_97,
    FrameRateCode::Fps30,
    FrameRateCode::Fps50,
    FrameRateCode::Fps59_94,
    FrameRateCode::Fps60,
];

impl FrameRateCode {
    /// Parse from code value.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => FrameRateCode::Fps23_976,
            2 => FrameRateCode::Fps24,
            3 => FrameRateCode::Fps25,
            4 => FrameRateCode::Fps29_97,
            5 => FrameRateCode::Fps30,
            6 => FrameRateCode::Fps50,
            7 => FrameRateCode::Fps59_94,
            8 => FrameRateCode::Fps60,
            9 => FrameRateCode::Fps100,
            10 => FrameRateCode::Fps120,
            11 => FrameRateCode::Fps200,
            12 => FrameRateCode::Fps240,
            13 => FrameRateCode::Fps300,
            _ => FrameRateCode::Forbidden,
        }
    }

    /// The raw 4-bit code value.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Get frame rate as fraction (num, den).
    pub fn fraction(self) -> (u32, u32) {
        match self {
            FrameRateCode::Forbidden => (0, 1),
            FrameRateCode::Fps23_976 => (24000, 1001),
            FrameRateCode::Fps24 => (24, 1),
            FrameRateCode::Fps25 => (25, 1),
            FrameRateCode::Fps29_97 => (30000, 1001),
            FrameRateCode::Fps30 => (30, 1),
            FrameRateCode::Fps50 => (50, 1),
            FrameRateCode::Fps59_94 => (60000, 1001),
            FrameRateCode::Fps60 => (60, 1),
            FrameRateCode::Fps100 => (100, 1),
            FrameRateCode::Fps120 => (120, 1),
            FrameRateCode::Fps200 => (200, 1),
            FrameRateCode::Fps240 => (240, 1),
            FrameRateCode::Fps300 => (300, 1),
        }
    }

    /// Get the frame rate as an exact rational.
    pub fn rational(self) -> Rational {
        let (num, den) = self.fraction();
        Rational::new(num as i64, den as i64)
    }

    /// Get the frame rate in fps.
    pub fn fps(self) -> f64 {
        self.rational().to_f64()
    }

    /// Pick the code the encoder marshals for a configured rate.
    ///
    /// Chooses the first encoder-supported code whose rate is greater
    /// than or equal to `rate`, comparing exact rationals. Rates above
    /// 60 fps saturate to code 8.
    pub fn for_rate(rate: Rational) -> Self {
        for code in ENCODER_CODES {
            if rate <= code.rational() {
                return code;
            }
        }
        FrameRateCode::Fps60
    }
}

impl fmt::Display for FrameRateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} fps", self.fps())
    }
}

/// AVS2 profile identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Main Picture profile (0x12), intra-only.
    MainPicture,
    /// Main profile (0x20), 8-bit.
    Main,
    /// Main-10 profile (0x22), up to 10-bit.
    Main10,
    /// Unknown profile.
    Unknown(u8),
}

impl Profile {
    /// Parse from profile_id.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x12 => Profile::MainPicture,
            0x20 => Profile::Main,
            0x22 => Profile::Main10,
            _ => Profile::Unknown(code),
        }
    }

    /// Convert to profile_id.
    pub fn code(&self) -> u8 {
        match self {
            Profile::MainPicture => 0x12,
            Profile::Main => 0x20,
            Profile::Main10 => 0x22,
            Profile::Unknown(code) => *code,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::MainPicture => write!(f, "Main Picture"),
            Profile::Main => write!(f, "Main"),
            Profile::Main10 => write!(f, "Main-10"),
            Profile::Unknown(code) => write!(f, "Unknown({:#04x})", code),
        }
    }
}

/// Chroma format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChromaFormat {
    /// 4:2:0 chroma subsampling.
    Yuv420 = 1,
    /// 4:2:2 chroma subsampling.
    Yuv422 = 2,
}

impl ChromaFormat {
    /// Parse from code value (0 and 3 are reserved).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ChromaFormat::Yuv420),
            2 => Some(ChromaFormat::Yuv422),
            _ => None,
        }
    }
}

impl fmt::Display for ChromaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChromaFormat::Yuv420 => write!(f, "4:2:0"),
            ChromaFormat::Yuv422 => write!(f, "4:2:2"),
        }
    }
}

/// Aspect ratio code from the sequence header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AspectRatio {
    /// Forbidden (0).
    Forbidden = 0,
    /// Square samples (1:1).
    Square = 1,
    /// 4:3 display.
    Dar4_3 = 2,
    /// 16:9 display.
    Dar16_9 = 3,
    /// 2.21:1 display.
    Dar221_100 = 4,
}

impl AspectRatio {
    /// Parse from code value.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => AspectRatio::Square,
            2 => AspectRatio::Dar4_3,
            3 => AspectRatio::Dar16_9,
            4 => AspectRatio::Dar221_100,
            _ => AspectRatio::Forbidden,
        }
    }

    /// Get the ratio as (width, height).
    pub fn ratio(&self) -> (u16, u16) {
        match self {
            AspectRatio::Forbidden => (0, 0),
            AspectRatio::Square => (1, 1),
            AspectRatio::Dar4_3 => (4, 3),
            AspectRatio::Dar16_9 => (16, 9),
            AspectRatio::Dar221_100 => (221, 100),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Forbidden => write!(f, "Forbidden"),
            AspectRatio::Square => write!(f, "1:1"),
            AspectRatio::Dar4_3 => write!(f, "4:3"),
            AspectRatio::Dar16_9 => write!(f, "16:9"),
            AspectRatio::Dar221_100 => write!(f, "2.21:1"),
        }
    }
}

/// Picture type as reported by the davs2 decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PictureType {
    /// Intra picture.
    I = 0,
    /// Forward-predicted picture.
    P = 1,
    /// Bidirectionally predicted picture.
    B = 2,
    /// Background (G) picture, intra-coded.
    G = 3,
    /// Multi-hypothesis forward (F) picture.
    F = 4,
    /// Scene (S) picture, predicted from the background.
    S = 5,
}

impl PictureType {
    /// Parse from the decoder's type code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(PictureType::I),
            1 => Some(PictureType::P),
            2 => Some(PictureType::B),
            3 => Some(PictureType::G),
            4 => Some(PictureType::F),
            5 => Some(PictureType::S),
            _ => None,
        }
    }

    /// Whether this picture is intra-coded (a stream entry point).
    pub fn is_intra(&self) -> bool {
        matches!(self, PictureType::I | PictureType::G)
    }
}

impl fmt::Display for PictureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PictureType::I => write!(f, "I"),
            PictureType::P => write!(f, "P"),
            PictureType::B => write!(f, "B"),
            PictureType::G => write!(f, "G"),
            PictureType::F => write!(f, "F"),
            PictureType::S => write!(f, "S"),
        }
    }
}

/// AVS2 sequence header information.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceHeader {
    /// Profile identifier.
    pub profile: Profile,
    /// Level identifier.
    pub level_id: u8,
    /// Progressive sequence flag.
    pub progressive_sequence: bool,
    /// Field coded sequence flag.
    pub field_coded_sequence: bool,
    /// Horizontal size in samples (14 bits).
    pub horizontal_size: u16,
    /// Vertical size in samples (14 bits).
    pub vertical_size: u16,
    /// Chroma format.
    pub chroma_format: ChromaFormat,
    /// Sample precision code (bit depth = 6 + 2 * code).
    pub sample_precision: u8,
    /// Encoding precision code, present only in the Main-10 profile.
    pub encoding_precision: Option<u8>,
    /// Aspect ratio code.
    pub aspect_ratio: AspectRatio,
    /// Frame rate code.
    pub frame_rate_code: FrameRateCode,
    /// Lower 18 bits of the bit rate (units of 400 bps).
    pub bit_rate_lower: u32,
    /// Upper 12 bits of the bit rate (units of 400 bps).
    pub bit_rate_upper: u16,
    /// Low delay flag (no picture reordering).
    pub low_delay: bool,
}

impl SequenceHeader {
    /// Coded bit depth: 6 + 2 * precision code, from the encoding
    /// precision when present, else the sample precision.
    pub fn bit_depth(&self) -> u8 {
        let code = self.encoding_precision.unwrap_or(self.sample_precision);
        6 + 2 * code
    }

    /// Frame dimensions as (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.horizontal_size as u32, self.vertical_size as u32)
    }

    /// Bit rate in bits per second (the two halves are in 400 bps units).
    pub fn bit_rate_bps(&self) -> u64 {
        (((self.bit_rate_upper as u64) << 18) | self.bit_rate_lower as u64) * 400
    }

    /// Frame rate in fps.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate_code.fps()
    }

    /// The host pixel format this stream decodes to, if representable.
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        let base = match self.chroma_format {
            ChromaFormat::Yuv420 => PixelFormat::Yuv420p,
            ChromaFormat::Yuv422 => PixelFormat::Yuv422p,
        };
        match self.bit_depth() {
            8 => Some(base),
            10 => Some(base.with_bit_depth(10)),
            _ => None,
        }
    }
}

/// Properties of an AVS2 stream, from a sequence header or the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    /// Frame width in samples.
    pub width: u32,
    /// Frame height in samples.
    pub height: u32,
    /// Pixel format of decoded output.
    pub pixel_format: PixelFormat,
    /// Frame rate.
    pub frame_rate: Rational,
    /// Bit rate in bits per second (0 if unknown).
    pub bit_rate: u64,
    /// Low delay flag (no picture reordering).
    pub low_delay: bool,
}

impl StreamInfo {
    /// Size of one uncompressed frame in bytes.
    pub fn frame_size(&self) -> usize {
        (0..self.pixel_format.num_planes())
            .map(|p| self.pixel_format.plane_size(p, self.width, self.height))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rate_code_values() {
        assert_eq!(FrameRateCode::Fps25.fraction(), (25, 1));
        assert!((FrameRateCode::Fps29_97.fps() - 29.97).abs() < 0.01);
        assert_eq!(FrameRateCode::from_code(9), FrameRateCode::Fps100);
        assert_eq!(FrameRateCode::from_code(14), FrameRateCode::Forbidden);
        assert_eq!(FrameRateCode::Fps59_94.code(), 7);
    }

    #[test]
    fn test_frame_rate_code_selection() {
        assert_eq!(
            FrameRateCode::for_rate(Rational::new(25, 1)),
            FrameRateCode::Fps25
        );
        assert_eq!(
            FrameRateCode::for_rate(Rational::new(24000, 1001)),
            FrameRateCode::Fps23_976
        );
        assert_eq!(
            FrameRateCode::for_rate(Rational::new(30000, 1001)),
            FrameRateCode::Fps29_97
        );
        // Between table entries: first code at or above the rate.
        assert_eq!(
            FrameRateCode::for_rate(Rational::new(26, 1)),
            FrameRateCode::Fps29_97
        );
        // Above the encoder table saturates to 60.
        assert_eq!(
            FrameRateCode::for_rate(Rational::new(120, 1)),
            FrameRateCode::Fps60
        );
    }

    #[test]
    fn test_profile_codes() {
        assert_eq!(Profile::from_code(0x20), Profile::Main);
        assert_eq!(Profile::from_code(0x22), Profile::Main10);
        assert_eq!(Profile::from_code(0x12), Profile::MainPicture);
        assert_eq!(Profile::Unknown(0x30).code(), 0x30);
    }

    #[test]
    fn test_picture_type() {
        assert!(PictureType::I.is_intra());
        assert!(PictureType::G.is_intra());
        assert!(!PictureType::B.is_intra());
        assert_eq!(PictureType::from_code(4), Some(PictureType::F));
        assert_eq!(PictureType::from_code(9), None);
    }

    #[test]
    fn test_sequence_header_derived_values() {
        let header = SequenceHeader {
            profile: Profile::Main10,
            level_id: 0x22,
            progressive_sequence: true,
            field_coded_sequence: false,
            horizontal_size: 1920,
            vertical_size: 1080,
            chroma_format: ChromaFormat::Yuv420,
            sample_precision: 1,
            encoding_precision: Some(2),
            aspect_ratio: AspectRatio::Dar16_9,
            frame_rate_code: FrameRateCode::Fps25,
            bit_rate_lower: 12500,
            bit_rate_upper: 0,
            low_delay: false,
        };

        assert_eq!(header.bit_depth(), 10);
        assert_eq!(header.dimensions(), (1920, 1080));
        assert_eq!(header.bit_rate_bps(), 12500 * 400);
        assert_eq!(header.pixel_format(), Some(PixelFormat::Yuv420p10le));
    }

    #[test]
    fn test_stream_info_frame_size() {
        let info = StreamInfo {
            width: 64,
            height: 48,
            pixel_format: PixelFormat::Yuv420p,
            frame_rate: Rational::new(25, 1),
            bit_rate: 0,
            low_delay: false,
        };
        // 4:2:0 at 8 bits: w*h*3/2.
        assert_eq!(info.frame_size(), 64 * 48 * 3 / 2);

        let info10 = StreamInfo {
            pixel_format: PixelFormat::Yuv420p10le,
            ..info
        };
        assert_eq!(info10.frame_size(), 64 * 48 * 3);
    }
}
