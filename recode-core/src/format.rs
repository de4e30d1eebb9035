//! Codec identifiers.

use std::fmt;

/// Video codec identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum VideoCodec {
    /// H.264 / AVC.
    H264,
    /// H.265 / HEVC.
    H265,
    /// AV1.
    Av1,
    /// AVS2 (AVS2-P2, IEEE 1857.4).
    Avs2,
    /// MPEG-2 Video.
    Mpeg2,
}

impl VideoCodec {
    /// Four-character code used in container sample entries.
    pub fn fourcc(&self) -> [u8; 4] {
        match self {
            Self::H264 => *b"avc1",
            Self::H265 => *b"hvc1",
            Self::Av1 => *b"av01",
            Self::Avs2 => *b"avs2",
            Self::Mpeg2 => *b"mp2v",
        }
    }

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::H265 => "hevc",
            Self::Av1 => "av1",
            Self::Avs2 => "avs2",
            Self::Mpeg2 => "mpeg2video",
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
