//! # recode-avs2
//!
//! AVS2 (AVS2-P2, IEEE 1857.4) codec support backed by the xavs2
//! encoder and davs2 decoder libraries.
//!
//! This crate provides:
//! - Native elementary stream parsing and sequence header extraction
//! - Stream metadata derivation (resolution, bit depth, frame rate)
//! - Adapters exposing xavs2/davs2 through the [`recode_codecs`] traits
//!
//! For actual encoding and decoding, enable the `ffi-xavs2` and/or
//! `ffi-davs2` features and have the corresponding development
//! libraries installed. Without them the adapters still construct,
//! validate settings and parse headers, but frame-level calls fail
//! with [`Avs2Error::FfiNotAvailable`].
//!
//! ## Features
//!
//! - Parse AVS2 elementary stream headers without native libraries
//! - Marshal typed encoder settings into xavs2 option strings
//! - Bridge frame buffers across stride and bit-depth conventions
//! - Publish registry descriptors for host-side codec discovery
//!
//! ## Example
//!
//! ```rust
//! use recode_avs2::Avs2Parser;
//!
//! // Parse an AVS2 video elementary stream
//! let data = vec![0x00, 0x00, 0x01, 0xB0 /* ... sequence header data ... */];
//! let mut parser = Avs2Parser::new();
//!
//! if let Ok(seq) = parser.parse_sequence_header(&data) {
//!     println!("Resolution: {}x{}", seq.horizontal_size, seq.vertical_size);
//!     println!("Frame rate: {:.3} fps", seq.frame_rate());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoder;
pub mod encoder;
#[cfg(any(feature = "ffi-xavs2", feature = "ffi-davs2"))]
pub mod ffi;
pub mod parser;
pub mod picture;
pub mod settings;
pub mod types;

pub use decoder::{Davs2Decoder, Davs2DecoderStats, DecoderSettings};
pub use encoder::{Xavs2Encoder, Xavs2EncoderStats};
pub use parser::{detect_avs2, extract_sequence_header, Avs2Parser};
pub use settings::{EncoderPreset, EncoderSettings};
pub use types::*;

use recode_codecs::{CodecCapabilities, CodecDescriptor, CodecKind};
use recode_core::{PixelFormat, VideoCodec};
use thiserror::Error;

/// AVS2 codec error types.
#[derive(Error, Debug)]
pub enum Avs2Error {
    /// Invalid sequence header.
    #[error("Invalid sequence header: {0}")]
    InvalidSequenceHeader(String),

    /// Encoder settings rejected before reaching the library.
    #[error("Invalid encoder settings: {0}")]
    InvalidSettings(String),

    /// Pixel format not handled by the AVS2 libraries.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedPixelFormat(PixelFormat),

    /// A native library call returned an error code.
    #[error("{call} failed with code {code}")]
    Backend {
        /// The library entry point that failed.
        call: &'static str,
        /// The code it returned.
        code: i32,
    },

    /// Encoding error.
    #[error("Encoding error: {0}")]
    EncoderError(String),

    /// Decoding error.
    #[error("Decoding error: {0}")]
    DecoderError(String),

    /// The encoder was flushed and cannot accept more frames.
    #[error("Encoder is flushed; reset it before encoding more frames")]
    Flushed,

    /// FFI not available.
    #[error("FFI support not enabled - enable the '{0}' feature for native codec access")]
    FfiNotAvailable(&'static str),

    /// Error from the shared core types.
    #[error("Core error: {0}")]
    Core(#[from] recode_core::Error),
}

/// Result type for AVS2 operations.
pub type Result<T> = std::result::Result<T, Avs2Error>;

impl From<Avs2Error> for recode_core::Error {
    fn from(err: Avs2Error) -> Self {
        use recode_core::error::CodecError;

        match err {
            Avs2Error::Core(inner) => inner,
            Avs2Error::UnsupportedPixelFormat(format) => {
                CodecError::UnsupportedPixelFormat(format.to_string()).into()
            }
            Avs2Error::Backend { call, code } => CodecError::Backend {
                code,
                message: call.to_string(),
            }
            .into(),
            Avs2Error::InvalidSettings(message) => CodecError::EncoderConfig(message).into(),
            Avs2Error::FfiNotAvailable(feature) => recode_core::Error::Unsupported(format!(
                "native codec support requires the '{}' feature",
                feature
            )),
            other => CodecError::Other(other.to_string()).into(),
        }
    }
}

/// Sequence header start code.
pub const SEQUENCE_HEADER_CODE: u8 = 0xB0;

/// Sequence end code.
pub const SEQUENCE_END_CODE: u8 = 0xB1;

/// User data start code.
pub const USER_DATA_CODE: u8 = 0xB2;

/// Intra picture start code.
pub const INTRA_PICTURE_CODE: u8 = 0xB3;

/// Extension start code.
pub const EXTENSION_START_CODE: u8 = 0xB5;

/// Inter picture start code.
pub const INTER_PICTURE_CODE: u8 = 0xB6;

/// Video edit code.
pub const VIDEO_EDIT_CODE: u8 = 0xB7;

/// Slice start code range minimum.
pub const SLICE_START_CODE_MIN: u8 = 0x00;
/// Slice start code range maximum.
pub const SLICE_START_CODE_MAX: u8 = 0xAF;

/// Maximum frame width accepted by the encoder.
pub const MAX_WIDTH: u32 = 8192;

/// Maximum frame height accepted by the encoder.
pub const MAX_HEIGHT: u32 = 4608;

/// Frames the encoder may hold back beyond its input queue; flushing
/// drains this many extra times before giving up.
pub const DELAY_FRAMES: u32 = 8;

/// Check if xavs2 encoder support is compiled in.
pub fn is_encoder_available() -> bool {
    cfg!(feature = "ffi-xavs2")
}

/// Check if davs2 decoder support is compiled in.
pub fn is_decoder_available() -> bool {
    cfg!(feature = "ffi-davs2")
}

/// Registry descriptor for the xavs2 encoder adapter.
pub fn encoder_descriptor() -> CodecDescriptor {
    CodecDescriptor {
        name: "xavs2",
        long_name: "xavs2 AVS2-P2/IEEE1857.4 encoder",
        codec: VideoCodec::Avs2,
        kind: CodecKind::Encoder,
        capabilities: CodecCapabilities::DELAY | CodecCapabilities::AUTO_THREADS,
        pixel_formats: &[PixelFormat::Yuv420p, PixelFormat::Yuv420p10le],
    }
}

/// Registry descriptor for the davs2 decoder adapter.
pub fn decoder_descriptor() -> CodecDescriptor {
    CodecDescriptor {
        name: "davs2",
        long_name: "davs2 AVS2-P2/IEEE1857.4 decoder",
        codec: VideoCodec::Avs2,
        kind: CodecKind::Decoder,
        capabilities: CodecCapabilities::DELAY,
        pixel_formats: &[PixelFormat::Yuv420p, PixelFormat::Yuv420p10le],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_codes() {
        assert_eq!(SEQUENCE_HEADER_CODE, 0xB0);
        assert_eq!(INTRA_PICTURE_CODE, 0xB3);
        assert_eq!(INTER_PICTURE_CODE, 0xB6);
    }

    #[test]
    fn test_ffi_availability() {
        #[cfg(not(feature = "ffi-xavs2"))]
        assert!(!is_encoder_available());
        #[cfg(not(feature = "ffi-davs2"))]
        assert!(!is_decoder_available());
    }

    #[test]
    fn test_descriptors() {
        let enc = encoder_descriptor();
        assert_eq!(enc.name, "xavs2");
        assert_eq!(enc.codec, VideoCodec::Avs2);
        assert_eq!(enc.kind, CodecKind::Encoder);
        assert!(enc.capabilities.contains(CodecCapabilities::DELAY));

        let dec = decoder_descriptor();
        assert_eq!(dec.name, "davs2");
        assert_eq!(dec.kind, CodecKind::Decoder);
        assert!(dec.supports_pixel_format(PixelFormat::Yuv420p10le));
        assert!(!dec.supports_pixel_format(PixelFormat::Yuv444p));
    }

    #[test]
    fn test_error_display() {
        let err = Avs2Error::InvalidSettings("width must be non-zero".into());
        assert_eq!(
            err.to_string(),
            "Invalid encoder settings: width must be non-zero"
        );

        let err = Avs2Error::Backend {
            call: "encoder_encode",
            code: -1,
        };
        assert_eq!(err.to_string(), "encoder_encode failed with code -1");
    }

    #[test]
    fn test_error_conversion_to_core() {
        use recode_core::error::CodecError;

        let err: recode_core::Error = Avs2Error::FfiNotAvailable("ffi-xavs2").into();
        assert!(matches!(err, recode_core::Error::Unsupported(_)));

        let err: recode_core::Error = Avs2Error::Backend {
            call: "davs2_decoder_send_packet",
            code: -1,
        }
        .into();
        assert!(matches!(
            err,
            recode_core::Error::Codec(CodecError::Backend { code: -1, .. })
        ));

        let err: recode_core::Error =
            Avs2Error::UnsupportedPixelFormat(PixelFormat::Yuv444p).into();
        assert!(matches!(
            err,
            recode_core::Error::Codec(CodecError::UnsupportedPixelFormat(_))
        ));
    }
}
