//! Error types shared across the recode crates.
//!
//! The top-level [`Error`] aggregates the codec and bitstream sub-taxonomies so
//! adapter crates can surface their failures through one type.

use thiserror::Error;

/// Main error type for the recode libraries.
#[derive(Error, Debug)]
pub enum Error {
    /// Codec errors (encoding/decoding).
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Bitstream parsing errors.
    #[error("Bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid parameter provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unsupported feature or format.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// End of stream reached.
    #[error("End of stream")]
    EndOfStream,

    /// Buffer too small for the requested operation.
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Codec errors.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Encoder or decoder handle was not created yet.
    #[error("Codec not initialized")]
    NotInitialized,

    /// Encoder configuration rejected.
    #[error("Encoder configuration error: {0}")]
    EncoderConfig(String),

    /// Decoder configuration rejected.
    #[error("Decoder configuration error: {0}")]
    DecoderConfig(String),

    /// Pixel format not accepted by this codec.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    /// Frame dimensions exceed codec limits.
    #[error("Frame dimensions {width}x{height} exceed maximum {max_width}x{max_height}")]
    DimensionsExceeded {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    /// The external codec library reported a failure.
    #[error("Codec backend failed ({code}): {message}")]
    Backend { code: i32, message: String },

    /// Generic codec error message.
    #[error("{0}")]
    Other(String),
}

impl From<String> for CodecError {
    fn from(s: String) -> Self {
        CodecError::Other(s)
    }
}

impl From<&str> for CodecError {
    fn from(s: &str) -> Self {
        CodecError::Other(s.to_string())
    }
}

/// Bitstream parsing errors.
#[derive(Error, Debug)]
pub enum BitstreamError {
    /// Unexpected end of bitstream.
    #[error("Unexpected end of bitstream")]
    UnexpectedEnd,

    /// Invalid start code.
    #[error("Invalid start code at offset {offset}")]
    InvalidStartCode { offset: u64 },

    /// Invalid syntax element value.
    #[error("Invalid syntax element: {element} = {value}")]
    InvalidSyntax { element: String, value: i64 },

    /// A marker bit that must be 1 was 0.
    #[error("Marker bit not set at bit position {position}")]
    InvalidMarker { position: usize },

    /// Generic bitstream error message.
    #[error("{0}")]
    Other(String),
}

impl From<String> for BitstreamError {
    fn from(s: String) -> Self {
        BitstreamError::Other(s)
    }
}

impl From<&str> for BitstreamError {
    fn from(s: &str) -> Self {
        BitstreamError::Other(s.to_string())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Check if this is an end-of-stream error.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::EndOfStream)
    }

    /// Check if this error is recoverable (processing may continue).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Bitstream(BitstreamError::InvalidSyntax { .. })
                | Error::Bitstream(BitstreamError::InvalidMarker { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidParameter("width".into());
        assert_eq!(err.to_string(), "Invalid parameter: width");
    }

    #[test]
    fn test_codec_error_conversion() {
        let codec_err = CodecError::NotInitialized;
        let err: Error = codec_err.into();
        assert!(matches!(err, Error::Codec(CodecError::NotInitialized)));
    }

    #[test]
    fn test_backend_error_display() {
        let err = Error::Codec(CodecError::Backend {
            code: -1,
            message: "send_packet failed".into(),
        });
        assert_eq!(
            err.to_string(),
            "Codec error: Codec backend failed (-1): send_packet failed"
        );
    }

    #[test]
    fn test_is_eof() {
        assert!(Error::EndOfStream.is_eof());
        assert!(!Error::Config("x".into()).is_eof());
    }

    #[test]
    fn test_is_recoverable() {
        let recoverable = Error::Bitstream(BitstreamError::InvalidMarker { position: 41 });
        assert!(recoverable.is_recoverable());
        assert!(!Error::EndOfStream.is_recoverable());
    }
}
