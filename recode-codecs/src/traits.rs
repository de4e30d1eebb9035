//! Common codec traits.
//!
//! This module defines the core traits implemented by every video codec
//! adapter:
//!
//! - [`VideoDecoder`] / [`VideoEncoder`] - Video codec traits
//! - [`VideoDecoderExt`] / [`VideoEncoderExt`] - Extension traits for buffer reuse
//!
//! # Buffer Reuse
//!
//! The `*Ext` traits provide `decode_into`, `encode_into` and `flush_into`
//! methods that write to pre-allocated buffers instead of allocating new
//! vectors. This reduces allocator pressure in hot transcoding loops.
//!
//! ```ignore
//! let mut frames = Vec::new();
//!
//! for packet in packets {
//!     decoder.decode_into(&packet, &mut frames)?;
//!     for frame in frames.drain(..) {
//!         process(frame);
//!     }
//! }
//! ```

use recode_core::{Frame, Packet, Result};

/// Information about a codec.
#[derive(Debug, Clone)]
pub struct CodecInfo {
    /// Codec name.
    pub name: &'static str,
    /// Long name/description.
    pub long_name: &'static str,
    /// Whether this codec supports encoding.
    pub can_encode: bool,
    /// Whether this codec supports decoding.
    pub can_decode: bool,
}

/// Common trait for video decoders.
pub trait VideoDecoder: Send {
    /// Get codec information.
    fn codec_info(&self) -> CodecInfo;

    /// Decode a packet into frames.
    ///
    /// May return zero or more frames depending on how much the codec
    /// buffers internally. An empty packet signals end of stream and
    /// drains the reorder queue.
    fn decode(&mut self, packet: &Packet<'_>) -> Result<Vec<Frame>>;

    /// Flush the decoder, returning any buffered frames.
    fn flush(&mut self) -> Result<Vec<Frame>>;

    /// Reset the decoder state.
    fn reset(&mut self);
}

/// Common trait for video encoders.
pub trait VideoEncoder: Send {
    /// Get codec information.
    fn codec_info(&self) -> CodecInfo;

    /// Encode a frame into packets.
    ///
    /// Codecs with lookahead may return nothing for the first several
    /// frames and release them later from [`VideoEncoder::flush`].
    fn encode(&mut self, frame: &Frame) -> Result<Vec<Packet<'static>>>;

    /// Flush the encoder, returning any buffered packets.
    fn flush(&mut self) -> Result<Vec<Packet<'static>>>;

    /// Reset the encoder state.
    fn reset(&mut self);

    /// Get the codec-specific configuration data (e.g., sequence header).
    fn extra_data(&self) -> Option<&[u8]>;
}

/// Extension trait for video decoders with buffer reuse.
///
/// This trait provides `decode_into` and `flush_into` methods that write to
/// pre-allocated buffers, reducing allocation overhead in hot loops.
///
/// Default implementations are provided that delegate to the base trait methods,
/// but implementors can override them for better performance.
pub trait VideoDecoderExt: VideoDecoder {
    /// Decode a packet into a pre-allocated frame buffer.
    ///
    /// The output buffer is cleared before decoding. This method is more efficient
    /// than [`VideoDecoder::decode`] when decoding multiple packets in a loop.
    ///
    /// # Arguments
    ///
    /// * `packet` - The packet to decode
    /// * `out` - Output buffer for decoded frames (will be cleared)
    fn decode_into(&mut self, packet: &Packet<'_>, out: &mut Vec<Frame>) -> Result<()> {
        out.clear();
        let frames = self.decode(packet)?;
        out.extend(frames);
        Ok(())
    }

    /// Flush decoder into a pre-allocated frame buffer.
    ///
    /// The output buffer is cleared before flushing.
    ///
    /// # Arguments
    ///
    /// * `out` - Output buffer for flushed frames (will be cleared)
    fn flush_into(&mut self, out: &mut Vec<Frame>) -> Result<()> {
        out.clear();
        let frames = self.flush()?;
        out.extend(frames);
        Ok(())
    }
}

// Blanket implementation for all VideoDecoder types
impl<T: VideoDecoder + ?Sized> VideoDecoderExt for T {}

/// Extension trait for video encoders with buffer reuse.
///
/// This trait provides `encode_into` and `flush_into` methods that write to
/// pre-allocated buffers, reducing allocation overhead in hot loops.
pub trait VideoEncoderExt: VideoEncoder {
    /// Encode a frame into a pre-allocated packet buffer.
    ///
    /// The output buffer is cleared before encoding.
    ///
    /// # Arguments
    ///
    /// * `frame` - The frame to encode
    /// * `out` - Output buffer for encoded packets (will be cleared)
    fn encode_into(&mut self, frame: &Frame, out: &mut Vec<Packet<'static>>) -> Result<()> {
        out.clear();
        let packets = self.encode(frame)?;
        out.extend(packets);
        Ok(())
    }

    /// Flush encoder into a pre-allocated packet buffer.
    ///
    /// The output buffer is cleared before flushing.
    ///
    /// # Arguments
    ///
    /// * `out` - Output buffer for flushed packets (will be cleared)
    fn flush_into(&mut self, out: &mut Vec<Packet<'static>>) -> Result<()> {
        out.clear();
        let packets = self.flush()?;
        out.extend(packets);
        Ok(())
    }
}

// Blanket implementation for all VideoEncoder types
impl<T: VideoEncoder + ?Sized> VideoEncoderExt for T {}
