//! davs2 decoder adapter.

use std::fmt;

use tracing::{info, warn};

use recode_codecs::{CodecInfo, VideoDecoder};
use recode_core::{Frame, Packet, TimeBase};

use crate::parser::Avs2Parser;
use crate::types::StreamInfo;
use crate::{Avs2Error, Result};

#[cfg(feature = "ffi-davs2")]
use crate::ffi::{self, DecodeStep};

/// davs2 decoder configuration.
#[derive(Debug, Clone)]
pub struct DecoderSettings {
    /// Worker thread count (0 = library default).
    pub threads: u32,
}

impl DecoderSettings {
    /// Create settings with the library defaults.
    pub fn new() -> Self {
        Self { threads: 0 }
    }

    /// Set the worker thread count.
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoder statistics.
#[derive(Debug, Clone, Default)]
pub struct Davs2DecoderStats {
    /// Packets submitted.
    pub packets_in: u64,
    /// Frames decoded.
    pub frames_out: u64,
    /// Sequence headers reported by the library.
    pub headers: u64,
}

/// AVS2 decoder backed by the davs2 library.
///
/// Stream parameters are tracked from two sources: sequence headers the
/// library reports and headers parsed directly out of incoming packets.
/// The latter keeps [`Davs2Decoder::stream_info`] useful even without
/// the `ffi-davs2` feature.
pub struct Davs2Decoder {
    /// Configuration.
    settings: DecoderSettings,
    /// Elementary stream parser for header probing.
    parser: Avs2Parser,
    /// Last known stream parameters.
    info: Option<StreamInfo>,
    /// Time base output timestamps are expressed in.
    time_base: TimeBase,
    /// Native decoder (when available).
    #[cfg(feature = "ffi-davs2")]
    backend: Option<ffi::DavsDecoder>,
    /// Running statistics.
    stats: Davs2DecoderStats,
}

impl fmt::Debug for Davs2Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Davs2Decoder");
        s.field("settings", &self.settings);
        s.field("info", &self.info);
        s.field("time_base", &self.time_base);
        s.field("stats", &self.stats);
        #[cfg(feature = "ffi-davs2")]
        s.field("backend", &self.backend.is_some());
        s.finish_non_exhaustive()
    }
}

impl Davs2Decoder {
    /// Create a new decoder.
    pub fn new(settings: DecoderSettings) -> Result<Self> {
        #[cfg(feature = "ffi-davs2")]
        {
            let backend = ffi::DavsDecoder::open(&settings)?;
            info!(threads = settings.threads, "davs2 decoder created");

            Ok(Self {
                settings,
                parser: Avs2Parser::new(),
                info: None,
                time_base: TimeBase::default(),
                backend: Some(backend),
                stats: Davs2DecoderStats::default(),
            })
        }

        #[cfg(not(feature = "ffi-davs2"))]
        {
            warn!("davs2 support not compiled in; decode calls will fail");
            Ok(Self {
                settings,
                parser: Avs2Parser::new(),
                info: None,
                time_base: TimeBase::default(),
                stats: Davs2DecoderStats::default(),
            })
        }
    }

    /// Decode one packet.
    ///
    /// Returns zero or one frames; an empty packet signals end of
    /// stream and drains the reorder queue.
    pub fn decode_packet(&mut self, packet: &Packet<'_>) -> Result<Vec<Frame>> {
        if packet.is_empty() {
            return self.drain();
        }

        self.stats.packets_in += 1;
        if packet.pts.is_valid() {
            self.time_base = packet.pts.time_base;
        }

        // Track stream parameters even when the native decoder is
        // absent or has not reported a header yet.
        if self.info.is_none() {
            self.probe_packet(packet.data());
        }

        #[cfg(feature = "ffi-davs2")]
        {
            let time_base = self.time_base;
            let backend = self.backend.as_mut().ok_or_else(|| {
                Avs2Error::DecoderError("decoder backend is not initialized".into())
            })?;

            match backend.decode(
                packet.data(),
                packet.pts.value,
                packet.dts.value,
                time_base,
            )? {
                DecodeStep::Frame(frame) => {
                    self.stats.frames_out += 1;
                    Ok(vec![frame])
                }
                DecodeStep::Header(header) => {
                    self.stats.headers += 1;
                    self.info = Some(header);
                    Ok(Vec::new())
                }
                DecodeStep::Pending | DecodeStep::End => Ok(Vec::new()),
            }
        }

        #[cfg(not(feature = "ffi-davs2"))]
        {
            Err(Avs2Error::FfiNotAvailable("ffi-davs2"))
        }
    }

    /// Drain buffered frames out of the decoder.
    pub fn drain(&mut self) -> Result<Vec<Frame>> {
        #[cfg(feature = "ffi-davs2")]
        {
            let time_base = self.time_base;
            let mut frames = Vec::new();

            if let Some(backend) = self.backend.as_mut() {
                loop {
                    match backend.flush_step(time_base)? {
                        DecodeStep::Frame(frame) => frames.push(frame),
                        DecodeStep::Header(header) => {
                            self.stats.headers += 1;
                            self.info = Some(header);
                        }
                        DecodeStep::Pending | DecodeStep::End => break,
                    }
                }
            }

            self.stats.frames_out += frames.len() as u64;
            Ok(frames)
        }

        #[cfg(not(feature = "ffi-davs2"))]
        {
            // Nothing was ever queued without a backend.
            Ok(Vec::new())
        }
    }

    /// Discard all state and recreate the native decoder.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.info = None;
        self.stats = Davs2DecoderStats::default();
        self.time_base = TimeBase::default();

        #[cfg(feature = "ffi-davs2")]
        {
            self.backend = None;
            match ffi::DavsDecoder::open(&self.settings) {
                Ok(backend) => self.backend = Some(backend),
                Err(error) => {
                    warn!(%error, "Failed to recreate davs2 decoder on reset");
                }
            }
        }
    }

    /// Last known stream parameters, from the library or from headers
    /// parsed out of the packet stream.
    pub fn stream_info(&self) -> Option<&StreamInfo> {
        self.info.as_ref()
    }

    /// Get the decoder configuration.
    pub fn settings(&self) -> &DecoderSettings {
        &self.settings
    }

    /// Get decoder statistics.
    pub fn stats(&self) -> Davs2DecoderStats {
        self.stats.clone()
    }

    fn probe_packet(&mut self, data: &[u8]) {
        if let Some(pos) = self.parser.find_sequence_header(data) {
            if self.parser.parse_sequence_header(&data[pos..]).is_ok() {
                if let Some(info) = self.parser.stream_info() {
                    self.info = Some(info);
                }
            }
        }
    }
}

impl Drop for Davs2Decoder {
    fn drop(&mut self) {
        info!(
            packets = self.stats.packets_in,
            frames = self.stats.frames_out,
            "davs2 decoder closed"
        );
    }
}

impl VideoDecoder for Davs2Decoder {
    fn codec_info(&self) -> CodecInfo {
        CodecInfo {
            name: "davs2",
            long_name: "davs2 AVS2-P2/IEEE1857.4 decoder",
            can_encode: false,
            can_decode: true,
        }
    }

    fn decode(&mut self, packet: &Packet<'_>) -> recode_core::Result<Vec<Frame>> {
        Ok(self.decode_packet(packet)?)
    }

    fn flush(&mut self) -> recode_core::Result<Vec<Frame>> {
        Ok(self.drain()?)
    }

    fn reset(&mut self) {
        Davs2Decoder::reset(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recode_core::bitstream::BitWriter;
    use recode_core::PixelFormat;

    // A minimal 1280x720 25fps main-profile sequence header.
    fn sequence_header_bytes() -> Vec<u8> {
        let mut w = BitWriter::new();
        w.write_bits(0x20, 8); // profile
        w.write_bits(0x42, 8); // level
        w.write_bit(true); // progressive_sequence
        w.write_bit(false); // field_coded_sequence
        w.write_bits(1280, 14);
        w.write_bits(720, 14);
        w.write_bits(1, 2); // chroma 4:2:0
        w.write_bits(1, 3); // 8-bit samples
        w.write_bits(1, 4); // square aspect
        w.write_bits(3, 4); // 25 fps
        w.write_bits(12500, 18);
        w.write_marker();
        w.write_bits(0, 12);
        w.write_bit(false); // low_delay
        w.align_to_byte();

        let mut data = vec![0x00, 0x00, 0x01, 0xB0];
        data.extend(w.into_bytes());
        data
    }

    #[test]
    fn test_default_settings() {
        let settings = DecoderSettings::default();
        assert_eq!(settings.threads, 0);
        assert_eq!(DecoderSettings::new().with_threads(4).threads, 4);
    }

    #[test]
    #[cfg(not(feature = "ffi-davs2"))]
    fn test_constructs_without_ffi() {
        let decoder = Davs2Decoder::new(DecoderSettings::default()).unwrap();
        assert!(decoder.stream_info().is_none());
    }

    #[test]
    #[cfg(not(feature = "ffi-davs2"))]
    fn test_probes_headers_even_without_ffi() {
        let mut decoder = Davs2Decoder::new(DecoderSettings::default()).unwrap();
        let packet = Packet::new(sequence_header_bytes());

        // The decode itself fails, but the header was still parsed.
        assert!(matches!(
            decoder.decode_packet(&packet),
            Err(Avs2Error::FfiNotAvailable(_))
        ));

        let info = decoder.stream_info().unwrap();
        assert_eq!(info.width, 1280);
        assert_eq!(info.height, 720);
        assert_eq!(info.pixel_format, PixelFormat::Yuv420p);
    }

    #[test]
    #[cfg(not(feature = "ffi-davs2"))]
    fn test_empty_packet_drains_cleanly() {
        let mut decoder = Davs2Decoder::new(DecoderSettings::default()).unwrap();
        let frames = decoder.decode_packet(&Packet::empty()).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    #[cfg(not(feature = "ffi-davs2"))]
    fn test_reset_clears_stream_info() {
        let mut decoder = Davs2Decoder::new(DecoderSettings::default()).unwrap();
        let packet = Packet::new(sequence_header_bytes());
        let _ = decoder.decode_packet(&packet);
        assert!(decoder.stream_info().is_some());

        Davs2Decoder::reset(&mut decoder);
        assert!(decoder.stream_info().is_none());
        assert_eq!(decoder.stats().packets_in, 0);
    }
}
