//! xavs2 encoder adapter.

use std::fmt;

use tracing::warn;

use recode_codecs::{CodecInfo, VideoEncoder};
use recode_core::{Frame, OwnedPacket, Packet, TimeBase};

use crate::settings::EncoderSettings;
use crate::{Avs2Error, Result};

#[cfg(feature = "ffi-xavs2")]
use tracing::info;

#[cfg(feature = "ffi-xavs2")]
use crate::ffi::{self, EncodeStep};
#[cfg(feature = "ffi-xavs2")]
use crate::parser;
#[cfg(feature = "ffi-xavs2")]
use crate::DELAY_FRAMES;

/// Encoder statistics.
#[derive(Debug, Clone, Default)]
pub struct Xavs2EncoderStats {
    /// Frames submitted.
    pub frames_in: u64,
    /// Packets produced.
    pub packets_out: u64,
    /// Payload bytes produced.
    pub bytes_out: u64,
    /// Keyframe packets produced.
    pub keyframes: u64,
}

/// AVS2 encoder backed by the xavs2 library.
///
/// Without the `ffi-xavs2` feature the encoder still constructs and
/// validates its settings, but every encode call fails.
pub struct Xavs2Encoder {
    /// Validated configuration.
    settings: EncoderSettings,
    /// Native encoder (when available).
    #[cfg(feature = "ffi-xavs2")]
    backend: Option<ffi::XavsEncoder>,
    /// Time base output timestamps are expressed in.
    time_base: TimeBase,
    /// Sequence header harvested from the first packets.
    extra_data: Option<Vec<u8>>,
    /// Running statistics.
    stats: Xavs2EncoderStats,
    /// Set once the flush sequence has run.
    finished: bool,
}

impl fmt::Debug for Xavs2Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Xavs2Encoder");
        s.field("settings", &self.settings);
        s.field("time_base", &self.time_base);
        s.field("stats", &self.stats);
        s.field("finished", &self.finished);
        #[cfg(feature = "ffi-xavs2")]
        s.field("backend", &self.backend.is_some());
        s.finish_non_exhaustive()
    }
}

impl Xavs2Encoder {
    /// Create a new encoder.
    pub fn new(settings: EncoderSettings) -> Result<Self> {
        settings.validate()?;

        #[cfg(feature = "ffi-xavs2")]
        {
            let backend = ffi::XavsEncoder::open(&settings)?;
            info!(
                width = settings.width,
                height = settings.height,
                pixel_format = %settings.pixel_format,
                preset = settings.preset.to_level(),
                internal_bit_depth = backend.internal_bit_depth(),
                "xavs2 encoder created"
            );

            Ok(Self {
                settings,
                backend: Some(backend),
                time_base: TimeBase::default(),
                extra_data: None,
                stats: Xavs2EncoderStats::default(),
                finished: false,
            })
        }

        #[cfg(not(feature = "ffi-xavs2"))]
        {
            warn!("xavs2 support not compiled in; encode calls will fail");
            Ok(Self {
                settings,
                time_base: TimeBase::default(),
                extra_data: None,
                stats: Xavs2EncoderStats::default(),
                finished: false,
            })
        }
    }

    /// Encode one frame.
    ///
    /// Returns zero or one packets; the encoder buffers several frames
    /// of lookahead which [`Xavs2Encoder::flush`] releases.
    pub fn encode_frame(&mut self, frame: &Frame) -> Result<Vec<OwnedPacket>> {
        if self.finished {
            return Err(Avs2Error::Flushed);
        }
        if frame.format() != self.settings.pixel_format {
            return Err(Avs2Error::UnsupportedPixelFormat(frame.format()));
        }
        if frame.width() != self.settings.width || frame.height() != self.settings.height {
            return Err(Avs2Error::EncoderError(format!(
                "frame size {}x{} does not match configured {}x{}",
                frame.width(),
                frame.height(),
                self.settings.width,
                self.settings.height
            )));
        }

        // Output timestamps stay in the unit the input arrived in.
        if frame.pts.is_valid() {
            self.time_base = frame.pts.time_base;
        }

        #[cfg(feature = "ffi-xavs2")]
        {
            let time_base = self.time_base;
            let backend = self.backend.as_mut().ok_or_else(|| {
                Avs2Error::EncoderError("encoder backend is not initialized".into())
            })?;

            self.stats.frames_in += 1;
            match backend.encode(Some(frame), time_base)? {
                EncodeStep::Packet(packet) => {
                    self.note_packet(&packet);
                    Ok(vec![packet])
                }
                EncodeStep::NoOutput | EncodeStep::FlushEnd => Ok(Vec::new()),
            }
        }

        #[cfg(not(feature = "ffi-xavs2"))]
        {
            Err(Avs2Error::FfiNotAvailable("ffi-xavs2"))
        }
    }

    /// Drain the lookahead queue and end the stream.
    ///
    /// Idempotent: a second flush returns no packets. Further encode
    /// calls fail until [`Xavs2Encoder::reset`].
    pub fn flush(&mut self) -> Result<Vec<OwnedPacket>> {
        if self.finished {
            return Ok(Vec::new());
        }
        self.finished = true;

        #[cfg(feature = "ffi-xavs2")]
        {
            let time_base = self.time_base;
            let pending = self.stats.frames_in.saturating_sub(self.stats.packets_out);

            let mut packets = Vec::new();
            if let Some(backend) = self.backend.as_mut() {
                // The drain is bounded: everything still queued plus the
                // library's own lookahead depth.
                for _ in 0..pending + u64::from(DELAY_FRAMES) {
                    match backend.encode(None, time_base)? {
                        EncodeStep::Packet(packet) => packets.push(packet),
                        EncodeStep::NoOutput => continue,
                        EncodeStep::FlushEnd => break,
                    }
                }
            }

            for packet in &packets {
                self.note_packet(packet);
            }
            Ok(packets)
        }

        #[cfg(not(feature = "ffi-xavs2"))]
        {
            // Nothing was ever queued without a backend.
            Ok(Vec::new())
        }
    }

    /// Discard all state and recreate the native encoder.
    pub fn reset(&mut self) {
        self.stats = Xavs2EncoderStats::default();
        self.extra_data = None;
        self.time_base = TimeBase::default();
        self.finished = false;

        #[cfg(feature = "ffi-xavs2")]
        {
            // A drained xavs2 instance cannot be restarted.
            self.backend = None;
            match ffi::XavsEncoder::open(&self.settings) {
                Ok(backend) => self.backend = Some(backend),
                Err(error) => {
                    warn!(%error, "Failed to recreate xavs2 encoder on reset");
                }
            }
        }
    }

    /// Get the encoder configuration.
    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Get encoder statistics.
    pub fn stats(&self) -> Xavs2EncoderStats {
        self.stats.clone()
    }

    /// Check if the encoder has been flushed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[cfg(feature = "ffi-xavs2")]
    fn note_packet(&mut self, packet: &OwnedPacket) {
        self.stats.packets_out += 1;
        self.stats.bytes_out += packet.size() as u64;
        if packet.is_keyframe() {
            self.stats.keyframes += 1;
        }
        // The first coded packets carry the sequence header; keep it
        // around for container initialization.
        if self.extra_data.is_none() {
            if let Some(unit) = parser::extract_sequence_header(packet.data()) {
                self.extra_data = Some(unit.to_vec());
            }
        }
    }
}

impl VideoEncoder for Xavs2Encoder {
    fn codec_info(&self) -> CodecInfo {
        CodecInfo {
            name: "xavs2",
            long_name: "xavs2 AVS2-P2/IEEE1857.4 encoder",
            can_encode: true,
            can_decode: false,
        }
    }

    fn encode(&mut self, frame: &Frame) -> recode_core::Result<Vec<Packet<'static>>> {
        Ok(self.encode_frame(frame)?)
    }

    fn flush(&mut self) -> recode_core::Result<Vec<Packet<'static>>> {
        Ok(Xavs2Encoder::flush(self)?)
    }

    fn reset(&mut self) {
        Xavs2Encoder::reset(self);
    }

    fn extra_data(&self) -> Option<&[u8]> {
        self.extra_data.as_deref()
    }
}
