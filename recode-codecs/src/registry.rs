//! Codec descriptor registry.
//!
//! A [`CodecDescriptor`] is the static metadata a codec adapter publishes
//! about itself: its registered name, the compressed format it handles,
//! its capability flags, and the pixel formats it accepts or produces.
//! Hosts query the [`CodecRegistry`] by name or by format to pick an
//! implementation without linking against it directly.

use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;
use serde::{Serialize, Serializer};
use tracing::info;

use recode_core::{PixelFormat, VideoCodec};

bitflags! {
    /// Capability flags a codec declares at registration time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CodecCapabilities: u32 {
        /// The codec buffers input and releases output with a delay;
        /// callers must drain it with an end-of-stream signal.
        const DELAY = 1 << 0;
        /// The codec picks its own thread count when none is configured.
        const AUTO_THREADS = 1 << 1;
        /// The codec is backed by a hardware device.
        const HARDWARE = 1 << 2;
    }
}

impl Default for CodecCapabilities {
    fn default() -> Self {
        CodecCapabilities::empty()
    }
}

/// Whether a descriptor names an encoder or a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// Compresses frames into packets.
    Encoder,
    /// Decompresses packets into frames.
    Decoder,
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecKind::Encoder => write!(f, "encoder"),
            CodecKind::Decoder => write!(f, "decoder"),
        }
    }
}

/// Static metadata describing one registered codec implementation.
#[derive(Debug, Clone, Serialize)]
pub struct CodecDescriptor {
    /// Short name the codec is registered under (e.g. `"xavs2"`).
    pub name: &'static str,
    /// Human-readable description.
    pub long_name: &'static str,
    /// The compressed format this codec reads or writes.
    #[serde(serialize_with = "serialize_codec")]
    pub codec: VideoCodec,
    /// Encoder or decoder.
    pub kind: CodecKind,
    /// Capability flags.
    #[serde(serialize_with = "serialize_capabilities")]
    pub capabilities: CodecCapabilities,
    /// Pixel formats accepted (encoder) or produced (decoder).
    #[serde(serialize_with = "serialize_pixel_formats")]
    pub pixel_formats: &'static [PixelFormat],
}

impl CodecDescriptor {
    /// Whether this codec handles the given pixel format.
    pub fn supports_pixel_format(&self, format: PixelFormat) -> bool {
        self.pixel_formats.contains(&format)
    }
}

fn serialize_codec<S: Serializer>(codec: &VideoCodec, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(codec.name())
}

fn serialize_capabilities<S: Serializer>(
    caps: &CodecCapabilities,
    s: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;
    let mut seq = s.serialize_seq(Some(caps.iter_names().count()))?;
    for (name, _) in caps.iter_names() {
        seq.serialize_element(name)?;
    }
    seq.end()
}

fn serialize_pixel_formats<S: Serializer>(
    formats: &&'static [PixelFormat],
    s: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;
    let mut seq = s.serialize_seq(Some(formats.len()))?;
    for format in formats.iter() {
        seq.serialize_element(&format.to_string())?;
    }
    seq.end()
}

/// Errors returned by [`CodecRegistry`] operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A codec of this kind is already registered under the name.
    #[error("{kind} '{name}' is already registered")]
    AlreadyRegistered {
        /// The conflicting name.
        name: String,
        /// Encoder or decoder namespace the conflict occurred in.
        kind: CodecKind,
    },

    /// No codec of this kind is registered under the name.
    #[error("no registered {kind} named '{name}'")]
    NotFound {
        /// The name that was looked up.
        name: String,
        /// Encoder or decoder namespace that was searched.
        kind: CodecKind,
    },
}

/// Central registry of codec descriptors.
///
/// Encoders and decoders live in separate namespaces, so an encoder and a
/// decoder may share a name without conflict.
pub struct CodecRegistry {
    encoders: HashMap<String, CodecDescriptor>,
    decoders: HashMap<String, CodecDescriptor>,
}

impl CodecRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            encoders: HashMap::new(),
            decoders: HashMap::new(),
        }
    }

    /// Register a codec by its descriptor.
    ///
    /// Returns an error if a codec of the same kind already claimed the name.
    pub fn register(&mut self, descriptor: CodecDescriptor) -> Result<(), RegistryError> {
        let table = match descriptor.kind {
            CodecKind::Encoder => &mut self.encoders,
            CodecKind::Decoder => &mut self.decoders,
        };

        if table.contains_key(descriptor.name) {
            return Err(RegistryError::AlreadyRegistered {
                name: descriptor.name.to_string(),
                kind: descriptor.kind,
            });
        }

        info!(
            name = %descriptor.name,
            codec = %descriptor.codec,
            kind = %descriptor.kind,
            "Codec registered"
        );

        table.insert(descriptor.name.to_string(), descriptor);
        Ok(())
    }

    /// Unregister a codec by name and kind.
    pub fn unregister(&mut self, name: &str, kind: CodecKind) -> Result<(), RegistryError> {
        let table = match kind {
            CodecKind::Encoder => &mut self.encoders,
            CodecKind::Decoder => &mut self.decoders,
        };
        table.remove(name).ok_or_else(|| RegistryError::NotFound {
            name: name.into(),
            kind,
        })?;
        Ok(())
    }

    /// Look up an encoder descriptor by name.
    pub fn find_encoder(&self, name: &str) -> Option<&CodecDescriptor> {
        self.encoders.get(name)
    }

    /// Look up a decoder descriptor by name.
    pub fn find_decoder(&self, name: &str) -> Option<&CodecDescriptor> {
        self.decoders.get(name)
    }

    /// List every encoder registered for a compressed format.
    pub fn encoders_for(&self, codec: VideoCodec) -> Vec<&CodecDescriptor> {
        self.encoders
            .values()
            .filter(|d| d.codec == codec)
            .collect()
    }

    /// List every decoder registered for a compressed format.
    pub fn decoders_for(&self, codec: VideoCodec) -> Vec<&CodecDescriptor> {
        self.decoders
            .values()
            .filter(|d| d.codec == codec)
            .collect()
    }

    /// List all registered descriptors, encoders first.
    pub fn list_all(&self) -> Vec<&CodecDescriptor> {
        self.encoders
            .values()
            .chain(self.decoders.values())
            .collect()
    }

    /// Return the count of registered codecs of both kinds.
    pub fn count(&self) -> usize {
        self.encoders.len() + self.decoders.len()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}
