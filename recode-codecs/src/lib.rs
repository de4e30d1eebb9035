//! # Recode Codecs
//!
//! Codec traits and registration metadata for the Recode media library.
//!
//! Concrete codec adapters live in their own crates (for example
//! `recode-avs2`); this crate defines the surface they all share.
//!
//! ## Trait System
//!
//! All codecs implement a common trait interface for uniform access:
//!
//! - [`VideoDecoder`] - Common interface for all video decoders
//! - [`VideoEncoder`] - Common interface for all video encoders
//! - [`CodecInfo`] - Metadata about codec capabilities
//!
//! This allows pipeline code to work generically with any codec without
//! knowing the specific implementation details.
//!
//! ## Registration
//!
//! Codec adapters publish a [`CodecDescriptor`] so hosts can discover them
//! through a [`CodecRegistry`] by name or by compressed format, the same
//! way a plugin loader would:
//!
//! ```
//! use recode_codecs::{CodecKind, CodecRegistry};
//!
//! let mut registry = CodecRegistry::new();
//! # let descriptor = recode_codecs::CodecDescriptor {
//! #     name: "xavs2",
//! #     long_name: "xavs2 AVS2-P2/IEEE1857.4 encoder",
//! #     codec: recode_core::VideoCodec::Avs2,
//! #     kind: CodecKind::Encoder,
//! #     capabilities: recode_codecs::CodecCapabilities::DELAY,
//! #     pixel_formats: &[recode_core::PixelFormat::Yuv420p],
//! # };
//! registry.register(descriptor)?;
//! assert!(registry.find_encoder("xavs2").is_some());
//! # Ok::<(), recode_codecs::RegistryError>(())
//! ```

pub mod registry;
pub mod traits;

pub use registry::{
    CodecCapabilities, CodecDescriptor, CodecKind, CodecRegistry, RegistryError,
};
pub use traits::{CodecInfo, VideoDecoder, VideoDecoderExt, VideoEncoder, VideoEncoderExt};
