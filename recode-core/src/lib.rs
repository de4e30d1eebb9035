//! # recode-core
//!
//! Core types for the recode codec libraries.
//!
//! This crate provides the building blocks shared by the codec adapter
//! crates:
//! - Error handling types
//! - Bitstream reading/writing utilities
//! - Planar video frame buffers with aligned strides
//! - Packet and timestamp management
//! - Exact rational arithmetic for frame rates and time bases

pub mod bitstream;
pub mod error;
pub mod format;
pub mod frame;
pub mod packet;
pub mod rational;
pub mod timestamp;

pub use bitstream::{BitReader, BitWriter};
pub use error::{Error, Result};
pub use format::VideoCodec;
pub use frame::{Frame, FrameBuffer, FrameFlags, PixelFormat};
pub use packet::{OwnedPacket, Packet, PacketFlags};
pub use rational::Rational;
pub use timestamp::{Duration, TimeBase, Timestamp};
