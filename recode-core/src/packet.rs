//! Packets of encoded bitstream data.

use crate::timestamp::{Duration, Timestamp};
use bitflags::bitflags;
use std::borrow::Cow;
use std::fmt;

bitflags! {
    /// Flags for packet properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PacketFlags: u32 {
        /// This packet contains a keyframe.
        const KEYFRAME = 0x0001;
        /// Packet data is corrupted.
        const CORRUPT = 0x0002;
    }
}

/// An encoded media packet.
///
/// Packets either own their payload or borrow it zero-copy; encoders hand out
/// owned packets because the backing library buffer is released immediately
/// after the encode call returns.
#[derive(Clone)]
pub struct Packet<'a> {
    /// The packet payload.
    data: Cow<'a, [u8]>,
    /// Presentation timestamp.
    pub pts: Timestamp,
    /// Decode timestamp.
    pub dts: Timestamp,
    /// Duration of the packet.
    pub duration: Duration,
    /// Packet flags.
    pub flags: PacketFlags,
}

impl<'a> Packet<'a> {
    /// Create a new packet with owned data.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Cow::Owned(data),
            pts: Timestamp::none(),
            dts: Timestamp::none(),
            duration: Duration::zero(),
            flags: PacketFlags::empty(),
        }
    }

    /// Create a new packet borrowing external data.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            pts: Timestamp::none(),
            dts: Timestamp::none(),
            duration: Duration::zero(),
            flags: PacketFlags::empty(),
        }
    }

    /// Create an empty packet.
    ///
    /// Feeding an empty packet to a decoder signals end of stream.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Get the packet payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if this packet is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if this is a keyframe packet.
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(PacketFlags::KEYFRAME)
    }

    /// Set the keyframe flag.
    pub fn set_keyframe(&mut self, keyframe: bool) {
        if keyframe {
            self.flags.insert(PacketFlags::KEYFRAME);
        } else {
            self.flags.remove(PacketFlags::KEYFRAME);
        }
    }

    /// Make the packet own its payload.
    pub fn into_owned(self) -> Packet<'static> {
        Packet {
            data: Cow::Owned(self.data.into_owned()),
            pts: self.pts,
            dts: self.dts,
            duration: self.duration,
            flags: self.flags,
        }
    }

    /// Builder-style timestamp assignment.
    pub fn with_timestamps(mut self, pts: Timestamp, dts: Timestamp) -> Self {
        self.pts = pts;
        self.dts = dts;
        self
    }

    /// Builder-style flag assignment.
    pub fn with_flags(mut self, flags: PacketFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl fmt::Debug for Packet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("size", &self.size())
            .field("pts", &self.pts)
            .field("dts", &self.dts)
            .field("flags", &self.flags)
            .finish()
    }
}

impl Default for Packet<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

/// An owned packet suitable for storage across calls.
pub type OwnedPacket = Packet<'static>;
