//! Video frame buffers.
//!
//! Frames hold planar YUV pixel data with per-plane strides. Strides are
//! aligned, so code exchanging pixels with external codec libraries must copy
//! row by row rather than assume tightly packed planes.

use crate::timestamp::{Duration, TimeBase, Timestamp};
use bitflags::bitflags;
use std::fmt;

/// Pixel format for video frames.
///
/// Only planar YUV layouts are represented; 10-bit formats store one sample
/// per little-endian u16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 8-bit.
    Yuv420p,
    /// Planar YUV 4:2:2, 8-bit.
    Yuv422p,
    /// Planar YUV 4:4:4, 8-bit.
    Yuv444p,
    /// Planar YUV 4:2:0, 10-bit little-endian.
    Yuv420p10le,
    /// Planar YUV 4:2:2, 10-bit little-endian.
    Yuv422p10le,
    /// Planar YUV 4:4:4, 10-bit little-endian.
    Yuv444p10le,
}

impl PixelFormat {
    /// Get the number of planes for this pixel format.
    pub fn num_planes(&self) -> usize {
        3
    }

    /// Check if this is a 10-bit format.
    pub fn is_10bit(&self) -> bool {
        matches!(
            self,
            Self::Yuv420p10le | Self::Yuv422p10le | Self::Yuv444p10le
        )
    }

    /// Bit depth of one sample (8 or 10).
    pub fn bit_depth(&self) -> u32 {
        if self.is_10bit() {
            10
        } else {
            8
        }
    }

    /// Bytes used to store one sample (1 or 2).
    pub fn bytes_per_sample(&self) -> usize {
        if self.is_10bit() {
            2
        } else {
            1
        }
    }

    /// Get chroma subsampling factors (horizontal, vertical).
    pub fn chroma_subsampling(&self) -> (u32, u32) {
        match self {
            Self::Yuv420p | Self::Yuv420p10le => (2, 2),
            Self::Yuv422p | Self::Yuv422p10le => (2, 1),
            Self::Yuv444p | Self::Yuv444p10le => (1, 1),
        }
    }

    /// Dimensions of a plane in samples for the given frame dimensions.
    pub fn plane_dimensions(&self, plane: usize, width: u32, height: u32) -> (usize, usize) {
        if plane == 0 {
            (width as usize, height as usize)
        } else {
            let (hsub, vsub) = self.chroma_subsampling();
            (
                width as usize / hsub as usize,
                height as usize / vsub as usize,
            )
        }
    }

    /// Tightly packed size of a plane in bytes for the given frame dimensions.
    pub fn plane_size(&self, plane: usize, width: u32, height: u32) -> usize {
        let (w, h) = self.plane_dimensions(plane, width, height);
        w * h * self.bytes_per_sample()
    }

    /// The matching format at the other bit depth.
    pub fn with_bit_depth(&self, bit_depth: u32) -> PixelFormat {
        match (self, bit_depth) {
            (Self::Yuv420p | Self::Yuv420p10le, 10) => Self::Yuv420p10le,
            (Self::Yuv420p | Self::Yuv420p10le, _) => Self::Yuv420p,
            (Self::Yuv422p | Self::Yuv422p10le, 10) => Self::Yuv422p10le,
            (Self::Yuv422p | Self::Yuv422p10le, _) => Self::Yuv422p,
            (Self::Yuv444p | Self::Yuv444p10le, 10) => Self::Yuv444p10le,
            (Self::Yuv444p | Self::Yuv444p10le, _) => Self::Yuv444p,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yuv420p => write!(f, "yuv420p"),
            Self::Yuv422p => write!(f, "yuv422p"),
            Self::Yuv444p => write!(f, "yuv444p"),
            Self::Yuv420p10le => write!(f, "yuv420p10le"),
            Self::Yuv422p10le => write!(f, "yuv422p10le"),
            Self::Yuv444p10le => write!(f, "yuv444p10le"),
        }
    }
}

bitflags! {
    /// Frame flags indicating frame properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FrameFlags: u32 {
        /// This is a keyframe (I-frame).
        const KEYFRAME = 0x0001;
        /// Frame is corrupted or incomplete.
        const CORRUPT = 0x0002;
        /// Interlaced frame.
        const INTERLACED = 0x0004;
        /// Top field first (for interlaced content).
        const TOP_FIELD_FIRST = 0x0008;
    }
}

impl Default for FrameFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A decoded or pre-encode video frame.
#[derive(Clone)]
pub struct Frame {
    /// Frame pixel data.
    buffer: FrameBuffer,
    /// Presentation timestamp.
    pub pts: Timestamp,
    /// Decode timestamp.
    pub dts: Timestamp,
    /// Frame duration.
    pub duration: Duration,
    /// Frame flags.
    pub flags: FrameFlags,
    /// Picture order count (display order within the coded sequence).
    pub poc: i32,
}

impl Frame {
    /// Create a new zero-filled frame.
    pub fn new(width: u32, height: u32, format: PixelFormat, time_base: TimeBase) -> Self {
        Self {
            buffer: FrameBuffer::new(width, height, format),
            pts: Timestamp::new(Timestamp::NONE, time_base),
            dts: Timestamp::new(Timestamp::NONE, time_base),
            duration: Duration::new(0, time_base),
            flags: FrameFlags::empty(),
            poc: 0,
        }
    }

    /// Create a frame from an existing buffer.
    pub fn from_buffer(buffer: FrameBuffer) -> Self {
        Self {
            buffer,
            pts: Timestamp::none(),
            dts: Timestamp::none(),
            duration: Duration::zero(),
            flags: FrameFlags::empty(),
            poc: 0,
        }
    }

    /// Get the frame width in pixels.
    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    /// Get the frame height in pixels.
    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    /// Get the pixel format.
    pub fn format(&self) -> PixelFormat {
        self.buffer.format
    }

    /// Check if this is a keyframe.
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(FrameFlags::KEYFRAME)
    }

    /// Get the frame buffer.
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Get a mutable reference to the frame buffer.
    pub fn buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.buffer
    }

    /// Get a plane's data.
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.buffer.plane(index)
    }

    /// Get a mutable reference to a plane's data.
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        self.buffer.plane_mut(index)
    }

    /// Get the stride (bytes per row) for a plane.
    pub fn stride(&self, plane: usize) -> usize {
        self.buffer.stride(plane)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.format())
            .field("pts", &self.pts)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Owned storage for one frame's pixel planes.
#[derive(Clone)]
pub struct FrameBuffer {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: PixelFormat,
    /// Plane data.
    planes: Vec<PlaneData>,
}

#[derive(Clone)]
struct PlaneData {
    data: Vec<u8>,
    stride: usize,
}

/// Stride alignment in bytes for allocated planes.
pub const STRIDE_ALIGN: usize = 32;

impl FrameBuffer {
    /// Create a new zero-filled frame buffer with aligned strides.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let mut planes = Vec::with_capacity(format.num_planes());

        for plane in 0..format.num_planes() {
            let (plane_width, plane_height) = format.plane_dimensions(plane, width, height);
            let row_bytes = plane_width * format.bytes_per_sample();
            let stride = (row_bytes + STRIDE_ALIGN - 1) & !(STRIDE_ALIGN - 1);

            planes.push(PlaneData {
                data: vec![0u8; stride * plane_height],
                stride,
            });
        }

        Self {
            width,
            height,
            format,
            planes,
        }
    }

    /// Get the number of planes.
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    /// Get a plane's data.
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(|p| p.data.as_slice())
    }

    /// Get a mutable reference to a plane's data.
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        self.planes.get_mut(index).map(|p| p.data.as_mut_slice())
    }

    /// Get the stride for a plane (0 for an out-of-range index).
    pub fn stride(&self, plane: usize) -> usize {
        self.planes.get(plane).map(|p| p.stride).unwrap_or(0)
    }

    /// Get the total size of all planes in bytes.
    pub fn total_size(&self) -> usize {
        self.planes.iter().map(|p| p.data.len()).sum()
    }

    /// Fill all planes with a value.
    pub fn fill(&mut self, value: u8) {
        for plane in &mut self.planes {
            plane.data.fill(value);
        }
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("planes", &self.planes.len())
            .finish()
    }
}
