//! FFI bindings and safe wrappers for the xavs2 and davs2 libraries.
//!
//! xavs2 exposes its whole API as a function-pointer table selected by
//! input bit depth; davs2 exports plain functions. Both hand out buffers
//! that only live until the next call into the library, so everything
//! crossing this boundary is copied before it is released.
//!
//! # Safety
//!
//! All library calls are inherently unsafe. This module wraps them in
//! safe interfaces that release native handles on drop and never let a
//! library-owned pointer escape.
//!
//! # Requirements
//!
//! - xavs2 development libraries and the `ffi-xavs2` feature for encoding
//! - davs2 development libraries and the `ffi-davs2` feature for decoding

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]

use std::os::raw::c_int;
use std::ptr;

use recode_core::{Frame, TimeBase, Timestamp};

use crate::picture;
use crate::{Avs2Error, Result};

#[cfg(feature = "ffi-xavs2")]
use std::ffi::CString;
#[cfg(feature = "ffi-xavs2")]
use std::os::raw::c_char;

#[cfg(feature = "ffi-xavs2")]
use recode_core::{OwnedPacket, Packet};
#[cfg(feature = "ffi-xavs2")]
use tracing::{debug, warn};

#[cfg(feature = "ffi-xavs2")]
use crate::settings::{parse_extra_params, EncoderSettings};

#[cfg(feature = "ffi-davs2")]
use recode_core::{FrameFlags, PixelFormat};

#[cfg(feature = "ffi-davs2")]
use crate::decoder::DecoderSettings;
#[cfg(feature = "ffi-davs2")]
use crate::parser;
#[cfg(feature = "ffi-davs2")]
use crate::types::{PictureType, StreamInfo};

// xavs2 type definitions, mirrored from xavs2.h.
#[cfg(feature = "ffi-xavs2")]
mod xavs2_sys {
    use std::os::raw::{c_char, c_int, c_void};

    pub const XAVS2_TYPE_AUTO: c_int = 0;
    pub const XAVS2_TYPE_IDR: c_int = 1;
    pub const XAVS2_TYPE_I: c_int = 2;

    pub const XAVS2_STATE_NO_DATA: c_int = 0;
    pub const XAVS2_STATE_ENCODED: c_int = 1;
    pub const XAVS2_STATE_FLUSH_END: c_int = 9;

    #[repr(C)]
    pub struct xavs2_image_t {
        /// Bytes per input sample (1 or 2).
        pub in_sample_size: c_int,
        /// Bytes per sample in the encoder's buffers (1 or 2).
        pub enc_sample_size: c_int,
        pub i_csp: c_int,
        /// Plane widths in samples.
        pub i_width: [c_int; 3],
        /// Plane heights in rows.
        pub i_lines: [c_int; 3],
        /// Plane strides in bytes.
        pub i_stride: [c_int; 3],
        pub img_planes: [*mut u8; 4],
    }

    #[repr(C)]
    pub struct xavs2_picture_t {
        pub img: xavs2_image_t,
        pub i_state: c_int,
        pub i_type: c_int,
        pub i_qpplus1: c_int,
        pub b_keyframe: c_int,
        pub i_pts: i64,
        pub i_dts: i64,
        pub priv_data: *mut c_void,
        // Reserve space so newer library builds writing extra fields
        // stay inside our allocation.
        pub _reserved: [u8; 256],
    }

    #[repr(C)]
    pub struct xavs2_outpacket_t {
        pub private_data: *mut c_void,
        pub stream: *const u8,
        pub len: c_int,
        pub state: c_int,
        pub r#type: c_int,
        pub pts: i64,
        pub dts: i64,
        pub opaque: *mut c_void,
        pub _reserved: [u8; 256],
    }

    /// The per-bit-depth API table returned by `xavs2_api_get`.
    #[repr(C)]
    pub struct xavs2_api_t {
        pub s_version_source: [c_char; 64],
        pub version_build: c_int,
        pub internal_bit_depth: c_int,
        pub opt_alloc: Option<unsafe extern "C" fn() -> *mut c_void>,
        pub opt_set2: Option<
            unsafe extern "C" fn(
                param: *mut c_void,
                name: *const c_char,
                value: *const c_char,
            ) -> c_int,
        >,
        pub opt_get:
            Option<unsafe extern "C" fn(param: *mut c_void, name: *const c_char) -> *const c_char>,
        pub opt_destroy: Option<unsafe extern "C" fn(param: *mut c_void)>,
        pub encoder_create: Option<unsafe extern "C" fn(param: *mut c_void) -> *mut c_void>,
        pub encoder_destroy: Option<unsafe extern "C" fn(encoder: *mut c_void)>,
        pub encoder_get_buffer:
            Option<unsafe extern "C" fn(encoder: *mut c_void, pic: *mut xavs2_picture_t) -> c_int>,
        pub encoder_encode: Option<
            unsafe extern "C" fn(
                encoder: *mut c_void,
                pic: *mut xavs2_picture_t,
                packet: *mut xavs2_outpacket_t,
            ) -> c_int,
        >,
        pub encoder_packet_unref:
            Option<unsafe extern "C" fn(encoder: *mut c_void, packet: *mut xavs2_outpacket_t)>,
    }

    extern "C" {
        pub fn xavs2_api_get(bit_depth: c_int) -> *const xavs2_api_t;
    }
}

// davs2 type definitions, mirrored from davs2.h.
#[cfg(feature = "ffi-davs2")]
mod davs2_sys {
    use std::os::raw::{c_int, c_void};

    pub const DAVS2_ERROR: c_int = -1;
    pub const DAVS2_DEFAULT: c_int = 0;
    pub const DAVS2_GOT_HEADER: c_int = 1;
    pub const DAVS2_GOT_FRAME: c_int = 2;
    pub const DAVS2_END: c_int = 3;

    #[repr(C)]
    pub struct davs2_param_t {
        /// Decoding thread count (0 = auto).
        pub threads: c_int,
        /// Library log level; negative disables logging.
        pub info_level: c_int,
        pub opaque: *mut c_void,
        pub disable_avx: c_int,
    }

    #[repr(C)]
    pub struct davs2_packet_t {
        pub data: *const u8,
        pub len: c_int,
        pub pts: i64,
        pub dts: i64,
    }

    #[repr(C)]
    pub struct davs2_seq_info_t {
        pub profile_id: u32,
        pub level_id: u32,
        pub progressive: u32,
        pub width: u32,
        pub height: u32,
        pub chroma_format: u32,
        pub aspect_ratio: u32,
        pub low_delay: u32,
        pub bitrate: u32,
        pub internal_bit_depth: u32,
        pub output_bit_depth: u32,
        pub bytes_per_sample: u32,
        pub frame_rate: f32,
        pub frame_rate_id: u32,
        pub _reserved: [u8; 256],
    }

    #[repr(C)]
    pub struct davs2_picture_t {
        pub magic: *mut c_void,
        /// Decoded planes, tightly packed (stride == width * bytes per sample).
        pub planes: [*mut u8; 3],
        /// Plane widths in samples.
        pub widths: [c_int; 3],
        /// Plane heights in rows.
        pub lines: [c_int; 3],
        pub pic_order_count: c_int,
        pub r#type: c_int,
        pub qp: c_int,
        pub pts: i64,
        pub dts: i64,
        pub bytes_per_sample: c_int,
        pub bit_depth: c_int,
        pub b_decode_error: c_int,
        pub _reserved: [u8; 256],
    }

    extern "C" {
        pub fn davs2_decoder_open(param: *mut davs2_param_t) -> *mut c_void;
        pub fn davs2_decoder_send_packet(decoder: *mut c_void, packet: *mut davs2_packet_t)
            -> c_int;
        pub fn davs2_decoder_recv_frame(
            decoder: *mut c_void,
            headerset: *mut davs2_seq_info_t,
            out_frame: *mut davs2_picture_t,
        ) -> c_int;
        pub fn davs2_decoder_flush(
            decoder: *mut c_void,
            headerset: *mut davs2_seq_info_t,
            out_frame: *mut davs2_picture_t,
        ) -> c_int;
        pub fn davs2_decoder_frame_unref(decoder: *mut c_void, picture: *mut davs2_picture_t);
        pub fn davs2_decoder_close(decoder: *mut c_void);
    }
}

/// Outcome of one call into the xavs2 encoder.
#[cfg(feature = "ffi-xavs2")]
pub(crate) enum EncodeStep {
    /// A coded packet was produced.
    Packet(OwnedPacket),
    /// The encoder accepted the input but has nothing to emit yet.
    NoOutput,
    /// The flush sequence is complete; the encoder is drained.
    FlushEnd,
}

#[cfg(feature = "ffi-xavs2")]
fn required<T>(f: Option<T>, name: &'static str) -> Result<T> {
    f.ok_or_else(|| Avs2Error::EncoderError(format!("xavs2 api table is missing {}", name)))
}

/// Safe wrapper around one xavs2 encoder instance.
#[cfg(feature = "ffi-xavs2")]
pub(crate) struct XavsEncoder {
    api: *const xavs2_sys::xavs2_api_t,
    param: *mut std::os::raw::c_void,
    encoder: *mut std::os::raw::c_void,
    sample_shift: u32,
}

// SAFETY: The xavs2 handles are only accessed from one thread at a time.
#[cfg(feature = "ffi-xavs2")]
unsafe impl Send for XavsEncoder {}

#[cfg(feature = "ffi-xavs2")]
impl XavsEncoder {
    /// Select the API table for the configured bit depth, marshal the
    /// options and create the encoder.
    pub fn open(settings: &EncoderSettings) -> Result<Self> {
        // SAFETY: the returned table is static library data (or null).
        let api = unsafe { xavs2_sys::xavs2_api_get(settings.bit_depth() as c_int) };
        if api.is_null() {
            return Err(Avs2Error::EncoderError(format!(
                "no xavs2 build supports {}-bit input",
                settings.bit_depth()
            )));
        }

        // SAFETY: api was null-checked; the table outlives the process.
        let opt_alloc = required(unsafe { (*api).opt_alloc }, "opt_alloc")?;
        // SAFETY: opt_alloc takes no arguments and returns an owned parameter set.
        let param = unsafe { opt_alloc() };
        if param.is_null() {
            return Err(Avs2Error::EncoderError(
                "failed to allocate encoder parameters".into(),
            ));
        }

        // From here on Drop releases the parameter set on any error path.
        let mut wrapper = Self {
            api,
            param,
            encoder: ptr::null_mut(),
            sample_shift: 0,
        };

        for (name, value) in settings.to_option_pairs() {
            wrapper.set_option(name, &value)?;
        }
        if let Some(extra) = settings.extra_params.as_deref() {
            for (key, value) in parse_extra_params(extra) {
                wrapper.set_option(&key, &value)?;
            }
        }

        wrapper.sample_shift = wrapper.query_sample_shift();

        let encoder_create = required(unsafe { (*api).encoder_create }, "encoder_create")?;
        // SAFETY: param holds a fully marshaled parameter set.
        let encoder = unsafe { encoder_create(wrapper.param) };
        if encoder.is_null() {
            return Err(Avs2Error::EncoderError(
                "failed to create xavs2 encoder".into(),
            ));
        }
        wrapper.encoder = encoder;

        Ok(wrapper)
    }

    /// Internal bit depth of the selected library build.
    pub fn internal_bit_depth(&self) -> u32 {
        // SAFETY: api is a static table, null-checked at open.
        unsafe { (*self.api).internal_bit_depth as u32 }
    }

    /// Bit-depth shift applied when widening 8-bit input.
    pub fn sample_shift(&self) -> u32 {
        self.sample_shift
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        // SAFETY: api is a static table, null-checked at open.
        let opt_set2 = required(unsafe { (*self.api).opt_set2 }, "opt_set2")?;

        let c_name = CString::new(name).map_err(|_| {
            Avs2Error::InvalidSettings(format!("option name {:?} contains a NUL byte", name))
        })?;
        let c_value = CString::new(value).map_err(|_| {
            Avs2Error::InvalidSettings(format!("option value {:?} contains a NUL byte", value))
        })?;

        // SAFETY: both strings are NUL-terminated and outlive the call.
        let ret = unsafe { opt_set2(self.param, c_name.as_ptr(), c_value.as_ptr()) };
        if ret < 0 {
            warn!(option = %name, value = %value, "Encoder rejected option");
        }

        Ok(())
    }

    /// Read back the sample shift the library derived from the marshaled
    /// bit depth. Missing or unparsable means no shift.
    fn query_sample_shift(&self) -> u32 {
        const SAMPLE_SHIFT: &[u8] = b"SampleShift\0";

        // SAFETY: api is a static table, null-checked at open.
        let opt_get = match unsafe { (*self.api).opt_get } {
            Some(f) => f,
            None => return 0,
        };

        // SAFETY: the name is NUL-terminated; the returned string is
        // library-owned and read before any further option call.
        let raw = unsafe { opt_get(self.param, SAMPLE_SHIFT.as_ptr() as *const c_char) };
        if raw.is_null() {
            return 0;
        }
        // SAFETY: raw was null-checked and points at a NUL-terminated string.
        let text = unsafe { std::ffi::CStr::from_ptr(raw) }.to_string_lossy();
        let shift = text.trim().parse().unwrap_or(0);
        debug!(shift, "Encoder sample shift");
        shift
    }

    /// Run one encode call. `Some(frame)` submits a picture, `None`
    /// advances the flush sequence.
    pub fn encode(&mut self, frame: Option<&Frame>, time_base: TimeBase) -> Result<EncodeStep> {
        let api = self.api;
        let get_buffer = required(unsafe { (*api).encoder_get_buffer }, "encoder_get_buffer")?;
        let encoder_encode = required(unsafe { (*api).encoder_encode }, "encoder_encode")?;
        let packet_unref = required(
            unsafe { (*api).encoder_packet_unref },
            "encoder_packet_unref",
        )?;

        // SAFETY: zeroed is valid for these plain-data structs; the
        // function-pointer options in them are all None.
        let mut pic: xavs2_sys::xavs2_picture_t = unsafe { std::mem::zeroed() };
        let pic_ptr = match frame {
            Some(frame) => {
                // SAFETY: encoder is a live handle; get_buffer fills pic
                // with encoder-owned plane memory.
                let ret = unsafe { get_buffer(self.encoder, &mut pic) };
                if ret < 0 {
                    return Err(Avs2Error::Backend {
                        call: "encoder_get_buffer",
                        code: ret,
                    });
                }
                self.stage_frame(&mut pic, frame)?;

                pic.i_state = 0;
                pic.i_type = xavs2_sys::XAVS2_TYPE_AUTO;
                pic.i_pts = frame.pts.value;
                &mut pic as *mut xavs2_sys::xavs2_picture_t
            }
            None => ptr::null_mut(),
        };

        // SAFETY: zeroed is valid for this plain-data struct.
        let mut pkt: xavs2_sys::xavs2_outpacket_t = unsafe { std::mem::zeroed() };
        // SAFETY: a null picture begins the flush sequence; pkt receives
        // a stream buffer owned by the encoder until packet_unref.
        let ret = unsafe { encoder_encode(self.encoder, pic_ptr, &mut pkt) };
        if ret < 0 {
            return Err(Avs2Error::Backend {
                call: "encoder_encode",
                code: ret,
            });
        }

        if pkt.len > 0 && !pkt.stream.is_null() && pkt.state != xavs2_sys::XAVS2_STATE_FLUSH_END {
            // The stream buffer is released by packet_unref, so the
            // payload must be copied first.
            // SAFETY: stream points at len bytes valid until the unref.
            let payload = unsafe { std::slice::from_raw_parts(pkt.stream, pkt.len as usize) }
                .to_vec();
            let keyframe = pkt.r#type == xavs2_sys::XAVS2_TYPE_IDR
                || pkt.r#type == xavs2_sys::XAVS2_TYPE_I;
            let (pts, dts) = (pkt.pts, pkt.dts);

            // SAFETY: pkt came from the paired encode call on this handle.
            unsafe { packet_unref(self.encoder, &mut pkt) };

            let mut packet = Packet::new(payload).with_timestamps(
                Timestamp::new(pts, time_base),
                Timestamp::new(dts, time_base),
            );
            packet.set_keyframe(keyframe);
            Ok(EncodeStep::Packet(packet))
        } else if pkt.state == xavs2_sys::XAVS2_STATE_FLUSH_END {
            if pkt.len > 0 {
                // SAFETY: pkt came from the paired encode call on this handle.
                unsafe { packet_unref(self.encoder, &mut pkt) };
            }
            Ok(EncodeStep::FlushEnd)
        } else {
            Ok(EncodeStep::NoOutput)
        }
    }

    /// Copy the host frame into the encoder's picture buffer, widening
    /// 8-bit samples when the library build stores 16-bit samples.
    fn stage_frame(&self, pic: &mut xavs2_sys::xavs2_picture_t, frame: &Frame) -> Result<()> {
        let in_size = pic.img.in_sample_size as usize;
        let enc_size = pic.img.enc_sample_size as usize;

        for plane in 0..3 {
            let width = pic.img.i_width[plane] as usize;
            let lines = pic.img.i_lines[plane] as usize;
            let stride = pic.img.i_stride[plane] as usize;

            let src = frame.plane(plane).ok_or_else(|| {
                Avs2Error::EncoderError(format!("input frame is missing plane {}", plane))
            })?;
            let src_stride = frame.stride(plane);

            if pic.img.img_planes[plane].is_null() {
                return Err(Avs2Error::EncoderError(format!(
                    "encoder picture buffer is missing plane {}",
                    plane
                )));
            }
            // SAFETY: img_planes[plane] points at lines * stride bytes
            // owned by the encoder until the matching encode call.
            let dst = unsafe {
                std::slice::from_raw_parts_mut(pic.img.img_planes[plane], lines * stride)
            };

            if in_size == enc_size {
                picture::copy_plane_rows(dst, stride, src, src_stride, width * in_size, lines)?;
            } else if in_size == 1 && enc_size == 2 {
                picture::widen_plane_rows(
                    dst,
                    stride,
                    src,
                    src_stride,
                    width,
                    lines,
                    self.sample_shift,
                )?;
            } else {
                return Err(Avs2Error::EncoderError(format!(
                    "cannot feed {}-byte samples to a {}-byte encoder build",
                    in_size, enc_size
                )));
            }
        }

        Ok(())
    }
}

#[cfg(feature = "ffi-xavs2")]
impl Drop for XavsEncoder {
    fn drop(&mut self) {
        // SAFETY: each handle is destroyed exactly once; the api table
        // is static.
        unsafe {
            if !self.encoder.is_null() {
                if let Some(destroy) = (*self.api).encoder_destroy {
                    destroy(self.encoder);
                }
                self.encoder = ptr::null_mut();
            }
            if !self.param.is_null() {
                if let Some(destroy) = (*self.api).opt_destroy {
                    destroy(self.param);
                }
                self.param = ptr::null_mut();
            }
        }
    }
}

/// Outcome of one call into the davs2 decoder.
#[cfg(feature = "ffi-davs2")]
pub(crate) enum DecodeStep {
    /// The decoder consumed the input without producing output.
    Pending,
    /// A sequence header was parsed; stream parameters are known.
    Header(StreamInfo),
    /// A picture was decoded.
    Frame(Frame),
    /// The decoder is fully drained.
    End,
}

/// Safe wrapper around one davs2 decoder instance.
#[cfg(feature = "ffi-davs2")]
pub(crate) struct DavsDecoder {
    decoder: *mut std::os::raw::c_void,
}

// SAFETY: The davs2 handle is only accessed from one thread at a time.
#[cfg(feature = "ffi-davs2")]
unsafe impl Send for DavsDecoder {}

#[cfg(feature = "ffi-davs2")]
impl DavsDecoder {
    pub fn open(settings: &DecoderSettings) -> Result<Self> {
        let mut param = davs2_sys::davs2_param_t {
            threads: settings.threads as c_int,
            info_level: 0,
            opaque: ptr::null_mut(),
            disable_avx: 0,
        };

        // SAFETY: param is fully initialized and only read during open.
        let decoder = unsafe { davs2_sys::davs2_decoder_open(&mut param) };
        if decoder.is_null() {
            return Err(Avs2Error::DecoderError(
                "failed to open davs2 decoder".into(),
            ));
        }

        Ok(Self { decoder })
    }

    /// Send one packet and receive at most one decode result.
    pub fn decode(
        &mut self,
        data: &[u8],
        pts: i64,
        dts: i64,
        time_base: TimeBase,
    ) -> Result<DecodeStep> {
        let mut packet = davs2_sys::davs2_packet_t {
            data: data.as_ptr(),
            len: data.len() as c_int,
            pts,
            dts,
        };

        // SAFETY: packet borrows data only for the duration of the call.
        let ret = unsafe { davs2_sys::davs2_decoder_send_packet(self.decoder, &mut packet) };
        if ret == davs2_sys::DAVS2_ERROR {
            return Err(Avs2Error::Backend {
                call: "davs2_decoder_send_packet",
                code: ret,
            });
        }

        // SAFETY: zeroed is valid for these plain-data out-structs.
        let mut headerset: davs2_sys::davs2_seq_info_t = unsafe { std::mem::zeroed() };
        let mut out_frame: davs2_sys::davs2_picture_t = unsafe { std::mem::zeroed() };
        // SAFETY: the decoder fills both structs; the picture stays
        // owned by the library until frame_unref.
        let ret = unsafe {
            davs2_sys::davs2_decoder_recv_frame(self.decoder, &mut headerset, &mut out_frame)
        };

        self.take_step(
            ret,
            &headerset,
            &mut out_frame,
            time_base,
            "davs2_decoder_recv_frame",
        )
    }

    /// Advance the drain sequence by one step.
    pub fn flush_step(&mut self, time_base: TimeBase) -> Result<DecodeStep> {
        // SAFETY: zeroed is valid for these plain-data out-structs.
        let mut headerset: davs2_sys::davs2_seq_info_t = unsafe { std::mem::zeroed() };
        let mut out_frame: davs2_sys::davs2_picture_t = unsafe { std::mem::zeroed() };
        // SAFETY: flush behaves like recv_frame without new input.
        let ret = unsafe {
            davs2_sys::davs2_decoder_flush(self.decoder, &mut headerset, &mut out_frame)
        };

        // Draining stops on END, on no-more-output and on errors alike;
        // a teardown failure is not actionable.
        if ret <= davs2_sys::DAVS2_DEFAULT || ret == davs2_sys::DAVS2_END {
            return Ok(DecodeStep::End);
        }

        self.take_step(
            ret,
            &headerset,
            &mut out_frame,
            time_base,
            "davs2_decoder_flush",
        )
    }

    fn take_step(
        &mut self,
        ret: c_int,
        headerset: &davs2_sys::davs2_seq_info_t,
        out_frame: &mut davs2_sys::davs2_picture_t,
        time_base: TimeBase,
        call: &'static str,
    ) -> Result<DecodeStep> {
        match ret {
            davs2_sys::DAVS2_GOT_HEADER => {
                let info = stream_info_from_header(headerset);
                self.unref(out_frame);
                Ok(DecodeStep::Header(info))
            }
            davs2_sys::DAVS2_GOT_FRAME => {
                // Unref must run even when the copy-out fails, or the
                // library leaks the picture slot.
                let frame = self.export_frame(out_frame, time_base);
                self.unref(out_frame);
                Ok(DecodeStep::Frame(frame?))
            }
            davs2_sys::DAVS2_END => Ok(DecodeStep::End),
            code if code < 0 => Err(Avs2Error::Backend { call, code }),
            _ => Ok(DecodeStep::Pending),
        }
    }

    fn unref(&mut self, picture: &mut davs2_sys::davs2_picture_t) {
        // SAFETY: picture came from the paired recv/flush call on this handle.
        unsafe { davs2_sys::davs2_decoder_frame_unref(self.decoder, picture) };
    }

    /// Copy a decoded picture out of library memory into an owned frame.
    fn export_frame(
        &self,
        picture: &davs2_sys::davs2_picture_t,
        time_base: TimeBase,
    ) -> Result<Frame> {
        let bytes_per_sample = picture.bytes_per_sample as usize;
        let format = if bytes_per_sample == 2 {
            PixelFormat::Yuv420p10le
        } else {
            PixelFormat::Yuv420p
        };
        let width = picture.widths[0] as u32;
        let height = picture.lines[0] as u32;

        let mut frame = Frame::new(width, height, format, time_base);

        for plane in 0..3 {
            let plane_width = picture.widths[plane] as usize;
            let plane_lines = picture.lines[plane] as usize;
            let row_bytes = plane_width * bytes_per_sample;

            if picture.planes[plane].is_null() {
                return Err(Avs2Error::DecoderError(format!(
                    "decoded picture is missing plane {}",
                    plane
                )));
            }
            // SAFETY: decoded planes are tightly packed rows valid until
            // frame_unref.
            let src = unsafe {
                std::slice::from_raw_parts(picture.planes[plane], row_bytes * plane_lines)
            };

            let dst_stride = frame.stride(plane);
            let dst = frame.plane_mut(plane).ok_or_else(|| {
                Avs2Error::DecoderError(format!("output frame is missing plane {}", plane))
            })?;
            picture::copy_plane_rows(dst, dst_stride, src, row_bytes, row_bytes, plane_lines)?;
        }

        frame.pts = Timestamp::new(picture.pts, time_base);
        frame.dts = Timestamp::new(picture.dts, time_base);
        frame.poc = picture.pic_order_count;
        if PictureType::from_code(picture.r#type).is_some_and(|t| t.is_intra()) {
            frame.flags.insert(FrameFlags::KEYFRAME);
        }
        if picture.b_decode_error != 0 {
            frame.flags.insert(FrameFlags::CORRUPT);
        }

        Ok(frame)
    }
}

#[cfg(feature = "ffi-davs2")]
impl Drop for DavsDecoder {
    fn drop(&mut self) {
        if !self.decoder.is_null() {
            // SAFETY: close is called exactly once; the library drops any
            // pictures still queued inside.
            unsafe { davs2_sys::davs2_decoder_close(self.decoder) };
            self.decoder = ptr::null_mut();
        }
    }
}

/// Stream parameters from a davs2 sequence header report.
#[cfg(feature = "ffi-davs2")]
fn stream_info_from_header(header: &davs2_sys::davs2_seq_info_t) -> StreamInfo {
    let pixel_format = if header.output_bit_depth == 10 {
        PixelFormat::Yuv420p10le
    } else {
        PixelFormat::Yuv420p
    };

    StreamInfo {
        width: header.width,
        height: header.height,
        pixel_format,
        frame_rate: parser::frame_rate_from_code(
            header.frame_rate_id as u8,
            header.frame_rate as f64,
        ),
        bit_rate: header.bitrate as u64,
        low_delay: header.low_delay != 0,
    }
}
