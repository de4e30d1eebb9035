//! Encoder configuration and option marshaling.
//!
//! xavs2 is configured through a string key/value API: every setting is
//! rendered to a decimal string and handed to the library's option
//! setter. [`EncoderSettings::to_option_pairs`] produces the built-in
//! key set; [`parse_extra_params`] handles the free-form
//! `key=value:key=value` passthrough list.

use tracing::warn;

use recode_core::{PixelFormat, Rational};

use crate::types::FrameRateCode;
use crate::{Avs2Error, Result, MAX_HEIGHT, MAX_WIDTH};

/// Encoding speed preset, mapped to xavs2 preset levels 0..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncoderPreset {
    /// Fastest encoding, lowest quality (level 0). The library default.
    #[default]
    UltraFast,
    /// Level 1.
    SuperFast,
    /// Level 2.
    VeryFast,
    /// Level 3.
    Faster,
    /// Level 4.
    Fast,
    /// Balanced speed and quality (level 5).
    Medium,
    /// Level 6.
    Slow,
    /// Level 7.
    Slower,
    /// Level 8.
    VerySlow,
    /// Slowest encoding, best quality (level 9).
    Placebo,
}

impl EncoderPreset {
    /// Convert to the xavs2 preset level (0-9).
    pub fn to_level(self) -> u8 {
        match self {
            Self::UltraFast => 0,
            Self::SuperFast => 1,
            Self::VeryFast => 2,
            Self::Faster => 3,
            Self::Fast => 4,
            Self::Medium => 5,
            Self::Slow => 6,
            Self::Slower => 7,
            Self::VerySlow => 8,
            Self::Placebo => 9,
        }
    }

    /// Create from a preset level, saturating above 9.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::UltraFast,
            1 => Self::SuperFast,
            2 => Self::VeryFast,
            3 => Self::Faster,
            4 => Self::Fast,
            5 => Self::Medium,
            6 => Self::Slow,
            7 => Self::Slower,
            8 => Self::VerySlow,
            _ => Self::Placebo,
        }
    }
}

/// xavs2 encoder configuration.
///
/// Defaults match the library's option table; `bit_rate == 0` selects
/// constant-QP mode, any positive value enables rate control targeting
/// that many bits per second.
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    /// Video width.
    pub width: u32,
    /// Video height.
    pub height: u32,
    /// Input pixel format (Yuv420p or Yuv420p10le).
    pub pixel_format: PixelFormat,
    /// Frame rate.
    pub frame_rate: Rational,
    /// Target bit rate in bits per second (0 = constant QP).
    pub bit_rate: u64,
    /// Initial quantizer (1-63). When unset, 32 is marshaled for 8-bit
    /// input and 45 for 10-bit.
    pub initial_qp: Option<u8>,
    /// Speed/quality preset.
    pub preset: EncoderPreset,
    /// Distance between intra pictures (3-100).
    pub intra_period: u32,
    /// Hierarchical reference structure.
    pub hierarchical_ref: bool,
    /// Number of B frames (0-15).
    pub bframes: u32,
    /// Row-level parallelism (1-8).
    pub row_threads: u32,
    /// Frame-level parallelism (1-4).
    pub frame_threads: u32,
    /// Free-form `key=value:key=value` passthrough options.
    pub extra_params: Option<String>,
}

impl EncoderSettings {
    /// Create settings with the library defaults for the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_format: PixelFormat::Yuv420p,
            frame_rate: Rational::new(25, 1),
            bit_rate: 0,
            initial_qp: None,
            preset: EncoderPreset::default(),
            intra_period: 50,
            hierarchical_ref: true,
            bframes: 7,
            row_threads: 5,
            frame_threads: 1,
            extra_params: None,
        }
    }

    /// Set the input pixel format.
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Set the frame rate.
    pub fn with_frame_rate(mut self, num: i64, den: i64) -> Self {
        self.frame_rate = Rational::new(num, den);
        self
    }

    /// Set a target bit rate, enabling rate control.
    pub fn with_bit_rate(mut self, bit_rate: u64) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    /// Set the initial quantizer explicitly.
    pub fn with_initial_qp(mut self, qp: u8) -> Self {
        self.initial_qp = Some(qp);
        self
    }

    /// Set the speed/quality preset.
    pub fn with_preset(mut self, preset: EncoderPreset) -> Self {
        self.preset = preset;
        self
    }

    /// Set the intra picture period.
    pub fn with_intra_period(mut self, period: u32) -> Self {
        self.intra_period = period;
        self
    }

    /// Enable or disable hierarchical references.
    pub fn with_hierarchical_ref(mut self, enabled: bool) -> Self {
        self.hierarchical_ref = enabled;
        self
    }

    /// Set the number of B frames.
    pub fn with_bframes(mut self, bframes: u32) -> Self {
        self.bframes = bframes;
        self
    }

    /// Set row- and frame-level thread counts.
    pub fn with_threads(mut self, rows: u32, frames: u32) -> Self {
        self.row_threads = rows;
        self.frame_threads = frames;
        self
    }

    /// Set the free-form passthrough option list.
    pub fn with_extra_params(mut self, params: impl Into<String>) -> Self {
        self.extra_params = Some(params.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Avs2Error::InvalidSettings(
                "Width and height must be non-zero".into(),
            ));
        }
        if self.width > MAX_WIDTH || self.height > MAX_HEIGHT {
            return Err(Avs2Error::InvalidSettings(format!(
                "Resolution {}x{} exceeds AVS2 maximum ({}x{})",
                self.width, self.height, MAX_WIDTH, MAX_HEIGHT
            )));
        }
        if !matches!(
            self.pixel_format,
            PixelFormat::Yuv420p | PixelFormat::Yuv420p10le
        ) {
            return Err(Avs2Error::UnsupportedPixelFormat(self.pixel_format));
        }
        if !self.frame_rate.is_positive() {
            return Err(Avs2Error::InvalidSettings("Invalid frame rate".into()));
        }
        if let Some(qp) = self.initial_qp {
            if !(1..=63).contains(&qp) {
                return Err(Avs2Error::InvalidSettings(format!(
                    "Initial QP {} out of range 1-63",
                    qp
                )));
            }
        }
        if !(3..=100).contains(&self.intra_period) {
            return Err(Avs2Error::InvalidSettings(format!(
                "Intra period {} out of range 3-100",
                self.intra_period
            )));
        }
        if self.bframes > 15 {
            return Err(Avs2Error::InvalidSettings(format!(
                "B frame count {} out of range 0-15",
                self.bframes
            )));
        }
        if !(1..=8).contains(&self.row_threads) {
            return Err(Avs2Error::InvalidSettings(format!(
                "Row thread count {} out of range 1-8",
                self.row_threads
            )));
        }
        if !(1..=4).contains(&self.frame_threads) {
            return Err(Avs2Error::InvalidSettings(format!(
                "Frame thread count {} out of range 1-4",
                self.frame_threads
            )));
        }
        Ok(())
    }

    /// Bit depth implied by the input pixel format.
    pub fn bit_depth(&self) -> u32 {
        self.pixel_format.bit_depth()
    }

    /// The quantizer actually marshaled: the explicit value when set,
    /// else the bit-depth default (32 for 8-bit, 45 for 10-bit).
    pub fn effective_qp(&self) -> u8 {
        self.initial_qp
            .unwrap_or(if self.bit_depth() == 10 { 45 } else { 32 })
    }

    /// Render the built-in option set as key/value string pairs, in the
    /// order they are handed to the library.
    ///
    /// `rec` and `log` are forced to 0: no reconstruction dump, quiet
    /// library logging. The rate-control pair is only present when a
    /// bit rate is configured.
    pub fn to_option_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("bitdepth", self.bit_depth().to_string()),
            ("initial_qp", self.effective_qp().to_string()),
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
            ("rec", "0".to_string()),
            ("log", "0".to_string()),
            ("preset", self.preset.to_level().to_string()),
            (
                "hierarchical_ref",
                (self.hierarchical_ref as u8).to_string(),
            ),
            ("bframes", self.bframes.to_string()),
            ("thread_frames", self.frame_threads.to_string()),
            ("thread_rows", self.row_threads.to_string()),
        ];
        if self.bit_rate > 0 {
            pairs.push(("RateControl", "1".to_string()));
            pairs.push(("TargetBitRate", self.bit_rate.to_string()));
        }
        pairs.push(("intraperiod", self.intra_period.to_string()));
        pairs.push((
            "FrameRate",
            FrameRateCode::for_rate(self.frame_rate).code().to_string(),
        ));
        pairs
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// Parse a free-form `key=value:key=value` option list.
///
/// Values are integer-coerced the way the library expects: a value with
/// a leading ASCII digit contributes its digit prefix, anything else
/// becomes 0. Segments without `=` are dropped with a warning.
pub fn parse_extra_params(params: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for segment in params.split(':') {
        if segment.is_empty() {
            continue;
        }
        match segment.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                pairs.push((key.to_string(), coerce_value(value).to_string()));
            }
            _ => {
                warn!(segment = %segment, "Malformed encoder option, expected key=value");
            }
        }
    }
    pairs
}

/// Integer coercion matching C `atoi` on digit-led strings, 0 otherwise.
fn coerce_value(value: &str) -> i64 {
    if value.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().unwrap_or(0)
    } else {
        0
    }
}
