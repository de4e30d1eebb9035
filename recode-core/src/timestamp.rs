//! Timestamps and time bases.
//!
//! Codec adapters pass presentation/decode timestamps through to the external
//! libraries untouched; the types here keep the unit attached to the value so
//! the host can rescale at its boundaries.

use crate::rational::Rational;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// A time base: the unit, in seconds, that timestamp values count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeBase(pub Rational);

impl TimeBase {
    /// Standard MPEG transport time base (1/90000).
    pub const MPEG: Self = Self(Rational { num: 1, den: 90000 });

    /// Millisecond time base (1/1000).
    pub const MILLISECONDS: Self = Self(Rational { num: 1, den: 1000 });

    /// Second time base (1/1).
    pub const SECONDS: Self = Self(Rational { num: 1, den: 1 });

    /// Create a new time base from numerator and denominator.
    pub fn new(num: i64, den: i64) -> Self {
        Self(Rational::new(num, den))
    }

    /// Time base in which one tick is one frame of the given rate.
    ///
    /// # Panics
    ///
    /// Panics if the rate is zero.
    pub fn from_rate(rate: Rational) -> Self {
        Self(rate.inverse())
    }

    /// Convert a value from this time base to another.
    pub fn convert(&self, value: i64, target: TimeBase) -> i64 {
        self.0.rescale(value, target.0)
    }

    /// Convert a value in this time base to seconds.
    pub fn to_seconds(&self, value: i64) -> f64 {
        value as f64 * self.0.to_f64()
    }

    /// Get the time base as a rational.
    pub fn as_rational(&self) -> Rational {
        self.0
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::MPEG
    }
}

impl From<Rational> for TimeBase {
    fn from(r: Rational) -> Self {
        Self(r)
    }
}

impl From<(i32, i32)> for TimeBase {
    fn from((num, den): (i32, i32)) -> Self {
        Self::new(num as i64, den as i64)
    }
}

/// A timestamp with an associated time base.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    /// The raw timestamp value.
    pub value: i64,
    /// The time base for interpreting the value.
    pub time_base: TimeBase,
}

impl Timestamp {
    /// Sentinel value for an undefined timestamp.
    pub const NONE: i64 = i64::MIN;

    /// Create a new timestamp.
    pub fn new(value: i64, time_base: TimeBase) -> Self {
        Self { value, time_base }
    }

    /// Create an undefined timestamp.
    pub fn none() -> Self {
        Self {
            value: Self::NONE,
            time_base: TimeBase::default(),
        }
    }

    /// Check if this timestamp is defined.
    pub fn is_valid(&self) -> bool {
        self.value != Self::NONE
    }

    /// Convert to a different time base. Undefined stays undefined.
    pub fn rescale(&self, target: TimeBase) -> Self {
        if !self.is_valid() {
            return Self::none();
        }
        Self {
            value: self.time_base.convert(self.value, target),
            time_base: target,
        }
    }

    /// Convert to seconds, or `None` if undefined.
    pub fn to_seconds(&self) -> Option<f64> {
        if self.is_valid() {
            Some(self.time_base.to_seconds(self.value))
        } else {
            None
        }
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::none()
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => return Ordering::Equal,
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            (true, true) => {}
        }

        // Compare in the higher-precision time base.
        let tb = if self.time_base.0.den > other.time_base.0.den {
            self.time_base
        } else {
            other.time_base
        };
        self.rescale(tb).value.cmp(&other.rescale(tb).value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(secs) = self.to_seconds() {
            let hours = (secs / 3600.0) as u32;
            let mins = ((secs % 3600.0) / 60.0) as u32;
            let secs = secs % 60.0;
            write!(f, "{:02}:{:02}:{:06.3}", hours, mins, secs)
        } else {
            write!(f, "NONE")
        }
    }
}

/// A duration with an associated time base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    /// The raw duration value.
    pub value: i64,
    /// The time base for interpreting the value.
    pub time_base: TimeBase,
}

impl Duration {
    /// Create a new duration.
    pub fn new(value: i64, time_base: TimeBase) -> Self {
        Self { value, time_base }
    }

    /// Create a zero duration.
    pub fn zero() -> Self {
        Self {
            value: 0,
            time_base: TimeBase::default(),
        }
    }

    /// Check if this duration is zero.
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Convert to a different time base.
    pub fn rescale(&self, target: TimeBase) -> Self {
        Self {
            value: self.time_base.convert(self.value, target),
            time_base: target,
        }
    }

    /// Convert to seconds.
    pub fn to_seconds(&self) -> f64 {
        self.time_base.to_seconds(self.value)
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        if !self.is_valid() {
            return self;
        }
        let rhs = rhs.rescale(self.time_base);
        Timestamp {
            value: self.value + rhs.value,
            time_base: self.time_base,
        }
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        if !self.is_valid() || !rhs.is_valid() {
            return Duration::zero();
        }
        let rhs = rhs.rescale(self.time_base);
        Duration {
            value: self.value - rhs.value,
            time_base: self.time_base,
        }
    }
}
