//! Exact rational arithmetic for frame rates and time bases.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// A rational number as a numerator/denominator pair.
///
/// Frame rates like 30000/1001 have no exact float representation; keeping
/// them as rationals avoids drift when selecting codec rate codes or
/// rescaling timestamps.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    /// Numerator.
    pub num: i64,
    /// Denominator (always positive after construction).
    pub den: i64,
}

impl Rational {
    /// The rational zero (0/1).
    pub const ZERO: Self = Self { num: 0, den: 1 };

    /// The rational one (1/1).
    pub const ONE: Self = Self { num: 1, den: 1 };

    /// Create a new rational number.
    ///
    /// The sign is normalized onto the numerator.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "Denominator cannot be zero");
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        Self { num, den }
    }

    /// Create a rational from an integer.
    pub const fn from_int(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    /// Check if this rational is zero.
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Check if this rational is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.num > 0
    }

    /// Return the rational reduced to lowest terms.
    pub fn reduced(&self) -> Self {
        if self.num == 0 {
            return Self::ZERO;
        }
        let g = gcd(self.num.unsigned_abs(), self.den.unsigned_abs()) as i64;
        Self {
            num: self.num / g,
            den: self.den / g,
        }
    }

    /// Convert to f64.
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Return the multiplicative inverse.
    ///
    /// # Panics
    ///
    /// Panics if the numerator is zero.
    pub fn inverse(&self) -> Self {
        assert!(self.num != 0, "Cannot invert zero");
        Self::new(self.den, self.num)
    }

    /// Rescale a value expressed in this unit into another unit.
    ///
    /// Computes `value * self / target` with 128-bit intermediates, truncating
    /// toward zero.
    pub fn rescale(&self, value: i64, target: Rational) -> i64 {
        let num = value as i128 * self.num as i128 * target.den as i128;
        let den = self.den as i128 * target.num as i128;
        (num / den) as i64
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}/{})", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // Cross-multiply in i128; denominators are positive so no sign flip.
        let lhs = self.num as i128 * other.den as i128;
        let rhs = other.num as i128 * self.den as i128;
        lhs.cmp(&rhs)
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let num = self.num * rhs.den + rhs.num * self.den;
        Self::new(num, self.den * rhs.den).reduced()
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        let num = self.num * rhs.den - rhs.num * self.den;
        Self::new(num, self.den * rhs.den).reduced()
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(self.num * rhs.num, self.den * rhs.den).reduced()
    }
}

impl Div for Rational {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self::new(self.num * rhs.den, self.den * rhs.num).reduced()
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_int(n)
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Self::new(num as i64, den as i64)
    }
}

impl From<(i64, i64)> for Rational {
    fn from((num, den): (i64, i64)) -> Self {
        Self::new(num, den)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_sign() {
        let r = Rational::new(1, -2);
        assert_eq!(r.num, -1);
        assert_eq!(r.den, 2);
    }

    #[test]
    fn test_reduced() {
        let r = Rational::new(48000, 2002).reduced();
        assert_eq!(r, Rational::new(24000, 1001));
    }

    #[test]
    fn test_ntsc_rates_compare_exactly() {
        let ntsc_film = Rational::new(24000, 1001);
        let film = Rational::new(24, 1);
        assert!(ntsc_film < film);
        assert!(Rational::new(30000, 1001) < Rational::new(30, 1));
    }

    #[test]
    fn test_rescale() {
        // 1 second in 1/25 units -> 1/90000 units
        let tb = Rational::new(1, 25);
        assert_eq!(tb.rescale(25, Rational::new(1, 90000)), 90000);
    }

    #[test]
    fn test_arithmetic() {
        let a = Rational::new(1, 2);
        let b = Rational::new(1, 3);
        assert_eq!(a + b, Rational::new(5, 6));
        assert_eq!(a - b, Rational::new(1, 6));
        assert_eq!(a * b, Rational::new(1, 6));
        assert_eq!(a / b, Rational::new(3, 2));
    }

    #[test]
    fn test_inverse() {
        let fps = Rational::new(30000, 1001);
        let frame_duration = fps.inverse();
        assert_eq!(frame_duration, Rational::new(1001, 30000));
    }

    #[test]
    #[should_panic(expected = "Denominator cannot be zero")]
    fn test_zero_denominator_panics() {
        let _ = Rational::new(1, 0);
    }
}
