//! Fixed-point scaling and complex fixed-point values.
//!
//! A [`ComplexFx`] is a pair of signed 16-bit integers interpreted in a
//! [`QFormat`] (Q1.15 by default, scale 32768). All arithmetic mirrors the
//! hardware datapath: 16-bit two's-complement wraparound for sums and
//! differences, 32-bit wrapping accumulation for products, and truncating
//! arithmetic shifts back into the 16-bit domain. Nothing here rounds or
//! saturates except the one-off real-to-fixed twiddle conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width in bits of every fixed-point component.
pub const COMPONENT_BITS: u32 = 16;

/// A Q-format descriptor: a 16-bit signed value `x` represents `x / 2^frac_bits`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QFormat {
    frac_bits: u32,
}

impl QFormat {
    /// Q1.15, scale 32768.
    pub const Q15: QFormat = QFormat { frac_bits: 15 };

    /// Builds a format from its scale factor.
    ///
    /// Returns `None` unless `scale` is a power of two no larger than `2^15`.
    pub fn from_scale(scale: u32) -> Option<Self> {
        if scale.is_power_of_two() && scale <= 1 << (COMPONENT_BITS - 1) {
            Some(Self {
                frac_bits: scale.trailing_zeros(),
            })
        } else {
            None
        }
    }

    /// Number of fractional bits, i.e. the shift that removes the scale.
    pub fn frac_bits(self) -> u32 {
        self.frac_bits
    }

    /// The scale factor `2^frac_bits`.
    pub fn scale(self) -> i32 {
        1 << self.frac_bits
    }

    /// Converts a real value to fixed point as `round(value * (scale - 1))`.
    ///
    /// Scaling by `scale - 1` keeps `1.0` representable. Out-of-range inputs
    /// saturate; NaN maps to zero.
    pub fn to_fixed(self, value: f64) -> i16 {
        (value * f64::from(self.scale() - 1)).round() as i16
    }

    /// Converts a fixed-point value back to a real number.
    pub fn to_real(self, value: i16) -> f64 {
        f64::from(value) / f64::from(self.scale())
    }
}

impl Default for QFormat {
    fn default() -> Self {
        Self::Q15
    }
}

/// A complex value with signed 16-bit real and imaginary components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComplexFx {
    /// Real component.
    pub re: i16,
    /// Imaginary component.
    pub im: i16,
}

/// The full-width result of a complex product, before scale removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WideComplex {
    /// Real component of the 32-bit accumulator.
    pub re: i32,
    /// Imaginary component of the 32-bit accumulator.
    pub im: i32,
}

impl ComplexFx {
    /// `0 + 0j`.
    pub const ZERO: ComplexFx = ComplexFx { re: 0, im: 0 };

    /// Creates a value from its components.
    pub const fn new(re: i16, im: i16) -> Self {
        Self { re, im }
    }

    /// Creates a value by truncating wider integers to 16 bits, the way a
    /// 16-bit port would capture them.
    pub fn from_wrapped(re: i64, im: i64) -> Self {
        Self {
            re: re as i16,
            im: im as i16,
        }
    }

    /// Component-wise 16-bit wrapping addition.
    pub fn wrapping_add(self, rhs: Self) -> Self {
        Self {
            re: self.re.wrapping_add(rhs.re),
            im: self.im.wrapping_add(rhs.im),
        }
    }

    /// Component-wise 16-bit wrapping subtraction.
    pub fn wrapping_sub(self, rhs: Self) -> Self {
        Self {
            re: self.re.wrapping_sub(rhs.re),
            im: self.im.wrapping_sub(rhs.im),
        }
    }

    /// Component-wise arithmetic right shift (sign-extending, rounds toward
    /// negative infinity).
    pub fn shr(self, bits: u32) -> Self {
        Self {
            re: self.re >> bits,
            im: self.im >> bits,
        }
    }

    /// Complex product carried in 32-bit wrapping accumulators.
    ///
    /// Each partial product fits in 31 bits; only the final sum/difference
    /// can wrap, which happens solely for `-32768 * -32768` pairs.
    pub fn widening_mul(self, rhs: Self) -> WideComplex {
        let (ar, ai) = (i32::from(self.re), i32::from(self.im));
        let (br, bi) = (i32::from(rhs.re), i32::from(rhs.im));
        WideComplex {
            re: (ar * br).wrapping_sub(ai * bi),
            im: (ar * bi).wrapping_add(ai * br),
        }
    }

    /// Components as `[re, im]`.
    pub fn components(self) -> [i16; 2] {
        [self.re, self.im]
    }
}

impl WideComplex {
    /// Removes the scale with a truncating arithmetic shift and keeps the low
    /// 16 bits of each component.
    pub fn narrow(self, format: QFormat) -> ComplexFx {
        let shift = format.frac_bits();
        ComplexFx {
            re: (self.re >> shift) as i16,
            im: (self.im >> shift) as i16,
        }
    }
}

impl fmt::Display for ComplexFx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.re, self.im)
    }
}

impl From<(i16, i16)> for ComplexFx {
    fn from((re, im): (i16, i16)) -> Self {
        Self { re, im }
    }
}

/// A twiddle (rotation) factor. Immutable once built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Twiddle(ComplexFx);

impl Twiddle {
    /// Converts a real-valued `(cos, sin)` pair with [`QFormat::to_fixed`].
    pub fn from_cos_sin(cos: f64, sin: f64, format: QFormat) -> Self {
        Self(ComplexFx::new(format.to_fixed(cos), format.to_fixed(sin)))
    }

    /// The twiddle `e^{j*theta}`.
    pub fn from_angle(theta: f64, format: QFormat) -> Self {
        Self::from_cos_sin(theta.cos(), theta.sin(), format)
    }

    /// Uses raw fixed-point components as-is.
    pub fn from_raw(re: i16, im: i16) -> Self {
        Self(ComplexFx::new(re, im))
    }

    /// The underlying fixed-point value.
    pub fn value(self) -> ComplexFx {
        self.0
    }
}

impl fmt::Display for Twiddle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn q15_scale() {
        assert_eq!(QFormat::Q15.scale(), 32768);
        assert_eq!(QFormat::Q15.frac_bits(), 15);
        assert_eq!(QFormat::default(), QFormat::Q15);
    }

    #[test]
    fn from_scale_accepts_powers_of_two() {
        assert_eq!(QFormat::from_scale(32768), Some(QFormat::Q15));
        assert_eq!(QFormat::from_scale(256).map(QFormat::frac_bits), Some(8));
        assert_eq!(QFormat::from_scale(30000), None);
        assert_eq!(QFormat::from_scale(65536), None);
        assert_eq!(QFormat::from_scale(0), None);
    }

    #[test]
    fn to_fixed_rounds_with_scale_minus_one() {
        let q = QFormat::Q15;
        assert_eq!(q.to_fixed(1.0), 32767);
        assert_eq!(q.to_fixed(-1.0), -32767);
        assert_eq!(q.to_fixed(0.0), 0);
        // 0.707 * 32767 = 23166.269
        assert_eq!(q.to_fixed(0.707), 23166);
        // 0.5 * 32767 = 16383.5 rounds away from zero
        assert_eq!(q.to_fixed(0.5), 16384);
        assert_eq!(q.to_fixed(-0.5), -16384);
    }

    #[test]
    fn to_fixed_saturates_and_maps_nan_to_zero() {
        let q = QFormat::Q15;
        assert_eq!(q.to_fixed(3.0), i16::MAX);
        assert_eq!(q.to_fixed(-3.0), i16::MIN);
        assert_eq!(q.to_fixed(f64::NAN), 0);
    }

    #[test]
    fn to_real() {
        assert_eq!(QFormat::Q15.to_real(16384), 0.5);
        assert_eq!(QFormat::Q15.to_real(-32768), -1.0);
    }

    #[test]
    fn wrapping_add_wraps_instead_of_saturating() {
        let a = ComplexFx::new(30000, 0);
        let sum = a.wrapping_add(a);
        // 60000 - 65536
        assert_eq!(sum, ComplexFx::new(-5536, 0));
    }

    #[test]
    fn wrapping_sub_wraps() {
        let a = ComplexFx::new(i16::MIN, 0);
        let b = ComplexFx::new(1, 0);
        assert_eq!(a.wrapping_sub(b), ComplexFx::new(i16::MAX, 0));
    }

    #[test]
    fn shr_preserves_sign() {
        let v = ComplexFx::new(-3, 7);
        assert_eq!(v.shr(1), ComplexFx::new(-2, 3));
        assert_eq!(ComplexFx::new(-1, -1).shr(1), ComplexFx::new(-1, -1));
    }

    #[test]
    fn widening_mul_is_complex_product() {
        let d = ComplexFx::new(3, 4);
        let w = ComplexFx::new(5, -2);
        // (3+4j)(5-2j) = 15 - 6j + 20j + 8 = 23 + 14j
        assert_eq!(d.widening_mul(w), WideComplex { re: 23, im: 14 });
    }

    #[test]
    fn widening_mul_wraps_accumulator() {
        let d = ComplexFx::new(i16::MIN, i16::MIN);
        let w = ComplexFx::new(i16::MIN, i16::MIN);
        let p = d.widening_mul(w);
        assert_eq!(p.re, 0);
        // 2^30 + 2^30 = 2^31 wraps to i32::MIN
        assert_eq!(p.im, i32::MIN);
    }

    #[test]
    fn narrow_truncates_toward_negative_infinity() {
        let wide = WideComplex {
            re: 500 * 32767,
            im: -500 * 32767,
        };
        assert_eq!(wide.narrow(QFormat::Q15), ComplexFx::new(499, -500));
    }

    #[test]
    fn narrow_keeps_low_sixteen_bits() {
        let wide = WideComplex {
            re: 40000 << 15,
            im: 0,
        };
        assert_eq!(wide.narrow(QFormat::Q15).re, (40000 - 65536) as i16);
    }

    #[test]
    fn from_wrapped_truncates() {
        assert_eq!(ComplexFx::from_wrapped(65535, -65537), ComplexFx::new(-1, -1));
    }

    #[test]
    fn twiddle_identity_and_quarter_turn() {
        let q = QFormat::Q15;
        assert_eq!(Twiddle::from_angle(0.0, q).value(), ComplexFx::new(32767, 0));
        assert_eq!(
            Twiddle::from_angle(FRAC_PI_2, q).value(),
            ComplexFx::new(0, 32767)
        );
        let w45 = Twiddle::from_angle(FRAC_PI_4, q).value();
        assert_eq!(w45, ComplexFx::new(23170, 23170));
    }

    #[test]
    fn twiddle_raw_is_unchanged() {
        assert_eq!(Twiddle::from_raw(-5, 9).value(), ComplexFx::new(-5, 9));
    }

    #[test]
    fn display() {
        assert_eq!(ComplexFx::new(1000, -500).to_string(), "(1000, -500)");
        assert_eq!(Twiddle::from_raw(0, 1).to_string(), "(0, 1)");
    }

    #[test]
    fn serde_roundtrip() {
        let v = ComplexFx::new(-123, 456);
        let json = serde_json::to_string(&v).unwrap();
        let back: ComplexFx = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
