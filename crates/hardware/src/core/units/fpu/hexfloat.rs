//! Excess-64 base-16 floating point.
//!
//! A value is a sign, a 7-bit exponent biased by 64 and a base-16 fraction
//! (24 bits single, 56 bits double): `0.fraction * 16^(exp - 64)`. Negative
//! values are the two's complement of the whole positive word. Results are
//! normalized and truncated.
//!
//! Arithmetic goes through `f64`, so double precision results carry at most 53
//! significant bits instead of 56.

use crate::core::arch::psd::psd1;
use crate::core::units::alu::cc_of;

use super::{FloatResult, FloatUnit};

const SINGLE_FRACTION: u32 = 24;
const DOUBLE_FRACTION: u32 = 56;
const EXPONENT_BIAS: i32 = 64;
const EXPONENT_MAX: i32 = 0x7F;

/// Reference [`FloatUnit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HexFloat;

const fn width_mask(fraction: u32) -> u64 {
    if fraction + 8 >= 64 {
        u64::MAX
    } else {
        (1u64 << (fraction + 8)) - 1
    }
}

/// Decodes a guest word holding `fraction` fraction bits.
pub fn decode(word: u64, fraction: u32) -> f64 {
    let mask = width_mask(fraction);
    let word = word & mask;
    let sign_bit = 1u64 << (fraction + 7);
    let negative = word & sign_bit != 0;
    let magnitude = if negative { word.wrapping_neg() & mask } else { word };
    if magnitude & !sign_bit == 0 {
        return 0.0;
    }
    let exp = ((magnitude >> fraction) & 0x7F) as i32 - EXPONENT_BIAS;
    let frac = (magnitude & ((1u64 << fraction) - 1)) as f64 / (1u64 << fraction) as f64;
    let value = frac * 16f64.powi(exp);
    if negative { -value } else { value }
}

/// Encodes `value` with `fraction` fraction bits.
///
/// # Returns
///
/// The guest word and its condition codes. Exponent overflow saturates to the
/// largest magnitude and sets CC1; underflow yields zero with CC1 and CC4.
pub fn encode(value: f64, fraction: u32) -> FloatResult<u64> {
    if value == 0.0 || value.is_nan() {
        return FloatResult {
            value: 0,
            cc: psd1::CC4,
        };
    }
    let negative = value < 0.0;
    let sign_cc = if negative { psd1::CC3 } else { psd1::CC2 };
    let one = 1u64 << fraction;
    let apply_sign = |word: u64| {
        if negative {
            word.wrapping_neg() & width_mask(fraction)
        } else {
            word
        }
    };

    let mut m = value.abs();
    let mut exp = EXPONENT_BIAS;
    if m.is_infinite() {
        exp = EXPONENT_MAX + 1;
    } else {
        while m >= 1.0 {
            m /= 16.0;
            exp += 1;
        }
        while m < 0.0625 {
            m *= 16.0;
            exp -= 1;
        }
    }
    let mut frac = (m * one as f64) as u64;
    if frac >= one {
        frac >>= 4;
        exp += 1;
    }

    if exp > EXPONENT_MAX {
        let largest = ((EXPONENT_MAX as u64) << fraction) | (one - 1);
        return FloatResult {
            value: apply_sign(largest),
            cc: psd1::CC1 | sign_cc,
        };
    }
    if exp < 0 {
        return FloatResult {
            value: 0,
            cc: psd1::CC1 | psd1::CC4,
        };
    }
    FloatResult {
        value: apply_sign(((exp as u64) << fraction) | frac),
        cc: sign_cc,
    }
}

fn single(value: f64) -> FloatResult<u32> {
    let r = encode(value, SINGLE_FRACTION);
    FloatResult {
        value: r.value as u32,
        cc: r.cc,
    }
}

fn double(value: f64) -> FloatResult<u64> {
    encode(value, DOUBLE_FRACTION)
}

fn divide(a: f64, b: f64, fraction: u32) -> FloatResult<u64> {
    if b == 0.0 {
        return FloatResult {
            value: 0,
            cc: psd1::CC1 | psd1::CC4,
        };
    }
    encode(a / b, fraction)
}

fn fix(value: f64, min: f64, max: f64) -> (i64, bool) {
    let t = value.trunc();
    if t < min {
        (min as i64, true)
    } else if t > max {
        (max as i64, true)
    } else {
        (t as i64, false)
    }
}

impl FloatUnit for HexFloat {
    fn add32(&self, a: u32, b: u32) -> FloatResult<u32> {
        single(decode(a.into(), SINGLE_FRACTION) + decode(b.into(), SINGLE_FRACTION))
    }

    fn sub32(&self, a: u32, b: u32) -> FloatResult<u32> {
        single(decode(a.into(), SINGLE_FRACTION) - decode(b.into(), SINGLE_FRACTION))
    }

    fn mul32(&self, a: u32, b: u32) -> FloatResult<u32> {
        single(decode(a.into(), SINGLE_FRACTION) * decode(b.into(), SINGLE_FRACTION))
    }

    fn div32(&self, a: u32, b: u32) -> FloatResult<u32> {
        let r = divide(
            decode(a.into(), SINGLE_FRACTION),
            decode(b.into(), SINGLE_FRACTION),
            SINGLE_FRACTION,
        );
        FloatResult {
            value: r.value as u32,
            cc: r.cc,
        }
    }

    fn fix32(&self, a: u32) -> FloatResult<u32> {
        let (int, overflow) = fix(
            decode(a.into(), SINGLE_FRACTION),
            f64::from(i32::MIN),
            f64::from(i32::MAX),
        );
        FloatResult {
            value: int as u32,
            cc: cc_of(int, overflow),
        }
    }

    fn float32(&self, a: u32) -> FloatResult<u32> {
        single(f64::from(a as i32))
    }

    fn add64(&self, a: u64, b: u64) -> FloatResult<u64> {
        double(decode(a, DOUBLE_FRACTION) + decode(b, DOUBLE_FRACTION))
    }

    fn sub64(&self, a: u64, b: u64) -> FloatResult<u64> {
        double(decode(a, DOUBLE_FRACTION) - decode(b, DOUBLE_FRACTION))
    }

    fn mul64(&self, a: u64, b: u64) -> FloatResult<u64> {
        double(decode(a, DOUBLE_FRACTION) * decode(b, DOUBLE_FRACTION))
    }

    fn div64(&self, a: u64, b: u64) -> FloatResult<u64> {
        divide(decode(a, DOUBLE_FRACTION), decode(b, DOUBLE_FRACTION), DOUBLE_FRACTION)
    }

    fn fix64(&self, a: u64) -> FloatResult<u64> {
        let (int, overflow) = fix(decode(a, DOUBLE_FRACTION), i64::MIN as f64, i64::MAX as f64);
        FloatResult {
            value: int as u64,
            cc: cc_of(int, overflow),
        }
    }

    fn float64(&self, a: u64) -> FloatResult<u64> {
        double(a as i64 as f64)
    }
}
