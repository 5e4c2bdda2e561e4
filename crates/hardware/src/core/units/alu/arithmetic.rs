//! ALU arithmetic operations.
//!
//! Two's complement add, subtract and negate on words and register pairs, a
//! word multiply producing a doubleword product, and a doubleword-by-word
//! divide. Overflow is reported, never trapped here.

use super::AluResult;

/// Word addition.
pub fn add32(a: u32, b: u32) -> AluResult {
    let (sum, overflow) = (a as i32).overflowing_add(b as i32);
    AluResult::word(sum as u32, overflow)
}

/// Word subtraction (`a - b`).
pub fn sub32(a: u32, b: u32) -> AluResult {
    let (diff, overflow) = (a as i32).overflowing_sub(b as i32);
    AluResult::word(diff as u32, overflow)
}

/// Doubleword addition.
pub fn add64(a: u64, b: u64) -> AluResult {
    let (sum, overflow) = (a as i64).overflowing_add(b as i64);
    AluResult::double(sum as u64, overflow)
}

/// Doubleword subtraction (`a - b`).
pub fn sub64(a: u64, b: u64) -> AluResult {
    let (diff, overflow) = (a as i64).overflowing_sub(b as i64);
    AluResult::double(diff as u64, overflow)
}

/// Word negation. Negating the most negative word overflows.
pub fn neg32(a: u32) -> AluResult {
    let (neg, overflow) = (a as i32).overflowing_neg();
    AluResult::word(neg as u32, overflow)
}

/// Word multiply producing a doubleword product; cannot overflow.
pub fn mul32(a: u32, b: u32) -> AluResult {
    let product = (a as i32 as i64) * (b as i32 as i64);
    AluResult::double(product as u64, false)
}

/// Quotient and remainder of a divide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DivResult {
    /// Quotient word.
    pub quotient: u32,
    /// Remainder word (sign of the dividend).
    pub remainder: u32,
    /// Condition codes of the quotient.
    pub cc: u32,
}

/// Doubleword by word divide.
///
/// # Returns
///
/// `None` on divide by zero or when the quotient does not fit in a word.
pub fn div64(dividend: u64, divisor: u32) -> Option<DivResult> {
    let divisor = divisor as i32 as i64;
    if divisor == 0 {
        return None;
    }
    let dividend = dividend as i64;
    let quotient = dividend.checked_div(divisor)?;
    let quotient = i32::try_from(quotient).ok()?;
    let remainder = dividend.checked_rem(divisor)? as i32;
    Some(DivResult {
        quotient: quotient as u32,
        remainder: remainder as u32,
        cc: super::cc_of(quotient as i64, false),
    })
}
