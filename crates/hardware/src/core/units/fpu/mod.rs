//! Floating-Point Unit (FPU).
//!
//! The instruction engine treats floating point as an opaque collaborator:
//! it hands raw register or memory words to a [`FloatUnit`] and applies the
//! usual deferred arithmetic exception rule to the condition codes it gets
//! back (CC1 set means the result overflowed or underflowed).
//!
//! - [`hexfloat`]: reference implementation of the excess-64, base-16 format.

/// Excess-64 base-16 reference implementation.
pub mod hexfloat;

use std::fmt;

pub use self::hexfloat::HexFloat;

/// Result of a floating-point operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloatResult<T> {
    /// Result value in guest format.
    pub value: T,
    /// Condition codes in PSD1 position.
    pub cc: u32,
}

/// Floating-point arithmetic and conversion helpers.
///
/// Every operation takes and returns guest-format words: single precision in a
/// `u32`, double precision in a `u64` (register pair, even register high).
pub trait FloatUnit: fmt::Debug + Send {
    /// Single precision add.
    fn add32(&self, a: u32, b: u32) -> FloatResult<u32>;
    /// Single precision subtract (`a - b`).
    fn sub32(&self, a: u32, b: u32) -> FloatResult<u32>;
    /// Single precision multiply.
    fn mul32(&self, a: u32, b: u32) -> FloatResult<u32>;
    /// Single precision divide (`a / b`).
    fn div32(&self, a: u32, b: u32) -> FloatResult<u32>;
    /// Single precision float to integer word.
    fn fix32(&self, a: u32) -> FloatResult<u32>;
    /// Integer word to single precision float.
    fn float32(&self, a: u32) -> FloatResult<u32>;

    /// Double precision add.
    fn add64(&self, a: u64, b: u64) -> FloatResult<u64>;
    /// Double precision subtract (`a - b`).
    fn sub64(&self, a: u64, b: u64) -> FloatResult<u64>;
    /// Double precision multiply.
    fn mul64(&self, a: u64, b: u64) -> FloatResult<u64>;
    /// Double precision divide (`a / b`).
    fn div64(&self, a: u64, b: u64) -> FloatResult<u64>;
    /// Double precision float to integer doubleword.
    fn fix64(&self, a: u64) -> FloatResult<u64>;
    /// Integer doubleword to double precision float.
    fn float64(&self, a: u64) -> FloatResult<u64>;
}
