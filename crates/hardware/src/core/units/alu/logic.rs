//! ALU logical and comparison operations.

use super::{AluOp, AluResult};
use crate::core::arch::psd::psd1;

/// Executes a bitwise operation; condition codes follow the signed result.
pub fn execute(op: AluOp, a: u32, b: u32) -> AluResult {
    let value = match op {
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        _ => a,
    };
    AluResult::word(value, false)
}

/// Arithmetic compare of `a` against `b`: CC2 if greater, CC3 if less, CC4 if equal.
pub const fn compare(a: u32, b: u32) -> u32 {
    let (a, b) = (a as i32, b as i32);
    if a > b {
        psd1::CC2
    } else if a < b {
        psd1::CC3
    } else {
        psd1::CC4
    }
}

/// Doubleword arithmetic compare.
pub const fn compare64(a: u64, b: u64) -> u32 {
    let (a, b) = (a as i64, b as i64);
    if a > b {
        psd1::CC2
    } else if a < b {
        psd1::CC3
    } else {
        psd1::CC4
    }
}

/// Masked compare: CC4 if `a` and `b` agree in every bit set in `mask`.
pub const fn masked_compare(a: u32, b: u32, mask: u32) -> u32 {
    if (a ^ b) & mask == 0 { psd1::CC4 } else { 0 }
}
