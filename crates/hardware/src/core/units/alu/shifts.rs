//! ALU shift operations.
//!
//! Left arithmetic shifts keep the sign bit and report overflow when a bit
//! different from the sign is shifted out of bit 1. Shift counts are masked to
//! five bits for words and six bits for register pairs.

use super::{AluOp, AluResult};

const COUNT_MASK_32: u32 = 0x1F;
const COUNT_MASK_64: u32 = 0x3F;

/// Executes a word shift or rotate.
pub fn execute(op: AluOp, a: u32, count: u32) -> AluResult {
    let n = count & COUNT_MASK_32;
    match op {
        AluOp::Sla => {
            let wide = (a as i32 as i64) << n;
            let overflow = wide != (wide as i32 as i64);
            let value = (a & 0x8000_0000) | ((a << n) & 0x7FFF_FFFF);
            AluResult::word(value, overflow)
        }
        AluOp::Sll => AluResult::word(a << n, false),
        AluOp::Slc => AluResult::word(a.rotate_left(n), false),
        AluOp::Sra => AluResult::word(((a as i32) >> n) as u32, false),
        AluOp::Srl => AluResult::word(a >> n, false),
        AluOp::Src => AluResult::word(a.rotate_right(n), false),
        _ => AluResult::word(a, false),
    }
}

/// Executes a register pair shift.
pub fn execute_double(op: AluOp, a: u64, count: u32) -> AluResult {
    let n = count & COUNT_MASK_64;
    match op {
        AluOp::Sla => {
            let wide = (a as i64 as i128) << n;
            let overflow = wide != (wide as i64 as i128);
            let sign = a & 0x8000_0000_0000_0000;
            AluResult::double(sign | ((a << n) & 0x7FFF_FFFF_FFFF_FFFF), overflow)
        }
        AluOp::Sll => AluResult::double(a << n, false),
        AluOp::Sra => AluResult::double(((a as i64) >> n) as u64, false),
        AluOp::Srl => AluResult::double(a >> n, false),
        _ => AluResult::double(a, false),
    }
}
