//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the integer ALU used by the opcode handlers. Every
//! operation returns its result together with the condition codes it produces
//! and an overflow flag; the engine decides whether the result is committed.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: add, subtract, negate, multiply, divide
//! - [`logic`]:      and, or, exclusive or, arithmetic and masked compare
//! - [`shifts`]:     arithmetic, logical and circular shifts, single and double

/// Integer arithmetic operations.
pub mod arithmetic;

/// Bitwise logical and comparison operations.
pub mod logic;

/// Shift operations.
pub mod shifts;

use crate::core::arch::psd::psd1;

/// Integer ALU operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// Two's complement addition.
    Add,
    /// Two's complement subtraction.
    Sub,
    /// Bitwise and.
    And,
    /// Bitwise or.
    Or,
    /// Bitwise exclusive or.
    Xor,
    /// Shift left arithmetic (sign bit kept).
    Sla,
    /// Shift left logical.
    Sll,
    /// Rotate left.
    Slc,
    /// Shift right arithmetic.
    Sra,
    /// Shift right logical.
    Srl,
    /// Rotate right.
    Src,
}

/// Result of an ALU operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AluResult {
    /// Result value (low 32 bits for word operations).
    pub value: u64,
    /// Condition codes in PSD1 position.
    pub cc: u32,
    /// Arithmetic overflow occurred.
    pub overflow: bool,
}

impl AluResult {
    /// Builds a word result with condition codes from its signed value.
    pub const fn word(value: u32, overflow: bool) -> Self {
        Self {
            value: value as u64,
            cc: cc_of(value as i32 as i64, overflow),
            overflow,
        }
    }

    /// Builds a doubleword result with condition codes from its signed value.
    pub const fn double(value: u64, overflow: bool) -> Self {
        Self {
            value,
            cc: cc_of(value as i64, overflow),
            overflow,
        }
    }

    /// Result as a 32-bit word.
    pub const fn low(self) -> u32 {
        self.value as u32
    }
}

/// Condition codes for a signed result: CC2 positive, CC3 negative, CC4 zero,
/// plus CC1 on overflow.
pub const fn cc_of(value: i64, overflow: bool) -> u32 {
    let sign = if value > 0 {
        psd1::CC2
    } else if value < 0 {
        psd1::CC3
    } else {
        psd1::CC4
    };
    if overflow { sign | psd1::CC1 } else { sign }
}

/// Integer ALU.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alu;

impl Alu {
    /// Executes a 32-bit operation.
    ///
    /// # Arguments
    ///
    /// * `op` - Operation.
    /// * `a` - First operand (the value shifted, for shifts).
    /// * `b` - Second operand (the shift count, for shifts).
    ///
    /// # Returns
    ///
    /// The result word, its condition codes and the overflow flag.
    pub fn execute(op: AluOp, a: u32, b: u32) -> AluResult {
        match op {
            AluOp::Add => arithmetic::add32(a, b),
            AluOp::Sub => arithmetic::sub32(a, b),
            AluOp::And | AluOp::Or | AluOp::Xor => logic::execute(op, a, b),
            AluOp::Sla | AluOp::Sll | AluOp::Slc | AluOp::Sra | AluOp::Srl | AluOp::Src => {
                shifts::execute(op, a, b)
            }
        }
    }

    /// Executes a 64-bit (register pair) operation.
    ///
    /// Logical operations and rotates have no doubleword form and return the
    /// first operand unchanged.
    pub fn execute_double(op: AluOp, a: u64, b: u64) -> AluResult {
        match op {
            AluOp::Add => arithmetic::add64(a, b),
            AluOp::Sub => arithmetic::sub64(a, b),
            AluOp::Sla | AluOp::Sll | AluOp::Sra | AluOp::Srl => {
                shifts::execute_double(op, a, b as u32)
            }
            _ => AluResult::double(a, false),
        }
    }
}
