//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the instruction formats, the opcode tables and the handlers of
//! every opcode group.
//!
//! # Formats
//!
//! * Halfword register instructions (op, R, R2, augment).
//! * Full-word memory reference instructions, non-base (X, I, F, 19-bit address)
//!   and base register (B, F, 16-bit displacement).
//! * Full-word immediate instructions (augment, 16-bit immediate).

/// Instruction disassembler for debug tracing and diagnostics.
pub mod disasm;

/// Opcode handlers, grouped by instruction class.
pub mod exec;

/// Instruction encoding structures and bit extraction utilities.
pub mod instruction;

/// Opcode tables for non-base and base register mode.
pub mod opcodes;
