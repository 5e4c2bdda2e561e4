//! Core processor implementation.
//!
//! This module contains the instruction engine and everything it owns: the
//! architecturally visible state, the integer and floating-point units, the
//! MMU and the trap and interrupt dispatcher.

/// Architectural state (PSD, status words, scratchpad, interrupt levels, models).
pub mod arch;

/// CPU core: instruction engine, protected memory access and dispatch.
pub mod cpu;

/// Execution units (ALU, FPU, MMU).
pub mod units;

pub use self::cpu::Cpu;
