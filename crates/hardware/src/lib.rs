//! SEL32 CPU emulator core.
//!
//! This crate implements an instruction-accurate model of the SEL 32-bit CPU
//! family with the following:
//! 1. **Core:** PSD, general and base registers, status words, the scratchpad and
//!    the interrupt level controller.
//! 2. **Memory:** Installed memory, the MMU with its four mapping models and the
//!    protected access layer.
//! 3. **ISA:** Halfword, memory reference, base register and immediate formats,
//!    with deferred arithmetic exceptions.
//! 4. **Dispatch:** Traps, interrupts and PSD loads through context blocks.
//! 5. **Simulation:** Image loading, the run loop, configuration and statistics.

/// Common types and constants (addresses, registers, faults, access types).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// CPU core (arch state, execution units, instruction engine, dispatch).
pub mod core;
/// Instruction set (formats, opcode tables, handlers, disassembler).
pub mod isa;
/// Image loader and run loop.
pub mod sim;
/// Installed memory and the I/O channel interface.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Main CPU type; holds the architectural state, MMU, memory and stats.
pub use crate::core::Cpu;
