//! Execution units and functional components.
//!
//! This module contains the integer ALU, the floating-point collaborator
//! interface and the memory management unit with its map loader.

/// Arithmetic Logic Unit for integer operations.
pub mod alu;

/// Floating-point unit interface and reference implementation.
pub mod fpu;

/// Memory Management Unit with map cache and map loader.
pub mod mmu;
