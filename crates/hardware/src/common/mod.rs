//! Common utilities and types used throughout the emulator.
//!
//! This module provides fundamental building blocks shared by every component:
//! 1. **Address Types:** Strong types for logical and physical addresses.
//! 2. **Constants:** Architectural sizes, address masks and reset values.
//! 3. **Memory Access:** Classification of memory operations (Fetch/Read/Write).
//! 4. **Error Handling:** Memory faults, map-load errors, trap causes and halt reasons.
//! 5. **Register Management:** The general and base register files.

/// Address type definitions (logical and physical addresses).
pub mod addr;

/// Architectural constants.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types and trap definitions.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use addr::{LogicalAddr, PhysAddr};
pub use data::AccessType;
pub use error::{HaltReason, MapLoadError, MemoryFault, SimError, TrapCause};
pub use reg::RegisterFile;
