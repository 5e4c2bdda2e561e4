//! Architectural state components.
//!
//! This module contains the architecturally visible state of the processor:
//! 1. **PSD:** The program status doubleword and its field accessors.
//! 2. **Status:** CPUSTATUS, TRAPSTATUS and the derived mode flags.
//! 3. **Scratchpad:** The 256-slot configuration store.
//! 4. **Interrupts:** The prioritized interrupt level controller.
//! 5. **Models:** The CPU model catalogue and per-model quirks.

/// Prioritized interrupt levels.
pub mod interrupt;

/// CPU model catalogue.
pub mod model;

/// Program status doubleword.
pub mod psd;

/// Scratchpad configuration store.
pub mod spad;

/// CPU status, trap status and mode flags.
pub mod status;

pub use interrupt::InterruptLevels;
pub use model::{CpuModel, MapGeometry};
pub use psd::Psd;
pub use spad::Scratchpad;
pub use status::{CpuStatus, ModeFlags, TrapStatus};
