//! CPU status, trap status and mode flags.
//!
//! Three derived status words sit beside the PSD:
//! 1. **CPUSTATUS:** mirrors of the PSD mode bits plus blocking, waiting, software
//!    trap enable and the model identifier. Readable with `RDSTS`.
//! 2. **TRAPSTATUS:** the fault detail recorded for the next context block.
//! 3. **Mode flags:** the engine's cached view of the addressing modes, re-derived
//!    after every PSD load.

use super::psd::Psd;

/// CPUSTATUS bit masks.
pub mod cpu_status {
    /// Privileged state mirror.
    pub const PRIVILEGED: u32 = 0x8000_0000;
    /// Mapped mode mirror.
    pub const MAPPED: u32 = 0x4000_0000;
    /// Extended addressing mirror.
    pub const EXTENDED: u32 = 0x2000_0000;
    /// Base register mode mirror.
    pub const BASE_MODE: u32 = 0x1000_0000;
    /// Arithmetic exception enable mirror.
    pub const AEXP: u32 = 0x0800_0000;
    /// Interrupts blocked.
    pub const BLOCKED: u32 = 0x0000_0080;
    /// Software trap handling enabled.
    pub const TRAPS_ENABLED: u32 = 0x0000_0040;
    /// CPU is in the wait state.
    pub const WAITING: u32 = 0x0000_0020;
    /// Model identifier field.
    pub const MODEL_MASK: u32 = 0x0000_000F;
    /// Bits software may change with `SETCPU`.
    pub const SOFTWARE_MASK: u32 = TRAPS_ENABLED;
    /// Bits recomputed from the PSD on every load.
    pub const MIRROR_MASK: u32 = PRIVILEGED | MAPPED | EXTENDED | BASE_MODE | AEXP;
}

/// TRAPSTATUS bit masks.
pub mod trap_status {
    /// The map loader failed.
    pub const MAP_LOAD_ERROR: u32 = 0x8000_0000;
    /// Page index outside the loaded context, or invalid map.
    pub const MAP_INDEX: u32 = 0x4000_0000;
    /// Operand or instruction beyond installed memory.
    pub const NON_PRESENT: u32 = 0x2000_0000;
    /// Page table beyond installed memory.
    pub const TABLE_NON_PRESENT: u32 = 0x1000_0000;
    /// Access denied by map protection.
    pub const PROTECTION: u32 = 0x0800_0000;
    /// Demand page fault.
    pub const DEMAND_PAGE: u32 = 0x0400_0000;
    /// Fault occurred on instruction fetch (2048-map models only).
    pub const ON_FETCH: u32 = 0x0200_0000;
    /// Misaligned operand.
    pub const ADDR_SPEC: u32 = 0x0100_0000;
    /// Malformed page table configuration.
    pub const CONFIG_CHECK: u32 = 0x0080_0000;
    /// Undefined instruction.
    pub const UNDEFINED: u32 = 0x0000_0400;
    /// Privilege violation.
    pub const PRIVILEGE: u32 = 0x0000_0200;
    /// Entry came from `CALM` rather than `SVC`.
    pub const CALL_MONITOR: u32 = 0x0000_0100;
    /// Context block status for an interrupt entry; the low byte holds the level.
    pub const INTERRUPT: u32 = 0x0001_0000;
}

/// CPUSTATUS register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuStatus(pub u32);

impl CpuStatus {
    /// True if interrupts are blocked.
    pub const fn blocked(self) -> bool {
        self.0 & cpu_status::BLOCKED != 0
    }

    /// True once software has enabled trap handling.
    pub const fn traps_enabled(self) -> bool {
        self.0 & cpu_status::TRAPS_ENABLED != 0
    }

    /// Sets or clears a CPUSTATUS bit.
    pub fn set(&mut self, mask: u32, on: bool) {
        if on {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    /// Recomputes the PSD mirror bits.
    pub fn mirror(&mut self, psd: &Psd) {
        let mut bits = 0;
        if psd.privileged() {
            bits |= cpu_status::PRIVILEGED;
        }
        if psd.mapped() {
            bits |= cpu_status::MAPPED;
        }
        if psd.extended() {
            bits |= cpu_status::EXTENDED;
        }
        if psd.base_mode() {
            bits |= cpu_status::BASE_MODE;
        }
        if psd.aexp_enabled() {
            bits |= cpu_status::AEXP;
        }
        self.0 = (self.0 & !cpu_status::MIRROR_MASK) | bits;
    }
}

/// TRAPSTATUS register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrapStatus(pub u32);

impl TrapStatus {
    /// Clears every bit.
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Records additional fault detail.
    pub fn record(&mut self, bits: u32) {
        self.0 |= bits;
    }
}

/// Mode flags re-derived from the PSD and the blocking state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModeFlags {
    /// Privileged state.
    pub privileged: bool,
    /// Mapped mode.
    pub mapped: bool,
    /// Extended addressing.
    pub extended: bool,
    /// Base register mode.
    pub base: bool,
    /// Arithmetic exceptions trap.
    pub aexp: bool,
    /// Interrupts blocked.
    pub blocked: bool,
}

impl ModeFlags {
    /// Derives the mode flags from a PSD and the effective blocking state.
    pub const fn derive(psd: &Psd, blocked: bool) -> Self {
        Self {
            privileged: psd.privileged(),
            mapped: psd.mapped(),
            extended: psd.extended(),
            base: psd.base_mode(),
            aexp: psd.aexp_enabled(),
            blocked,
        }
    }

    /// True if logical addresses carry 24 significant bits.
    pub const fn wide_addressing(&self) -> bool {
        self.extended || self.base
    }
}
