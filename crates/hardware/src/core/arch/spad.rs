//! Scratchpad Configuration Store.
//!
//! 256 words of configuration written by system software. A few slots have fixed
//! meaning (trap and interrupt table bases, master process list base and the
//! configuration key); `0x80 + level` holds the control word of each interrupt
//! level. Reset fills in defaults unless the configuration key is present.

use crate::common::constants::SPAD_SLOTS;

/// Slot holding the trap table base.
pub const TRAP_TABLE: usize = 0xF0;
/// Slot holding the interrupt table base.
pub const INTERRUPT_TABLE: usize = 0xF1;
/// Slot holding the master process list base.
pub const MASTER_LIST: usize = 0xF3;
/// Slot holding the configuration key.
pub const CONFIG_KEY: usize = 0xF7;
/// First per-interrupt-level control slot.
pub const LEVEL_BASE: usize = 0x80;

/// Controller state bits of a level control word.
pub const LEVEL_STATE_MASK: u32 = 0x7;

/// Value software writes to [`CONFIG_KEY`] once it owns the configuration.
pub const CONFIG_KEY_VALUE: u32 = 0xECDA_B897;

/// Reset default for the trap table base.
pub const DEFAULT_TRAP_TABLE: u32 = 0x80;
/// Reset default for the interrupt table base.
pub const DEFAULT_INTERRUPT_TABLE: u32 = 0x100;
/// Reset default for the master process list base.
pub const DEFAULT_MASTER_LIST: u32 = 0x400;

/// The scratchpad store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scratchpad {
    slots: [u32; SPAD_SLOTS],
}

impl Default for Scratchpad {
    fn default() -> Self {
        Self {
            slots: [0; SPAD_SLOTS],
        }
    }
}

impl Scratchpad {
    /// Reads slot `idx`.
    pub fn get(&self, idx: usize) -> u32 {
        self.slots[idx & 0xFF]
    }

    /// Writes slot `idx`.
    pub fn set(&mut self, idx: usize, val: u32) {
        self.slots[idx & 0xFF] = val;
    }

    /// Trap table base address.
    pub fn trap_table(&self) -> u32 {
        self.get(TRAP_TABLE)
    }

    /// Interrupt table base address.
    pub fn interrupt_table(&self) -> u32 {
        self.get(INTERRUPT_TABLE)
    }

    /// Master process list base address.
    pub fn master_list(&self) -> u32 {
        self.get(MASTER_LIST)
    }

    /// Control word of interrupt `level`.
    pub fn level_control(&self, level: usize) -> u32 {
        self.get(LEVEL_BASE + level)
    }

    /// Mirrors the controller state of `level` into the low bits of its control word.
    pub fn set_level_state(&mut self, level: usize, bits: u32) {
        let idx = LEVEL_BASE + level;
        if idx < SPAD_SLOTS {
            self.slots[idx] = (self.slots[idx] & !LEVEL_STATE_MASK) | (bits & LEVEL_STATE_MASK);
        }
    }

    /// True once software has installed its own configuration.
    pub fn configured(&self) -> bool {
        self.get(CONFIG_KEY) == CONFIG_KEY_VALUE
    }

    /// Reset behavior: defaults everywhere unless software configured the store.
    ///
    /// # Returns
    ///
    /// `true` if the existing configuration was preserved.
    pub fn reset(&mut self) -> bool {
        if self.configured() {
            return true;
        }
        self.slots = [0; SPAD_SLOTS];
        self.slots[TRAP_TABLE] = DEFAULT_TRAP_TABLE;
        self.slots[INTERRUPT_TABLE] = DEFAULT_INTERRUPT_TABLE;
        self.slots[MASTER_LIST] = DEFAULT_MASTER_LIST;
        false
    }
}
