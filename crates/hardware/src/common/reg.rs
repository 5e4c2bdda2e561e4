//! General and Base Register Files.
//!
//! This module provides the `RegisterFile` struct holding the eight general
//! purpose registers and the eight base registers used in base register mode.
//! Doubleword instructions address an even/odd register pair with the even
//! register holding the most significant word.

use super::constants::{NUM_BASE_REGS, NUM_GPRS};

/// Combined general purpose and base register file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    gpr: [u32; NUM_GPRS],
    br: [u32; NUM_BASE_REGS],
}

impl RegisterFile {
    /// Creates a register file with every register cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads general register `idx` (0-7).
    #[inline(always)]
    pub fn read(&self, idx: usize) -> u32 {
        self.gpr[idx & 7]
    }

    /// Writes general register `idx` (0-7).
    #[inline(always)]
    pub fn write(&mut self, idx: usize, val: u32) {
        self.gpr[idx & 7] = val;
    }

    /// Reads the even/odd pair starting at `idx` as a 64-bit value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Even register index; the odd register holds the low word.
    pub fn read_pair(&self, idx: usize) -> u64 {
        let hi = self.read(idx) as u64;
        let lo = self.read(idx | 1) as u64;
        (hi << 32) | lo
    }

    /// Writes a 64-bit value to the even/odd pair starting at `idx`.
    pub fn write_pair(&mut self, idx: usize, val: u64) {
        self.write(idx, (val >> 32) as u32);
        self.write(idx | 1, val as u32);
    }

    /// Reads base register `idx` (0-7).
    #[inline(always)]
    pub fn read_base(&self, idx: usize) -> u32 {
        self.br[idx & 7]
    }

    /// Writes base register `idx` (0-7).
    #[inline(always)]
    pub fn write_base(&mut self, idx: usize, val: u32) {
        self.br[idx & 7] = val;
    }

    /// Clears every register.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Dumps both register files to stdout.
    pub fn dump(&self) {
        for i in (0..NUM_GPRS).step_by(2) {
            println!(
                "R{}={:#010x} R{}={:#010x}   B{}={:#010x} B{}={:#010x}",
                i,
                self.gpr[i],
                i + 1,
                self.gpr[i + 1],
                i,
                self.br[i],
                i + 1,
                self.br[i + 1]
            );
        }
    }
}
