//! Interrupt Level Controller.
//!
//! Each of the 112 priority levels carries three bits: enabled, requested and
//! active. Level 0 has the highest priority. A level is delivered when it is
//! requested and enabled and no level of equal or higher priority is active.
//! I/O interrupts additionally carry the context block address supplied by
//! the channel subsystem.

use crate::common::constants::INTERRUPT_LEVELS;

const ENABLED: u8 = 0x1;
const REQUESTED: u8 = 0x2;
const ACTIVE: u8 = 0x4;

/// Per-level interrupt state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterruptLevels {
    levels: [u8; INTERRUPT_LEVELS],
    io_blocks: [Option<u32>; INTERRUPT_LEVELS],
}

impl Default for InterruptLevels {
    fn default() -> Self {
        Self {
            levels: [0; INTERRUPT_LEVELS],
            io_blocks: [None; INTERRUPT_LEVELS],
        }
    }
}

impl InterruptLevels {
    /// Zeroes every level.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Enables `level` (`EI`).
    pub fn enable(&mut self, level: usize) {
        self.levels[level] |= ENABLED;
    }

    /// Disables `level` (`DI`). A pending request stays pending.
    pub fn disable(&mut self, level: usize) {
        self.levels[level] &= !ENABLED;
    }

    /// Requests `level` (`RI`, or a channel interrupt carrying its own context block).
    pub fn request(&mut self, level: usize, context_block: Option<u32>) {
        self.levels[level] |= REQUESTED;
        if context_block.is_some() {
            self.io_blocks[level] = context_block;
        }
    }

    /// Marks `level` active without delivering it (`AI`).
    pub fn activate(&mut self, level: usize) {
        self.levels[level] |= ACTIVE;
    }

    /// Clears the active bit of `level` (`DAI`).
    pub fn deactivate(&mut self, level: usize) {
        self.levels[level] &= !ACTIVE;
    }

    /// Clears the active bit of the highest-priority active level (`BRI`).
    pub fn deactivate_highest(&mut self) -> Option<usize> {
        let level = self.levels.iter().position(|l| l & ACTIVE != 0)?;
        self.deactivate(level);
        Some(level)
    }

    /// Takes the next deliverable level, moving it from requested to active.
    ///
    /// # Returns
    ///
    /// The level and, for I/O interrupts, the context block supplied by the channel.
    pub fn take_deliverable(&mut self) -> Option<(usize, Option<u32>)> {
        for (level, bits) in self.levels.iter_mut().enumerate() {
            if *bits & ACTIVE != 0 {
                return None;
            }
            if *bits & (ENABLED | REQUESTED) == ENABLED | REQUESTED {
                *bits = (*bits & !REQUESTED) | ACTIVE;
                return Some((level, self.io_blocks[level].take()));
            }
        }
        None
    }

    /// Drops a pending request (used when the level has no usable context block).
    pub fn cancel(&mut self, level: usize) {
        self.levels[level] &= !(REQUESTED | ACTIVE);
        self.io_blocks[level] = None;
    }

    /// True if `level` is enabled.
    pub fn is_enabled(&self, level: usize) -> bool {
        self.levels[level] & ENABLED != 0
    }

    /// True if `level` has a pending request.
    pub fn is_requested(&self, level: usize) -> bool {
        self.levels[level] & REQUESTED != 0
    }

    /// True if `level` is active.
    pub fn is_active(&self, level: usize) -> bool {
        self.levels[level] & ACTIVE != 0
    }

    /// Raw enabled/requested/active bits of `level` (bit 0 enabled, 1 requested, 2 active).
    pub fn bits(&self, level: usize) -> u32 {
        u32::from(self.levels[level])
    }

    /// True if any level could be delivered now.
    pub fn has_deliverable(&self) -> bool {
        for bits in &self.levels {
            if bits & ACTIVE != 0 {
                return false;
            }
            if bits & (ENABLED | REQUESTED) == ENABLED | REQUESTED {
                return true;
            }
        }
        false
    }
}
