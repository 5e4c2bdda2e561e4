//! Program Status Doubleword.
//!
//! The PSD is the pair of 32-bit words that fully describe the running context:
//! 1. **PSD1:** privilege, condition codes, addressing mode bits and the program counter.
//! 2. **PSD2:** mapped mode, the current process index (CPIX) and the retain/blocking directives.
//!
//! Both words stay plain integers so that they can be stored to and loaded from
//! context blocks verbatim; every field is reached through an accessor.

/// PSD1 field masks.
pub mod psd1 {
    /// Privileged state.
    pub const PRIVILEGED: u32 = 0x8000_0000;
    /// Condition code 1 (overflow).
    pub const CC1: u32 = 0x4000_0000;
    /// Condition code 2 (greater than zero).
    pub const CC2: u32 = 0x2000_0000;
    /// Condition code 3 (less than zero).
    pub const CC3: u32 = 0x1000_0000;
    /// Condition code 4 (zero).
    pub const CC4: u32 = 0x0800_0000;
    /// All four condition codes.
    pub const CC_MASK: u32 = CC1 | CC2 | CC3 | CC4;
    /// Arithmetic exception trap enable.
    pub const AEXP: u32 = 0x0400_0000;
    /// Extended (24-bit) addressing.
    pub const EXTENDED: u32 = 0x0200_0000;
    /// Base register mode.
    pub const BASE_MODE: u32 = 0x0100_0000;
    /// Program counter (bit 30 selects the right halfword).
    pub const PC_MASK: u32 = 0x00FF_FFFE;
    /// The last instruction executed was a halfword instruction.
    pub const HALF_EXECUTED: u32 = 0x0000_0001;
}

/// PSD2 field masks.
pub mod psd2 {
    /// Mapped mode.
    pub const MAPPED: u32 = 0x8000_0000;
    /// Keep the current maps when this PSD is loaded.
    pub const RETAIN_MAPS: u32 = 0x0001_0000;
    /// Keep the current blocking state when this PSD is loaded.
    pub const RETAIN_BLOCKING: u32 = 0x0000_8000;
    /// Enter blocked mode when this PSD is loaded.
    pub const SET_BLOCKED: u32 = 0x0000_4000;
    /// Current process index, as a byte offset into the master process list.
    pub const CPIX_MASK: u32 = 0x0000_3FF8;
}

/// A program status doubleword.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Psd {
    /// First word: state, condition codes and program counter.
    pub word1: u32,
    /// Second word: mapping and process context.
    pub word2: u32,
}

impl Psd {
    /// Creates a PSD from its two raw words.
    pub const fn new(word1: u32, word2: u32) -> Self {
        Self { word1, word2 }
    }

    /// Program counter (byte address).
    #[inline(always)]
    pub const fn pc(&self) -> u32 {
        self.word1 & psd1::PC_MASK
    }

    /// Replaces the program counter, leaving every other field intact.
    #[inline(always)]
    pub fn set_pc(&mut self, pc: u32) {
        self.word1 = (self.word1 & !psd1::PC_MASK) | (pc & psd1::PC_MASK);
    }

    /// Condition codes, in place (`CC1..CC4` masks).
    #[inline(always)]
    pub const fn cc(&self) -> u32 {
        self.word1 & psd1::CC_MASK
    }

    /// Replaces all four condition codes.
    #[inline(always)]
    pub fn set_cc(&mut self, cc: u32) {
        self.word1 = (self.word1 & !psd1::CC_MASK) | (cc & psd1::CC_MASK);
    }

    /// True in the privileged state.
    pub const fn privileged(&self) -> bool {
        self.word1 & psd1::PRIVILEGED != 0
    }

    /// True if arithmetic exceptions trap.
    pub const fn aexp_enabled(&self) -> bool {
        self.word1 & psd1::AEXP != 0
    }

    /// Sets or clears the arithmetic exception enable.
    pub fn set_aexp(&mut self, on: bool) {
        self.set1(psd1::AEXP, on);
    }

    /// True with extended addressing on.
    pub const fn extended(&self) -> bool {
        self.word1 & psd1::EXTENDED != 0
    }

    /// Sets or clears extended addressing.
    pub fn set_extended(&mut self, on: bool) {
        self.set1(psd1::EXTENDED, on);
    }

    /// True in base register mode.
    pub const fn base_mode(&self) -> bool {
        self.word1 & psd1::BASE_MODE != 0
    }

    /// True if the last instruction executed was a halfword instruction.
    pub const fn half_executed(&self) -> bool {
        self.word1 & psd1::HALF_EXECUTED != 0
    }

    /// Sets or clears the last-instruction-half bit.
    pub fn set_half_executed(&mut self, on: bool) {
        self.set1(psd1::HALF_EXECUTED, on);
    }

    /// True in mapped mode.
    pub const fn mapped(&self) -> bool {
        self.word2 & psd2::MAPPED != 0
    }

    /// CPIX as a byte offset into the master process list.
    pub const fn cpix(&self) -> u32 {
        self.word2 & psd2::CPIX_MASK
    }

    /// Replaces the CPIX field.
    pub fn set_cpix(&mut self, cpix: u32) {
        self.word2 = (self.word2 & !psd2::CPIX_MASK) | (cpix & psd2::CPIX_MASK);
    }

    /// True if loading this PSD keeps the current maps.
    pub const fn retain_maps(&self) -> bool {
        self.word2 & psd2::RETAIN_MAPS != 0
    }

    /// True if loading this PSD keeps the current blocking state.
    pub const fn retain_blocking(&self) -> bool {
        self.word2 & psd2::RETAIN_BLOCKING != 0
    }

    /// True if loading this PSD requests blocked mode.
    pub const fn set_blocked(&self) -> bool {
        self.word2 & psd2::SET_BLOCKED != 0
    }

    /// Returns the live form of this PSD: retain directives cleared and the
    /// set-blocked bit reflecting the effective blocking state.
    pub const fn normalized(self, blocked: bool) -> Self {
        let mut w2 = self.word2 & !(psd2::RETAIN_MAPS | psd2::RETAIN_BLOCKING | psd2::SET_BLOCKED);
        if blocked {
            w2 |= psd2::SET_BLOCKED;
        }
        Self {
            word1: self.word1,
            word2: w2,
        }
    }

    fn set1(&mut self, mask: u32, on: bool) {
        if on {
            self.word1 |= mask;
        } else {
            self.word1 &= !mask;
        }
    }
}
