//! Guest Physical Memory.
//!
//! This module implements installed guest memory. It provides:
//! 1. **Buffer:** Word-granular big-endian backing storage.
//! 2. **Bounds:** Every accessor reports addresses beyond installed memory as `None`
//!    so that the caller can raise a non-present memory fault.
//! 3. **Image Loading:** Copying raw images into memory at a byte address.
//!
//! Accesses here are physical; translation and protection live in the MMU and
//! the CPU's protected access layer.

/// Word buffer backing storage.
pub mod buffer;

use self::buffer::WordBuffer;
use crate::common::constants::MAX_MEMORY_BYTES;
use crate::common::{PhysAddr, SimError};

/// Installed guest memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MainMemory {
    buffer: WordBuffer,
}

impl MainMemory {
    /// Creates zeroed memory of `bytes` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MemorySize`] if the size is zero, not a multiple of
    /// 8KB, or larger than the 16MB physical space.
    pub fn new(bytes: usize) -> Result<Self, SimError> {
        if bytes == 0 || bytes % 0x2000 != 0 || bytes > MAX_MEMORY_BYTES {
            return Err(SimError::MemorySize(bytes));
        }
        Ok(Self {
            buffer: WordBuffer::new(bytes),
        })
    }

    /// Installed size in bytes.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// True if `len` bytes starting at `addr` are all installed.
    #[inline(always)]
    pub fn contains(&self, addr: u32, len: u32) -> bool {
        (addr as usize).saturating_add(len as usize) <= self.buffer.len()
    }

    /// Reads the word containing `addr`.
    pub fn read_word(&self, addr: PhysAddr) -> Option<u32> {
        self.contains(addr.val() & !3, 4)
            .then(|| self.buffer.word(addr.word_index()))
    }

    /// Writes the word containing `addr`. Returns `None` beyond installed memory.
    pub fn write_word(&mut self, addr: PhysAddr, val: u32) -> Option<()> {
        if !self.contains(addr.val() & !3, 4) {
            return None;
        }
        self.buffer.set_word(addr.word_index(), val);
        Some(())
    }

    /// Reads the halfword at `addr` (bit 0 ignored).
    pub fn read_half(&self, addr: PhysAddr) -> Option<u16> {
        let a = addr.val() & !1;
        self.contains(a, 2).then(|| self.buffer.half(a as usize))
    }

    /// Writes the halfword at `addr` (bit 0 ignored).
    pub fn write_half(&mut self, addr: PhysAddr, val: u16) -> Option<()> {
        let a = addr.val() & !1;
        if !self.contains(a, 2) {
            return None;
        }
        self.buffer.set_half(a as usize, val);
        Some(())
    }

    /// Reads the byte at `addr`.
    pub fn read_byte(&self, addr: PhysAddr) -> Option<u8> {
        self.contains(addr.val(), 1)
            .then(|| self.buffer.byte(addr.val() as usize))
    }

    /// Writes the byte at `addr`.
    pub fn write_byte(&mut self, addr: PhysAddr, val: u8) -> Option<()> {
        if !self.contains(addr.val(), 1) {
            return None;
        }
        self.buffer.set_byte(addr.val() as usize, val);
        Some(())
    }

    /// Copies a raw big-endian image into memory at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ImageTooLarge`] if the image does not fit.
    pub fn load(&mut self, addr: u32, data: &[u8]) -> Result<(), SimError> {
        let fits = u32::try_from(data.len())
            .ok()
            .is_some_and(|len| self.contains(addr, len));
        if !fits {
            return Err(SimError::ImageTooLarge {
                size: data.len(),
                addr,
                memory: self.size(),
            });
        }
        for (i, byte) in data.iter().enumerate() {
            self.buffer.set_byte(addr as usize + i, *byte);
        }
        Ok(())
    }

    /// Writes consecutive words starting at `addr` (word aligned).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ImageTooLarge`] if the words do not fit.
    pub fn load_words(&mut self, addr: u32, words: &[u32]) -> Result<(), SimError> {
        let len = words.len().saturating_mul(4);
        if !u32::try_from(len).is_ok_and(|l| self.contains(addr & !3, l)) {
            return Err(SimError::ImageTooLarge {
                size: len,
                addr,
                memory: self.size(),
            });
        }
        let base = (addr >> 2) as usize;
        for (i, w) in words.iter().enumerate() {
            self.buffer.set_word(base + i, *w);
        }
        Ok(())
    }

    /// Zeroes all of memory.
    pub fn clear(&mut self) {
        self.buffer.fill_zero();
    }
}
