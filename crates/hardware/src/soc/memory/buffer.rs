//! Word Buffer.
//!
//! Backing storage for guest memory: a flat vector of 32-bit words. Bytes and
//! halfwords are big-endian within a word (byte 0 is the most significant byte,
//! the left halfword is the most significant half). Callers bounds-check.

/// Word-granular backing store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordBuffer {
    words: Vec<u32>,
}

impl WordBuffer {
    /// Creates a zeroed buffer of `bytes` bytes (rounded down to whole words).
    pub fn new(bytes: usize) -> Self {
        Self {
            words: vec![0; bytes / 4],
        }
    }

    /// Size of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.words.len() * 4
    }

    /// True if the buffer holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Reads the word at word index `idx`.
    #[inline(always)]
    pub fn word(&self, idx: usize) -> u32 {
        self.words[idx]
    }

    /// Writes the word at word index `idx`.
    #[inline(always)]
    pub fn set_word(&mut self, idx: usize, val: u32) {
        self.words[idx] = val;
    }

    /// Reads the halfword at byte address `addr` (bit 1 selects the half).
    #[inline(always)]
    pub fn half(&self, addr: usize) -> u16 {
        let w = self.words[addr >> 2];
        if addr & 2 == 0 {
            (w >> 16) as u16
        } else {
            w as u16
        }
    }

    /// Writes the halfword at byte address `addr`.
    #[inline(always)]
    pub fn set_half(&mut self, addr: usize, val: u16) {
        let w = &mut self.words[addr >> 2];
        *w = if addr & 2 == 0 {
            (*w & 0x0000_FFFF) | ((val as u32) << 16)
        } else {
            (*w & 0xFFFF_0000) | val as u32
        };
    }

    /// Reads the byte at byte address `addr`.
    #[inline(always)]
    pub fn byte(&self, addr: usize) -> u8 {
        let shift = (3 - (addr & 3)) * 8;
        (self.words[addr >> 2] >> shift) as u8
    }

    /// Writes the byte at byte address `addr`.
    #[inline(always)]
    pub fn set_byte(&mut self, addr: usize, val: u8) {
        let shift = (3 - (addr & 3)) * 8;
        let w = &mut self.words[addr >> 2];
        *w = (*w & !(0xFF << shift)) | ((val as u32) << shift);
    }

    /// Clears the whole buffer.
    pub fn fill_zero(&mut self) {
        self.words.fill(0);
    }
}
