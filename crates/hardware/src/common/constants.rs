//! Architectural Constants.
//!
//! This module defines constants shared across the emulator. It includes:
//! 1. **Memory Constants:** Address masks, memory ceiling and word size.
//! 2. **Register Constants:** Register file sizes.
//! 3. **Control Constants:** Reset entry point, interrupt level count and limits.

/// Mask for a 19-bit (non-extended) logical address.
pub const ADDR_MASK_19: u32 = 0x0007_FFFF;

/// Mask for a 24-bit (extended or base mode) logical address.
pub const ADDR_MASK_24: u32 = 0x00FF_FFFF;

/// Largest installable guest memory (16MB, the 24-bit physical space).
pub const MAX_MEMORY_BYTES: usize = 0x0100_0000;

/// Size of a memory word in bytes.
pub const WORD_BYTES: u32 = 4;

/// Number of general purpose registers.
pub const NUM_GPRS: usize = 8;

/// Number of base registers (base register mode).
pub const NUM_BASE_REGS: usize = 8;

/// Number of slots in the scratchpad configuration store.
pub const SPAD_SLOTS: usize = 256;

/// Number of prioritized interrupt levels.
pub const INTERRUPT_LEVELS: usize = 112;

/// Largest map count of any supported memory model.
pub const MAX_MAPS: usize = 2048;

/// Program counter loaded at reset.
pub const BOOT_ENTRY: u32 = 0x0000_0000;

/// Maximum number of links followed in an indirect address chain.
pub const INDIRECT_LIMIT: usize = 64;

/// Number of words in an interrupt/trap context block.
pub const CONTEXT_BLOCK_WORDS: u32 = 6;

/// Mask applied to a vector entry to obtain the context block address.
pub const CONTEXT_BLOCK_MASK: u32 = 0x00FF_FFFC;

/// Encoding of the halfword no-op (`NOP`).
pub const NOP_HALFWORD: u16 = 0x0002;
