//! Logical and Physical address types.
//!
//! Programs issue logical addresses; the address translator turns them into
//! physical addresses into guest memory. Keeping the two apart at the type
//! level prevents a mapped-mode address from ever reaching memory untranslated.

/// A logical address as issued by an instruction (19 or 24 significant bits).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalAddr(pub u32);

/// A physical byte address in installed guest memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u32);

impl LogicalAddr {
    /// Creates a new logical address from a raw value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw address value.
    #[inline(always)]
    pub const fn val(&self) -> u32 {
        self.0
    }

    /// Returns the address of the word containing this byte.
    #[inline(always)]
    pub const fn word_aligned(&self) -> Self {
        Self(self.0 & !3)
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw address value.
    #[inline(always)]
    pub const fn val(&self) -> u32 {
        self.0
    }

    /// Index of the 32-bit word containing this address.
    #[inline(always)]
    pub const fn word_index(&self) -> usize {
        (self.0 >> 2) as usize
    }
}
