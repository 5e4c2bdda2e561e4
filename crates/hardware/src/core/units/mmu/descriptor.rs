//! Map Descriptors.
//!
//! A map descriptor is a 16-bit halfword describing one page. Three encodings
//! exist across the supported models:
//! 1. **Legacy:** valid bit, four quarter-page write-protect bits, 9-bit frame of 32KB.
//! 2. **Quarter-protected:** valid bit, four quarter-page write-protect bits, 11-bit frame of 8KB.
//! 3. **Paged:** valid, accessed and modified bits, a 2-bit protection code and an
//!    11-bit frame of 8KB. The protection code combined with the privilege state
//!    yields read/write/execute rights.

/// Descriptor bit masks.
pub mod bits {
    /// Map is valid.
    pub const VALID: u16 = 0x8000;
    /// Quarter-page write-protect bits (legacy and quarter-protected encodings).
    pub const QUARTER_PROTECT: u16 = 0x7800;
    /// Page has been accessed (paged encoding).
    pub const ACCESSED: u16 = 0x4000;
    /// Page has been written (paged encoding).
    pub const MODIFIED: u16 = 0x2000;
    /// Two-bit protection code (paged encoding).
    pub const PROTECTION: u16 = 0x1800;
    /// Shift of the protection code.
    pub const PROTECTION_SHIFT: u16 = 11;
    /// Frame number, 8KB frames.
    pub const FRAME_11: u16 = 0x07FF;
    /// Frame number, 32KB frames.
    pub const FRAME_9: u16 = 0x01FF;
}

/// Access rights granted by a map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rights {
    /// Operand reads allowed.
    pub read: bool,
    /// Operand writes allowed.
    pub write: bool,
    /// Instruction fetches allowed.
    pub execute: bool,
}

impl Rights {
    /// Every access allowed.
    pub const ALL: Self = Self {
        read: true,
        write: true,
        execute: true,
    };

    /// Read and execute only.
    pub const READ_EXECUTE: Self = Self {
        read: true,
        write: false,
        execute: true,
    };

    /// No access.
    pub const NONE: Self = Self {
        read: false,
        write: false,
        execute: false,
    };

    /// Packs the rights as an `rwx` 3-bit field.
    pub const fn bits(self) -> u8 {
        ((self.read as u8) << 2) | ((self.write as u8) << 1) | self.execute as u8
    }
}

/// Encoding used by a memory model's descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorFormat {
    /// 32/7x descriptors.
    Legacy,
    /// 32/27, 32/67 and 32/87 descriptors.
    QuarterProtected,
    /// 32/97, V6 and V9 descriptors.
    Paged,
}

impl DescriptorFormat {
    /// log2 of the page size.
    pub const fn page_shift(self) -> u32 {
        match self {
            Self::Legacy => 15,
            Self::QuarterProtected | Self::Paged => 13,
        }
    }

    /// Page size in bytes.
    pub const fn page_size(self) -> u32 {
        1 << self.page_shift()
    }

    const fn frame_mask(self) -> u16 {
        match self {
            Self::Legacy => bits::FRAME_9,
            Self::QuarterProtected | Self::Paged => bits::FRAME_11,
        }
    }
}

/// A raw map descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapDescriptor(pub u16);

impl MapDescriptor {
    /// True if the valid bit is set.
    #[inline(always)]
    pub const fn valid(self) -> bool {
        self.0 & bits::VALID != 0
    }

    /// Physical base address of the page.
    #[inline(always)]
    pub const fn frame_base(self, format: DescriptorFormat) -> u32 {
        ((self.0 & format.frame_mask()) as u32) << format.page_shift()
    }

    /// True if the accessed bit is set (paged encoding).
    pub const fn accessed(self) -> bool {
        self.0 & bits::ACCESSED != 0
    }

    /// True if the modified bit is set (paged encoding).
    pub const fn modified(self) -> bool {
        self.0 & bits::MODIFIED != 0
    }

    /// Two-bit protection code (paged encoding).
    pub const fn protection_code(self) -> u16 {
        (self.0 & bits::PROTECTION) >> bits::PROTECTION_SHIFT
    }

    /// True if the quarter page containing `offset` is write-protected.
    ///
    /// # Arguments
    ///
    /// * `offset` - Byte offset within the page.
    /// * `format` - Encoding, which fixes the page (and so the quarter) size.
    pub const fn quarter_protected(self, offset: u32, format: DescriptorFormat) -> bool {
        let quarter = (offset >> (format.page_shift() - 2)) & 3;
        self.0 & (0x4000 >> quarter) != 0
    }

    /// Rights granted by this descriptor for an access at `offset`.
    ///
    /// Quarter-protected encodings allow everything except unprivileged writes to a
    /// protected quarter. The paged encoding maps its protection code as:
    ///
    /// | code | privileged | unprivileged |
    /// |------|------------|--------------|
    /// | 0    | rwx        | rwx          |
    /// | 1    | rwx        | r-x          |
    /// | 2    | rwx        | ---          |
    /// | 3    | r-x        | ---          |
    pub const fn rights(self, offset: u32, privileged: bool, format: DescriptorFormat) -> Rights {
        match format {
            DescriptorFormat::Legacy | DescriptorFormat::QuarterProtected => {
                if !privileged && self.quarter_protected(offset, format) {
                    Rights::READ_EXECUTE
                } else {
                    Rights::ALL
                }
            }
            DescriptorFormat::Paged => match (self.protection_code(), privileged) {
                (0, _) | (1 | 2, true) => Rights::ALL,
                (1, false) | (3, true) => Rights::READ_EXECUTE,
                _ => Rights::NONE,
            },
        }
    }
}
