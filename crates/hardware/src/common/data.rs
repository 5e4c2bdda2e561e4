//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used by the
//! translator and the protected access layer. The kind of access decides:
//! 1. **Permission Validation:** which right (read, write, execute) a map must grant.
//! 2. **Fault Reporting:** whether a fault is recorded as an instruction-fetch fault.
//! 3. **Access Tracking:** whether demand-paged maps get their modified bit set.

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Instruction fetch. Requires execute (or read) permission.
    Fetch,

    /// Operand read. Requires read permission.
    Read,

    /// Operand write. Requires write permission.
    Write,
}

impl AccessType {
    /// Returns true for [`AccessType::Write`].
    #[inline(always)]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }

    /// Returns true for [`AccessType::Fetch`].
    #[inline(always)]
    pub const fn is_fetch(self) -> bool {
        matches!(self, Self::Fetch)
    }
}
