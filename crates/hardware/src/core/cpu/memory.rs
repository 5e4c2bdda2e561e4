//! Protected Memory Access.
//!
//! This module layers every logical memory access of the instruction engine on
//! top of the MMU. It performs the following:
//! 1. **Alignment:** Halfword, word and doubleword accesses must be naturally aligned.
//! 2. **Translation:** Logical addresses go through the MMU of the current context.
//! 3. **Protection:** Fetches and reads need read or execute rights; writes need write.
//! 4. **Access Tracking:** Demand-paged maps get their accessed/modified bits set.
//! 5. **Fault Recording:** Every fault is recorded in TRAPSTATUS before it is
//!    returned as the trap cause to dispatch.
//!
//! Multi-word writes translate and check every word before storing any of them.

use crate::common::constants::WORD_BYTES;
use crate::common::{AccessType, MapLoadError, MemoryFault, PhysAddr, TrapCause};
use crate::core::arch::status::trap_status;
use crate::core::units::mmu::Translation;
use crate::isa::instruction::{MemRef, OperandSize};

use super::Cpu;

impl Cpu {
    /// Translates and checks one logical access.
    ///
    /// # Arguments
    ///
    /// * `addr` - Logical byte address.
    /// * `access` - Kind of access, which selects the right to check.
    ///
    /// # Returns
    ///
    /// The physical address, or the trap cause after recording the fault.
    pub fn translate(&mut self, addr: u32, access: AccessType) -> Result<PhysAddr, TrapCause> {
        let t = self.translate_unmarked(addr, access)?;
        self.mark_used(t, access);
        Ok(t.paddr)
    }

    /// Translates and checks one access without touching accessed/modified bits.
    fn translate_unmarked(
        &mut self,
        addr: u32,
        access: AccessType,
    ) -> Result<Translation, TrapCause> {
        self.translate_checked(addr, access)
            .map_err(|fault| self.record_fault(fault, access))
    }

    fn translate_checked(
        &mut self,
        addr: u32,
        access: AccessType,
    ) -> Result<Translation, MemoryFault> {
        let t = self
            .mmu
            .translate(addr, access, self.state.modes, &self.memory)?;
        let allowed = if access.is_write() {
            t.rights.write
        } else {
            t.rights.read || t.rights.execute
        };
        if !allowed {
            return Err(MemoryFault::Protection { addr, access });
        }
        Ok(t)
    }

    fn mark_used(&mut self, t: Translation, access: AccessType) {
        if let Some(index) = t.map_index {
            self.mmu.record_access(index, access.is_write(), &mut self.memory);
        }
    }

    fn aligned(&mut self, addr: u32, bytes: u32, access: AccessType) -> Result<(), TrapCause> {
        if addr & (bytes - 1) == 0 {
            Ok(())
        } else {
            Err(self.record_fault(MemoryFault::AddressSpecification { addr }, access))
        }
    }

    fn absent(&mut self, paddr: PhysAddr, access: AccessType) -> TrapCause {
        self.record_fault(MemoryFault::NonPresentMemory { addr: paddr.val() }, access)
    }

    /// Records `fault` in TRAPSTATUS and converts it into its trap cause.
    pub fn record_fault(&mut self, fault: MemoryFault, access: AccessType) -> TrapCause {
        let bits = match fault {
            MemoryFault::NonPresentMemory { .. } => trap_status::NON_PRESENT,
            MemoryFault::MapFault { .. } => trap_status::MAP_INDEX,
            MemoryFault::DemandPage { .. } => {
                self.stats.demand_page_faults += 1;
                trap_status::DEMAND_PAGE
            }
            MemoryFault::Protection { .. } => trap_status::PROTECTION,
            MemoryFault::AddressSpecification { .. } => trap_status::ADDR_SPEC,
            MemoryFault::MapLoad(err) => map_load_status(err),
        };
        let on_fetch = if access.is_fetch() && self.model.reports_fetch_faults() {
            trap_status::ON_FETCH
        } else {
            0
        };
        self.state.trap_status.record(bits | on_fetch);
        fault.into()
    }

    /// Records a map loader failure in TRAPSTATUS and converts it into its trap cause.
    pub fn record_map_load(&mut self, err: MapLoadError) -> TrapCause {
        self.state.trap_status.record(map_load_status(err));
        err.into()
    }

    /// Fetches the instruction word containing `pc`.
    pub fn fetch(&mut self, pc: u32) -> Result<u32, TrapCause> {
        self.read_word(pc & !3, AccessType::Fetch)
    }

    /// Reads a word.
    pub fn read_word(&mut self, addr: u32, access: AccessType) -> Result<u32, TrapCause> {
        self.aligned(addr, 4, access)?;
        let paddr = self.translate(addr, access)?;
        self.memory
            .read_word(paddr)
            .ok_or_else(|| self.absent(paddr, access))
    }

    /// Reads a halfword.
    pub fn read_half(&mut self, addr: u32) -> Result<u16, TrapCause> {
        self.aligned(addr, 2, AccessType::Read)?;
        let paddr = self.translate(addr, AccessType::Read)?;
        self.memory
            .read_half(paddr)
            .ok_or_else(|| self.absent(paddr, AccessType::Read))
    }

    /// Reads a byte.
    pub fn read_byte(&mut self, addr: u32) -> Result<u8, TrapCause> {
        let paddr = self.translate(addr, AccessType::Read)?;
        self.memory
            .read_byte(paddr)
            .ok_or_else(|| self.absent(paddr, AccessType::Read))
    }

    /// Reads a doubleword (even word most significant).
    pub fn read_double(&mut self, addr: u32) -> Result<u64, TrapCause> {
        self.aligned(addr, 8, AccessType::Read)?;
        let hi = self.read_word(addr, AccessType::Read)?;
        let lo = self.read_word(addr.wrapping_add(WORD_BYTES), AccessType::Read)?;
        Ok((u64::from(hi) << 32) | u64::from(lo))
    }

    /// Writes a word.
    pub fn write_word(&mut self, addr: u32, val: u32) -> Result<(), TrapCause> {
        self.aligned(addr, 4, AccessType::Write)?;
        let paddr = self.translate(addr, AccessType::Write)?;
        self.memory
            .write_word(paddr, val)
            .ok_or_else(|| self.absent(paddr, AccessType::Write))
    }

    /// Writes a halfword.
    pub fn write_half(&mut self, addr: u32, val: u16) -> Result<(), TrapCause> {
        self.aligned(addr, 2, AccessType::Write)?;
        let paddr = self.translate(addr, AccessType::Write)?;
        self.memory
            .write_half(paddr, val)
            .ok_or_else(|| self.absent(paddr, AccessType::Write))
    }

    /// Writes a byte.
    pub fn write_byte(&mut self, addr: u32, val: u8) -> Result<(), TrapCause> {
        let paddr = self.translate(addr, AccessType::Write)?;
        self.memory
            .write_byte(paddr, val)
            .ok_or_else(|| self.absent(paddr, AccessType::Write))
    }

    /// Writes a doubleword. Both words are checked before either is stored.
    pub fn write_double(&mut self, addr: u32, val: u64) -> Result<(), TrapCause> {
        self.aligned(addr, 8, AccessType::Write)?;
        self.write_block(addr, &[(val >> 32) as u32, val as u32])
    }

    /// Writes consecutive words starting at `addr`. Every word is translated
    /// and checked before any page is marked or any word is stored.
    pub fn write_block(&mut self, addr: u32, words: &[u32]) -> Result<(), TrapCause> {
        self.aligned(addr, 4, AccessType::Write)?;
        let mut targets = Vec::with_capacity(words.len());
        for i in 0..words.len() as u32 {
            let t = self.translate_unmarked(addr.wrapping_add(i * WORD_BYTES), AccessType::Write)?;
            if !self.memory.contains(t.paddr.val(), WORD_BYTES) {
                return Err(self.absent(t.paddr, AccessType::Write));
            }
            targets.push(t);
        }
        for (t, val) in targets.into_iter().zip(words) {
            self.mark_used(t, AccessType::Write);
            self.memory
                .write_word(t.paddr, *val)
                .ok_or_else(|| self.absent(t.paddr, AccessType::Write))?;
        }
        Ok(())
    }

    /// Reads a memory operand: bytes zero-extended, halfwords sign-extended
    /// to a word.
    pub fn read_operand(&mut self, operand: MemRef) -> Result<u64, TrapCause> {
        Ok(match operand.size {
            OperandSize::Byte => u64::from(self.read_byte(operand.addr)?),
            OperandSize::Half => u64::from(self.read_half(operand.addr)? as i16 as u32),
            OperandSize::Word => u64::from(self.read_word(operand.addr, AccessType::Read)?),
            OperandSize::Double => self.read_double(operand.addr)?,
        })
    }

    /// Writes the low bits of `value` to a memory operand.
    pub fn write_operand(&mut self, operand: MemRef, value: u64) -> Result<(), TrapCause> {
        match operand.size {
            OperandSize::Byte => self.write_byte(operand.addr, value as u8),
            OperandSize::Half => self.write_half(operand.addr, value as u16),
            OperandSize::Word => self.write_word(operand.addr, value as u32),
            OperandSize::Double => self.write_double(operand.addr, value),
        }
    }
}

/// TRAPSTATUS bits describing a map loader failure.
const fn map_load_status(err: MapLoadError) -> u32 {
    trap_status::MAP_LOAD_ERROR
        | match err {
            MapLoadError::NonPresentMemory { .. } => trap_status::TABLE_NON_PRESENT,
            MapLoadError::MisalignedMasterList { .. }
            | MapLoadError::MisalignedDescriptorList { .. } => trap_status::CONFIG_CHECK,
            MapLoadError::MapCountExceeded { .. } | MapLoadError::EmptyContext => {
                trap_status::MAP_INDEX
            }
        }
}
