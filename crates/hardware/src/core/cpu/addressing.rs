//! Effective address computation.
//!
//! Non-base mode: the 19-bit address field, plus index register X when X is
//! nonzero, followed through indirect words while their I bit is set. Each
//! indirect word also supplies the condition codes a taken branch installs.
//! With extended addressing an indirect word holds a final 24-bit address.
//!
//! Base mode: base register B (none when B is zero) plus the signed 16-bit
//! displacement. There is no indirection in base mode.

use crate::common::constants::{ADDR_MASK_19, ADDR_MASK_24, INDIRECT_LIMIT};
use crate::common::{AccessType, MemoryFault, TrapCause};
use crate::isa::instruction::{CC_OVERRIDE_MASK, InstructionBits};

use super::Cpu;

/// A computed effective address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectiveAddress {
    /// Logical byte address.
    pub ea: u32,
    /// Condition codes from the last indirect word, if any was followed.
    pub cc_override: Option<u32>,
}

impl Cpu {
    /// Computes the effective address of the memory reference instruction `word`.
    pub fn effective_address(&mut self, word: u32) -> Result<EffectiveAddress, TrapCause> {
        let modes = self.state.modes;
        if modes.base {
            let b = word.base_reg();
            let base = if b == 0 { 0 } else { self.state.regs.read_base(b) };
            return Ok(EffectiveAddress {
                ea: base.wrapping_add(word.displacement() as u32) & ADDR_MASK_24,
                cc_override: None,
            });
        }

        let mask = if modes.extended { ADDR_MASK_24 } else { ADDR_MASK_19 };
        let mut link = word;
        let mut cc_override = None;
        for _ in 0..=INDIRECT_LIMIT {
            let x = link.x();
            let index = if x == 0 { 0 } else { self.state.regs.read(x) };
            let ea = link.address().wrapping_add(index) & mask;
            if !link.indirect() {
                return Ok(EffectiveAddress { ea, cc_override });
            }
            let indirect = self.read_word(ea & !3, AccessType::Read)?;
            cc_override = Some(indirect & CC_OVERRIDE_MASK);
            if modes.extended {
                return Ok(EffectiveAddress {
                    ea: indirect & ADDR_MASK_24,
                    cc_override,
                });
            }
            link = indirect;
        }
        let addr = link.address();
        Err(self.record_fault(MemoryFault::AddressSpecification { addr }, AccessType::Read))
    }
}
