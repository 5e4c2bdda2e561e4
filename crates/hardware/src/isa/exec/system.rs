//! System handlers: the `0x28` register-transfer group and `0xFC` interrupt
//! control.

use tracing::debug;

use super::branch::return_from_call;
use super::{Execution, Flow, Write, io};
use crate::common::constants::INTERRUPT_LEVELS;
use crate::common::{AccessType, TrapCause};
use crate::core::Cpu;
use crate::core::arch::psd::{Psd, psd1};
use crate::core::arch::status::cpu_status;
use crate::core::units::mmu::loader::LoadMode;
use crate::isa::instruction::{Decoded, InstructionBits};

/// Augment codes of the `0x28` group.
pub mod misc {
    /// Transfer register to PSW (PC and condition codes).
    pub const TRSW: u32 = 0x0;
    /// Transfer register to base register.
    pub const TRBR: u32 = 0x1;
    /// Transfer base register to register.
    pub const TBRR: u32 = 0x2;
    /// Transfer condition codes to register.
    pub const TCCR: u32 = 0x3;
    /// Transfer register to condition codes.
    pub const TRCC: u32 = 0x4;
    /// Load maps for the PSD addressed by R.
    pub const LMAP: u32 = 0xA;
    /// Transfer map entry to register.
    pub const TMAPR: u32 = 0xB;
    /// Set CPU software status bits.
    pub const SETCPU: u32 = 0xC;
    /// Procedure return (base mode).
    pub const RETURN: u32 = 0xE;
}

/// Sub-operations of the `0xFC` group (bits 13-15).
pub mod interrupt_op {
    /// Enable interrupt level.
    pub const EI: u32 = 0;
    /// Disable interrupt level.
    pub const DI: u32 = 1;
    /// Request interrupt level.
    pub const RI: u32 = 2;
    /// Activate interrupt level.
    pub const AI: u32 = 3;
    /// Deactivate interrupt level.
    pub const DAI: u32 = 4;
    /// Execute I/O.
    pub const XIO: u32 = 7;
}

/// Condition code field shift between PSD1 and a register's low nibble.
const CC_SHIFT: u32 = 27;

/// Dispatches the `0x28` group on the augment code.
pub fn misc_group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let (r, r2) = (d.r(), d.word.r2());
    match d.word.aug() {
        misc::TRSW => {
            let value = cpu.state.regs.read(r);
            Ok(Execution::flow(Flow::Branch(value & psd1::PC_MASK)).cc(value & psd1::CC_MASK))
        }
        misc::TRBR => {
            cpu.require_base()?;
            Ok(Execution::next().write(Write::Base(r, cpu.state.regs.read(r2))))
        }
        misc::TBRR => {
            cpu.require_base()?;
            Ok(Execution::next().write(Write::Reg(r, cpu.state.regs.read_base(r2))))
        }
        misc::TCCR => Ok(Execution::next().write(Write::Reg(r, cpu.state.psd.cc() >> CC_SHIFT))),
        misc::TRCC => {
            let cc = (cpu.state.regs.read(r) & 0xF) << CC_SHIFT;
            Ok(Execution::next().cc(cc))
        }
        misc::LMAP => load_maps(cpu, r),
        misc::TMAPR => {
            cpu.require_privileged()?;
            let index = cpu.state.regs.read(r2) & 0x7FF;
            let (raw, derived) = cpu.mmu.map_entry(index);
            let value = if cpu.mmu.demand_paged() {
                derived
            } else {
                u32::from(raw.0)
            };
            Ok(Execution::next().write(Write::Reg(r, value)))
        }
        misc::SETCPU => {
            cpu.require_privileged()?;
            let bits = cpu.state.regs.read(r) & cpu_status::SOFTWARE_MASK;
            let status = &mut cpu.state.cpu_status;
            status.0 = (status.0 & !cpu_status::SOFTWARE_MASK) | bits;
            Ok(Execution::next())
        }
        misc::RETURN => return_from_call(cpu, d),
        _ => Err(TrapCause::UndefinedInstruction),
    }
}

/// `LMAP`: force-loads the maps of the context named by the PSD whose address
/// is in R.
fn load_maps(cpu: &mut Cpu, r: usize) -> Result<Execution, TrapCause> {
    cpu.require_privileged()?;
    let addr = cpu.state.regs.read(r) & !3;
    let word1 = cpu.read_word(addr, AccessType::Read)?;
    let word2 = cpu.read_word(addr.wrapping_add(4), AccessType::Read)?;
    let psd = Psd::new(word1, word2);
    let loaded = cpu.load_context(psd.cpix(), LoadMode::Force)?;
    debug!(cpix = psd.cpix(), loaded, hiwm = cpu.mmu.ctx.hiwm, "LMAP");
    Ok(Execution::next())
}

/// Dispatches `EI`, `DI`, `RI`, `AI`, `DAI` and `XIO`.
pub fn interrupt_group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let r = d.r();
    let base = if r == 0 { 0 } else { cpu.state.regs.read(r) };
    let op = d.word.imm_aug();
    if op == interrupt_op::XIO {
        let chsa = (base.wrapping_add(d.word & 0xFFF) & 0x7FFF) as u16;
        return io::execute(cpu, (d.word >> 12) & 0xF, chsa);
    }

    let level = base.wrapping_add(d.word & 0x7F) as usize;
    if level >= INTERRUPT_LEVELS {
        return Err(TrapCause::UndefinedInstruction);
    }
    let ints = &mut cpu.state.interrupts;
    match op {
        interrupt_op::EI => ints.enable(level),
        interrupt_op::DI => ints.disable(level),
        interrupt_op::RI => ints.request(level, None),
        interrupt_op::AI => ints.activate(level),
        interrupt_op::DAI => ints.deactivate(level),
        _ => return Err(TrapCause::UndefinedInstruction),
    }
    cpu.sync_level(level);
    Ok(Execution::next())
}
