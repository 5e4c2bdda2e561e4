//! Control group (`0x00`).
//!
//! The augment code selects the operation. Mode changes (blocking, arithmetic
//! exception enable, extended addressing) are applied to the PSD directly and
//! the mode flags re-derived before the handler returns.

use super::{Execution, Flow, OverflowPolicy, Write, even};
use crate::common::TrapCause;
use crate::core::Cpu;
use crate::core::units::alu::{AluResult, arithmetic};
use crate::isa::instruction::{Decoded, InstructionBits};

/// Augment codes of the control group.
pub mod aug {
    /// Halt the engine.
    pub const HALT: u32 = 0x0;
    /// Enter the wait state.
    pub const WAIT: u32 = 0x1;
    /// No operation.
    pub const NOP: u32 = 0x2;
    /// Load console switches.
    pub const LCS: u32 = 0x3;
    /// Extend sign of R+1 into R.
    pub const ES: u32 = 0x4;
    /// Round R by the sign bit of R+1.
    pub const RND: u32 = 0x5;
    /// Block external interrupts.
    pub const BEI: u32 = 0x6;
    /// Unblock external interrupts.
    pub const UEI: u32 = 0x7;
    /// Enable arithmetic exception traps.
    pub const EAE: u32 = 0x8;
    /// Read CPU status word.
    pub const RDSTS: u32 = 0x9;
    /// Set extended addressing.
    pub const SEA: u32 = 0xD;
    /// Disable arithmetic exception traps.
    pub const DAE: u32 = 0xE;
    /// Clear extended addressing.
    pub const CEA: u32 = 0xF;
}

/// Dispatches the control group on the augment code.
pub fn group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let r = d.r();
    match d.word.aug() {
        aug::HALT => {
            cpu.require_privileged()?;
            Ok(Execution::flow(Flow::Halt))
        }
        aug::WAIT => {
            cpu.require_privileged()?;
            Ok(Execution::flow(Flow::Wait))
        }
        aug::NOP => Ok(Execution::next()),
        aug::LCS => Ok(Execution::next().write(Write::Reg(r, cpu.console_switches))),
        aug::ES => {
            let r = even(r)?;
            let low = cpu.state.regs.read(r | 1);
            let high = if (low as i32) < 0 { u32::MAX } else { 0 };
            let value = (u64::from(high) << 32) | u64::from(low);
            Ok(Execution::next()
                .write(Write::Reg(r, high))
                .cc(AluResult::double(value, false).cc))
        }
        aug::RND => {
            let r = even(r)?;
            let regs = &cpu.state.regs;
            let res = arithmetic::add32(regs.read(r), regs.read(r | 1) >> 31);
            Ok(Execution::next()
                .write(Write::Reg(r, res.low()))
                .cc(res.cc)
                .overflow(res.overflow, OverflowPolicy::SuppressOnTrap))
        }
        aug::BEI | aug::UEI => {
            cpu.require_privileged()?;
            cpu.set_blocked(d.word.aug() == aug::BEI);
            Ok(Execution::next())
        }
        aug::EAE | aug::DAE => {
            cpu.state.psd.set_aexp(d.word.aug() == aug::EAE);
            cpu.refresh_modes();
            Ok(Execution::next())
        }
        aug::RDSTS => {
            cpu.require_privileged()?;
            Ok(Execution::next().write(Write::Reg(r, cpu.state.cpu_status.0)))
        }
        aug::SEA | aug::CEA => {
            cpu.state.psd.set_extended(d.word.aug() == aug::SEA);
            cpu.refresh_modes();
            Ok(Execution::next())
        }
        _ => Err(TrapCause::UndefinedInstruction),
    }
}
