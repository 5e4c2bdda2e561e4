//! Immediate group (`0xC8`) and `CALM`.

use super::register::{divide_pair, multiply_pair};
use super::{Execution, Flow, OverflowPolicy, Write};
use crate::common::TrapCause;
use crate::core::Cpu;
use crate::core::units::alu::{AluResult, arithmetic, logic};
use crate::isa::instruction::{Decoded, InstructionBits};

/// Load immediate.
pub const LI: u32 = 0;
/// Compare immediate.
pub const CI: u32 = 1;
/// Add immediate.
pub const ADI: u32 = 2;
/// Subtract immediate.
pub const SUI: u32 = 3;
/// Multiply immediate.
pub const MPI: u32 = 4;
/// Divide immediate.
pub const DVI: u32 = 5;
/// Supervisor call.
pub const SVC: u32 = 6;
/// Execute register (`EXRR` with F set).
pub const EXR: u32 = 7;

/// Dispatches the immediate group on bits 13-15.
pub fn group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let r = d.r();
    let imm = d.word.displacement() as u32;
    let current = cpu.state.regs.read(r);
    let arith = |res: AluResult| {
        Execution::next()
            .write(Write::Reg(r, res.low()))
            .cc(res.cc)
            .overflow(res.overflow, OverflowPolicy::SuppressOnTrap)
    };
    match d.word.imm_aug() {
        LI => Ok(Execution::next()
            .write(Write::Reg(r, imm))
            .cc(AluResult::word(imm, false).cc)),
        CI => Ok(Execution::next().cc(logic::compare(current, imm))),
        ADI => Ok(arith(arithmetic::add32(current, imm))),
        SUI => Ok(arith(arithmetic::sub32(current, imm))),
        MPI => multiply_pair(cpu, r, imm),
        DVI => divide_pair(cpu, r, imm),
        SVC => Err(TrapCause::SupervisorCall {
            number: d.word as u16,
        }),
        _ => {
            let target = if d.word.f() { current << 16 } else { current };
            Ok(Execution::flow(Flow::Execute(target)))
        }
    }
}

/// `CALM`: call monitor with the ten-bit number in bits 6-15.
pub fn calm(_cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    Err(TrapCause::CallMonitor {
        number: ((d.word >> 16) & 0x3FF) as u16,
    })
}
