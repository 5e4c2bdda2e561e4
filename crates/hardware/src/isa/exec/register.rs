//! Register format handlers.
//!
//! Halfword instructions operating on general registers R and R2. Masked forms
//! use R4 as the mask register. Pair operations require R to be even.

use super::{Execution, OverflowPolicy, Write, even};
use crate::common::TrapCause;
use crate::core::Cpu;
use crate::core::arch::psd::psd1;
use crate::core::units::alu::{Alu, AluOp, AluResult, arithmetic, logic};
use crate::isa::instruction::{Decoded, InstructionBits};

/// Mask register of the masked forms.
const MASK_REG: usize = 4;

fn result(r: usize, res: AluResult, policy: OverflowPolicy) -> Execution {
    Execution::next()
        .write(Write::Reg(r, res.low()))
        .cc(res.cc)
        .overflow(res.overflow, policy)
}

fn logical(cpu: &Cpu, d: &Decoded, op: AluOp) -> Result<Execution, TrapCause> {
    let (r, r2) = (d.word.r(), d.word.r2());
    let regs = &cpu.state.regs;
    let mut res = Alu::execute(op, regs.read(r), regs.read(r2));
    match d.word.aug() {
        0 => {}
        8 => res = AluResult::word(res.low() & regs.read(MASK_REG), false),
        _ => return Err(TrapCause::UndefinedInstruction),
    }
    Ok(result(r, res, OverflowPolicy::Commit))
}

/// `ANR` and `RPSWT`.
pub fn and_group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    match d.word.aug() {
        0xB => Ok(Execution::next().write(Write::Reg(d.word.r(), cpu.state.psd.word2))),
        _ => logical(cpu, d, AluOp::And),
    }
}

/// `ORR` and `ORRM`.
pub fn or_group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    logical(cpu, d, AluOp::Or)
}

/// `EOR` and `EORM`.
pub fn eor_group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    logical(cpu, d, AluOp::Xor)
}

/// `CAR` and `CMR`.
pub fn compare_group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let regs = &cpu.state.regs;
    let (a, b) = (regs.read(d.word.r()), regs.read(d.word.r2()));
    let cc = match d.word.aug() {
        0 => logic::compare(a, b),
        4 => logic::masked_compare(a, b, regs.read(MASK_REG)),
        _ => return Err(TrapCause::UndefinedInstruction),
    };
    Ok(Execution::next().cc(cc))
}

/// `SBR`, `ZBR`, `ABR` and `TBR`. Bit 0 is the most significant bit.
pub fn bit_group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let r = d.word.r();
    let value = cpu.state.regs.read(r);
    let mask = 0x8000_0000u32 >> d.word.bit_number();
    let was_set = if value & mask != 0 { psd1::CC1 } else { 0 };
    Ok(match d.word.bit_op() {
        0 => Execution::next().write(Write::Reg(r, value | mask)).cc(was_set),
        1 => Execution::next().write(Write::Reg(r, value & !mask)).cc(was_set),
        2 => result(r, arithmetic::add32(value, mask), OverflowPolicy::Commit),
        _ => Execution::next().cc(was_set),
    })
}

fn shift(cpu: &Cpu, d: &Decoded, ops: [AluOp; 3], double: AluOp) -> Result<Execution, TrapCause> {
    let r = d.word.r();
    let count = d.word.shift_count();
    let kind = d.word.shift_kind();
    if kind == 3 {
        let r = even(r)?;
        let res = Alu::execute_double(double, cpu.state.regs.read_pair(r), count.into());
        return Ok(Execution::next()
            .write(Write::Pair(r, res.value))
            .cc(res.cc)
            .overflow(res.overflow, OverflowPolicy::Commit));
    }
    let op = ops[kind as usize];
    let res = Alu::execute(op, cpu.state.regs.read(r), count);
    if matches!(op, AluOp::Sra | AluOp::Sla) {
        Ok(result(r, res, OverflowPolicy::Commit))
    } else {
        Ok(Execution::next().write(Write::Reg(r, res.low())))
    }
}

/// `SRA`, `SRL`, `SRC` and `SRAD`.
pub fn shift_right(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    shift(cpu, d, [AluOp::Sra, AluOp::Srl, AluOp::Src], AluOp::Sra)
}

/// `SLA`, `SLL`, `SLC` and `SLAD`.
pub fn shift_left(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    shift(cpu, d, [AluOp::Sla, AluOp::Sll, AluOp::Slc], AluOp::Sla)
}

/// `TRR`, `TRC`, `TRN`, `XCR` and `TRRM`.
pub fn transfer_group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let (r, r2) = (d.word.r(), d.word.r2());
    let regs = &cpu.state.regs;
    let src = regs.read(r2);
    Ok(match d.word.aug() {
        0 => result(r, AluResult::word(src, false), OverflowPolicy::Commit),
        3 => result(r, AluResult::word(!src, false), OverflowPolicy::Commit),
        4 => result(r, arithmetic::neg32(src), OverflowPolicy::SuppressOnTrap),
        5 => Execution::next()
            .write(Write::Reg(r2, regs.read(r)))
            .write(Write::Reg(r, src))
            .cc(AluResult::word(src, false).cc),
        8 => result(
            r,
            AluResult::word(src & regs.read(MASK_REG), false),
            OverflowPolicy::Commit,
        ),
        _ => return Err(TrapCause::UndefinedInstruction),
    })
}

/// `ADR`.
pub fn add(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let regs = &cpu.state.regs;
    let res = arithmetic::add32(regs.read(d.word.r()), regs.read(d.word.r2()));
    Ok(result(d.word.r(), res, OverflowPolicy::SuppressOnTrap))
}

/// `SUR`.
pub fn subtract(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let regs = &cpu.state.regs;
    let res = arithmetic::sub32(regs.read(d.word.r()), regs.read(d.word.r2()));
    Ok(result(d.word.r(), res, OverflowPolicy::SuppressOnTrap))
}

/// Multiplies the odd register of pair `r` by `multiplier` into the pair.
pub(crate) fn multiply_pair(cpu: &Cpu, r: usize, multiplier: u32) -> Result<Execution, TrapCause> {
    let r = even(r)?;
    let res = arithmetic::mul32(cpu.state.regs.read(r | 1), multiplier);
    Ok(Execution::next().write(Write::Pair(r, res.value)).cc(res.cc))
}

/// Divides pair `r` by `divisor`: quotient to the odd register, remainder to
/// the even one. Registers are untouched on divide by zero or overflow.
pub(crate) fn divide_pair(cpu: &Cpu, r: usize, divisor: u32) -> Result<Execution, TrapCause> {
    let r = even(r)?;
    Ok(match arithmetic::div64(cpu.state.regs.read_pair(r), divisor) {
        Some(q) => Execution::next()
            .write(Write::Reg(r, q.remainder))
            .write(Write::Reg(r | 1, q.quotient))
            .cc(q.cc),
        None => Execution::next()
            .cc(psd1::CC1)
            .overflow(true, OverflowPolicy::AllOrNothing),
    })
}

/// `MPR`.
pub fn multiply(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let multiplier = cpu.state.regs.read(d.word.r2());
    multiply_pair(cpu, d.word.r(), multiplier)
}

/// `DVR`.
pub fn divide(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let divisor = cpu.state.regs.read(d.word.r2());
    divide_pair(cpu, d.word.r(), divisor)
}
