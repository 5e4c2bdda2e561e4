//! Memory reference handlers.
//!
//! The operand has already been read by the engine for opcodes flagged
//! `READ_MEM`; its width follows the F and C fields. Doubleword operands
//! address an even/odd register pair.

use super::register::{divide_pair, multiply_pair};
use super::{Execution, OverflowPolicy, Write, even};
use crate::common::constants::NUM_GPRS;
use crate::common::{AccessType, TrapCause};
use crate::core::Cpu;
use crate::core::arch::psd::psd1;
use crate::core::units::alu::{Alu, AluOp, AluResult, arithmetic, logic};
use crate::isa::instruction::{Decoded, InstructionBits, MemRef, OperandSize};

const MASK_REG: usize = 4;

fn is_double(d: &Decoded) -> bool {
    d.size() == OperandSize::Double
}

fn operand_ref(d: &Decoded) -> Result<MemRef, TrapCause> {
    d.operand.ok_or(TrapCause::UndefinedInstruction)
}

fn to_reg(d: &Decoded, res: AluResult, policy: OverflowPolicy) -> Result<Execution, TrapCause> {
    let r = d.r();
    let write = if is_double(d) {
        Write::Pair(even(r)?, res.value)
    } else {
        Write::Reg(r, res.low())
    };
    Ok(Execution::next()
        .write(write)
        .cc(res.cc)
        .overflow(res.overflow, policy))
}

fn logical(cpu: &Cpu, d: &Decoded, op: AluOp) -> Result<Execution, TrapCause> {
    let r = d.r();
    if is_double(d) {
        let a = cpu.state.regs.read_pair(even(r)?);
        let hi = Alu::execute(op, (a >> 32) as u32, (d.value >> 32) as u32).low();
        let lo = Alu::execute(op, a as u32, d.value as u32).low();
        let value = (u64::from(hi) << 32) | u64::from(lo);
        return to_reg(d, AluResult::double(value, false), OverflowPolicy::Commit);
    }
    let res = Alu::execute(op, cpu.state.regs.read(r), d.value32());
    to_reg(d, res, OverflowPolicy::Commit)
}

/// `ANMx`.
pub fn and(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    logical(cpu, d, AluOp::And)
}

/// `ORMx`.
pub fn or(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    logical(cpu, d, AluOp::Or)
}

/// `EOMx`.
pub fn eor(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    logical(cpu, d, AluOp::Xor)
}

/// `CAMx`: arithmetic compare of R with the operand.
pub fn compare(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let r = d.r();
    let cc = if is_double(d) {
        logic::compare64(cpu.state.regs.read_pair(even(r)?), d.value)
    } else {
        logic::compare(cpu.state.regs.read(r), d.value32())
    };
    Ok(Execution::next().cc(cc))
}

/// `CMMx`: compare R with the operand under the mask in R4.
pub fn compare_masked(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let regs = &cpu.state.regs;
    let cc = logic::masked_compare(regs.read(d.r()), d.value32(), regs.read(MASK_REG));
    Ok(Execution::next().cc(cc))
}

fn bit_mask(d: &Decoded) -> u64 {
    u64::from(0x80u8 >> d.r())
}

/// `SBM`: sets bit R of the byte operand; CC1 receives its previous value.
pub fn set_bit(_cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let was = if d.value & bit_mask(d) != 0 { psd1::CC1 } else { 0 };
    Ok(Execution::next()
        .write(Write::Memory(operand_ref(d)?, d.value | bit_mask(d)))
        .cc(was))
}

/// `ZBM`: clears bit R of the byte operand; CC1 receives its previous value.
pub fn zero_bit(_cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let was = if d.value & bit_mask(d) != 0 { psd1::CC1 } else { 0 };
    Ok(Execution::next()
        .write(Write::Memory(operand_ref(d)?, d.value & !bit_mask(d)))
        .cc(was))
}

/// `TBM`: CC1 receives bit R of the byte operand.
pub fn test_bit(_cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let was = if d.value & bit_mask(d) != 0 { psd1::CC1 } else { 0 };
    Ok(Execution::next().cc(was))
}

/// `ABM`: adds bit R of the addressed byte into the word containing it.
pub fn add_bit(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let target = operand_ref(d)?;
    let word_addr = target.addr & !3;
    let position = (target.addr & 3) * 8 + d.r() as u32;
    let word = cpu.read_word(word_addr, AccessType::Read)?;
    let res = arithmetic::add32(word, 0x8000_0000 >> position);
    Ok(Execution::next()
        .write(Write::Memory(MemRef::word(word_addr), res.value))
        .cc(res.cc)
        .overflow(res.overflow, OverflowPolicy::Commit))
}

/// `Lx`: loads the operand (bytes zero-extended, halfwords sign-extended).
pub fn load(_cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let res = if is_double(d) {
        AluResult::double(d.value, false)
    } else {
        AluResult::word(d.value32(), false)
    };
    to_reg(d, res, OverflowPolicy::Commit)
}

/// `LMx`: loads the operand masked by R4.
pub fn load_masked(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let regs = &cpu.state.regs;
    let res = if is_double(d) {
        AluResult::double(d.value & regs.read_pair(MASK_REG), false)
    } else {
        AluResult::word(d.value32() & regs.read(MASK_REG), false)
    };
    to_reg(d, res, OverflowPolicy::Commit)
}

/// `LNx`: loads the negated operand.
pub fn load_negative(_cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let res = if is_double(d) {
        arithmetic::sub64(0, d.value)
    } else {
        arithmetic::neg32(d.value32())
    };
    to_reg(d, res, OverflowPolicy::SuppressOnTrap)
}

/// `ADMx`.
pub fn add(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let r = d.r();
    let res = if is_double(d) {
        arithmetic::add64(cpu.state.regs.read_pair(even(r)?), d.value)
    } else {
        arithmetic::add32(cpu.state.regs.read(r), d.value32())
    };
    to_reg(d, res, OverflowPolicy::SuppressOnTrap)
}

/// `SUMx`.
pub fn subtract(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let r = d.r();
    let res = if is_double(d) {
        arithmetic::sub64(cpu.state.regs.read_pair(even(r)?), d.value)
    } else {
        arithmetic::sub32(cpu.state.regs.read(r), d.value32())
    };
    to_reg(d, res, OverflowPolicy::SuppressOnTrap)
}

/// `MPMx`.
pub fn multiply(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    if is_double(d) {
        return Err(TrapCause::AddressSpecification);
    }
    multiply_pair(cpu, d.r(), d.value32())
}

/// `DVMx`.
pub fn divide(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    if is_double(d) {
        return Err(TrapCause::AddressSpecification);
    }
    divide_pair(cpu, d.r(), d.value32())
}

/// `ARMx`: adds R into the memory operand.
pub fn add_to_memory(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let target = operand_ref(d)?;
    let r = d.r();
    let res = match target.size {
        OperandSize::Double => arithmetic::add64(d.value, cpu.state.regs.read_pair(even(r)?)),
        OperandSize::Word => arithmetic::add32(d.value32(), cpu.state.regs.read(r)),
        OperandSize::Half => {
            let sum = (d.value32() as i32).wrapping_add(cpu.state.regs.read(r) as i32);
            AluResult::word(sum as u32, i16::try_from(sum).is_err())
        }
        OperandSize::Byte => {
            let sum = d.value32().wrapping_add(cpu.state.regs.read(r));
            AluResult::word(sum & 0xFF, sum > 0xFF)
        }
    };
    Ok(Execution::next()
        .write(Write::Memory(target, res.value))
        .cc(res.cc)
        .overflow(res.overflow, OverflowPolicy::SuppressOnTrap))
}

/// `LA` and `LEA`: loads the effective address.
pub fn load_address(_cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    Ok(Execution::next().write(Write::Reg(d.r(), d.ea)))
}

/// `STx`: stores R (or the pair) into the operand.
pub fn store(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let target = operand_ref(d)?;
    let value = if target.size == OperandSize::Double {
        cpu.state.regs.read_pair(even(d.r())?)
    } else {
        u64::from(cpu.state.regs.read(d.r()))
    };
    Ok(Execution::next().write(Write::Memory(target, value)))
}

/// `STMx`: stores R masked by R4.
pub fn store_masked(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let target = operand_ref(d)?;
    let regs = &cpu.state.regs;
    let value = if target.size == OperandSize::Double {
        regs.read_pair(even(d.r())?) & regs.read_pair(MASK_REG)
    } else {
        u64::from(regs.read(d.r()) & regs.read(MASK_REG))
    };
    Ok(Execution::next().write(Write::Memory(target, value)))
}

fn file_base(d: &Decoded) -> Result<u32, TrapCause> {
    let addr = d.ea;
    if addr & 3 != 0 {
        return Err(TrapCause::AddressSpecification);
    }
    Ok(addr)
}

/// `LF` / `LFBR`: loads registers R through R7 (base registers when F is set)
/// from consecutive words.
pub fn load_file(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let base = file_base(d)?;
    let mut exec = Execution::next();
    for (i, r) in (d.r()..NUM_GPRS).enumerate() {
        let value = cpu.read_word(base.wrapping_add(4 * i as u32), AccessType::Read)?;
        exec = exec.write(if d.word.f() {
            Write::Base(r, value)
        } else {
            Write::Reg(r, value)
        });
    }
    Ok(exec)
}

/// `STF` / `STFBR`: stores registers R through R7 to consecutive words.
pub fn store_file(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let base = file_base(d)?;
    let regs = &cpu.state.regs;
    let words = (d.r()..NUM_GPRS)
        .map(|r| {
            if d.word.f() {
                regs.read_base(r)
            } else {
                regs.read(r)
            }
        })
        .collect();
    Ok(Execution::next().write(Write::Block(base, words)))
}

/// `LABR`: loads the effective address into base register R.
pub fn load_base_address(_cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    Ok(Execution::next().write(Write::Base(d.r(), d.ea)))
}

/// `STWBR`: stores base register R.
pub fn store_base(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let target = operand_ref(d)?;
    if target.size != OperandSize::Word {
        return Err(TrapCause::AddressSpecification);
    }
    let value = cpu.state.regs.read_base(d.r());
    Ok(Execution::next().write(Write::Memory(target, value.into())))
}

/// `LWBR`: loads base register R.
pub fn load_base(_cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    if d.size() != OperandSize::Word {
        return Err(TrapCause::AddressSpecification);
    }
    Ok(Execution::next().write(Write::Base(d.r(), d.value32())))
}
