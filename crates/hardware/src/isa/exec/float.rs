//! Floating point handlers.
//!
//! Arithmetic is delegated to the CPU's [`FloatUnit`](crate::core::units::fpu::FloatUnit).
//! CC1 in the returned condition codes marks an exponent overflow or underflow,
//! which follows the same deferred exception rule as integer overflow.

use super::{Execution, OverflowPolicy, Write, even};
use crate::common::TrapCause;
use crate::core::Cpu;
use crate::core::arch::psd::psd1;
use crate::core::units::fpu::{FloatResult, FloatUnit};
use crate::isa::instruction::{Decoded, InstructionBits, OperandSize};

fn single(r: usize, res: FloatResult<u32>) -> Execution {
    Execution::next()
        .write(Write::Reg(r, res.value))
        .cc(res.cc)
        .overflow(res.cc & psd1::CC1 != 0, OverflowPolicy::SuppressOnTrap)
}

fn double(r: usize, res: FloatResult<u64>) -> Execution {
    Execution::next()
        .write(Write::Pair(r, res.value))
        .cc(res.cc)
        .overflow(res.cc & psd1::CC1 != 0, OverflowPolicy::SuppressOnTrap)
}

/// Register forms: `ADRFW`, `SURFW`, `MPRFW`, `DVRFW`, `FIXW`, `FLTW` (augment
/// 0-5) and their doubleword counterparts (augment 8-D). R receives the result
/// of R op R2.
pub fn register_group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let (r, r2) = (d.r(), d.word.r2());
    let aug = d.word.aug();
    let fpu = &cpu.fpu;
    let regs = &cpu.state.regs;
    if aug & 0x8 == 0 {
        let (a, b) = (regs.read(r), regs.read(r2));
        let res = match aug {
            0 => fpu.add32(a, b),
            1 => fpu.sub32(a, b),
            2 => fpu.mul32(a, b),
            3 => fpu.div32(a, b),
            4 => fpu.fix32(b),
            5 => fpu.float32(b),
            _ => return Err(TrapCause::UndefinedInstruction),
        };
        return Ok(single(r, res));
    }
    let (r, r2) = (even(r)?, even(r2)?);
    let (a, b) = (regs.read_pair(r), regs.read_pair(r2));
    let res = match aug & 0x7 {
        0 => fpu.add64(a, b),
        1 => fpu.sub64(a, b),
        2 => fpu.mul64(a, b),
        3 => fpu.div64(a, b),
        4 => fpu.fix64(b),
        5 => fpu.float64(b),
        _ => return Err(TrapCause::UndefinedInstruction),
    };
    Ok(double(r, res))
}

fn memory_op(
    cpu: &Cpu,
    d: &Decoded,
    op32: fn(&dyn FloatUnit, u32, u32) -> FloatResult<u32>,
    op64: fn(&dyn FloatUnit, u64, u64) -> FloatResult<u64>,
) -> Result<Execution, TrapCause> {
    let r = d.r();
    match d.size() {
        OperandSize::Word => {
            let res = op32(cpu.fpu.as_ref(), cpu.state.regs.read(r), d.value32());
            Ok(single(r, res))
        }
        OperandSize::Double => {
            let r = even(r)?;
            Ok(double(r, op64(cpu.fpu.as_ref(), cpu.state.regs.read_pair(r), d.value)))
        }
        _ => Err(TrapCause::AddressSpecification),
    }
}

/// `ADFW` / `ADFD`.
pub fn add_memory(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    memory_op(cpu, d, |f, a, b| f.add32(a, b), |f, a, b| f.add64(a, b))
}

/// `SUFW` / `SUFD`.
pub fn subtract_memory(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    memory_op(cpu, d, |f, a, b| f.sub32(a, b), |f, a, b| f.sub64(a, b))
}
