//! Branch, linkage and PSD load handlers.
//!
//! Branch targets are the effective address with bit 31 cleared; bit 30 selects
//! the right halfword. The condition field R of `BCT`/`BCF` selects:
//!
//! | R | condition            |
//! |---|----------------------|
//! | 0 | always               |
//! | 1 | CC1                  |
//! | 2 | CC2                  |
//! | 3 | CC3                  |
//! | 4 | CC4                  |
//! | 5 | CC2 or CC4 (>= 0)    |
//! | 6 | CC3 or CC4 (<= 0)    |
//! | 7 | any condition code   |

use super::{Execution, Flow, PsdLoad, Write};
use crate::common::constants::{ADDR_MASK_24, NUM_BASE_REGS};
use crate::common::{AccessType, TrapCause};
use crate::core::Cpu;
use crate::core::arch::psd::{Psd, psd1};
use crate::isa::instruction::{Decoded, InstructionBits, MemRef, OperandSize};

/// Sub-operations of the `0xF8` group, selected by R.
pub mod group_op {
    /// Zero memory.
    pub const ZM: usize = 0;
    /// Branch and link.
    pub const BL: usize = 1;
    /// Branch and reset interrupt.
    pub const BRI: usize = 2;
    /// Load PSD.
    pub const LPSD: usize = 3;
    /// Load PSD and change maps.
    pub const LPSDCM: usize = 4;
    /// Procedure call (base mode).
    pub const CALL: usize = 6;
}

/// Words in a `CALL` frame.
pub const FRAME_WORDS: u32 = 10;

/// Evaluates branch condition `r` against condition codes `cc`.
pub const fn condition(cc: u32, r: usize) -> bool {
    match r {
        0 => true,
        1 => cc & psd1::CC1 != 0,
        2 => cc & psd1::CC2 != 0,
        3 => cc & psd1::CC3 != 0,
        4 => cc & psd1::CC4 != 0,
        5 => cc & (psd1::CC2 | psd1::CC4) != 0,
        6 => cc & (psd1::CC3 | psd1::CC4) != 0,
        _ => cc & psd1::CC_MASK != 0,
    }
}

#[inline(always)]
const fn target(d: &Decoded) -> u32 {
    d.ea & !1
}

/// `BCT` (and `BU` with R = 0).
pub fn on_true(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    if condition(cpu.state.psd.cc(), d.r()) {
        Ok(Execution::flow(Flow::Branch(target(d))))
    } else {
        Ok(Execution::next())
    }
}

/// `BCF`.
pub fn on_false(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    if condition(cpu.state.psd.cc(), d.r()) {
        Ok(Execution::next())
    } else {
        Ok(Execution::flow(Flow::Branch(target(d))))
    }
}

/// `BIB`, `BIH`, `BIW`, `BID`: adds the width selected by the F and C bits to R
/// and branches if the result is nonzero.
pub fn increment(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let step = if d.word.f() {
        OperandSize::Byte
    } else {
        match d.word & 3 {
            0 => OperandSize::Word,
            2 => OperandSize::Double,
            _ => OperandSize::Half,
        }
    }
    .bytes();
    let r = d.r();
    let value = cpu.state.regs.read(r).wrapping_add(step);
    let exec = Execution::next().write(Write::Reg(r, value));
    Ok(if value == 0 {
        exec
    } else {
        Execution {
            flow: Flow::Branch(target(d)),
            ..exec
        }
    })
}

/// `ZMx`, `BL`, `BRI`, `LPSD`, `LPSDCM` and `CALL`.
pub fn group(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    match d.r() {
        group_op::ZM => {
            let operand = MemRef::from_fc(d.ea, d.word.f()).ok_or(TrapCause::AddressSpecification)?;
            Ok(Execution::next().write(Write::Memory(operand, 0)))
        }
        group_op::BL => {
            let link = (cpu.state.psd.word1 & !psd1::PC_MASK) | (d.next_pc & psd1::PC_MASK);
            Ok(Execution::flow(Flow::Branch(target(d))).write(Write::Reg(0, link)))
        }
        group_op::BRI => load_psd(cpu, d, PsdLoad::Bri),
        group_op::LPSD => load_psd(cpu, d, PsdLoad::Lpsd),
        group_op::LPSDCM => load_psd(cpu, d, PsdLoad::Lpsdcm),
        group_op::CALL => call(cpu, d),
        _ => Err(TrapCause::UndefinedInstruction),
    }
}

fn load_psd(cpu: &mut Cpu, d: &Decoded, kind: PsdLoad) -> Result<Execution, TrapCause> {
    cpu.require_privileged()?;
    let addr = d.ea & !3;
    let word1 = cpu.read_word(addr, AccessType::Read)?;
    let word2 = cpu.read_word(addr.wrapping_add(4), AccessType::Read)?;
    Ok(Execution::flow(Flow::LoadPsd(kind, Psd::new(word1, word2))))
}

/// `CALL`: pushes a frame at BR2 holding the return PSD1, BR0-BR7 and the
/// call target, points BR1 at it and advances BR2 past it.
fn call(cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    cpu.require_base()?;
    let regs = &cpu.state.regs;
    let frame = regs.read_base(2) & ADDR_MASK_24;
    if frame & 3 != 0 {
        return Err(TrapCause::AddressSpecification);
    }
    let ret = (cpu.state.psd.word1 & !psd1::PC_MASK) | (d.next_pc & psd1::PC_MASK);
    let mut words = Vec::with_capacity(FRAME_WORDS as usize);
    words.push(ret);
    words.extend((0..NUM_BASE_REGS).map(|b| regs.read_base(b)));
    words.push(target(d));
    Ok(Execution::flow(Flow::Branch(target(d)))
        .write(Write::Block(frame, words))
        .write(Write::Base(1, frame))
        .write(Write::Base(2, frame.wrapping_add(4 * FRAME_WORDS) & ADDR_MASK_24)))
}

/// `RETURN`: restores BR0-BR7 and the PC and condition codes from the frame at BR1.
pub fn return_from_call(cpu: &mut Cpu, _d: &Decoded) -> Result<Execution, TrapCause> {
    cpu.require_base()?;
    let frame = cpu.state.regs.read_base(1) & ADDR_MASK_24;
    if frame & 3 != 0 {
        return Err(TrapCause::AddressSpecification);
    }
    let saved = cpu.read_word(frame, AccessType::Read)?;
    let mut exec = Execution::flow(Flow::Branch(saved & psd1::PC_MASK)).cc(saved & psd1::CC_MASK);
    for b in 0..NUM_BASE_REGS {
        let value = cpu.read_word(frame.wrapping_add(4 * (b as u32 + 1)), AccessType::Read)?;
        exec = exec.write(Write::Base(b, value));
    }
    Ok(exec)
}

/// `EXM`: executes the halfword or word operand.
pub fn execute_memory(_cpu: &mut Cpu, d: &Decoded) -> Result<Execution, TrapCause> {
    let word = match d.size() {
        OperandSize::Half => u32::from(d.value as u16) << 16,
        OperandSize::Word => d.value32(),
        _ => return Err(TrapCause::AddressSpecification),
    };
    Ok(Execution::flow(Flow::Execute(word)))
}
