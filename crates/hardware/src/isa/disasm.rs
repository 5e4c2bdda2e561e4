//! Instruction Disassembler.
//!
//! Converts a left-justified instruction word into a human-readable string for
//! debug tracing, logging, and test diagnostics.
//!
//! # Usage
//!
//! ```
//! use sel32_core::isa::disasm::disassemble;
//! assert_eq!(disassemble(0xAC80_1000, false), "LW R1, 0x1000");
//! assert_eq!(disassemble(0x0002_0000, false), "NOP");
//! ```

use crate::isa::exec::branch::group_op;
use crate::isa::exec::control::aug;
use crate::isa::exec::immediate;
use crate::isa::exec::system::{interrupt_op, misc};
use crate::isa::instruction::InstructionBits;
use crate::isa::opcodes::{self, OpFlags};

/// Width suffix selected by the F and C fields.
fn width_suffix(word: u32) -> &'static str {
    if word.f() {
        return "B";
    }
    match word & 3 {
        0 => "W",
        2 => "D",
        _ => "H",
    }
}

/// Mnemonic of `word`, refined by its augment code where the opcode is a group.
///
/// Returns `"???"` for undefined encodings.
pub fn mnemonic(word: u32, base: bool) -> &'static str {
    let entry = opcodes::lookup(word, base);
    match word.opcode() {
        0x00 => match word.aug() {
            aug::HALT => "HALT",
            aug::WAIT => "WAIT",
            aug::NOP => "NOP",
            aug::LCS => "LCS",
            aug::ES => "ES",
            aug::RND => "RND",
            aug::BEI => "BEI",
            aug::UEI => "UEI",
            aug::EAE => "EAE",
            aug::RDSTS => "RDSTS",
            aug::SEA => "SEA",
            aug::DAE => "DAE",
            aug::CEA => "CEA",
            _ => "???",
        },
        0x28 => match word.aug() {
            misc::TRSW => "TRSW",
            misc::TRBR => "TRBR",
            misc::TBRR => "TBRR",
            misc::TCCR => "TCCR",
            misc::TRCC => "TRCC",
            misc::LMAP => "LMAP",
            misc::TMAPR => "TMAPR",
            misc::SETCPU => "SETCPU",
            misc::RETURN => "RETURN",
            _ => "???",
        },
        0xC8 if entry.handler.is_some() => match word.imm_aug() {
            immediate::LI => "LI",
            immediate::CI => "CI",
            immediate::ADI => "ADI",
            immediate::SUI => "SUI",
            immediate::MPI => "MPI",
            immediate::DVI => "DVI",
            immediate::SVC => "SVC",
            _ => "EXR",
        },
        0xF8 => match word.r() {
            group_op::ZM => "ZM",
            group_op::BL => "BL",
            group_op::BRI => "BRI",
            group_op::LPSD => "LPSD",
            group_op::LPSDCM => "LPSDCM",
            group_op::CALL => "CALL",
            _ => "???",
        },
        0xFC => match word.imm_aug() {
            interrupt_op::EI => "EI",
            interrupt_op::DI => "DI",
            interrupt_op::RI => "RI",
            interrupt_op::AI => "AI",
            interrupt_op::DAI => "DAI",
            interrupt_op::XIO => "XIO",
            _ => "???",
        },
        0xEC if word.r() == 0 => "BU",
        _ => entry.mnemonic,
    }
}

/// Disassembles a left-justified instruction word.
///
/// # Arguments
///
/// * `word` - The instruction; a halfword instruction occupies the upper half.
/// * `base` - Decode with the base register mode opcode table.
pub fn disassemble(word: u32, base: bool) -> String {
    let entry = opcodes::lookup(word, base);
    let mn = mnemonic(word, base);
    if entry.handler.is_none() || mn == "???" {
        return format!("??? ({word:#010x})");
    }
    let r = word.r();

    if entry.is_half() {
        return match word.opcode() {
            0x00 => match word.aug() {
                aug::LCS | aug::ES | aug::RND | aug::RDSTS => format!("{mn} R{r}"),
                _ => mn.to_string(),
            },
            0x18 | 0x1C => format!("{mn} R{r}, {}", word.shift_count()),
            0x30 => format!("{mn} {:#05x}", (word >> 16) & 0x3FF),
            _ => format!("{mn} R{r}, R{}", word.r2()),
        };
    }

    if word.opcode() == 0xC8 {
        return match word.imm_aug() {
            immediate::SVC => format!("{mn} {:#06x}", word as u16),
            immediate::EXR => format!("{mn} R{r}"),
            _ => format!("{mn} R{r}, {}", word.displacement()),
        };
    }
    if word.opcode() == 0xFC {
        return format!("{mn} R{r}, {:#x}", word & 0xFFF);
    }

    let operand = if base {
        let b = word.base_reg();
        if b == 0 {
            format!("{:#x}", word.displacement())
        } else {
            format!("{}(B{b})", word.displacement())
        }
    } else {
        let indirect = if word.indirect() { "*" } else { "" };
        let index = if word.x() == 0 {
            String::new()
        } else {
            format!(", X{}", word.x())
        };
        format!("{indirect}{:#x}{index}", word.address() & !3)
    };

    let sized = entry.flags.contains(OpFlags::READ_MEM) || entry.flags.contains(OpFlags::WRITE_MEM);
    if entry.flags.contains(OpFlags::BRANCH) || !sized || word.opcode() == 0xA8 {
        if word.opcode() == 0xEC && r == 0 {
            return format!("{mn} {operand}");
        }
        return format!("{mn} {r}, {operand}");
    }
    let suffix = if entry.flags.contains(OpFlags::BYTE_OPERAND) {
        ""
    } else {
        width_suffix(word)
    };
    format!("{mn}{suffix} R{r}, {operand}")
}
