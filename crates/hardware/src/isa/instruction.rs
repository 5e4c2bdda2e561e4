//! Instruction encoding and field extraction.
//!
//! Instructions are handled as left-justified 32-bit words: a halfword
//! instruction occupies bits 0-15 (the upper half of the word) whichever half
//! of memory it was fetched from. Bit 0 is the most significant bit.
//!
//! Formats:
//! 1. **Register (halfword):** op (0-5), R (6-8), R2 (9-11), aug (12-15).
//! 2. **Memory reference:** op, R, X (9-10), I (11), F (12), address (13-31).
//! 3. **Base memory reference:** op, R, B (9-11), F (12), displacement (16-31).
//! 4. **Immediate:** op, R, aug (13-15), immediate (16-31).

use crate::core::arch::psd::psd1;

/// Opcode byte (bits 0-5, low two bits clear).
pub const OPCODE_MASK: u32 = 0xFC;
/// Register field width mask.
pub const REG_MASK: u32 = 0x7;
/// Indirect bit.
pub const INDIRECT_BIT: u32 = 0x0010_0000;
/// Format (byte) bit.
pub const F_BIT: u32 = 0x0008_0000;
/// Non-base address field.
pub const ADDRESS_MASK: u32 = 0x0007_FFFF;
/// Condition code bits carried by an indirect word.
pub const CC_OVERRIDE_MASK: u32 = psd1::CC_MASK;

/// Field extraction for left-justified instruction words.
pub trait InstructionBits {
    /// Index into the 64-entry opcode table.
    fn op_index(&self) -> usize;
    /// Opcode byte (`0x00`-`0xFC`).
    fn opcode(&self) -> u8;
    /// Register field R (bits 6-8).
    fn r(&self) -> usize;
    /// Second register field R2 (bits 9-11).
    fn r2(&self) -> usize;
    /// Augment code of the register format (bits 12-15).
    fn aug(&self) -> u32;
    /// Index register field X (bits 9-10).
    fn x(&self) -> usize;
    /// Indirect bit I.
    fn indirect(&self) -> bool;
    /// Format bit F.
    fn f(&self) -> bool;
    /// Address field (bits 13-31).
    fn address(&self) -> u32;
    /// Base register field B (bits 9-11).
    fn base_reg(&self) -> usize;
    /// Signed 16-bit displacement or immediate (bits 16-31).
    fn displacement(&self) -> i32;
    /// Augment code of the immediate format (bits 13-15).
    fn imm_aug(&self) -> u32;
    /// Bit number of the register bit operations (bits 9-13).
    fn bit_number(&self) -> u32;
    /// Sub-operation of the register bit operations (bits 14-15).
    fn bit_op(&self) -> u32;
    /// Shift kind (bits 9-10).
    fn shift_kind(&self) -> u32;
    /// Shift count (bits 11-15).
    fn shift_count(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn op_index(&self) -> usize {
        (self >> 26) as usize
    }

    #[inline(always)]
    fn opcode(&self) -> u8 {
        ((self >> 24) & OPCODE_MASK) as u8
    }

    #[inline(always)]
    fn r(&self) -> usize {
        ((self >> 23) & REG_MASK) as usize
    }

    #[inline(always)]
    fn r2(&self) -> usize {
        ((self >> 20) & REG_MASK) as usize
    }

    #[inline(always)]
    fn aug(&self) -> u32 {
        (self >> 16) & 0xF
    }

    #[inline(always)]
    fn x(&self) -> usize {
        ((self >> 21) & 0x3) as usize
    }

    #[inline(always)]
    fn indirect(&self) -> bool {
        self & INDIRECT_BIT != 0
    }

    #[inline(always)]
    fn f(&self) -> bool {
        self & F_BIT != 0
    }

    #[inline(always)]
    fn address(&self) -> u32 {
        self & ADDRESS_MASK
    }

    #[inline(always)]
    fn base_reg(&self) -> usize {
        ((self >> 20) & REG_MASK) as usize
    }

    #[inline(always)]
    fn displacement(&self) -> i32 {
        i32::from(*self as u16 as i16)
    }

    #[inline(always)]
    fn imm_aug(&self) -> u32 {
        (self >> 16) & 0x7
    }

    fn bit_number(&self) -> u32 {
        (self >> 18) & 0x1F
    }

    fn bit_op(&self) -> u32 {
        (self >> 16) & 0x3
    }

    fn shift_kind(&self) -> u32 {
        (self >> 21) & 0x3
    }

    fn shift_count(&self) -> u32 {
        (self >> 16) & 0x1F
    }
}

/// Width of a memory operand, selected by the F and C fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandSize {
    /// Byte (`F = 1`).
    Byte,
    /// Halfword (`C = 1` left, `C = 3` right).
    Half,
    /// Word (`C = 0`).
    Word,
    /// Doubleword (`C = 2`).
    Double,
}

impl OperandSize {
    /// Operand length in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
            Self::Double => 8,
        }
    }
}

/// A resolved memory operand: logical address and width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemRef {
    /// Logical byte address of the operand.
    pub addr: u32,
    /// Operand width.
    pub size: OperandSize,
}

impl MemRef {
    /// Creates a word reference.
    pub const fn word(addr: u32) -> Self {
        Self {
            addr,
            size: OperandSize::Word,
        }
    }

    /// Creates a doubleword reference.
    pub const fn double(addr: u32) -> Self {
        Self {
            addr,
            size: OperandSize::Double,
        }
    }

    /// Resolves an effective address and F bit into an operand reference.
    ///
    /// # Returns
    ///
    /// `None` if a doubleword reference is not doubleword aligned.
    pub const fn from_fc(ea: u32, f: bool) -> Option<Self> {
        if f {
            return Some(Self {
                addr: ea,
                size: OperandSize::Byte,
            });
        }
        let word = ea & !3;
        match ea & 3 {
            0 => Some(Self::word(word)),
            1 => Some(Self {
                addr: word,
                size: OperandSize::Half,
            }),
            3 => Some(Self {
                addr: word + 2,
                size: OperandSize::Half,
            }),
            _ => {
                if word & 4 != 0 {
                    None
                } else {
                    Some(Self::double(word))
                }
            }
        }
    }
}

/// A decoded instruction ready for execution.
#[derive(Clone, Debug)]
pub struct Decoded {
    /// Left-justified instruction word.
    pub word: u32,
    /// Address of the instruction (bit 30 set for a right half).
    pub pc: u32,
    /// Address execution continues at when the instruction completes normally.
    pub next_pc: u32,
    /// True for halfword instructions.
    pub half: bool,
    /// Effective address (0 for instructions without one).
    pub ea: u32,
    /// Resolved memory operand, for instructions that read or write memory.
    pub operand: Option<MemRef>,
    /// Operand value read from memory (bytes zero-extended, halfwords sign-extended).
    pub value: u64,
    /// Condition codes carried by the last indirect word, if any.
    pub cc_override: Option<u32>,
}

impl Decoded {
    /// A decoded instruction with no operand yet.
    pub const fn new(word: u32, pc: u32, next_pc: u32, half: bool) -> Self {
        Self {
            word,
            pc,
            next_pc,
            half,
            ea: 0,
            operand: None,
            value: 0,
            cc_override: None,
        }
    }

    /// Register field R.
    #[inline(always)]
    pub fn r(&self) -> usize {
        self.word.r()
    }

    /// Operand value as a word.
    #[inline(always)]
    pub const fn value32(&self) -> u32 {
        self.value as u32
    }

    /// Operand width (word when there is no memory operand).
    pub fn size(&self) -> OperandSize {
        self.operand.map_or(OperandSize::Word, |m| m.size)
    }
}
