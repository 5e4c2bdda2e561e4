//! Opcode Tables.
//!
//! Two 64-entry tables indexed by the six opcode bits, one for non-base and one
//! for base register mode. Each entry carries the mnemonic, the static opcode
//! flags the engine acts on before calling the handler, and the handler. An
//! entry without a handler is an undefined instruction.

use super::exec::{Handler, branch, control, float, immediate, memory, register, system};

/// Static per-opcode attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OpFlags(u16);

impl OpFlags {
    /// No attributes.
    pub const NONE: Self = Self(0);
    /// Halfword register format.
    pub const HALFWORD: Self = Self(0x0001);
    /// Computes an effective address.
    pub const MEMORY: Self = Self(0x0002);
    /// Reads the memory operand before the handler runs.
    pub const READ_MEM: Self = Self(0x0004);
    /// Requires the privileged state.
    pub const PRIVILEGED: Self = Self(0x0008);
    /// The operand is always a byte, whatever the F bit says.
    pub const BYTE_OPERAND: Self = Self(0x0010);
    /// Transfers control.
    pub const BRANCH: Self = Self(0x0020);
    /// Executes another instruction (`EXM`, `EXR`).
    pub const EXECUTE: Self = Self(0x0040);
    /// Writes its memory operand.
    pub const WRITE_MEM: Self = Self(0x0080);

    /// Union of two flag sets.
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True if every flag of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// One opcode table entry.
#[derive(Clone, Copy, Debug)]
pub struct OpcodeEntry {
    /// Mnemonic of the opcode (or of its group).
    pub mnemonic: &'static str,
    /// Static attributes.
    pub flags: OpFlags,
    /// Handler; `None` for undefined opcodes.
    pub handler: Option<Handler>,
}

impl OpcodeEntry {
    /// True for halfword instructions.
    pub const fn is_half(&self) -> bool {
        self.flags.contains(OpFlags::HALFWORD)
    }
}

const UNDEFINED: OpcodeEntry = OpcodeEntry {
    mnemonic: "???",
    flags: OpFlags::NONE,
    handler: None,
};

const fn half(mnemonic: &'static str, handler: Handler) -> OpcodeEntry {
    OpcodeEntry {
        mnemonic,
        flags: OpFlags::HALFWORD,
        handler: Some(handler),
    }
}

const fn full(mnemonic: &'static str, flags: OpFlags, handler: Handler) -> OpcodeEntry {
    OpcodeEntry {
        mnemonic,
        flags,
        handler: Some(handler),
    }
}

const M: OpFlags = OpFlags::MEMORY;
const MR: OpFlags = OpFlags::MEMORY.with(OpFlags::READ_MEM);
const MW: OpFlags = OpFlags::MEMORY.with(OpFlags::WRITE_MEM);
const MRW: OpFlags = MR.with(OpFlags::WRITE_MEM);
const BIT: OpFlags = MR.with(OpFlags::BYTE_OPERAND);
const BRANCH: OpFlags = OpFlags::MEMORY.with(OpFlags::BRANCH);

const fn nonbase_table() -> [OpcodeEntry; 64] {
    let mut t = [UNDEFINED; 64];
    t[0x00 >> 2] = half("CTRL", control::group);
    t[0x04 >> 2] = half("ANR", register::and_group);
    t[0x08 >> 2] = half("ORR", register::or_group);
    t[0x0C >> 2] = half("EOR", register::eor_group);
    t[0x10 >> 2] = half("CAR", register::compare_group);
    t[0x14 >> 2] = half("BITR", register::bit_group);
    t[0x18 >> 2] = half("SR", register::shift_right);
    t[0x1C >> 2] = half("SL", register::shift_left);
    t[0x20 >> 2] = half("TRR", register::transfer_group);
    t[0x28 >> 2] = half("TRSW", system::misc_group);
    t[0x30 >> 2] = half("CALM", immediate::calm);
    t[0x34 >> 2] = full("LA", M, memory::load_address);
    t[0x38 >> 2] = half("ADR", register::add);
    t[0x3C >> 2] = half("SUR", register::subtract);
    t[0x40 >> 2] = half("MPR", register::multiply);
    t[0x44 >> 2] = half("DVR", register::divide);
    t[0x60 >> 2] = half("FLTR", float::register_group);
    t[0x84 >> 2] = full("AND", MR, memory::and);
    t[0x88 >> 2] = full("OR", MR, memory::or);
    t[0x8C >> 2] = full("EOR", MR, memory::eor);
    t[0x90 >> 2] = full("CAM", MR, memory::compare);
    t[0x94 >> 2] = full("CMM", MR, memory::compare_masked);
    t[0x98 >> 2] = full("SBM", BIT.with(OpFlags::WRITE_MEM), memory::set_bit);
    t[0x9C >> 2] = full("ZBM", BIT.with(OpFlags::WRITE_MEM), memory::zero_bit);
    t[0xA0 >> 2] = full("ABM", BIT.with(OpFlags::WRITE_MEM), memory::add_bit);
    t[0xA4 >> 2] = full("TBM", BIT, memory::test_bit);
    t[0xA8 >> 2] = full("EXM", MR.with(OpFlags::EXECUTE), branch::execute_memory);
    t[0xAC >> 2] = full("L", MR, memory::load);
    t[0xB0 >> 2] = full("LM", MR, memory::load_masked);
    t[0xB4 >> 2] = full("LN", MR, memory::load_negative);
    t[0xB8 >> 2] = full("ADM", MR, memory::add);
    t[0xBC >> 2] = full("SUM", MR, memory::subtract);
    t[0xC0 >> 2] = full("MPM", MR, memory::multiply);
    t[0xC4 >> 2] = full("DVM", MR, memory::divide);
    t[0xC8 >> 2] = full("IMM", OpFlags::NONE, immediate::group);
    t[0xCC >> 2] = full("LF", M, memory::load_file);
    t[0xD0 >> 2] = full("LEA", M, memory::load_address);
    t[0xD4 >> 2] = full("ST", MW, memory::store);
    t[0xD8 >> 2] = full("STM", MW, memory::store_masked);
    t[0xDC >> 2] = full("STF", MW, memory::store_file);
    t[0xE0 >> 2] = full("ADF", MR, float::add_memory);
    t[0xE4 >> 2] = full("SUF", MR, float::subtract_memory);
    t[0xE8 >> 2] = full("ARM", MRW, memory::add_to_memory);
    t[0xEC >> 2] = full("BCT", BRANCH, branch::on_true);
    t[0xF0 >> 2] = full("BCF", BRANCH, branch::on_false);
    t[0xF4 >> 2] = full("BI", BRANCH, branch::increment);
    t[0xF8 >> 2] = full("BL", BRANCH, branch::group);
    t[0xFC >> 2] = full("IC", OpFlags::PRIVILEGED, system::interrupt_group);
    t
}

const fn base_table() -> [OpcodeEntry; 64] {
    let mut t = nonbase_table();
    t[0x30 >> 2] = UNDEFINED;
    t[0x34 >> 2] = UNDEFINED;
    t[0xD0 >> 2] = UNDEFINED;
    t[0x50 >> 2] = full("LABR", M, memory::load_base_address);
    t[0x54 >> 2] = full("STWBR", MW, memory::store_base);
    t[0x58 >> 2] = full("LWBR", MR, memory::load_base);
    t
}

/// Non-base mode opcode table.
pub static NONBASE: [OpcodeEntry; 64] = nonbase_table();

/// Base register mode opcode table.
pub static BASE: [OpcodeEntry; 64] = base_table();

/// Looks up the table entry of a left-justified instruction word.
#[inline(always)]
pub fn lookup(word: u32, base: bool) -> &'static OpcodeEntry {
    let table = if base { &BASE } else { &NONBASE };
    &table[(word >> 26) as usize]
}

/// True if `word` is an execute-type instruction (`EXM`, `EXR`, `EXRR`).
pub fn is_execute(word: u32, base: bool) -> bool {
    let entry = lookup(word, base);
    entry.flags.contains(OpFlags::EXECUTE)
        || (word >> 24) & 0xFC == 0xC8 && (word >> 16) & 0x7 == immediate::EXR
}
