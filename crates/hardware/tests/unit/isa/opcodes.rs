//! Opcode table tests.

use pretty_assertions::assert_eq;
use rstest::rstest;

use sel32_core::isa::opcodes::{BASE, NONBASE, OpFlags, is_execute, lookup};

use crate::common::builder::instruction::*;

/// Opcodes whose meaning changes in base register mode.
const BASE_ONLY: [u8; 3] = [0x50, 0x54, 0x58];
const NONBASE_ONLY: [u8; 3] = [0x30, 0x34, 0xD0];

fn opcode_word(op: u8) -> u32 {
    u32::from(op) << 24
}

#[rstest]
#[case(0xAC, "L", OpFlags::READ_MEM)]
#[case(0xD4, "ST", OpFlags::WRITE_MEM)]
#[case(0xEC, "BCT", OpFlags::BRANCH)]
#[case(0xFC, "IC", OpFlags::PRIVILEGED)]
#[case(0xA8, "EXM", OpFlags::EXECUTE)]
#[case(0xA0, "ABM", OpFlags::BYTE_OPERAND)]
fn entries_carry_their_attributes(#[case] op: u8, #[case] name: &str, #[case] flag: OpFlags) {
    let entry = lookup(opcode_word(op), false);
    assert_eq!(entry.mnemonic, name);
    assert!(entry.flags.contains(flag));
    assert!(entry.handler.is_some());
}

#[test]
fn halfword_opcodes_sit_in_the_low_range() {
    for i in 0u8..64 {
        let entry = &NONBASE[usize::from(i)];
        if entry.is_half() {
            assert!(i < 0x20, "opcode {:#04x} is a halfword", i << 2);
        }
    }
}

#[test]
fn unassigned_opcodes_have_no_handler() {
    assert!(lookup(0x2400_0000, false).handler.is_none());
    assert!(lookup(0xFE00_0000, false).handler.is_some());
    assert_eq!(lookup(0x2400_0000, false).mnemonic, "???");
}

#[test]
fn base_table_differs_only_where_modes_differ() {
    for i in 0..64usize {
        let op = (i << 2) as u8;
        let (plain, based) = (&NONBASE[i], &BASE[i]);
        if BASE_ONLY.contains(&op) {
            assert!(plain.handler.is_none() && based.handler.is_some());
        } else if NONBASE_ONLY.contains(&op) {
            assert!(plain.handler.is_some() && based.handler.is_none());
        } else {
            assert_eq!(plain.mnemonic, based.mnemonic);
            assert_eq!(plain.flags, based.flags);
        }
    }
}

#[test]
fn lookup_selects_table_by_mode() {
    assert_eq!(lookup(0x5000_0000, true).mnemonic, "LABR");
    assert!(lookup(0x5000_0000, false).handler.is_none());
    assert!(lookup(calm(1), true).handler.is_none());
    assert!(lookup(calm(1), false).is_half());
}

#[test]
fn execute_type_instructions() {
    assert!(is_execute(exm(0x2000), false));
    assert!(is_execute(exr(1), false));
    assert!(!is_execute(li(1, 0), false));
    assert!(!is_execute(svc(7), false));
}

#[test]
fn flag_union_contains_both() {
    let flags = OpFlags::MEMORY.with(OpFlags::READ_MEM);
    assert!(flags.contains(OpFlags::MEMORY));
    assert!(flags.contains(OpFlags::READ_MEM));
    assert!(!flags.contains(OpFlags::WRITE_MEM));
    assert!(OpFlags::NONE.contains(OpFlags::NONE));
}
