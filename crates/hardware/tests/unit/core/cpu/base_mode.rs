//! Base Register Mode Tests.

use pretty_assertions::assert_eq;

use sel32_core::common::TrapCause;
use sel32_core::core::arch::psd::psd1;
use sel32_core::core::cpu::StepResult;

use crate::common::builder::instruction::*;
use crate::common::harness::{PROGRAM, TestContext};

const ICB: u32 = 0x600;
const HANDLER: u32 = 0x4000;
const LABR: u8 = 0x50;
const STWBR: u8 = 0x54;
const LWBR: u8 = 0x58;

fn base_mode(program: &[u32]) -> TestContext {
    TestContext::new()
        .program(program)
        .with_psd(psd1::PRIVILEGED | psd1::BASE_MODE | PROGRAM, 0)
}

fn with_base(mut tc: TestContext, b: usize, val: u32) -> TestContext {
    tc.cpu.state.regs.write_base(b, val);
    tc
}

#[test]
fn base_plus_displacement() {
    let tc = base_mode(&[based(op::L, 1, 2, 8), based(op::L, 3, 2, -8)]).with_word(0x3008, 42);
    let mut tc = with_base(tc, 2, 0x3000).with_word(0x2FF8, 7);

    assert_eq!(tc.run(2), StepResult::Executed);

    assert_eq!(tc.get_reg(1), 42);
    assert_eq!(tc.get_reg(3), 7);
}

#[test]
fn base_register_zero_means_no_base() {
    let tc = base_mode(&[based(op::L, 1, 0, 0x2000)]).with_word(0x2000, 11);
    let mut tc = with_base(tc, 0, 0x5_0000);

    let _ = tc.step();
    assert_eq!(tc.get_reg(1), 11);
}

#[test]
fn base_addresses_span_24_bits() {
    let tc = base_mode(&[based(op::L, 1, 2, 4)]).with_word(0x10_0004, 12);
    let mut tc = with_base(tc, 2, 0x10_0000);

    let _ = tc.step();
    assert_eq!(tc.get_reg(1), 12);
}

#[test]
fn base_register_loads_and_stores() {
    let tc = base_mode(&[
        based(LWBR, 3, 2, 0),
        based(STWBR, 3, 0, 0x3004),
        based(LABR, 4, 2, 0x10),
    ])
    .with_word(0x3000, 0x5555);
    let mut tc = with_base(tc, 2, 0x3000);

    assert_eq!(tc.run(3), StepResult::Executed);

    let regs = &tc.cpu.state.regs;
    assert_eq!(regs.read_base(3), 0x5555);
    assert_eq!(regs.read_base(4), 0x3010);
    assert_eq!(tc.word(0x3004), 0x5555);
}

#[test]
fn register_transfers_between_files() {
    let mut tc = base_mode(&[solo(half(op::MISC, 5, 1, 0x1)), solo(half(op::MISC, 6, 5, 0x2))])
        .with_reg(1, 0xABCD);

    assert_eq!(tc.run(2), StepResult::Executed);

    assert_eq!(tc.cpu.state.regs.read_base(5), 0xABCD);
    assert_eq!(tc.get_reg(6), 0xABCD);
}

// ══════════════════════════════════════════════════════════
// Procedure Call
// ══════════════════════════════════════════════════════════

fn calling() -> TestContext {
    let tc = base_mode(&[call(0, 0x2000)]).with_word(0x2000, ret());
    let tc = with_base(tc, 0, 0x111);
    let tc = with_base(tc, 3, 0x333);
    with_base(tc, 2, 0x4000)
}

#[test]
fn call_pushes_a_frame() {
    let mut tc = calling();

    assert_eq!(tc.step(), StepResult::Executed);

    assert_eq!(tc.pc(), 0x2000);
    let regs = &tc.cpu.state.regs;
    assert_eq!(regs.read_base(1), 0x4000);
    assert_eq!(regs.read_base(2), 0x4028);
    assert_eq!(tc.word(0x4000) & psd1::PC_MASK, PROGRAM + 4);
    assert_eq!(tc.word(0x4004), 0x111);
    assert_eq!(tc.word(0x400C), 0x4000);
    assert_eq!(tc.word(0x4010), 0x333);
    assert_eq!(tc.word(0x4024), 0x2000);
}

#[test]
fn return_restores_the_caller() {
    let mut tc = calling();

    let _ = tc.step();
    tc.cpu.state.regs.write_base(3, 0xBAD);
    assert_eq!(tc.step(), StepResult::Executed);

    assert_eq!(tc.pc(), PROGRAM + 4);
    let regs = &tc.cpu.state.regs;
    assert_eq!(regs.read_base(1), 0);
    assert_eq!(regs.read_base(2), 0x4000);
    assert_eq!(regs.read_base(3), 0x333);
}

#[test]
fn call_frame_address_wraps_to_24_bits() {
    let mut tc = with_base(calling(), 2, 0xFF00_4000);

    assert_eq!(tc.step(), StepResult::Executed);

    let regs = &tc.cpu.state.regs;
    assert_eq!(regs.read_base(1), 0x4000);
    assert_eq!(regs.read_base(2), 0x4028);
    assert_eq!(tc.word(0x4004), 0x111);
}

#[test]
fn call_frame_at_the_top_of_the_address_space_traps() {
    let tc = calling().with_trap_handler(0x8C, ICB, HANDLER);
    let mut tc = with_base(tc, 2, 0xFFFF_FFF8);

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::NonPresentMemory));
    assert_eq!(tc.cpu.state.regs.read_base(2), 0xFFFF_FFF8);
}

#[test]
fn return_frame_address_wraps_to_24_bits() {
    let mut tc = calling();

    let _ = tc.step();
    let frame = tc.cpu.state.regs.read_base(1);
    tc.cpu.state.regs.write_base(1, 0xFF00_0000 | frame);
    assert_eq!(tc.step(), StepResult::Executed);

    assert_eq!(tc.pc(), PROGRAM + 4);
    assert_eq!(tc.cpu.state.regs.read_base(3), 0x333);
}

#[test]
fn return_frame_at_the_top_of_the_address_space_traps() {
    let tc = base_mode(&[ret()]).with_trap_handler(0x8C, ICB, HANDLER);
    let mut tc = with_base(tc, 1, 0xFFFF_FFF0);

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::NonPresentMemory));
}

#[test]
fn misaligned_frame_is_an_address_specification() {
    let tc = calling().with_trap_handler(0xB0, ICB, HANDLER);
    let mut tc = with_base(tc, 2, 0x4002);

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::AddressSpecification));
}

// ══════════════════════════════════════════════════════════
// Mode Checks
// ══════════════════════════════════════════════════════════

#[test]
fn call_outside_base_mode_is_undefined() {
    let mut tc = TestContext::new()
        .program(&[call(0, 0x2000)])
        .with_trap_handler(0x90, ICB, HANDLER);

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::UndefinedInstruction));
}

#[test]
fn call_monitor_opcode_is_undefined_in_base_mode() {
    let mut tc = base_mode(&[calm(1)]).with_trap_handler(0x90, ICB, HANDLER);

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::UndefinedInstruction));
}

#[test]
fn base_register_transfer_needs_base_mode() {
    let mut tc = TestContext::new()
        .program(&[solo(half(op::MISC, 5, 1, 0x1))])
        .with_trap_handler(0x90, ICB, HANDLER);

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::UndefinedInstruction));
}
