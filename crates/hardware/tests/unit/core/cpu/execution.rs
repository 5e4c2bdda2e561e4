//! Instruction Engine Tests.
//!
//! This module verifies one-step execution semantics:
//! - Halfword pairing and the right-half `NOP` skip per model
//! - Format rules (full-word opcodes in a right half, unassigned opcodes)
//! - Operand widths and sign extension
//! - Overflow policies and the deferred arithmetic exception
//! - Execute-type instructions

use pretty_assertions::assert_eq;
use rstest::rstest;

use sel32_core::common::TrapCause;
use sel32_core::core::arch::CpuModel;
use sel32_core::core::arch::psd::psd1;
use sel32_core::core::arch::status::trap_status;
use sel32_core::core::cpu::StepResult;

use crate::common::builder::instruction::*;
use crate::common::harness::{PROGRAM, TestContext, icb};

// ══════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════

const ICB: u32 = 0x600;
const HANDLER: u32 = 0x4000;

/// Context with a handler installed for `vector`.
fn trapping(model: CpuModel, vector: u32, program: &[u32]) -> TestContext {
    TestContext::with_model(model)
        .program(program)
        .with_trap_handler(vector, ICB, HANDLER)
}

// ══════════════════════════════════════════════════════════
// 1. Basic Operations
// ══════════════════════════════════════════════════════════

#[test]
fn load_immediate_then_add_immediate() {
    let mut tc = TestContext::new().program(&[li(1, 5), adi(1, 3)]);

    assert_eq!(tc.step(), StepResult::Executed);
    assert_eq!(tc.step(), StepResult::Executed);

    assert_eq!(tc.get_reg(1), 8);
    assert_eq!(tc.cc(), psd1::CC2);
    assert_eq!(tc.pc(), PROGRAM + 8);
}

#[test]
fn load_immediate_sets_sign_codes() {
    let mut tc = TestContext::new().program(&[li(2, -1), li(3, 0)]);
    let _ = tc.step();
    assert_eq!(tc.get_reg(2), 0xFFFF_FFFF);
    assert_eq!(tc.cc(), psd1::CC3);
    let _ = tc.step();
    assert_eq!(tc.cc(), psd1::CC4);
}

#[test]
fn store_then_load_word() {
    let mut tc = TestContext::new()
        .program(&[stw(1, 0x2000), lw(2, 0x2000)])
        .with_reg(1, 0xCAFE_F00D);

    let _ = tc.run(2);

    assert_eq!(tc.word(0x2000), 0xCAFE_F00D);
    assert_eq!(tc.get_reg(2), 0xCAFE_F00D);
}

#[test]
fn operand_widths_follow_f_and_c() {
    let mut tc = TestContext::new()
        .program(&[lb(1, 0x2003), lh(2, 0x2002), lh(3, 0x2000), ld(4, 0x2000)])
        .with_word(0x2000, 0x1234_80FF)
        .with_word(0x2004, 0x0000_0007);

    let _ = tc.run(4);

    assert_eq!(tc.get_reg(1), 0xFF, "bytes are zero-extended");
    assert_eq!(tc.get_reg(2), 0xFFFF_80FF, "halfwords are sign-extended");
    assert_eq!(tc.get_reg(3), 0x1234);
    assert_eq!(tc.get_reg(4), 0x1234_80FF);
    assert_eq!(tc.get_reg(5), 7);
}

#[test]
fn misaligned_doubleword_is_an_address_specification_trap() {
    let mut tc = trapping(CpuModel::M3287, 0xB0, &[mem(op::L, 2, 0x2006)]);

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::AddressSpecification));
    assert_ne!(tc.word(ICB + icb::STATUS) & trap_status::ADDR_SPEC, 0);
    assert_eq!(tc.word(ICB + icb::OLD_PSD1) & psd1::PC_MASK, PROGRAM);
}

// ══════════════════════════════════════════════════════════
// 2. Halfword Pairing
// ══════════════════════════════════════════════════════════

#[test]
fn halfword_pair_executes_left_then_right() {
    let word = pair(half(op::ADR, 1, 2, 0), half(op::ADR, 3, 4, 0));
    let mut tc = TestContext::new()
        .program(&[word])
        .with_reg(1, 1)
        .with_reg(2, 2)
        .with_reg(3, 10)
        .with_reg(4, 20);

    let _ = tc.step();
    assert_eq!(tc.pc(), PROGRAM + 2);
    assert_eq!(tc.get_reg(1), 3);
    assert_eq!(tc.get_reg(3), 10);

    let _ = tc.step();
    assert_eq!(tc.pc(), PROGRAM + 4);
    assert_eq!(tc.get_reg(3), 30);
    assert_eq!(tc.cpu.stats.inst_half, 2);
}

#[rstest]
#[case(CpuModel::M3287, PROGRAM + 4, 1)]
#[case(CpuModel::V9, PROGRAM + 4, 1)]
#[case(CpuModel::M327x, PROGRAM + 2, 0)]
fn right_nop_after_left_halfword(#[case] model: CpuModel, #[case] pc: u32, #[case] dropped: u64) {
    let mut tc = TestContext::with_model(model)
        .program(&[adr(1, 2)])
        .with_reg(1, 4)
        .with_reg(2, 5);

    assert_eq!(tc.step(), StepResult::Executed);

    assert_eq!(tc.get_reg(1), 9);
    assert_eq!(tc.pc(), pc);
    assert_eq!(tc.cpu.stats.nops_dropped, dropped);
}

#[test]
fn right_half_nop_executes_on_3275() {
    let mut tc = TestContext::with_model(CpuModel::M327x).program(&[adr(1, 2), halt()]);

    let _ = tc.step();
    assert_eq!(tc.step(), StepResult::Executed);
    assert_eq!(tc.pc(), PROGRAM + 4);
    assert_eq!(tc.cpu.stats.instructions_retired, 2);
}

#[test]
fn half_executed_bit_tracks_last_instruction() {
    let mut tc = TestContext::new().program(&[adr(1, 2), li(1, 0)]);

    let _ = tc.step();
    assert!(tc.cpu.state.psd.half_executed());
    let _ = tc.step();
    assert!(!tc.cpu.state.psd.half_executed());
}

#[test]
fn full_word_opcode_in_right_half_is_undefined() {
    let word = pair(half(op::ADR, 1, 2, 0), (u16::from(op::L) << 8) | 0x80);
    let mut tc = trapping(CpuModel::M3287, 0x90, &[word]);

    assert_eq!(tc.step(), StepResult::Executed);
    assert_eq!(tc.pc(), PROGRAM + 2);
    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::UndefinedInstruction));
    assert_ne!(tc.word(ICB + icb::STATUS) & trap_status::UNDEFINED, 0);
}

#[rstest]
#[case(CpuModel::M3287, PROGRAM + 4)]
#[case(CpuModel::M3297, PROGRAM)]
#[case(CpuModel::V9, PROGRAM)]
fn undefined_opcode_resume_point(#[case] model: CpuModel, #[case] resume: u32) {
    let mut tc = trapping(model, 0x90, &[0x2400_0000]);

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::UndefinedInstruction));
    assert_eq!(tc.word(ICB + icb::OLD_PSD1) & psd1::PC_MASK, resume);
    assert_eq!(tc.pc(), HANDLER);
}

#[test]
fn unassigned_augment_code_is_undefined() {
    let mut tc = trapping(CpuModel::M3287, 0x90, &[solo(half(op::MISC, 0, 0, 0xF))]);
    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::UndefinedInstruction));
}

// ══════════════════════════════════════════════════════════
// 3. Overflow and Deferred Arithmetic Exceptions
// ══════════════════════════════════════════════════════════

#[test]
fn divide_by_zero_sets_cc1_and_leaves_registers() {
    let mut tc = TestContext::new()
        .program(&[dvr(2, 4)])
        .with_reg(2, 0)
        .with_reg(3, 100)
        .with_reg(4, 0);

    assert_eq!(tc.step(), StepResult::Executed);

    assert_eq!(tc.cc(), psd1::CC1);
    assert_eq!(tc.get_reg(2), 0);
    assert_eq!(tc.get_reg(3), 100);
    assert_eq!(tc.pc(), PROGRAM + 4);
}

#[test]
fn divide_pair_by_register() {
    let mut tc = TestContext::new()
        .program(&[dvr(2, 4)])
        .with_reg(2, 0)
        .with_reg(3, 103)
        .with_reg(4, 10);

    let _ = tc.step();

    assert_eq!(tc.get_reg(2), 3, "remainder in the even register");
    assert_eq!(tc.get_reg(3), 10, "quotient in the odd register");
    assert_eq!(tc.cc(), psd1::CC2);
}

#[test]
fn divide_by_zero_with_aexp_traps_after_advancing() {
    let mut tc = trapping(CpuModel::M3287, 0xBC, &[dvi(2, 0)])
        .with_reg(2, 5)
        .with_reg(3, 6)
        .with_aexp();

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::ArithmeticException));

    assert_eq!(tc.get_reg(2), 5);
    assert_eq!(tc.get_reg(3), 6);
    let old = tc.word(ICB + icb::OLD_PSD1);
    assert_eq!(old & psd1::PC_MASK, PROGRAM + 4);
    assert_eq!(old & psd1::CC_MASK, psd1::CC1);
    assert_eq!(tc.cpu.stats.arithmetic_traps, 1);
}

#[test]
fn register_add_overflow_commits_without_aexp() {
    let mut tc = TestContext::new()
        .program(&[adr(1, 2)])
        .with_reg(1, 0x7FFF_FFFF)
        .with_reg(2, 1);

    assert_eq!(tc.step(), StepResult::Executed);

    assert_eq!(tc.get_reg(1), 0x8000_0000);
    assert_eq!(tc.cc(), psd1::CC1 | psd1::CC3);
}

#[test]
fn register_add_overflow_with_aexp_suppresses_result() {
    let mut tc = trapping(CpuModel::M3287, 0xBC, &[adr(1, 2)])
        .with_reg(1, 0x7FFF_FFFF)
        .with_reg(2, 1)
        .with_aexp();

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::ArithmeticException));

    assert_eq!(tc.get_reg(1), 0x7FFF_FFFF);
    assert_eq!(tc.word(ICB + icb::OLD_PSD1) & psd1::CC1, psd1::CC1);
}

#[test]
fn memory_add_overflow_with_aexp_suppresses_result() {
    let mut tc = trapping(CpuModel::M3287, 0xBC, &[admw(1, 0x2000)])
        .with_reg(1, 0x7FFF_FFFF)
        .with_word(0x2000, 1)
        .with_aexp();

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::ArithmeticException));
    assert_eq!(tc.get_reg(1), 0x7FFF_FFFF);
}

#[test]
fn add_bit_overflow_commits_then_traps() {
    // Bit 7 of byte 3 is the least significant bit of the word.
    let mut tc = trapping(CpuModel::M3287, 0xBC, &[mem(op::ABM, 7, 0x2003)])
        .with_word(0x2000, 0x7FFF_FFFF)
        .with_aexp();

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::ArithmeticException));
    assert_eq!(tc.word(0x2000), 0x8000_0000);
}

#[test]
fn enable_arithmetic_exceptions_instruction() {
    let mut tc = trapping(CpuModel::M3287, 0xBC, &[eae(), adr(1, 2)])
        .with_reg(1, i32::MIN as u32)
        .with_reg(2, u32::MAX);

    let _ = tc.step();
    assert!(tc.cpu.state.psd.aexp_enabled());
    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::ArithmeticException));
}

#[rstest]
#[case(CpuModel::M3287, false)]
#[case(CpuModel::V9, true)]
fn half_bit_in_saved_psd_depends_on_model(#[case] model: CpuModel, #[case] kept: bool) {
    let mut tc = trapping(model, 0xBC, &[adr(1, 2)])
        .with_reg(1, 0x7FFF_FFFF)
        .with_reg(2, 1)
        .with_aexp();

    let _ = tc.step();

    let old = tc.word(ICB + icb::OLD_PSD1);
    assert_eq!(old & psd1::HALF_EXECUTED != 0, kept);
}

// ══════════════════════════════════════════════════════════
// 4. Execute Instructions
// ══════════════════════════════════════════════════════════

#[test]
fn execute_memory_runs_the_target_in_place() {
    let mut tc = TestContext::new()
        .program(&[exm(0x3000)])
        .with_word(0x3000, li(3, 7));

    assert_eq!(tc.step(), StepResult::Executed);

    assert_eq!(tc.get_reg(3), 7);
    assert_eq!(tc.pc(), PROGRAM + 4);
    assert_eq!(tc.cpu.stats.instructions_retired, 1);
}

#[test]
fn execute_register_runs_register_contents() {
    let mut tc = TestContext::new()
        .program(&[exr(5)])
        .with_reg(5, adi(1, 2))
        .with_reg(1, 40);

    let _ = tc.step();

    assert_eq!(tc.get_reg(1), 42);
    assert_eq!(tc.pc(), PROGRAM + 4);
}

#[test]
fn executed_branch_redirects_control() {
    let mut tc = TestContext::new()
        .program(&[exm(0x3000)])
        .with_word(0x3000, bu(0x5000));

    let _ = tc.step();
    assert_eq!(tc.pc(), 0x5000);
}

#[test]
fn execute_of_execute_is_undefined() {
    let mut tc = trapping(CpuModel::M3287, 0x90, &[exm(0x3000)]).with_word(0x3000, exm(0x3000));

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::UndefinedInstruction));
}

// ══════════════════════════════════════════════════════════
// 5. Privilege
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(CpuModel::M3287, PROGRAM + 2)]
#[case(CpuModel::V6, PROGRAM)]
fn halt_in_unprivileged_state(#[case] model: CpuModel, #[case] resume: u32) {
    let mut tc = trapping(model, 0x94, &[halt()]).unprivileged();

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::PrivilegeViolation));

    assert_ne!(tc.word(ICB + icb::STATUS) & trap_status::PRIVILEGE, 0);
    assert_eq!(tc.word(ICB + icb::OLD_PSD1) & psd1::PC_MASK, resume);
    assert_eq!(tc.cpu.halt_reason(), None);
}

#[test]
fn interrupt_control_is_privileged() {
    let mut tc = trapping(CpuModel::M3287, 0x94, &[ei(3)]).unprivileged();
    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::PrivilegeViolation));
    assert!(!tc.cpu.state.interrupts.is_enabled(3));
}

#[test]
fn privileged_halt_stops_the_engine() {
    let mut tc = TestContext::new().program(&[halt()]);

    assert!(matches!(tc.step(), StepResult::Halted(_)));
    assert!(matches!(tc.step(), StepResult::Halted(_)));
    assert_eq!(tc.cpu.stats.instructions_retired, 1);
}
