//! Effective Address and Branch Tests.
//!
//! Covers indexing, indirect chains (including their condition code
//! override and the chain limit), extended indirection and the branch
//! instructions that consume the resulting addresses.

use pretty_assertions::assert_eq;
use rstest::rstest;

use sel32_core::common::TrapCause;
use sel32_core::core::arch::psd::psd1;
use sel32_core::core::arch::status::trap_status;
use sel32_core::core::cpu::StepResult;

use crate::common::builder::instruction::*;
use crate::common::harness::{PROGRAM, TestContext, icb};

const ICB: u32 = 0x600;
const HANDLER: u32 = 0x4000;

// ══════════════════════════════════════════════════════════
// 1. Indexing
// ══════════════════════════════════════════════════════════

#[test]
fn index_register_is_added_to_the_address() {
    let mut tc = TestContext::new()
        .program(&[mem_indexed(op::L, 1, 2, 0x3000)])
        .with_reg(2, 8)
        .with_word(0x3008, 42);

    assert_eq!(tc.step(), StepResult::Executed);
    assert_eq!(tc.get_reg(1), 42);
}

#[test]
fn indexed_address_wraps_at_19_bits() {
    let mut tc = TestContext::new()
        .program(&[mem_indexed(op::L, 1, 2, 0x7_FFFC)])
        .with_reg(2, 8)
        .with_word(0x4, 77);

    let _ = tc.step();
    assert_eq!(tc.get_reg(1), 77);
}

// ══════════════════════════════════════════════════════════
// 2. Indirection
// ══════════════════════════════════════════════════════════

#[test]
fn indirect_word_supplies_the_address() {
    let mut tc = TestContext::new()
        .program(&[mem_indirect(op::L, 1, 0x3000)])
        .with_word(0x3000, 0x3008)
        .with_word(0x3008, 42);

    assert_eq!(tc.step(), StepResult::Executed);
    assert_eq!(tc.get_reg(1), 42);
}

#[test]
fn indirect_word_may_be_indexed() {
    let mut tc = TestContext::new()
        .program(&[mem_indirect(op::L, 1, 0x3000)])
        .with_word(0x3000, (3 << 21) | 0x3100)
        .with_reg(3, 8)
        .with_word(0x3108, 43);

    let _ = tc.step();
    assert_eq!(tc.get_reg(1), 43);
}

#[test]
fn indirect_chain_is_followed() {
    let mut tc = TestContext::new()
        .program(&[mem_indirect(op::L, 1, 0x3000)])
        .with_word(0x3000, I_BIT | 0x3010)
        .with_word(0x3010, 0x3020)
        .with_word(0x3020, 44);

    let _ = tc.step();
    assert_eq!(tc.get_reg(1), 44);
}

#[test]
fn endless_indirect_chain_is_an_address_specification() {
    let mut tc = TestContext::new()
        .program(&[mem_indirect(op::L, 1, 0x3000)])
        .with_trap_handler(0xB0, ICB, HANDLER)
        .with_word(0x3000, I_BIT | 0x3000);

    assert_eq!(tc.step(), StepResult::Trapped(TrapCause::AddressSpecification));

    assert_ne!(tc.word(ICB + icb::STATUS) & trap_status::ADDR_SPEC, 0);
    assert_eq!(tc.word(ICB + icb::OLD_PSD1) & psd1::PC_MASK, PROGRAM);
}

#[test]
fn extended_indirect_word_is_final() {
    let mut tc = TestContext::new()
        .program(&[mem_indirect(op::L, 1, 0x3000)])
        .with_psd(psd1::PRIVILEGED | psd1::EXTENDED | PROGRAM, 0)
        .with_word(0x3000, I_BIT | 0x5000)
        .with_word(0x10_5000, 99);

    assert_eq!(tc.step(), StepResult::Executed);
    assert_eq!(tc.get_reg(1), 99);
}

#[test]
fn indirect_branch_installs_condition_codes() {
    let mut tc = TestContext::new()
        .program(&[mem_indirect(op::BCT, 0, 0x3000)])
        .with_word(0x3000, psd1::CC2 | 0x2000);

    assert_eq!(tc.step(), StepResult::Executed);

    assert_eq!(tc.pc(), 0x2000);
    assert_eq!(tc.cc(), psd1::CC2);
}

#[test]
fn indirect_load_keeps_its_own_condition_codes() {
    let mut tc = TestContext::new()
        .program(&[mem_indirect(op::L, 1, 0x3000)])
        .with_word(0x3000, psd1::CC1 | 0x3008)
        .with_word(0x3008, 5);

    let _ = tc.step();
    assert_eq!(tc.cc(), psd1::CC2);
}

// ══════════════════════════════════════════════════════════
// 3. Branches
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(3, true)]
#[case(2, false)]
#[case(6, true)]
#[case(0, true)]
fn branch_on_condition_true(#[case] cond: u32, #[case] taken: bool) {
    let mut tc = TestContext::new().program(&[li(1, -1), bct(cond, 0x2000)]);

    let _ = tc.run(2);

    let expected = if taken { 0x2000 } else { PROGRAM + 8 };
    assert_eq!(tc.pc(), expected);
}

#[test]
fn branch_on_condition_false() {
    let mut tc = TestContext::new().program(&[li(1, 0), bcf(2, 0x2000)]);

    let _ = tc.run(2);

    assert_eq!(tc.pc(), 0x2000);
    assert_eq!(tc.cpu.stats.branches_taken, 1);
}

#[test]
fn branch_target_drops_the_low_bit() {
    let mut tc = TestContext::new().program(&[bu(0x2003)]);

    let _ = tc.step();
    assert_eq!(tc.pc(), 0x2002);
}

#[test]
fn branch_and_link_saves_the_return_point() {
    let mut tc = TestContext::new().program(&[bl(0x2000)]);

    assert_eq!(tc.step(), StepResult::Executed);

    assert_eq!(tc.pc(), 0x2000);
    assert_eq!(tc.get_reg(0) & psd1::PC_MASK, PROGRAM + 4);
    assert_ne!(tc.get_reg(0) & psd1::PRIVILEGED, 0);
}

#[test]
fn branch_increment_loops_until_zero() {
    let mut tc = TestContext::new()
        .program(&[biw(1, PROGRAM)])
        .with_reg(1, (-8i32) as u32);

    let _ = tc.step();
    assert_eq!(tc.pc(), PROGRAM);
    assert_eq!(tc.get_reg(1), (-4i32) as u32);

    let _ = tc.step();
    assert_eq!(tc.pc(), PROGRAM + 4);
    assert_eq!(tc.get_reg(1), 0);
}

#[test]
fn transfer_register_to_psw_branches_with_codes() {
    let mut tc = TestContext::new()
        .program(&[trsw(1)])
        .with_reg(1, psd1::CC4 | 0x2400);

    let _ = tc.step();

    assert_eq!(tc.pc(), 0x2400);
    assert_eq!(tc.cc(), psd1::CC4);
}
