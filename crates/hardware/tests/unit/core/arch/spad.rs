//! Scratchpad Tests.
//!
//! Verifies the reset defaults and the configuration key that preserves a
//! software-installed scratchpad across reset.

use sel32_core::core::arch::Scratchpad;
use sel32_core::core::arch::spad::{
    CONFIG_KEY, CONFIG_KEY_VALUE, DEFAULT_INTERRUPT_TABLE, DEFAULT_MASTER_LIST,
    DEFAULT_TRAP_TABLE, LEVEL_BASE, TRAP_TABLE,
};

#[test]
fn reset_installs_defaults() {
    let mut spad = Scratchpad::default();
    assert!(!spad.reset());
    assert_eq!(spad.trap_table(), DEFAULT_TRAP_TABLE);
    assert_eq!(spad.interrupt_table(), DEFAULT_INTERRUPT_TABLE);
    assert_eq!(spad.master_list(), DEFAULT_MASTER_LIST);
    assert!(!spad.configured());
}

#[test]
fn configured_store_survives_reset() {
    let mut spad = Scratchpad::default();
    let _ = spad.reset();
    spad.set(TRAP_TABLE, 0x2000);
    spad.set(CONFIG_KEY, CONFIG_KEY_VALUE);

    assert!(spad.reset());
    assert_eq!(spad.trap_table(), 0x2000);
}

#[test]
fn unconfigured_store_is_wiped() {
    let mut spad = Scratchpad::default();
    let _ = spad.reset();
    spad.set(TRAP_TABLE, 0x2000);
    spad.set(0x10, 0xDEAD);

    assert!(!spad.reset());
    assert_eq!(spad.trap_table(), DEFAULT_TRAP_TABLE);
    assert_eq!(spad.get(0x10), 0);
}

#[test]
fn level_state_touches_only_the_low_bits() {
    let mut spad = Scratchpad::default();
    spad.set(LEVEL_BASE + 3, 0xABCD_0000);
    spad.set_level_state(3, 0b101);
    assert_eq!(spad.level_control(3), 0xABCD_0005);
    spad.set_level_state(3, 0);
    assert_eq!(spad.level_control(3), 0xABCD_0000);
}
