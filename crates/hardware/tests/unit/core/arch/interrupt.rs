//! Interrupt Level Controller Tests.
//!
//! Verifies the enabled/requested/active state machine and priority ordering:
//! level 0 is highest, and an active level holds off itself and everything
//! below it.

use sel32_core::core::arch::InterruptLevels;

#[test]
fn request_without_enable_is_not_deliverable() {
    let mut ints = InterruptLevels::default();
    ints.request(5, None);
    assert!(ints.is_requested(5));
    assert!(!ints.has_deliverable());
    assert_eq!(ints.take_deliverable(), None);
}

#[test]
fn delivery_moves_request_to_active() {
    let mut ints = InterruptLevels::default();
    ints.enable(5);
    ints.request(5, None);
    assert_eq!(ints.take_deliverable(), Some((5, None)));
    assert!(!ints.is_requested(5));
    assert!(ints.is_active(5));
    assert_eq!(ints.bits(5), 0b101);
}

#[test]
fn highest_priority_goes_first() {
    let mut ints = InterruptLevels::default();
    for level in [9, 3, 40] {
        ints.enable(level);
        ints.request(level, None);
    }
    assert_eq!(ints.take_deliverable(), Some((3, None)));
}

#[test]
fn active_level_holds_off_lower_priorities() {
    let mut ints = InterruptLevels::default();
    ints.enable(2);
    ints.activate(2);
    ints.enable(7);
    ints.request(7, None);
    assert!(!ints.has_deliverable());
    assert_eq!(ints.take_deliverable(), None);

    ints.deactivate(2);
    assert_eq!(ints.take_deliverable(), Some((7, None)));
}

#[test]
fn higher_priority_preempts_an_active_level() {
    let mut ints = InterruptLevels::default();
    ints.enable(10);
    ints.activate(10);
    ints.enable(1);
    ints.request(1, None);
    assert_eq!(ints.take_deliverable(), Some((1, None)));
}

#[test]
fn deactivate_highest_ends_the_innermost_level() {
    let mut ints = InterruptLevels::default();
    ints.activate(4);
    ints.activate(12);
    assert_eq!(ints.deactivate_highest(), Some(4));
    assert!(ints.is_active(12));
    assert_eq!(ints.deactivate_highest(), Some(12));
    assert_eq!(ints.deactivate_highest(), None);
}

#[test]
fn io_request_carries_its_context_block_once() {
    let mut ints = InterruptLevels::default();
    ints.enable(0x14);
    ints.request(0x14, Some(0x900));
    assert_eq!(ints.take_deliverable(), Some((0x14, Some(0x900))));

    ints.deactivate(0x14);
    ints.request(0x14, None);
    assert_eq!(ints.take_deliverable(), Some((0x14, None)));
}

#[test]
fn disable_keeps_the_request_pending() {
    let mut ints = InterruptLevels::default();
    ints.enable(6);
    ints.disable(6);
    ints.request(6, None);
    assert!(!ints.is_enabled(6));
    assert!(ints.is_requested(6));

    ints.enable(6);
    assert!(ints.has_deliverable());
}

#[test]
fn cancel_drops_request_and_block() {
    let mut ints = InterruptLevels::default();
    ints.enable(8);
    ints.request(8, Some(0x700));
    ints.cancel(8);
    assert_eq!(ints.bits(8), 0b001);
    ints.request(8, None);
    assert_eq!(ints.take_deliverable(), Some((8, None)));
}
