//! Channel subsystem interface.
//!
//! The CPU hands every I/O instruction to a channel subsystem and polls it for
//! pending interrupts between instructions. The core never interprets channel
//! programs; it only merges the returned status into the condition codes and
//! delivers the interrupts the channel reports.

use std::fmt;

use crate::soc::channel::{ChannelStatus, IoInterrupt};
use crate::soc::memory::MainMemory;

/// External I/O channel collaborator.
///
/// All addresses are 15-bit channel/sub-addresses. Implementors must be `Send`
/// so that a whole `Cpu` can move to a worker thread.
pub trait ChannelSubsystem: fmt::Debug + Send {
    /// Starts the channel program for `chsa` (`SIO`). Guest memory is passed so the
    /// channel can read its command list.
    fn start_io(&mut self, chsa: u16, memory: &mut MainMemory) -> ChannelStatus;

    /// Reports the state of `chsa` (`TIO`).
    fn test_io(&mut self, chsa: u16) -> ChannelStatus;

    /// Stops the running program on `chsa` (`STPIO`).
    fn stop_io(&mut self, chsa: u16) -> ChannelStatus;

    /// Resets the channel containing `chsa` (`RSCHNL`).
    fn reset_channel(&mut self, chsa: u16) -> ChannelStatus;

    /// Resets the controller addressed by `chsa` (`RSCTL`).
    fn reset_controller(&mut self, chsa: u16) -> ChannelStatus {
        self.reset_channel(chsa)
    }

    /// Takes the next pending I/O interrupt, if any.
    fn next_interrupt(&mut self) -> Option<IoInterrupt>;

    /// True if the channel has work that will eventually raise an interrupt.
    fn busy(&self) -> bool {
        false
    }
}
