//! Channel status words and the null channel.

use super::memory::MainMemory;
use super::traits::ChannelSubsystem;
use crate::core::arch::psd::psd1;

/// Status returned by a channel operation; the low four bits become CC1-CC4.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelStatus(pub u8);

impl ChannelStatus {
    /// Request accepted and started.
    pub const ACCEPTED: Self = Self(0b0000);
    /// Channel busy, request not accepted.
    pub const BUSY: Self = Self(0b0010);
    /// Request accepted, status stored.
    pub const STATUS_STORED: Self = Self(0b0100);
    /// Channel or device not operational.
    pub const NOT_OPERATIONAL: Self = Self(0b0011);

    /// Condition codes in PSD1 position.
    pub const fn condition_codes(self) -> u32 {
        (((self.0 as u32) & 0xF) << 27) & psd1::CC_MASK
    }
}

/// An interrupt reported by the channel subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IoInterrupt {
    /// Priority level to request.
    pub level: u8,
    /// Physical address of the interrupt context block.
    pub context_block: u32,
}

/// Channel subsystem with nothing attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullChannel;

impl ChannelSubsystem for NullChannel {
    fn start_io(&mut self, _chsa: u16, _memory: &mut MainMemory) -> ChannelStatus {
        ChannelStatus::NOT_OPERATIONAL
    }

    fn test_io(&mut self, _chsa: u16) -> ChannelStatus {
        ChannelStatus::NOT_OPERATIONAL
    }

    fn stop_io(&mut self, _chsa: u16) -> ChannelStatus {
        ChannelStatus::NOT_OPERATIONAL
    }

    fn reset_channel(&mut self, _chsa: u16) -> ChannelStatus {
        ChannelStatus::NOT_OPERATIONAL
    }

    fn next_interrupt(&mut self) -> Option<IoInterrupt> {
        None
    }
}
