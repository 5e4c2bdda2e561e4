//! System components outside the CPU.
//!
//! This module holds guest physical memory and the interface to the external
//! I/O channel subsystem, together with a null channel for running with no
//! channel subsystem attached.

/// Channel status words, I/O interrupts and the null channel.
pub mod channel;

/// Installed guest memory.
pub mod memory;

/// Channel subsystem trait.
pub mod traits;

pub use channel::{ChannelStatus, IoInterrupt, NullChannel};
pub use memory::MainMemory;
pub use traits::ChannelSubsystem;
