//! Channel I/O (`XIO`).
//!
//! The core forwards each request to the channel subsystem and turns the
//! returned status into condition codes. Channel programs are never
//! interpreted here.

use tracing::trace;

use super::Execution;
use crate::common::TrapCause;
use crate::core::Cpu;

/// `XIO` function codes.
pub mod func {
    /// Start I/O.
    pub const SIO: u32 = 0x2;
    /// Test I/O.
    pub const TIO: u32 = 0x3;
    /// Stop I/O.
    pub const STPIO: u32 = 0x4;
    /// Reset channel.
    pub const RSCHNL: u32 = 0x5;
    /// Reset controller.
    pub const RSCTL: u32 = 0xF;
}

/// Forwards I/O function `function` for channel/sub-address `chsa`.
pub fn execute(cpu: &mut Cpu, function: u32, chsa: u16) -> Result<Execution, TrapCause> {
    let status = match function {
        func::SIO => cpu.channel.start_io(chsa, &mut cpu.memory),
        func::TIO => cpu.channel.test_io(chsa),
        func::STPIO => cpu.channel.stop_io(chsa),
        func::RSCHNL => cpu.channel.reset_channel(chsa),
        func::RSCTL => cpu.channel.reset_controller(chsa),
        _ => return Err(TrapCause::UndefinedInstruction),
    };
    trace!(chsa, function, status = status.0, "XIO");
    Ok(Execution::next().cc(status.condition_codes()))
}
