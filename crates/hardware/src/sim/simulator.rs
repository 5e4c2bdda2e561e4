//! Simulator: owns the CPU and drives `step()`.
//!
//! The run loop stops on a halt, a step limit or an external stop request. In
//! the wait state it keeps stepping while the channel subsystem has work that
//! may still raise an interrupt, and reports [`RunExit::Idle`] once nothing can
//! ever wake the CPU.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::common::{HaltReason, SimError};
use crate::config::Config;
use crate::core::Cpu;
use crate::core::cpu::StepResult;
use crate::soc::ChannelSubsystem;

/// Why [`Simulator::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunExit {
    /// The engine stopped.
    Halted(HaltReason),
    /// The step limit was reached.
    StepLimit,
    /// A stop was requested through [`Simulator::stop_handle`].
    Stopped,
    /// The CPU waits with nothing able to wake it.
    Idle,
}

/// Top-level simulator.
#[derive(Debug)]
pub struct Simulator {
    /// The emulated processor.
    pub cpu: Cpu,
    stop: Arc<AtomicBool>,
}

impl Simulator {
    /// Creates a simulator with no I/O channel attached.
    ///
    /// # Errors
    ///
    /// [`SimError::MemorySize`] if the configured memory size is unsupported.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        Ok(Self::from_cpu(Cpu::new(config)?))
    }

    /// Creates a simulator wired to `channel`.
    ///
    /// # Errors
    ///
    /// [`SimError::MemorySize`] if the configured memory size is unsupported.
    pub fn with_channel(
        config: &Config,
        channel: Box<dyn ChannelSubsystem>,
    ) -> Result<Self, SimError> {
        Ok(Self::from_cpu(Cpu::with_channel(config, channel)?))
    }

    /// Wraps an existing CPU.
    pub fn from_cpu(cpu: Cpu) -> Self {
        Self {
            cpu,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops [`Simulator::run`] at the next instruction boundary
    /// when set from another thread.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Requests a console attention trap.
    pub fn request_attention(&mut self) {
        self.cpu.request_attention();
    }

    /// Steps the CPU until it halts, idles, is stopped, or `max_steps` steps
    /// have been taken (`None` for no limit).
    pub fn run(&mut self, max_steps: Option<u64>) -> RunExit {
        let mut taken = 0u64;
        let exit = loop {
            if self.stop.swap(false, Ordering::Relaxed) {
                break RunExit::Stopped;
            }
            if max_steps.is_some_and(|limit| taken >= limit) {
                break RunExit::StepLimit;
            }
            taken += 1;
            match self.cpu.step() {
                StepResult::Halted(reason) => break RunExit::Halted(reason),
                StepResult::Waiting if self.idle() => break RunExit::Idle,
                _ => {}
            }
        };
        self.cpu.stats.sync_mapping(&self.cpu.mmu.counters);
        info!(?exit, steps = taken, pc = self.cpu.pc(), "run finished");
        exit
    }

    /// True if the waiting CPU can never be woken.
    fn idle(&self) -> bool {
        let cpu = &self.cpu;
        let idle = !cpu.state.attention
            && !cpu.channel.busy()
            && (cpu.state.modes.blocked || !cpu.state.interrupts.has_deliverable());
        if idle {
            debug!(pc = cpu.pc(), "waiting with no interrupt source");
        }
        idle
    }
}
