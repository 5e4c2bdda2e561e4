//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, which owns the entire
//! emulated processor. It coordinates the following:
//! 1. **State Management:** The single `CpuState` aggregate (PSD, registers, status
//!    words, scratchpad, interrupt levels).
//! 2. **Memory Hierarchy:** The MMU with its map cache, and installed guest memory.
//! 3. **Collaborators:** The channel subsystem and the floating-point unit.
//! 4. **Reset:** The boot state every run starts from.

/// Instruction engine (`step`) and result commit.
pub mod execution;

/// Effective address computation.
pub mod addressing;

/// Protected memory access.
pub mod memory;

/// Trap and interrupt dispatch.
pub mod trap;

use tracing::debug;

use crate::common::{HaltReason, RegisterFile, SimError, TrapCause};
use crate::config::Config;
use crate::core::arch::psd::{Psd, psd1, psd2};
use crate::core::arch::status::{CpuStatus, ModeFlags, TrapStatus, cpu_status};
use crate::core::arch::{CpuModel, InterruptLevels, Scratchpad};
use crate::core::units::fpu::{FloatUnit, HexFloat};
use crate::core::units::mmu::Mmu;
use crate::soc::{ChannelSubsystem, MainMemory, NullChannel};
use crate::stats::SimStats;

pub use self::execution::StepResult;

/// Architecturally visible processor state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuState {
    /// Program status doubleword.
    pub psd: Psd,
    /// General and base registers.
    pub regs: RegisterFile,
    /// Scratchpad configuration store.
    pub spad: Scratchpad,
    /// CPUSTATUS.
    pub cpu_status: CpuStatus,
    /// TRAPSTATUS of the instruction in progress.
    pub trap_status: TrapStatus,
    /// Mode flags derived from the PSD.
    pub modes: ModeFlags,
    /// Interrupt level controller.
    pub interrupts: InterruptLevels,
    /// In the wait state.
    pub waiting: bool,
    /// Set once the engine has stopped.
    pub halted: Option<HaltReason>,
    /// Console attention requested and not yet delivered.
    pub attention: bool,
}

/// Main CPU structure containing all processor state and components.
#[derive(Debug)]
pub struct Cpu {
    /// Architectural state.
    pub state: CpuState,
    /// Memory Management Unit.
    pub mmu: Mmu,
    /// Installed guest memory.
    pub memory: MainMemory,
    /// I/O channel subsystem.
    pub channel: Box<dyn ChannelSubsystem>,
    /// Floating-point unit.
    pub fpu: Box<dyn FloatUnit>,
    /// Performance statistics.
    pub stats: SimStats,
    /// Emulated model.
    pub model: CpuModel,
    /// Console switch register (`LCS`).
    pub console_switches: u32,
    /// Log every instruction at `trace` level.
    pub trace: bool,
    /// `HALT` enters the wait state instead of stopping the engine.
    pub halt_waits: bool,
    boot_entry: u32,
    traps_enabled_at_reset: bool,
}

impl Cpu {
    /// Creates a CPU with no I/O channel attached, already reset.
    ///
    /// # Errors
    ///
    /// [`SimError::MemorySize`] if the configured memory size is unsupported.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        Self::with_channel(config, Box::new(NullChannel))
    }

    /// Creates a CPU wired to `channel`, already reset.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulator configuration.
    /// * `channel` - I/O channel subsystem collaborator.
    ///
    /// # Errors
    ///
    /// [`SimError::MemorySize`] if the configured memory size is unsupported.
    pub fn with_channel(
        config: &Config,
        channel: Box<dyn ChannelSubsystem>,
    ) -> Result<Self, SimError> {
        let model = config.cpu.model;
        let mut cpu = Self {
            state: CpuState::default(),
            mmu: Mmu::new(model),
            memory: MainMemory::new(config.memory.size_bytes)?,
            channel,
            fpu: Box::new(HexFloat),
            stats: SimStats::default(),
            model,
            console_switches: config.cpu.console_switches,
            trace: config.general.trace_instructions,
            halt_waits: !config.general.stop_on_halt,
            boot_entry: config.general.boot_entry,
            traps_enabled_at_reset: config.cpu.traps_enabled,
        };
        cpu.reset();
        Ok(cpu)
    }

    /// Returns the processor to its boot state: privileged, unmapped and
    /// blocked at the boot entry. Guest memory is left untouched.
    pub fn reset(&mut self) {
        let spad_preserved = self.state.spad.reset();
        let spad = std::mem::take(&mut self.state.spad);
        self.state = CpuState {
            spad,
            psd: Psd::new(psd1::PRIVILEGED | (self.boot_entry & psd1::PC_MASK), psd2::SET_BLOCKED),
            ..CpuState::default()
        };
        let mut status = CpuStatus(self.model.id() & cpu_status::MODEL_MASK);
        status.set(cpu_status::TRAPS_ENABLED, self.traps_enabled_at_reset);
        self.state.cpu_status = status;
        self.refresh_modes();
        self.mmu.reset();
        debug!(
            model = %self.model,
            pc = self.state.psd.pc(),
            spad_preserved,
            "reset"
        );
    }

    /// Re-derives the mode flags and the CPUSTATUS mirrors from the live PSD.
    pub fn refresh_modes(&mut self) {
        let blocked = self.state.psd.set_blocked();
        self.state.modes = ModeFlags::derive(&self.state.psd, blocked);
        self.state.cpu_status.mirror(&self.state.psd);
        self.state.cpu_status.set(cpu_status::BLOCKED, blocked);
    }

    /// Enters or leaves blocked mode (`BEI`, `UEI`).
    pub fn set_blocked(&mut self, on: bool) {
        let psd = &mut self.state.psd;
        psd.word2 = if on {
            psd.word2 | psd2::SET_BLOCKED
        } else {
            psd.word2 & !psd2::SET_BLOCKED
        };
        self.refresh_modes();
    }

    /// Fails with a privilege violation in the unprivileged state.
    pub fn require_privileged(&self) -> Result<(), TrapCause> {
        if self.state.modes.privileged {
            Ok(())
        } else {
            Err(TrapCause::PrivilegeViolation)
        }
    }

    /// Fails with an undefined instruction outside base register mode.
    pub fn require_base(&self) -> Result<(), TrapCause> {
        if self.state.modes.base {
            Ok(())
        } else {
            Err(TrapCause::UndefinedInstruction)
        }
    }

    /// Requests a console attention trap at the next instruction boundary.
    pub fn request_attention(&mut self) {
        self.state.attention = true;
    }

    /// Mirrors the controller state of `level` into its scratchpad control word.
    pub fn sync_level(&mut self, level: usize) {
        let bits = self.state.interrupts.bits(level);
        self.state.spad.set_level_state(level, bits);
    }

    /// Current program counter.
    pub const fn pc(&self) -> u32 {
        self.state.psd.pc()
    }

    /// Reason the engine stopped, if it has.
    pub const fn halt_reason(&self) -> Option<HaltReason> {
        self.state.halted
    }

    /// Dumps the PSD, status words and registers to stdout.
    pub fn dump_state(&self) {
        let s = &self.state;
        println!(
            "PSD={:08x} {:08x}  CPUSTATUS={:08x}  TRAPSTATUS={:08x}",
            s.psd.word1, s.psd.word2, s.cpu_status.0, s.trap_status.0
        );
        s.regs.dump();
    }
}
