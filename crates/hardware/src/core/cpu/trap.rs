//! Trap and Interrupt Dispatch.
//!
//! This module implements the context switch protocol shared by traps,
//! interrupts and the PSD load instructions. It performs the following:
//! 1. **Vectoring:** Selects the trap table slot (or interrupt table entry) and
//!    validates it; an uninitialized vector or disabled trap handling halts.
//! 2. **Context Save:** Stores the old PSD, the status word and the
//!    cause-dependent word into the context block.
//! 3. **PSD Load:** Installs the new PSD under the retain-blocking and
//!    retain-maps directives and loads the maps of the new context.
//! 4. **Fallback:** A map load failure on entry becomes a machine check; a
//!    failure while entering the machine check handler halts.
//!
//! Context blocks and vector tables are accessed physically.

use tracing::{debug, warn};

use crate::common::constants::{CONTEXT_BLOCK_MASK, CONTEXT_BLOCK_WORDS, INTERRUPT_LEVELS};
use crate::common::{HaltReason, MapLoadError, PhysAddr, TrapCause};
use crate::core::arch::psd::Psd;
use crate::core::arch::status::{cpu_status, trap_status};
use crate::core::units::mmu::loader::LoadMode;
use crate::isa::exec::PsdLoad;

use super::Cpu;
use super::execution::StepResult;

/// Vector of the first trap table slot.
const TRAP_VECTOR_BASE: u32 = 0x80;

/// Context block word offsets.
mod icb {
    pub const OLD_PSD1: u32 = 0;
    pub const OLD_PSD2: u32 = 4;
    pub const NEW_PSD1: u32 = 8;
    pub const NEW_PSD2: u32 = 12;
    pub const STATUS: u32 = 16;
    pub const AUX: u32 = 20;
}

/// Why a context block could not be entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EntryFailure {
    /// The block lies outside installed memory.
    NotPresent(u32),
    /// Loading the maps of the new PSD failed.
    MapLoad(MapLoadError),
}

/// Status bits a cause adds to TRAPSTATUS in the context block.
const fn cause_status(cause: TrapCause) -> u32 {
    match cause {
        TrapCause::UndefinedInstruction => trap_status::UNDEFINED,
        TrapCause::PrivilegeViolation => trap_status::PRIVILEGE,
        TrapCause::ProtectionViolation => trap_status::PROTECTION,
        TrapCause::CallMonitor { .. } => trap_status::CALL_MONITOR,
        TrapCause::AddressSpecification => trap_status::ADDR_SPEC,
        _ => 0,
    }
}

/// An entry word that was never set up by software.
const fn uninitialized(entry: u32) -> bool {
    entry == 0 || entry == u32::MAX
}

impl Cpu {
    /// PC saved in the context block for `cause` raised by the instruction at
    /// `pc` whose successor is `next_pc`.
    pub fn resume_pc(&self, cause: TrapCause, pc: u32, next_pc: u32) -> u32 {
        match cause {
            TrapCause::SupervisorCall { .. }
            | TrapCause::CallMonitor { .. }
            | TrapCause::ArithmeticException => next_pc,
            TrapCause::UndefinedInstruction | TrapCause::PrivilegeViolation => {
                if self.model.restarts_opcode_traps() {
                    pc
                } else {
                    next_pc
                }
            }
            _ => pc,
        }
    }

    /// Delivers trap `cause`, saving `resume` as the PC of the old PSD.
    ///
    /// # Returns
    ///
    /// [`StepResult::Trapped`] once the handler's PSD is live, or
    /// [`StepResult::Halted`] if the trap could not be delivered.
    pub fn take_trap(&mut self, cause: TrapCause, resume: u32) -> StepResult {
        let mut old = self.state.psd;
        old.set_pc(resume);
        self.deliver(cause, old)
    }

    fn deliver(&mut self, cause: TrapCause, old: Psd) -> StepResult {
        self.stats.traps_taken += 1;
        if cause == TrapCause::ArithmeticException {
            self.stats.arithmetic_traps += 1;
        }
        match self.dispatch(cause, old) {
            Ok(delivered) => StepResult::Trapped(delivered),
            Err(reason) => self.halt(reason),
        }
    }

    /// Stops the engine.
    pub(crate) fn halt(&mut self, reason: HaltReason) -> StepResult {
        if reason == HaltReason::HaltInstruction {
            debug!(pc = self.pc(), "halt");
        } else {
            warn!(pc = self.pc(), %reason, "engine halted");
        }
        self.state.halted = Some(reason);
        StepResult::Halted(reason)
    }

    /// Enters the handler of `cause`, falling back to the machine check
    /// handler when the maps of the new context fail to load.
    ///
    /// # Returns
    ///
    /// The cause whose handler was entered.
    fn dispatch(&mut self, cause: TrapCause, mut old: Psd) -> Result<TrapCause, HaltReason> {
        if !self.state.cpu_status.traps_enabled() {
            return Err(HaltReason::TrapHandlingDisabled { cause });
        }
        let slot = self
            .state
            .spad
            .trap_table()
            .wrapping_add(cause.vector() - TRAP_VECTOR_BASE);
        let entry = self
            .memory
            .read_word(PhysAddr::new(slot))
            .ok_or(HaltReason::ContextBlockNotPresent { cause, addr: slot })?;
        if uninitialized(entry) {
            return Err(HaltReason::UninitializedVector {
                cause,
                vector: slot,
            });
        }
        if self.model.clears_half_bit_on_trap() {
            old.set_half_executed(false);
        }

        let status = self.state.trap_status.0 | cause_status(cause);
        let block = entry & CONTEXT_BLOCK_MASK;
        debug!(%cause, vector = slot, icb = block, pc = old.pc(), status, "trap");
        match self.enter_context(block, old, status, cause.aux_word()) {
            Ok(()) => Ok(cause),
            Err(EntryFailure::NotPresent(addr)) => {
                Err(HaltReason::ContextBlockNotPresent { cause, addr })
            }
            Err(EntryFailure::MapLoad(_)) if cause == TrapCause::MachineCheck => {
                Err(HaltReason::NestedFault { cause })
            }
            Err(EntryFailure::MapLoad(err)) => {
                let _ = self.record_map_load(err);
                self.dispatch(TrapCause::MachineCheck, old)
            }
        }
    }

    /// Saves `old` into the context block at `block` and installs the new PSD
    /// it holds. The new PSD keeps the CPIX of the old one.
    fn enter_context(
        &mut self,
        block: u32,
        old: Psd,
        status: u32,
        aux: Option<u32>,
    ) -> Result<(), EntryFailure> {
        if !self.memory.contains(block, CONTEXT_BLOCK_WORDS * 4) {
            return Err(EntryFailure::NotPresent(block));
        }
        let word = |off: u32| PhysAddr::new(block + off);
        let new1 = self.memory.read_word(word(icb::NEW_PSD1)).unwrap_or_default();
        let new2 = self.memory.read_word(word(icb::NEW_PSD2)).unwrap_or_default();
        let _ = self.memory.write_word(word(icb::OLD_PSD1), old.word1);
        let _ = self.memory.write_word(word(icb::OLD_PSD2), old.word2);
        let _ = self.memory.write_word(word(icb::STATUS), status);
        if let Some(aux) = aux {
            let _ = self.memory.write_word(word(icb::AUX), aux);
        }

        let mut new = Psd::new(new1, new2);
        new.set_cpix(old.cpix());
        self.install_psd(new, LoadMode::Honor)
            .map_err(EntryFailure::MapLoad)?;
        self.set_waiting(false);
        Ok(())
    }

    /// Makes `new` the live PSD.
    ///
    /// The blocking state comes from the current one when `new` asks to retain
    /// it, and from its set-blocked bit otherwise. A mapped PSD without the
    /// retain-maps directive loads the maps of its CPIX in `mode`.
    ///
    /// # Errors
    ///
    /// The map loader failure; the previous PSD and modes are restored.
    pub fn install_psd(&mut self, new: Psd, mode: LoadMode) -> Result<(), MapLoadError> {
        let previous = (self.state.psd, self.state.cpu_status, self.state.modes);
        let blocked = if new.retain_blocking() {
            self.state.modes.blocked
        } else {
            new.set_blocked()
        };
        let retain_maps = new.retain_maps();
        self.state.psd = new.normalized(blocked);
        self.refresh_modes();

        if self.state.psd.mapped() && !retain_maps {
            let cpix = self.state.psd.cpix();
            let master_list = self.state.spad.master_list();
            if let Err(err) = self.mmu.load_maps(cpix, mode, master_list, &self.memory) {
                (self.state.psd, self.state.cpu_status, self.state.modes) = previous;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Loads the maps of context `cpix` (`LMAP`).
    ///
    /// # Returns
    ///
    /// The number of maps loaded, or the trap cause after recording the failure.
    pub fn load_context(&mut self, cpix: u32, mode: LoadMode) -> Result<u32, TrapCause> {
        let master_list = self.state.spad.master_list();
        self.mmu
            .load_maps(cpix, mode, master_list, &self.memory)
            .map_err(|err| self.record_map_load(err))
    }

    /// Executes a PSD load instruction (`LPSD`, `LPSDCM`, `BRI`).
    pub(crate) fn load_psd(&mut self, kind: PsdLoad, mut new: Psd) -> Result<(), TrapCause> {
        let mode = match kind {
            PsdLoad::Lpsd | PsdLoad::Bri => {
                new.set_cpix(self.state.psd.cpix());
                LoadMode::Honor
            }
            PsdLoad::Lpsdcm => LoadMode::Force,
        };
        self.install_psd(new, mode)
            .map_err(|err| self.record_map_load(err))?;
        if kind == PsdLoad::Bri
            && let Some(level) = self.state.interrupts.deactivate_highest()
        {
            self.sync_level(level);
        }
        Ok(())
    }

    /// Enters or leaves the wait state.
    pub(crate) fn set_waiting(&mut self, on: bool) {
        self.state.waiting = on;
        self.state.cpu_status.set(cpu_status::WAITING, on);
    }

    /// Moves interrupts reported by the channel subsystem into the controller.
    pub(crate) fn poll_channel(&mut self) {
        while let Some(irq) = self.channel.next_interrupt() {
            let level = usize::from(irq.level);
            if level >= INTERRUPT_LEVELS {
                warn!(level, "channel interrupt level out of range; dropped");
                continue;
            }
            self.state.interrupts.request(level, Some(irq.context_block));
            self.sync_level(level);
        }
    }

    /// Delivers a pending console attention request.
    pub(crate) fn deliver_attention(&mut self) -> Option<StepResult> {
        if !self.state.attention {
            return None;
        }
        self.state.attention = false;
        Some(self.take_trap(TrapCause::ConsoleAttention, self.pc()))
    }

    /// Delivers the highest-priority deliverable interrupt, if any.
    ///
    /// A level whose context block is missing or uninitialized is cancelled
    /// and execution continues.
    pub(crate) fn deliver_interrupt(&mut self) -> Option<StepResult> {
        let (level, io_block) = self.state.interrupts.take_deliverable()?;
        self.sync_level(level);

        let block = io_block.or_else(|| {
            let slot = self.state.spad.interrupt_table().wrapping_add(4 * level as u32);
            self.memory
                .read_word(PhysAddr::new(slot))
                .filter(|entry| !uninitialized(*entry))
                .map(|entry| entry & CONTEXT_BLOCK_MASK)
        });
        let Some(block) = block else {
            warn!(level, "interrupt vector uninitialized; request cancelled");
            self.cancel_level(level);
            return None;
        };

        let old = self.state.psd;
        let status = trap_status::INTERRUPT | level as u32;
        match self.enter_context(block, old, status, None) {
            Ok(()) => {
                self.stats.interrupts_taken += 1;
                debug!(level, icb = block, pc = old.pc(), "interrupt");
                Some(StepResult::Interrupted(level as u8))
            }
            Err(EntryFailure::NotPresent(addr)) => {
                warn!(level, icb = addr, "interrupt context block not present; request cancelled");
                self.cancel_level(level);
                None
            }
            Err(EntryFailure::MapLoad(err)) => {
                let _ = self.record_map_load(err);
                self.cancel_level(level);
                Some(self.deliver(TrapCause::MachineCheck, old))
            }
        }
    }

    fn cancel_level(&mut self, level: usize) {
        self.state.interrupts.cancel(level);
        self.sync_level(level);
    }
}
