//! Main Execution Loop.
//!
//! This module implements one engine step. It performs the following:
//! 1. **Boundary Work:** Polls the channel subsystem and delivers console attention
//!    and interrupts while not blocked.
//! 2. **Fetch and Decode:** Reads the instruction word, selects the halfword, looks
//!    up the opcode table and enforces the format and privilege rules.
//! 3. **Operand Fetch:** Computes the effective address and reads the operand.
//! 4. **Commit:** Applies the handler's writes under its overflow policy, installs
//!    the condition codes and advances or replaces the PC.
//! 5. **Deferred Exceptions:** Raises the arithmetic exception trap after commit.
//!
//! Any fault hands the instruction to the trap dispatcher; the engine never
//! retries a step itself.

use tracing::trace;

use crate::common::constants::NOP_HALFWORD;
use crate::common::{AccessType, HaltReason, MemoryFault, TrapCause};
use crate::isa::disasm;
use crate::isa::exec::{Execution, Flow, OverflowPolicy, Write};
use crate::isa::instruction::{Decoded, InstructionBits, MemRef};
use crate::isa::opcodes::{self, OpFlags};

use super::Cpu;

/// Outcome of one call to [`Cpu::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// One instruction completed.
    Executed,
    /// A trap handler was entered.
    Trapped(TrapCause),
    /// An interrupt handler was entered at the given level.
    Interrupted(u8),
    /// The CPU is in the wait state.
    Waiting,
    /// The engine has stopped.
    Halted(HaltReason),
}

impl Cpu {
    /// Advances the engine by one step: one instruction, one handler entry,
    /// or one idle step in the wait state.
    pub fn step(&mut self) -> StepResult {
        self.stats.steps += 1;
        if let Some(reason) = self.state.halted {
            return StepResult::Halted(reason);
        }

        self.poll_channel();
        if !self.state.modes.blocked {
            if let Some(result) = self.deliver_attention() {
                return result;
            }
            if let Some(result) = self.deliver_interrupt() {
                return result;
            }
        }
        if self.state.waiting {
            self.stats.wait_steps += 1;
            return StepResult::Waiting;
        }

        self.state.trap_status.clear();
        self.execute_next()
    }

    fn execute_next(&mut self) -> StepResult {
        let pc = self.pc();
        let word = match self.fetch(pc) {
            Ok(word) => word,
            Err(cause) => return self.take_trap(cause, pc),
        };
        let right = pc & 2 != 0;
        let word = if right { word << 16 } else { word };
        let base = self.state.modes.base;
        let half = opcodes::lookup(word, base).is_half();

        let drop_nop = half
            && !right
            && word as u16 == NOP_HALFWORD
            && self.model.drops_right_nop();
        let next_pc = if half && !drop_nop { pc + 2 } else { (pc & !2) + 4 };

        if self.trace {
            trace!(pc, word, "{}", disasm::disassemble(word, base));
        }

        let mut d = Decoded::new(word, pc, next_pc, half);
        match self.run(&mut d, false) {
            Ok(result) => {
                if drop_nop && result == StepResult::Executed {
                    self.stats.nops_dropped += 1;
                }
                result
            }
            Err(cause) => {
                let resume = self.resume_pc(cause, pc, next_pc);
                self.take_trap(cause, resume)
            }
        }
    }

    /// Decodes, executes and commits `d`. `executed` is set for the target of
    /// an execute-type instruction.
    fn run(&mut self, d: &mut Decoded, executed: bool) -> Result<StepResult, TrapCause> {
        let entry = opcodes::lookup(d.word, self.state.modes.base);
        let flags = entry.flags;
        if !executed && !entry.is_half() && d.pc & 2 != 0 {
            return Err(TrapCause::UndefinedInstruction);
        }
        let handler = entry.handler.ok_or(TrapCause::UndefinedInstruction)?;
        if flags.contains(OpFlags::PRIVILEGED) {
            self.require_privileged()?;
        }

        if flags.contains(OpFlags::MEMORY) {
            let ea = self.effective_address(d.word)?;
            d.ea = ea.ea;
            d.cc_override = ea.cc_override;
            let reads = flags.contains(OpFlags::READ_MEM);
            if (reads || flags.contains(OpFlags::WRITE_MEM)) && !flags.contains(OpFlags::BRANCH) {
                let byte = d.word.f() || flags.contains(OpFlags::BYTE_OPERAND);
                let operand = MemRef::from_fc(ea.ea, byte).ok_or_else(|| {
                    self.record_fault(MemoryFault::AddressSpecification { addr: ea.ea }, AccessType::Read)
                })?;
                d.operand = Some(operand);
                if reads {
                    d.value = self.read_operand(operand)?;
                }
            }
        }

        let exec = handler(self, d)?;
        if let Flow::Execute(target) = exec.flow {
            if opcodes::is_execute(target, self.state.modes.base) {
                return Err(TrapCause::UndefinedInstruction);
            }
            let half = opcodes::lookup(target, self.state.modes.base).is_half();
            let mut inner = Decoded::new(target, d.pc, d.next_pc, half);
            return self.run(&mut inner, true);
        }

        self.retire_stats(d, flags);
        self.commit(d, exec)
    }

    fn retire_stats(&mut self, d: &Decoded, flags: OpFlags) {
        let stats = &mut self.stats;
        stats.instructions_retired += 1;
        if d.half {
            stats.inst_half += 1;
        } else {
            stats.inst_full += 1;
        }
        if flags.contains(OpFlags::MEMORY) {
            stats.inst_memory += 1;
        }
        if flags.contains(OpFlags::PRIVILEGED) {
            stats.inst_privileged += 1;
        }
    }

    /// Applies the effect of an instruction.
    fn commit(&mut self, d: &Decoded, exec: Execution) -> Result<StepResult, TrapCause> {
        let aexp = self.state.modes.aexp;
        let suppress = exec.overflow
            && match exec.policy {
                OverflowPolicy::Commit => false,
                OverflowPolicy::SuppressOnTrap => aexp,
                OverflowPolicy::AllOrNothing => true,
            };
        if !suppress {
            self.apply_writes(exec.writes)?;
        }
        if let Some(cc) = exec.cc {
            self.state.psd.set_cc(cc);
        }

        let mut result = StepResult::Executed;
        match exec.flow {
            Flow::Next | Flow::Execute(_) => self.state.psd.set_pc(d.next_pc),
            Flow::Branch(target) => {
                self.state.psd.set_pc(target);
                if let Some(cc) = d.cc_override {
                    self.state.psd.set_cc(cc);
                }
                self.stats.branches_taken += 1;
            }
            Flow::Wait => {
                self.state.psd.set_pc(d.next_pc);
                self.set_waiting(true);
            }
            Flow::Halt => {
                self.state.psd.set_pc(d.next_pc);
                if self.halt_waits {
                    self.set_waiting(true);
                } else {
                    result = self.halt(HaltReason::HaltInstruction);
                }
            }
            Flow::LoadPsd(kind, psd) => {
                self.load_psd(kind, psd)?;
                return Ok(result);
            }
        }
        self.state.psd.set_half_executed(d.half);

        if exec.overflow && aexp && result == StepResult::Executed {
            return Ok(self.take_trap(TrapCause::ArithmeticException, self.pc()));
        }
        Ok(result)
    }

    /// Stores result writes: memory first, then registers, so that a memory
    /// fault leaves every register untouched.
    fn apply_writes(&mut self, writes: Vec<Write>) -> Result<(), TrapCause> {
        let (memory, registers): (Vec<_>, Vec<_>) = writes
            .into_iter()
            .partition(|w| matches!(w, Write::Memory(..) | Write::Block(..)));
        for write in memory {
            match write {
                Write::Memory(operand, value) => self.write_operand(operand, value)?,
                Write::Block(addr, words) => self.write_block(addr, &words)?,
                _ => {}
            }
        }
        let regs = &mut self.state.regs;
        for write in registers {
            match write {
                Write::Reg(r, value) => regs.write(r, value),
                Write::Pair(r, value) => regs.write_pair(r, value),
                Write::Base(r, value) => regs.write_base(r, value),
                _ => {}
            }
        }
        Ok(())
    }
}
