//! Opcode handlers.
//!
//! A handler computes the effect of one instruction without committing it:
//! it returns an [`Execution`] describing the writes, condition codes,
//! overflow and control flow, and the engine commits it according to the
//! opcode's overflow policy. Faults detected while computing are returned as
//! the [`TrapCause`] to dispatch.
//!
//! Handlers are grouped by instruction class:
//! - [`control`]: halt, wait, condition code and mode control
//! - [`register`]: register-to-register logic, arithmetic, shifts and transfers
//! - [`memory`]: loads, stores and memory arithmetic
//! - [`immediate`]: the immediate group, `SVC` and `EXR`
//! - [`branch`]: branches, linkage and PSD loads
//! - [`system`]: map control, status and interrupt control
//! - [`float`]: floating point
//! - [`io`]: channel I/O

/// Branch, call and PSD load handlers.
pub mod branch;

/// Control group handlers.
pub mod control;

/// Floating point handlers.
pub mod float;

/// Immediate group handlers.
pub mod immediate;

/// Channel I/O handlers.
pub mod io;

/// Memory reference handlers.
pub mod memory;

/// Register format handlers.
pub mod register;

/// Privileged system handlers.
pub mod system;

use crate::common::TrapCause;
use crate::core::Cpu;
use crate::core::arch::psd::Psd;
use crate::isa::instruction::{Decoded, MemRef};

/// Opcode handler signature.
pub type Handler = fn(&mut Cpu, &Decoded) -> Result<Execution, TrapCause>;

/// How an overflow interacts with the result writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Result written; trap afterwards if enabled.
    #[default]
    Commit,
    /// Result written only when the arithmetic exception trap is disabled.
    SuppressOnTrap,
    /// Result never written on overflow.
    AllOrNothing,
}

/// Which PSD load opcode produced a new PSD.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PsdLoad {
    /// `LPSD`: keeps the current CPIX.
    Lpsd,
    /// `LPSDCM`: takes the new CPIX and loads its maps.
    Lpsdcm,
    /// `BRI`: as `LPSD`, and ends the highest active interrupt.
    Bri,
}

/// A single result write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Write {
    /// General register.
    Reg(usize, u32),
    /// Even/odd register pair.
    Pair(usize, u64),
    /// Base register.
    Base(usize, u32),
    /// Memory operand.
    Memory(MemRef, u64),
    /// Consecutive words; every word is checked before any is stored.
    Block(u32, Vec<u32>),
}

/// Control flow after an instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flow {
    /// Continue at the next instruction.
    #[default]
    Next,
    /// Continue at the target address.
    Branch(u32),
    /// Replace the PSD.
    LoadPsd(PsdLoad, Psd),
    /// Enter the wait state.
    Wait,
    /// Stop the engine.
    Halt,
    /// Execute the given instruction word in place of this one.
    Execute(u32),
}

/// The uncommitted effect of an instruction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Execution {
    /// Result writes, applied memory first.
    pub writes: Vec<Write>,
    /// New condition codes.
    pub cc: Option<u32>,
    /// Arithmetic overflow (CC1) occurred.
    pub overflow: bool,
    /// Overflow policy.
    pub policy: OverflowPolicy,
    /// Control flow.
    pub flow: Flow,
}

impl Execution {
    /// No effect; continue.
    pub fn next() -> Self {
        Self::default()
    }

    /// Only control flow.
    pub fn flow(flow: Flow) -> Self {
        Self {
            flow,
            ..Self::default()
        }
    }

    /// Adds a write.
    #[must_use]
    pub fn write(mut self, w: Write) -> Self {
        self.writes.push(w);
        self
    }

    /// Sets the condition codes.
    #[must_use]
    pub const fn cc(mut self, cc: u32) -> Self {
        self.cc = Some(cc);
        self
    }

    /// Records overflow under `policy`.
    #[must_use]
    pub const fn overflow(mut self, overflow: bool, policy: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self.policy = policy;
        self
    }
}

/// Checks that `r` names the even register of a pair.
pub(crate) const fn even(r: usize) -> Result<usize, TrapCause> {
    if r & 1 == 0 {
        Ok(r)
    } else {
        Err(TrapCause::AddressSpecification)
    }
}
