//! Fault, Trap and Halt definitions.
//!
//! This module defines the error handling vocabulary of the emulator. It provides:
//! 1. **Memory Faults:** Conditions detected by the translator and the protected access layer.
//! 2. **Map Load Errors:** Conditions detected while walking the in-memory page tables.
//! 3. **Trap Causes:** Every condition funneled into the trap dispatcher, with its vector.
//! 4. **Halt Reasons:** Conditions that stop the engine instead of entering a handler.
//! 5. **Simulation Errors:** Host-side failures (image loading, configuration).
//!
//! Detectors only report; none of them retries or decides where execution resumes.

use thiserror::Error;

use super::data::AccessType;

/// Failure raised while loading maps from the master process list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MapLoadError {
    /// A master list entry or descriptor list lies outside installed memory.
    #[error("page table at {addr:#08x} lies outside installed memory")]
    NonPresentMemory {
        /// Physical address that was not present.
        addr: u32,
    },

    /// The context asks for more maps than the model provides.
    #[error("{count} maps requested, model ceiling is {ceiling}")]
    MapCountExceeded {
        /// Total maps requested (operating system plus user).
        count: u32,
        /// Maximum maps for this memory model.
        ceiling: u32,
    },

    /// A mapped context defines no maps at all.
    #[error("mapped context defines no maps")]
    EmptyContext,

    /// The master process list base is not doubleword aligned.
    #[error("master process list base {addr:#08x} is not doubleword aligned")]
    MisalignedMasterList {
        /// Configured base address.
        addr: u32,
    },

    /// A descriptor list address is not halfword aligned.
    #[error("descriptor list {addr:#08x} is not halfword aligned")]
    MisalignedDescriptorList {
        /// Address read from the master list entry.
        addr: u32,
    },
}

/// Fault reported by the address translator or the protected access layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MemoryFault {
    /// The (translated) address is beyond installed memory.
    #[error("non-present memory at {addr:#08x}")]
    NonPresentMemory {
        /// Offending physical address.
        addr: u32,
    },

    /// The page index is outside the loaded context or its map is invalid.
    #[error("map fault at {addr:#08x} (page {index:#x})")]
    MapFault {
        /// Logical address being translated.
        addr: u32,
        /// Page index derived from the address.
        index: u32,
    },

    /// A demand-paged model found an invalid map for a page in range.
    #[error("demand page fault on page {index:#x}")]
    DemandPage {
        /// Faulting page index.
        index: u32,
        /// True if the fault occurred on instruction fetch.
        fetch: bool,
    },

    /// The map denies the requested access.
    #[error("protection violation ({access:?}) at {addr:#08x}")]
    Protection {
        /// Logical address being accessed.
        addr: u32,
        /// Kind of access that was denied.
        access: AccessType,
    },

    /// Operand address is misaligned for its width.
    #[error("address specification error at {addr:#08x}")]
    AddressSpecification {
        /// Offending logical address.
        addr: u32,
    },

    /// Loading a single map on a translation miss failed.
    #[error("map load failed: {0}")]
    MapLoad(#[from] MapLoadError),
}

/// A condition that transfers control through the trap table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TrapCause {
    /// Access beyond installed memory.
    #[error("non-present memory")]
    NonPresentMemory,
    /// Unassigned opcode or sub-opcode, or a full-word opcode in a right halfword.
    #[error("undefined instruction")]
    UndefinedInstruction,
    /// Privileged opcode executed in the unprivileged state.
    #[error("privilege violation")]
    PrivilegeViolation,
    /// Write to a write-protected page or access denied by map rights.
    #[error("memory protection violation")]
    ProtectionViolation,
    /// `SVC` supervisor call.
    #[error("supervisor call {number:#06x}")]
    SupervisorCall {
        /// Call index and number (low 16 bits of the instruction).
        number: u16,
    },
    /// `CALM` monitor call.
    #[error("monitor call {number:#05x}")]
    CallMonitor {
        /// Ten-bit call number.
        number: u16,
    },
    /// Hardware consistency failure, including a map load failing during dispatch.
    #[error("machine check")]
    MachineCheck,
    /// Malformed system configuration (page table base).
    #[error("system check")]
    SystemCheck,
    /// Page index out of range or map invalid on a non-demand model.
    #[error("map fault")]
    MapFault,
    /// Misaligned operand or register specification.
    #[error("address specification")]
    AddressSpecification,
    /// Operator console attention request.
    #[error("console attention")]
    ConsoleAttention,
    /// Overflow or divide fault with arithmetic exceptions enabled.
    #[error("arithmetic exception")]
    ArithmeticException,
    /// Invalid map on a demand-paged model.
    #[error("demand page fault (page {index:#x})")]
    DemandPage {
        /// Faulting page index.
        index: u16,
        /// True if the fault occurred on instruction fetch.
        fetch: bool,
    },
}

impl TrapCause {
    /// Vector address of this cause; its offset from `0x80` selects the trap table slot.
    pub const fn vector(&self) -> u32 {
        match self {
            Self::NonPresentMemory => 0x8C,
            Self::UndefinedInstruction => 0x90,
            Self::PrivilegeViolation | Self::ProtectionViolation => 0x94,
            Self::SupervisorCall { .. } | Self::CallMonitor { .. } => 0x98,
            Self::MachineCheck => 0x9C,
            Self::SystemCheck => 0xA0,
            Self::MapFault => 0xA4,
            Self::AddressSpecification => 0xB0,
            Self::ConsoleAttention => 0xB4,
            Self::ArithmeticException => 0xBC,
            Self::DemandPage { .. } => 0xC4,
        }
    }

    /// Cause-dependent sixth word of the context block, if this cause defines one.
    pub const fn aux_word(&self) -> Option<u32> {
        match *self {
            Self::SupervisorCall { number } | Self::CallMonitor { number } => Some(number as u32),
            Self::DemandPage { index, fetch } => {
                Some(((fetch as u32) << 31) | index as u32)
            }
            _ => None,
        }
    }
}

impl From<MapLoadError> for TrapCause {
    fn from(err: MapLoadError) -> Self {
        match err {
            MapLoadError::NonPresentMemory { .. } => Self::NonPresentMemory,
            MapLoadError::MapCountExceeded { .. } | MapLoadError::EmptyContext => Self::MapFault,
            MapLoadError::MisalignedMasterList { .. } => Self::SystemCheck,
            MapLoadError::MisalignedDescriptorList { .. } => Self::MachineCheck,
        }
    }
}

impl From<MemoryFault> for TrapCause {
    fn from(fault: MemoryFault) -> Self {
        match fault {
            MemoryFault::NonPresentMemory { .. } => Self::NonPresentMemory,
            MemoryFault::MapFault { .. } => Self::MapFault,
            MemoryFault::DemandPage { index, fetch } => Self::DemandPage {
                index: index as u16,
                fetch,
            },
            MemoryFault::Protection { .. } => Self::ProtectionViolation,
            MemoryFault::AddressSpecification { .. } => Self::AddressSpecification,
            MemoryFault::MapLoad(err) => err.into(),
        }
    }
}

/// Reason the instruction engine stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum HaltReason {
    /// `HALT` executed in the privileged state.
    #[error("halt instruction")]
    HaltInstruction,

    /// A trap occurred before software enabled trap handling.
    #[error("{cause} with trap handling disabled")]
    TrapHandlingDisabled {
        /// The trap that could not be delivered.
        cause: TrapCause,
    },

    /// The trap table slot holds zero or all ones.
    #[error("{cause}: trap vector at {vector:#08x} is uninitialized")]
    UninitializedVector {
        /// The trap that could not be delivered.
        cause: TrapCause,
        /// Physical address of the trap table slot.
        vector: u32,
    },

    /// The vector or context block lies outside installed memory.
    #[error("{cause}: context block at {addr:#08x} is not present")]
    ContextBlockNotPresent {
        /// The trap that could not be delivered.
        cause: TrapCause,
        /// Offending physical address.
        addr: u32,
    },

    /// A fault occurred while dispatching a machine check.
    #[error("nested fault while dispatching {cause}")]
    NestedFault {
        /// The trap being dispatched when the second fault occurred.
        cause: TrapCause,
    },
}

/// Host-side simulation error.
#[derive(Debug, Error)]
pub enum SimError {
    /// I/O failure reading an image or configuration file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The image does not fit in installed memory at the requested address.
    #[error("image of {size} bytes at {addr:#08x} exceeds {memory} bytes of memory")]
    ImageTooLarge {
        /// Image length in bytes.
        size: usize,
        /// Requested load address.
        addr: u32,
        /// Installed memory in bytes.
        memory: usize,
    },

    /// Installed memory size is zero, unaligned or above the architectural ceiling.
    #[error("unsupported memory size {0:#x}")]
    MemorySize(usize),
}
