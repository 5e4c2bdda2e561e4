//! Configuration system for the emulator.
//!
//! This module defines the configuration structures used to parameterize a
//! CPU instance. It provides:
//! 1. **Defaults:** Baseline values for memory size, boot entry and the CPU model.
//! 2. **Structures:** Hierarchical config for general, cpu and memory settings.
//!
//! Configuration is supplied as JSON (see [`Config::from_json`]) or built with
//! `Config::default()` for the CLI. Every field is optional in JSON.

use serde::Deserialize;

use crate::common::SimError;
use crate::core::arch::model::CpuModel;

/// Default configuration constants.
mod defaults {
    /// Installed memory (2 MiB).
    pub const MEMORY_SIZE: usize = 2 * 1024 * 1024;

    /// Reset program counter.
    pub const BOOT_ENTRY: u32 = crate::common::constants::BOOT_ENTRY;

    /// Software trap handling is enabled at reset.
    pub const TRAPS_ENABLED: bool = true;

    /// Stop the driver on a halt instruction.
    pub const STOP_ON_HALT: bool = true;
}

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use sel32_core::config::Config;
/// use sel32_core::core::arch::CpuModel;
///
/// let json = r#"{
///     "general": { "trace_instructions": true },
///     "cpu": { "model": "V9", "console_switches": 16 },
///     "memory": { "size_bytes": 1048576 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert!(config.general.trace_instructions);
/// assert_eq!(config.cpu.model, CpuModel::V9);
/// assert!(config.cpu.traps_enabled);
/// assert_eq!(config.memory.size_bytes, 0x10_0000);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Processor model and reset state
    #[serde(default)]
    pub cpu: CpuConfig,
    /// Installed memory
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// [`SimError::Config`] if the document is malformed or names an unknown model.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// General simulation settings and options.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Log every executed instruction at `trace` level
    #[serde(default)]
    pub trace_instructions: bool,

    /// Stop the driver when a halt instruction executes. When false the CPU
    /// waits for an interrupt or console attention instead.
    #[serde(default = "GeneralConfig::default_stop_on_halt")]
    pub stop_on_halt: bool,

    /// Reset program counter
    #[serde(default = "GeneralConfig::default_boot_entry")]
    pub boot_entry: u32,
}

impl GeneralConfig {
    fn default_stop_on_halt() -> bool {
        defaults::STOP_ON_HALT
    }

    fn default_boot_entry() -> u32 {
        defaults::BOOT_ENTRY
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_instructions: false,
            stop_on_halt: defaults::STOP_ON_HALT,
            boot_entry: defaults::BOOT_ENTRY,
        }
    }
}

/// Processor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CpuConfig {
    /// CPU model, which selects the mapping hardware and the model quirks
    #[serde(default)]
    pub model: CpuModel,

    /// Software trap handling enabled in CPUSTATUS at reset
    #[serde(default = "CpuConfig::default_traps_enabled")]
    pub traps_enabled: bool,

    /// Console switch register, readable with `LCS`
    #[serde(default)]
    pub console_switches: u32,
}

impl CpuConfig {
    fn default_traps_enabled() -> bool {
        defaults::TRAPS_ENABLED
    }
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            model: CpuModel::default(),
            traps_enabled: defaults::TRAPS_ENABLED,
            console_switches: 0,
        }
    }
}

/// Main memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Installed memory in bytes (multiple of 8KB, at most 16MB)
    #[serde(default = "MemoryConfig::default_size")]
    pub size_bytes: usize,
}

impl MemoryConfig {
    fn default_size() -> usize {
        defaults::MEMORY_SIZE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size_bytes: defaults::MEMORY_SIZE,
        }
    }
}
