//! CPU model catalogue.
//!
//! All models share one instruction set; they differ in mapping hardware and in
//! a handful of externally visible quirks. Every model-dependent decision in the
//! engine asks this type instead of matching on the model directly.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Supported CPU models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum CpuModel {
    /// 32/7x series: 32 maps of 32KB.
    #[serde(rename = "32/7x", alias = "32/75", alias = "M3275")]
    M327x,
    /// 32/27: 256 maps of 8KB.
    #[serde(rename = "32/27", alias = "M3227")]
    M3227,
    /// 32/67: 256 maps of 8KB.
    #[serde(rename = "32/67", alias = "M3267")]
    M3267,
    /// 32/87: 256 maps of 8KB.
    #[default]
    #[serde(rename = "32/87", alias = "M3287")]
    M3287,
    /// 32/97: 2048 maps of 8KB, loaded lazily.
    #[serde(rename = "32/97", alias = "M3297")]
    M3297,
    /// V6: 2048 demand-paged maps.
    #[serde(rename = "V6")]
    V6,
    /// V9: 2048 demand-paged maps.
    #[serde(rename = "V9")]
    V9,
}

/// Mapping hardware family of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapGeometry {
    /// 32 maps of 32KB, loaded through a segment list.
    Legacy32,
    /// Up to 256 maps of 8KB, always fully loaded.
    Fixed256,
    /// Up to 2048 maps of 8KB, loaded lazily, invalid map is a map fault.
    Paged2048NonDemand,
    /// Up to 2048 maps of 8KB, loaded lazily, invalid map is a demand-page fault.
    Paged2048Demand,
}

impl CpuModel {
    /// Every supported model.
    pub const ALL: [Self; 7] = [
        Self::M327x,
        Self::M3227,
        Self::M3267,
        Self::M3287,
        Self::M3297,
        Self::V6,
        Self::V9,
    ];

    /// Identifier reported in the CPUSTATUS model field.
    pub const fn id(self) -> u32 {
        match self {
            Self::M327x => 0,
            Self::M3227 => 1,
            Self::M3267 => 2,
            Self::M3287 => 3,
            Self::M3297 => 4,
            Self::V6 => 5,
            Self::V9 => 6,
        }
    }

    /// Mapping hardware family.
    pub const fn geometry(self) -> MapGeometry {
        match self {
            Self::M327x => MapGeometry::Legacy32,
            Self::M3227 | Self::M3267 | Self::M3287 => MapGeometry::Fixed256,
            Self::M3297 => MapGeometry::Paged2048NonDemand,
            Self::V6 | Self::V9 => MapGeometry::Paged2048Demand,
        }
    }

    /// True if a right-half `NOP` after a left-half instruction is skipped.
    pub const fn drops_right_nop(self) -> bool {
        !matches!(self, Self::M327x)
    }

    /// True if the saved PSD1 has its last-instruction-half bit cleared on a trap.
    pub const fn clears_half_bit_on_trap(self) -> bool {
        matches!(self, Self::M3267 | Self::M3287 | Self::M3297)
    }

    /// True if undefined-instruction and privilege traps save the faulting PC.
    pub const fn restarts_opcode_traps(self) -> bool {
        matches!(self, Self::M3297 | Self::V6 | Self::V9)
    }

    /// True if TRAPSTATUS distinguishes instruction-fetch faults.
    pub const fn reports_fetch_faults(self) -> bool {
        matches!(self.geometry(), MapGeometry::Paged2048NonDemand | MapGeometry::Paged2048Demand)
    }

    /// Display name as printed on the front panel.
    pub const fn name(self) -> &'static str {
        match self {
            Self::M327x => "32/7x",
            Self::M3227 => "32/27",
            Self::M3267 => "32/67",
            Self::M3287 => "32/87",
            Self::M3297 => "32/97",
            Self::V6 => "V6",
            Self::V9 => "V9",
        }
    }
}

impl fmt::Display for CpuModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a model name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cpu model `{0}` (expected 32/7x, 32/27, 32/67, 32/87, 32/97, V6 or V9)")]
pub struct ParseModelError(pub String);

impl FromStr for CpuModel {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .or_else(|| match wanted {
                "32/75" | "7x" | "75" => Some(Self::M327x),
                "27" => Some(Self::M3227),
                "67" => Some(Self::M3267),
                "87" => Some(Self::M3287),
                "97" => Some(Self::M3297),
                _ => None,
            })
            .ok_or_else(|| ParseModelError(wanted.to_string()))
    }
}
