//! Memory model strategies.
//!
//! One strategy per mapping hardware family, chosen once when the CPU is built:
//! 1. **`Legacy32`:** flat 32-entry table rebuilt from the segment list on every load.
//! 2. **`Fixed256`:** up to 256 maps, always loaded in full.
//! 3. **`Paged2048NonDemand`:** up to 2048 maps loaded one at a time on first use;
//!    an invalid map is a map fault.
//! 4. **`Paged2048Demand`:** as above, but an invalid map is a demand-page fault and
//!    accessed/modified bits are maintained.

use std::fmt;

use crate::common::{AccessType, MapLoadError, MemoryFault};
use crate::core::arch::model::{CpuModel, MapGeometry};
use crate::soc::memory::MainMemory;

use super::cache::MapCache;
use super::descriptor::DescriptorFormat;
use super::loader::{self, LoadMode, MapContext};

/// Behavior that differs between mapping hardware families.
pub trait MemoryModel: fmt::Debug + Send + Sync {
    /// Hardware family implemented by this strategy.
    fn geometry(&self) -> MapGeometry;

    /// Descriptor encoding.
    fn format(&self) -> DescriptorFormat;

    /// Largest number of maps a context may define.
    fn max_maps(&self) -> u32;

    /// True if maps are loaded one at a time on first use.
    fn lazy(&self) -> bool {
        false
    }

    /// True if accessed/modified bits are maintained and invalid maps raise demand-page faults.
    fn demand_paged(&self) -> bool {
        false
    }

    /// Establishes the maps for `cpix`.
    ///
    /// # Arguments
    ///
    /// * `memory` - Guest memory holding the page tables.
    /// * `master_list` - MPL base from the scratchpad.
    /// * `cpix` - Target context (byte offset into the MPL).
    /// * `mode` - Whether to load everything now.
    /// * `cache` - Map cache to fill.
    /// * `ctx` - Current context; replaced only on success.
    ///
    /// # Returns
    ///
    /// The number of maps loaded eagerly.
    fn load(
        &self,
        memory: &MainMemory,
        master_list: u32,
        cpix: u32,
        mode: LoadMode,
        cache: &mut MapCache,
        ctx: &mut MapContext,
    ) -> Result<u32, MapLoadError>;

    /// Fault raised when an in-range map is invalid after any lazy load.
    fn miss_fault(&self, addr: u32, index: u32, _access: AccessType) -> MemoryFault {
        MemoryFault::MapFault { addr, index }
    }
}

/// Builds the strategy for `model`.
pub fn for_model(model: CpuModel) -> Box<dyn MemoryModel> {
    match model.geometry() {
        MapGeometry::Legacy32 => Box::new(Legacy32),
        MapGeometry::Fixed256 => Box::new(Fixed256),
        MapGeometry::Paged2048NonDemand => Box::new(Paged2048NonDemand),
        MapGeometry::Paged2048Demand => Box::new(Paged2048Demand),
    }
}

/// 32/7x mapping hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct Legacy32;

impl MemoryModel for Legacy32 {
    fn geometry(&self) -> MapGeometry {
        MapGeometry::Legacy32
    }

    fn format(&self) -> DescriptorFormat {
        DescriptorFormat::Legacy
    }

    fn max_maps(&self) -> u32 {
        32
    }

    fn load(
        &self,
        memory: &MainMemory,
        master_list: u32,
        cpix: u32,
        _mode: LoadMode,
        cache: &mut MapCache,
        ctx: &mut MapContext,
    ) -> Result<u32, MapLoadError> {
        loader::check_master_list(memory, master_list)?;
        let os = loader::master_entry(memory, master_list, 0)?;
        let user = loader::master_entry(memory, master_list, cpix)?;
        let ceiling = self.max_maps();
        let format = self.format();

        // Built into a scratch cache so a failed walk leaves the live maps intact.
        let mut scratch = MapCache::new();
        let mut next = 0;
        if cpix != 0 && os.load_os_first {
            next = loader::load_segments(memory, &mut scratch, os, next, ceiling, format)?;
        }
        let bpix = next;
        next = loader::load_segments(memory, &mut scratch, user, next, ceiling, format)?;
        if next == 0 {
            return Err(MapLoadError::EmptyContext);
        }
        for i in 0..ceiling as usize {
            cache.populate(i, scratch.raw(i), scratch.source(i), format);
        }
        *ctx = MapContext {
            bpix,
            cpixpl: next - bpix,
            cpix,
            hiwm: next,
            os_list: os.list,
            user_list: user.list,
        };
        Ok(next)
    }
}

/// 32/27, 32/67 and 32/87 mapping hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fixed256;

impl MemoryModel for Fixed256 {
    fn geometry(&self) -> MapGeometry {
        MapGeometry::Fixed256
    }

    fn format(&self) -> DescriptorFormat {
        DescriptorFormat::QuarterProtected
    }

    fn max_maps(&self) -> u32 {
        256
    }

    fn load(
        &self,
        memory: &MainMemory,
        master_list: u32,
        cpix: u32,
        _mode: LoadMode,
        cache: &mut MapCache,
        ctx: &mut MapContext,
    ) -> Result<u32, MapLoadError> {
        let fresh = loader::resolve_context(memory, master_list, cpix, self.max_maps())?;
        *ctx = loader::load_all(memory, cache, fresh, ctx.hiwm, self.format())?;
        Ok(ctx.hiwm)
    }
}

fn load_paged(
    memory: &MainMemory,
    master_list: u32,
    cpix: u32,
    mode: LoadMode,
    cache: &mut MapCache,
    ctx: &mut MapContext,
) -> Result<u32, MapLoadError> {
    let fresh = loader::resolve_context(memory, master_list, cpix, 2048)?;
    match mode {
        LoadMode::Force => {
            *ctx = loader::load_all(memory, cache, fresh, ctx.hiwm, DescriptorFormat::Paged)?;
            Ok(ctx.hiwm)
        }
        LoadMode::Honor => {
            cache.invalidate_range(0, ctx.hiwm.max(fresh.limit()) as usize);
            *ctx = fresh;
            Ok(0)
        }
    }
}

/// 32/97 mapping hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paged2048NonDemand;

impl MemoryModel for Paged2048NonDemand {
    fn geometry(&self) -> MapGeometry {
        MapGeometry::Paged2048NonDemand
    }

    fn format(&self) -> DescriptorFormat {
        DescriptorFormat::Paged
    }

    fn max_maps(&self) -> u32 {
        2048
    }

    fn lazy(&self) -> bool {
        true
    }

    fn load(
        &self,
        memory: &MainMemory,
        master_list: u32,
        cpix: u32,
        mode: LoadMode,
        cache: &mut MapCache,
        ctx: &mut MapContext,
    ) -> Result<u32, MapLoadError> {
        load_paged(memory, master_list, cpix, mode, cache, ctx)
    }
}

/// V6 and V9 mapping hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paged2048Demand;

impl MemoryModel for Paged2048Demand {
    fn geometry(&self) -> MapGeometry {
        MapGeometry::Paged2048Demand
    }

    fn format(&self) -> DescriptorFormat {
        DescriptorFormat::Paged
    }

    fn max_maps(&self) -> u32 {
        2048
    }

    fn lazy(&self) -> bool {
        true
    }

    fn demand_paged(&self) -> bool {
        true
    }

    fn load(
        &self,
        memory: &MainMemory,
        master_list: u32,
        cpix: u32,
        mode: LoadMode,
        cache: &mut MapCache,
        ctx: &mut MapContext,
    ) -> Result<u32, MapLoadError> {
        load_paged(memory, master_list, cpix, mode, cache, ctx)
    }

    fn miss_fault(&self, _addr: u32, index: u32, access: AccessType) -> MemoryFault {
        MemoryFault::DemandPage {
            index,
            fetch: access.is_fetch(),
        }
    }
}
