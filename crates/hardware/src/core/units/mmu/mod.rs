//! Memory Management Unit (MMU).
//!
//! This module implements logical-to-physical address translation for every
//! supported model. The MMU owns the map cache and the context counters; the
//! model-specific behavior lives in a [`model::MemoryModel`] strategy selected
//! once at construction.
//!
//! The MMU never decides whether an access is allowed: it returns the rights of
//! the page and leaves the check to the CPU's protected access layer.

/// Map/TLB cache.
pub mod cache;

/// Map descriptor encodings.
pub mod descriptor;

/// Page table walker.
pub mod loader;

/// Memory model strategies.
pub mod model;

use tracing::debug;

use crate::common::constants::{ADDR_MASK_19, ADDR_MASK_24};
use crate::common::{AccessType, MapLoadError, MemoryFault, PhysAddr};
use crate::core::arch::model::{CpuModel, MapGeometry};
use crate::core::arch::status::ModeFlags;
use crate::soc::memory::MainMemory;

use self::cache::MapCache;
use self::descriptor::{MapDescriptor, Rights};
use self::loader::{LoadMode, MapContext};
use self::model::MemoryModel;

/// Outcome of a successful translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Translation {
    /// Physical address.
    pub paddr: PhysAddr,
    /// Rights granted by the page.
    pub rights: Rights,
    /// Page index, for mapped accesses.
    pub map_index: Option<u32>,
}

/// Translation and map-load counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapCounters {
    /// Mapped translations that hit a loaded map.
    pub hits: u64,
    /// Mapped translations that found no loaded map.
    pub misses: u64,
    /// Maps loaded one at a time on a miss.
    pub lazy_loads: u64,
    /// Map loader invocations that established a context.
    pub context_loads: u64,
}

/// Memory Management Unit.
#[derive(Debug)]
pub struct Mmu {
    model: Box<dyn MemoryModel>,
    /// Loaded maps.
    pub cache: MapCache,
    /// Context counters (`BPIX`, `CPIXPL`, `HIWM`, ...).
    pub ctx: MapContext,
    /// Translation statistics.
    pub counters: MapCounters,
}

impl Mmu {
    /// Creates an MMU for `model` with an empty map cache.
    pub fn new(model: CpuModel) -> Self {
        Self {
            model: model::for_model(model),
            cache: MapCache::new(),
            ctx: MapContext::default(),
            counters: MapCounters::default(),
        }
    }

    /// Clears the map cache and context counters.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.ctx = MapContext::default();
    }

    /// Mapping hardware family.
    pub fn geometry(&self) -> MapGeometry {
        self.model.geometry()
    }

    /// True if accessed/modified bits are maintained.
    pub fn demand_paged(&self) -> bool {
        self.model.demand_paged()
    }

    /// Runs the map loader for context `cpix`.
    ///
    /// # Arguments
    ///
    /// * `cpix` - Target context (byte offset into the MPL).
    /// * `mode` - [`LoadMode::Force`] loads every map now.
    /// * `master_list` - MPL base from the scratchpad.
    /// * `memory` - Guest memory.
    ///
    /// # Returns
    ///
    /// The number of maps loaded eagerly. On error the previous context is kept.
    pub fn load_maps(
        &mut self,
        cpix: u32,
        mode: LoadMode,
        master_list: u32,
        memory: &MainMemory,
    ) -> Result<u32, MapLoadError> {
        let loaded = self
            .model
            .load(memory, master_list, cpix, mode, &mut self.cache, &mut self.ctx)?;
        self.counters.context_loads += 1;
        debug!(
            cpix,
            ?mode,
            bpix = self.ctx.bpix,
            cpixpl = self.ctx.cpixpl,
            loaded,
            "maps loaded"
        );
        Ok(loaded)
    }

    /// Translates a logical address.
    ///
    /// # Arguments
    ///
    /// * `addr` - Logical byte address.
    /// * `access` - Kind of access, used only to classify demand-page faults.
    /// * `modes` - Current mode flags (mapped, extended, base, privileged).
    /// * `memory` - Guest memory, read on lazy map loads.
    ///
    /// # Returns
    ///
    /// The physical address and the rights of the page, or the fault detected.
    pub fn translate(
        &mut self,
        addr: u32,
        access: AccessType,
        modes: ModeFlags,
        memory: &MainMemory,
    ) -> Result<Translation, MemoryFault> {
        let addr = addr & if modes.wide_addressing() { ADDR_MASK_24 } else { ADDR_MASK_19 };

        if !modes.mapped {
            if !memory.contains(addr, 1) {
                return Err(MemoryFault::NonPresentMemory { addr });
            }
            return Ok(Translation {
                paddr: PhysAddr::new(addr),
                rights: Rights::ALL,
                map_index: None,
            });
        }

        let format = self.model.format();
        let shift = format.page_shift();
        let index = addr >> shift;
        let offset = addr & (format.page_size() - 1);
        if !self.ctx.contains(index) {
            return Err(MemoryFault::MapFault { addr, index });
        }

        let map = match self.cache.query(index as usize) {
            Some(map) => {
                self.counters.hits += 1;
                map
            }
            None => {
                self.counters.misses += 1;
                if !self.model.lazy() {
                    return Err(self.model.miss_fault(addr, index, access));
                }
                self.counters.lazy_loads += 1;
                let _ = loader::load_one(memory, &mut self.cache, &mut self.ctx, index, format)?;
                self.cache
                    .query(index as usize)
                    .ok_or_else(|| self.model.miss_fault(addr, index, access))?
            }
        };

        let paddr = map.base | offset;
        if !memory.contains(paddr, 1) {
            return Err(MemoryFault::NonPresentMemory { addr: paddr });
        }
        Ok(Translation {
            paddr: PhysAddr::new(paddr),
            rights: map.descriptor.rights(offset, modes.privileged, format),
            map_index: Some(index),
        })
    }

    /// Records an access to a demand-paged map: accessed on first access,
    /// modified on first write, in both the cache and the guest page table.
    pub fn record_access(&mut self, index: u32, write: bool, memory: &mut MainMemory) {
        if !self.model.demand_paged() {
            return;
        }
        if let Some(updated) = self.cache.mark(index as usize, write) {
            let source = self.cache.source(index as usize);
            let _ = memory.write_half(PhysAddr::new(source), updated.0);
        }
    }

    /// Raw descriptor and derived entry at `index` (used by `TMAPR`).
    pub fn map_entry(&self, index: u32) -> (MapDescriptor, u32) {
        let i = (index as usize) & 0x7FF;
        (self.cache.raw(i), self.cache.derived(i))
    }
}
