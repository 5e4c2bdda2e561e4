//! Map/TLB Cache.
//!
//! Holds the maps of the current context. Unlike an associative TLB this cache
//! is directly indexed by page index:
//! 1. **Raw descriptors:** packed two per word, left half first, exactly as loaded.
//! 2. **Derived entries:** a hit bit, accessed/modified bits and the physical frame base.
//! 3. **Sources:** the physical address each descriptor was loaded from, used to write
//!    accessed/modified bits back into the guest page table.

use crate::common::constants::MAX_MAPS;

use super::descriptor::{DescriptorFormat, MapDescriptor};

/// Derived entry bit masks.
pub mod entry {
    /// Entry holds a valid translation.
    pub const HIT: u32 = 0x8000_0000;
    /// Page has been accessed.
    pub const ACCESSED: u32 = 0x4000_0000;
    /// Page has been written.
    pub const MODIFIED: u32 = 0x2000_0000;
    /// Physical frame base.
    pub const BASE_MASK: u32 = 0x00FF_FFFF;
}

/// A cached translation returned by [`MapCache::query`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachedMap {
    /// Physical base address of the page.
    pub base: u32,
    /// Raw descriptor.
    pub descriptor: MapDescriptor,
    /// Accessed bit.
    pub accessed: bool,
    /// Modified bit.
    pub modified: bool,
}

/// The per-context map cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapCache {
    raw: Vec<u32>,
    derived: Vec<u32>,
    sources: Vec<u32>,
}

impl Default for MapCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MapCache {
    /// Creates an empty cache sized for the largest memory model.
    pub fn new() -> Self {
        Self {
            raw: vec![0; MAX_MAPS / 2],
            derived: vec![0; MAX_MAPS],
            sources: vec![0; MAX_MAPS],
        }
    }

    /// Clears every entry.
    pub fn clear(&mut self) {
        self.raw.fill(0);
        self.derived.fill(0);
        self.sources.fill(0);
    }

    /// Raw descriptor at `index`.
    #[inline(always)]
    pub fn raw(&self, index: usize) -> MapDescriptor {
        let word = self.raw[index >> 1];
        MapDescriptor(if index & 1 == 0 {
            (word >> 16) as u16
        } else {
            word as u16
        })
    }

    /// Derived entry word at `index`.
    #[inline(always)]
    pub fn derived(&self, index: usize) -> u32 {
        self.derived[index]
    }

    /// Physical address the descriptor at `index` was loaded from.
    pub fn source(&self, index: usize) -> u32 {
        self.sources[index]
    }

    /// Installs a descriptor. The hit bit is set only if the descriptor is valid;
    /// otherwise the derived entry is cleared.
    pub fn populate(
        &mut self,
        index: usize,
        descriptor: MapDescriptor,
        source: u32,
        format: DescriptorFormat,
    ) {
        self.set_raw(index, descriptor.0);
        self.sources[index] = source;
        self.derived[index] = if descriptor.valid() {
            let mut e = entry::HIT | (descriptor.frame_base(format) & entry::BASE_MASK);
            if format == DescriptorFormat::Paged {
                if descriptor.accessed() {
                    e |= entry::ACCESSED;
                }
                if descriptor.modified() {
                    e |= entry::MODIFIED;
                }
            }
            e
        } else {
            0
        };
    }

    /// Clears every derived entry in `from..to`.
    pub fn invalidate_range(&mut self, from: usize, to: usize) {
        let to = to.min(MAX_MAPS);
        if from < to {
            self.derived[from..to].fill(0);
        }
    }

    /// Clears raw and derived entries in `from..to`.
    pub fn clear_range(&mut self, from: usize, to: usize) {
        for i in from..to.min(MAX_MAPS) {
            self.set_raw(i, 0);
            self.derived[i] = 0;
            self.sources[i] = 0;
        }
    }

    /// Looks up `index`; `None` unless the entry has its hit bit set.
    #[inline(always)]
    pub fn query(&self, index: usize) -> Option<CachedMap> {
        let e = *self.derived.get(index)?;
        if e & entry::HIT == 0 {
            return None;
        }
        Some(CachedMap {
            base: e & entry::BASE_MASK,
            descriptor: self.raw(index),
            accessed: e & entry::ACCESSED != 0,
            modified: e & entry::MODIFIED != 0,
        })
    }

    /// Sets the accessed bit (and the modified bit for writes) in both the derived
    /// entry and the raw descriptor.
    ///
    /// # Returns
    ///
    /// The updated raw descriptor if anything changed.
    pub fn mark(&mut self, index: usize, write: bool) -> Option<MapDescriptor> {
        let mut want = entry::ACCESSED;
        let mut raw_bits = super::descriptor::bits::ACCESSED;
        if write {
            want |= entry::MODIFIED;
            raw_bits |= super::descriptor::bits::MODIFIED;
        }
        if self.derived[index] & want == want {
            return None;
        }
        self.derived[index] |= want;
        let updated = self.raw(index).0 | raw_bits;
        self.set_raw(index, updated);
        Some(MapDescriptor(updated))
    }

    fn set_raw(&mut self, index: usize, val: u16) {
        let word = &mut self.raw[index >> 1];
        *word = if index & 1 == 0 {
            (*word & 0x0000_FFFF) | ((val as u32) << 16)
        } else {
            (*word & 0xFFFF_0000) | val as u32
        };
    }
}
