//! Map Loader.
//!
//! Walks the page-table hierarchy kept in guest memory:
//! 1. **Master process list (MPL):** doubleword entries indexed by the PSD2 CPIX byte
//!    offset; entry 0 describes the operating system.
//! 2. **Descriptor lists (MSDL):** halfword map descriptors, one per page. The legacy
//!    model interposes a segment list of (page count, page list) doublewords.
//!
//! The walker reports configuration errors instead of guessing: an unaligned
//! MPL is a system check, an unaligned descriptor list a machine check, tables
//! beyond installed memory are non-present memory, and map counts beyond the
//! model ceiling are map faults.

use crate::common::{MapLoadError, PhysAddr};
use crate::soc::memory::MainMemory;

use super::cache::MapCache;
use super::descriptor::{DescriptorFormat, MapDescriptor};

/// Master entry flag asking the legacy loader to load the O/S maps first.
pub const LOAD_OS_FIRST: u32 = 0x8000_0000;
/// Map (or segment) count field of a master entry.
pub const COUNT_MASK: u32 = 0x0000_FFFF;

/// How a PSD load establishes its maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadMode {
    /// Load every map now (`LMAP`, `LPSDCM`).
    Force,
    /// Context switch: lazily-loading models only record the context.
    Honor,
}

/// Counters describing the loaded context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapContext {
    /// Number of operating system maps.
    pub bpix: u32,
    /// Number of user maps following the O/S maps.
    pub cpixpl: u32,
    /// CPIX (byte offset into the MPL) the context was built for.
    pub cpix: u32,
    /// High-water mark: one past the highest index loaded in this context.
    pub hiwm: u32,
    /// Descriptor list of the O/S maps.
    pub os_list: u32,
    /// Descriptor list of the user maps.
    pub user_list: u32,
}

impl MapContext {
    /// One past the last valid page index.
    pub const fn limit(&self) -> u32 {
        self.bpix + self.cpixpl
    }

    /// True if `index` is inside the loaded context.
    pub const fn contains(&self, index: u32) -> bool {
        index < self.limit()
    }

    /// Descriptor list and list offset holding the descriptor of `index`.
    pub const fn locate(&self, index: u32) -> (u32, u32) {
        if index < self.bpix {
            (self.os_list, index)
        } else {
            (self.user_list, index - self.bpix)
        }
    }
}

/// A decoded master process list entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MasterEntry {
    /// Map count (segment count on the legacy model).
    pub count: u32,
    /// Address of the descriptor (or segment) list.
    pub list: u32,
    /// Legacy "load O/S first" flag.
    pub load_os_first: bool,
}

fn word(memory: &MainMemory, addr: u32) -> Result<u32, MapLoadError> {
    memory
        .read_word(PhysAddr::new(addr))
        .ok_or(MapLoadError::NonPresentMemory { addr })
}

/// Validates the MPL base from the scratchpad.
///
/// # Errors
///
/// `MisalignedMasterList` if not doubleword aligned, `NonPresentMemory` if the
/// O/S entry is not installed.
pub fn check_master_list(memory: &MainMemory, base: u32) -> Result<(), MapLoadError> {
    if base & 7 != 0 {
        return Err(MapLoadError::MisalignedMasterList { addr: base });
    }
    if !memory.contains(base, 8) {
        return Err(MapLoadError::NonPresentMemory { addr: base });
    }
    Ok(())
}

/// Reads the MPL entry at byte offset `cpix`.
pub fn master_entry(memory: &MainMemory, base: u32, cpix: u32) -> Result<MasterEntry, MapLoadError> {
    let addr = base.wrapping_add(cpix);
    let w0 = word(memory, addr)?;
    let w1 = word(memory, addr.wrapping_add(4))?;
    Ok(MasterEntry {
        count: w0 & COUNT_MASK,
        list: w1 & 0x00FF_FFFF,
        load_os_first: w0 & LOAD_OS_FIRST != 0,
    })
}

/// Checks that a descriptor list of `count` halfwords is aligned and installed.
pub fn check_descriptor_list(memory: &MainMemory, list: u32, count: u32) -> Result<(), MapLoadError> {
    if count == 0 {
        return Ok(());
    }
    if list & 1 != 0 {
        return Err(MapLoadError::MisalignedDescriptorList { addr: list });
    }
    if !memory.contains(list, count * 2) {
        return Err(MapLoadError::NonPresentMemory { addr: list });
    }
    Ok(())
}

/// Reads descriptor `i` of the list at `list`.
///
/// # Returns
///
/// The descriptor and the physical address it was read from.
pub fn read_descriptor(
    memory: &MainMemory,
    list: u32,
    i: u32,
) -> Result<(MapDescriptor, u32), MapLoadError> {
    let addr = list.wrapping_add(i * 2);
    memory
        .read_half(PhysAddr::new(addr))
        .map(|h| (MapDescriptor(h), addr))
        .ok_or(MapLoadError::NonPresentMemory { addr })
}

/// Resolves and validates the context for `cpix` on the flat (non-legacy) models.
///
/// The O/S entry always supplies the first `BPIX` maps; CPIX 0 is the O/S itself
/// and has no user maps.
pub fn resolve_context(
    memory: &MainMemory,
    base: u32,
    cpix: u32,
    ceiling: u32,
) -> Result<MapContext, MapLoadError> {
    check_master_list(memory, base)?;
    let os = master_entry(memory, base, 0)?;
    let user = if cpix == 0 {
        MasterEntry::default()
    } else {
        master_entry(memory, base, cpix)?
    };
    let count = os.count + user.count;
    if count > ceiling {
        return Err(MapLoadError::MapCountExceeded { count, ceiling });
    }
    if count == 0 {
        return Err(MapLoadError::EmptyContext);
    }
    check_descriptor_list(memory, os.list, os.count)?;
    check_descriptor_list(memory, user.list, user.count)?;
    Ok(MapContext {
        bpix: os.count,
        cpixpl: user.count,
        cpix,
        hiwm: 0,
        os_list: os.list,
        user_list: user.list,
    })
}

/// Loads every map of `ctx` into the cache and clears stale entries up to the
/// previous high-water mark.
///
/// # Returns
///
/// The number of maps loaded.
pub fn load_all(
    memory: &MainMemory,
    cache: &mut MapCache,
    mut ctx: MapContext,
    previous_hiwm: u32,
    format: DescriptorFormat,
) -> Result<MapContext, MapLoadError> {
    let total = ctx.limit();
    for index in 0..total {
        let (list, i) = ctx.locate(index);
        let (desc, source) = read_descriptor(memory, list, i)?;
        cache.populate(index as usize, desc, source, format);
    }
    cache.clear_range(total as usize, previous_hiwm as usize);
    ctx.hiwm = total;
    Ok(ctx)
}

/// Loads a single map on a translation miss.
pub fn load_one(
    memory: &MainMemory,
    cache: &mut MapCache,
    ctx: &mut MapContext,
    index: u32,
    format: DescriptorFormat,
) -> Result<MapDescriptor, MapLoadError> {
    let (list, i) = ctx.locate(index);
    let (desc, source) = read_descriptor(memory, list, i)?;
    cache.populate(index as usize, desc, source, format);
    ctx.hiwm = ctx.hiwm.max(index + 1);
    Ok(desc)
}

/// Appends the pages of every segment listed by `entry` (legacy segment list walk).
///
/// # Returns
///
/// The next free map index.
pub fn load_segments(
    memory: &MainMemory,
    cache: &mut MapCache,
    entry: MasterEntry,
    mut next: u32,
    ceiling: u32,
    format: DescriptorFormat,
) -> Result<u32, MapLoadError> {
    if entry.count == 0 {
        return Ok(next);
    }
    if entry.list & 3 != 0 {
        return Err(MapLoadError::MisalignedDescriptorList { addr: entry.list });
    }
    for seg in 0..entry.count {
        let at = entry.list.wrapping_add(seg * 8);
        let pages = word(memory, at)? & COUNT_MASK;
        let page_list = word(memory, at.wrapping_add(4))? & 0x00FF_FFFF;
        if next + pages > ceiling {
            return Err(MapLoadError::MapCountExceeded {
                count: next + pages,
                ceiling,
            });
        }
        check_descriptor_list(memory, page_list, pages)?;
        for p in 0..pages {
            let (desc, source) = read_descriptor(memory, page_list, p)?;
            cache.populate(next as usize, desc, source, format);
            next += 1;
        }
    }
    Ok(next)
}
