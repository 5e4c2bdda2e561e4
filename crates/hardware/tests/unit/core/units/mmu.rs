//! MMU Unit Tests.
//!
//! Drives the translator and map loader directly, without the instruction
//! engine:
//! - Unmapped translation and address masking
//! - Fixed 256-map contexts and quarter-page protection
//! - Map loader configuration errors
//! - The legacy segment-list walk

use pretty_assertions::assert_eq;

use sel32_core::common::{AccessType, MapLoadError, MemoryFault, PhysAddr};
use sel32_core::core::arch::CpuModel;
use sel32_core::core::arch::status::ModeFlags;
use sel32_core::core::units::mmu::Mmu;
use sel32_core::core::units::mmu::descriptor::{Rights, bits};
use sel32_core::core::units::mmu::loader::{LOAD_OS_FIRST, LoadMode};
use sel32_core::soc::MainMemory;

use crate::common::builder::page_tables::{MPL, frames, valid, write_context, write_entry};

const OS_LIST: u32 = 0x500;
const USER_LIST: u32 = 0x520;
const USER_CPIX: u32 = 8;

fn memory() -> MainMemory {
    MainMemory::new(2 * 1024 * 1024).unwrap()
}

fn privileged() -> ModeFlags {
    ModeFlags {
        privileged: true,
        ..ModeFlags::default()
    }
}

fn mapped(privileged: bool) -> ModeFlags {
    ModeFlags {
        privileged,
        mapped: true,
        ..ModeFlags::default()
    }
}

/// Two O/S maps on frames 0-1 and a user context of three maps on frames 5-7.
fn standard_tables(mem: &mut MainMemory) {
    write_context(mem, MPL, 0, OS_LIST, &frames(0, 2));
    write_context(mem, MPL, USER_CPIX, USER_LIST, &frames(5, 3));
}

fn loaded_mmu(model: CpuModel, mem: &MainMemory) -> Mmu {
    let mut mmu = Mmu::new(model);
    let _ = mmu.load_maps(USER_CPIX, LoadMode::Force, MPL, mem).unwrap();
    mmu
}

// ══════════════════════════════════════════════════════════
// 1. Unmapped Translation
// ══════════════════════════════════════════════════════════

#[test]
fn unmapped_is_identity_with_full_rights() {
    let mem = memory();
    let mut mmu = Mmu::new(CpuModel::M3287);

    let t = mmu.translate(0x1234, AccessType::Write, privileged(), &mem).unwrap();

    assert_eq!(t.paddr, PhysAddr::new(0x1234));
    assert_eq!(t.rights, Rights::ALL);
    assert_eq!(t.map_index, None);
}

#[test]
fn unmapped_address_is_masked_to_nineteen_bits() {
    let mem = memory();
    let mut mmu = Mmu::new(CpuModel::M3287);

    let t = mmu.translate(0x0088_1234, AccessType::Read, privileged(), &mem).unwrap();
    assert_eq!(t.paddr.val(), 0x0008_1234);

    let extended = ModeFlags {
        extended: true,
        ..privileged()
    };
    assert_eq!(
        mmu.translate(0x0088_1234, AccessType::Read, extended, &mem),
        Err(MemoryFault::NonPresentMemory { addr: 0x0088_1234 })
    );
}

#[test]
fn unmapped_beyond_memory_is_non_present() {
    let mem = MainMemory::new(0x4000).unwrap();
    let mut mmu = Mmu::new(CpuModel::M3287);

    assert_eq!(
        mmu.translate(0x4000, AccessType::Fetch, privileged(), &mem),
        Err(MemoryFault::NonPresentMemory { addr: 0x4000 })
    );
}

// ══════════════════════════════════════════════════════════
// 2. Fixed 256-Map Contexts
// ══════════════════════════════════════════════════════════

#[test]
fn user_context_follows_operating_system_maps() {
    let mut mem = memory();
    standard_tables(&mut mem);
    let mut mmu = Mmu::new(CpuModel::M3287);

    let loaded = mmu.load_maps(USER_CPIX, LoadMode::Honor, MPL, &mem).unwrap();

    assert_eq!(loaded, 5);
    assert_eq!(mmu.ctx.bpix, 2);
    assert_eq!(mmu.ctx.cpixpl, 3);
    assert_eq!(mmu.ctx.hiwm, 5);
    assert_eq!(mmu.ctx.cpix, USER_CPIX);
    assert_eq!(mmu.counters.context_loads, 1);
}

#[test]
fn mapped_translation_uses_frame_and_offset() {
    let mut mem = memory();
    standard_tables(&mut mem);
    let mut mmu = loaded_mmu(CpuModel::M3287, &mem);

    let os = mmu.translate(0x2010, AccessType::Read, mapped(true), &mem).unwrap();
    assert_eq!(os.paddr.val(), 0x2010);
    assert_eq!(os.map_index, Some(1));

    let user = mmu.translate(0x4010, AccessType::Read, mapped(true), &mem).unwrap();
    assert_eq!(user.paddr.val(), 0xA010);
    assert_eq!(user.map_index, Some(2));
    assert_eq!(mmu.counters.hits, 2);
}

#[test]
fn index_beyond_context_is_a_map_fault() {
    let mut mem = memory();
    standard_tables(&mut mem);
    let mut mmu = loaded_mmu(CpuModel::M3287, &mem);

    assert_eq!(
        mmu.translate(0xA000, AccessType::Read, mapped(true), &mem),
        Err(MemoryFault::MapFault {
            addr: 0xA000,
            index: 5
        })
    );
}

#[test]
fn invalid_map_is_a_map_fault() {
    let mut mem = memory();
    write_context(&mut mem, MPL, 0, OS_LIST, &[valid(0), 0x0003]);
    let mut mmu = loaded_mmu(CpuModel::M3287, &mem);

    assert_eq!(
        mmu.translate(0x2000, AccessType::Read, mapped(true), &mem),
        Err(MemoryFault::MapFault {
            addr: 0x2000,
            index: 1
        })
    );
}

#[test]
fn cpix_zero_loads_only_operating_system_maps() {
    let mut mem = memory();
    standard_tables(&mut mem);
    let mut mmu = Mmu::new(CpuModel::M3287);

    let loaded = mmu.load_maps(0, LoadMode::Force, MPL, &mem).unwrap();

    assert_eq!(loaded, 2);
    assert_eq!(mmu.ctx.cpixpl, 0);
}

#[test]
fn smaller_context_clears_stale_maps() {
    let mut mem = memory();
    standard_tables(&mut mem);
    let mut mmu = loaded_mmu(CpuModel::M3287, &mem);
    assert!(mmu.cache.query(4).is_some());

    let _ = mmu.load_maps(0, LoadMode::Force, MPL, &mem).unwrap();

    assert!(mmu.cache.query(4).is_none());
    assert!(mmu.cache.query(1).is_some());
}

#[test]
fn quarter_protection_denies_unprivileged_writes_only() {
    let mut mem = memory();
    // Page 1, quarter 0 write-protected.
    write_context(&mut mem, MPL, 0, OS_LIST, &[valid(0), bits::VALID | 0x4000 | 1]);
    let mut mmu = loaded_mmu(CpuModel::M3287, &mem);

    let user = mapped(false);
    let protected = mmu.translate(0x2000, AccessType::Write, user, &mem).unwrap();
    assert_eq!(protected.rights, Rights::READ_EXECUTE);
    let open = mmu.translate(0x2800, AccessType::Write, user, &mem).unwrap();
    assert_eq!(open.rights, Rights::ALL);

    let system = mmu.translate(0x2000, AccessType::Write, mapped(true), &mem).unwrap();
    assert_eq!(system.rights, Rights::ALL);
}

// ══════════════════════════════════════════════════════════
// 3. Map Loader Errors
// ══════════════════════════════════════════════════════════

#[test]
fn too_many_maps_keeps_previous_context() {
    let mut mem = memory();
    standard_tables(&mut mem);
    write_entry(&mut mem, MPL, 16, 300, 0x1000);
    let mut mmu = loaded_mmu(CpuModel::M3287, &mem);
    let before = mmu.ctx;

    let err = mmu.load_maps(16, LoadMode::Force, MPL, &mem).unwrap_err();

    assert_eq!(
        err,
        MapLoadError::MapCountExceeded {
            count: 302,
            ceiling: 256
        }
    );
    assert_eq!(mmu.ctx, before);
    assert!(mmu.cache.query(4).is_some());
}

#[test]
fn context_without_maps_is_empty() {
    let mem = memory();
    let mut mmu = Mmu::new(CpuModel::M3287);

    assert_eq!(
        mmu.load_maps(0, LoadMode::Force, MPL, &mem),
        Err(MapLoadError::EmptyContext)
    );
}

#[test]
fn master_list_must_be_doubleword_aligned() {
    let mut mem = memory();
    standard_tables(&mut mem);
    let mut mmu = Mmu::new(CpuModel::M3287);

    assert_eq!(
        mmu.load_maps(USER_CPIX, LoadMode::Force, MPL + 4, &mem),
        Err(MapLoadError::MisalignedMasterList { addr: MPL + 4 })
    );
}

#[test]
fn descriptor_list_must_be_halfword_aligned() {
    let mut mem = memory();
    write_entry(&mut mem, MPL, 0, 2, OS_LIST + 1);
    let mut mmu = Mmu::new(CpuModel::M3287);

    assert_eq!(
        mmu.load_maps(0, LoadMode::Force, MPL, &mem),
        Err(MapLoadError::MisalignedDescriptorList { addr: OS_LIST + 1 })
    );
}

#[test]
fn tables_beyond_memory_are_non_present() {
    let mut mem = memory();
    write_entry(&mut mem, MPL, 0, 2, 0x0030_0000);
    let mut mmu = Mmu::new(CpuModel::M3287);

    assert_eq!(
        mmu.load_maps(0, LoadMode::Force, MPL, &mem),
        Err(MapLoadError::NonPresentMemory { addr: 0x0030_0000 })
    );

    let small = MainMemory::new(0x2000).unwrap();
    assert_eq!(
        mmu.load_maps(0, LoadMode::Force, 0x4000, &small),
        Err(MapLoadError::NonPresentMemory { addr: 0x4000 })
    );
}

// ══════════════════════════════════════════════════════════
// 4. Legacy Segment Lists
// ══════════════════════════════════════════════════════════

fn write_halves(mem: &mut MainMemory, addr: u32, halves: &[u16]) {
    for (i, h) in halves.iter().enumerate() {
        mem.write_half(PhysAddr::new(addr + 2 * i as u32), *h).unwrap();
    }
}

/// O/S: one segment of two pages on frames 1-2. User: one segment of one page on frame 3.
fn legacy_tables(mem: &mut MainMemory, load_os_first: bool) {
    let flag = if load_os_first { LOAD_OS_FIRST } else { 0 };
    write_entry(mem, MPL, 0, flag | 1, 0x600);
    mem.load_words(0x600, &[2, 0x640]).unwrap();
    write_halves(mem, 0x640, &[valid(1), valid(2)]);

    write_entry(mem, MPL, USER_CPIX, 1, 0x610);
    mem.load_words(0x610, &[1, 0x650]).unwrap();
    write_halves(mem, 0x650, &[valid(3)]);
}

#[test]
fn legacy_loads_os_segments_first_when_flagged() {
    let mut mem = memory();
    legacy_tables(&mut mem, true);
    let mut mmu = Mmu::new(CpuModel::M327x);

    let loaded = mmu.load_maps(USER_CPIX, LoadMode::Honor, MPL, &mem).unwrap();

    assert_eq!(loaded, 3);
    assert_eq!(mmu.ctx.bpix, 2);
    assert_eq!(mmu.ctx.cpixpl, 1);
    let t = mmu.translate(0x0001_0004, AccessType::Read, mapped(true), &mem).unwrap();
    assert_eq!(t.paddr.val(), 0x0001_8004);
}

#[test]
fn legacy_without_flag_loads_only_the_user_segments() {
    let mut mem = memory();
    legacy_tables(&mut mem, false);
    let mut mmu = Mmu::new(CpuModel::M327x);

    let loaded = mmu.load_maps(USER_CPIX, LoadMode::Force, MPL, &mem).unwrap();

    assert_eq!(loaded, 1);
    assert_eq!(mmu.ctx.bpix, 0);
    let t = mmu.translate(0x0004, AccessType::Read, mapped(true), &mem).unwrap();
    assert_eq!(t.paddr.val(), 0x0001_8004);
}

#[test]
fn legacy_segment_overflow_is_rejected() {
    let mut mem = memory();
    write_entry(&mut mem, MPL, 0, 1, 0x600);
    mem.load_words(0x600, &[33, 0x640]).unwrap();
    let mut mmu = Mmu::new(CpuModel::M327x);

    assert_eq!(
        mmu.load_maps(0, LoadMode::Force, MPL, &mem),
        Err(MapLoadError::MapCountExceeded {
            count: 33,
            ceiling: 32
        })
    );
}
