//! # UEFI Memory Map Utilities
//!
//! Exits boot services and translates the firmware's memory map into the
//! kernel's [`MemoryRegion`] model.

use alloc::vec::Vec;
use kernel_info::memory_map::{MemoryMap as KernelMemoryMap, MemoryRegion};
use log::{info, warn};
use uefi::boot::MemoryType;
use uefi::mem::memory_map::MemoryMap;
use uefi::{Status, boot};

/// Descriptors of headroom for entries the firmware adds between the probe
/// and `ExitBootServices`.
const EXTRA_DESCS: usize = 32;

/// Exit the UEFI boot services and hand back the translated memory map.
///
/// The region buffer is allocated before exiting; nothing is allocated
/// afterwards.
pub fn exit_boot_services() -> Result<KernelMemoryMap<'static>, Status> {
    let mut regions = allocate_region_buffer()?;

    info!("Exiting boot services ...");
    // SAFETY: no boot-services resources are used after this point.
    let owned_map = unsafe { boot::exit_boot_services(None) };

    let total = owned_map.len();
    if total > regions.capacity() {
        warn!(
            "Memory map has {total} entries, only the first {} are kept",
            regions.capacity()
        );
    }

    let capacity = regions.capacity();
    regions.extend(
        owned_map
            .entries()
            .take(capacity)
            .map(|desc| MemoryRegion::from_uefi(desc.ty.0, desc.phys_start, desc.page_count)),
    );

    info!("Boot services exited, {} memory regions handed over", regions.len());
    Ok(KernelMemoryMap::new(regions.leak()))
}

/// Allocate room for the memory map as it will look after
/// `ExitBootServices`, with slack for descriptors added in the meantime.
fn allocate_region_buffer() -> Result<Vec<MemoryRegion>, Status> {
    let probe = boot::memory_map(MemoryType::LOADER_DATA).map_err(|err| {
        warn!("Failed to get memory map: {err:?}");
        Status::UNSUPPORTED
    })?;

    let needed = probe.len() + EXTRA_DESCS;
    drop(probe);

    Ok(Vec::with_capacity(needed))
}
