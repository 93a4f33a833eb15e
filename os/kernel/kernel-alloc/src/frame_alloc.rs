//! # Boot Frame Allocator
//!
//! First-fit, single-frame allocator over the firmware memory map. Each
//! reservation takes the lowest page of the first region of the requested kind
//! that still has pages, then shrinks that region from the front. There is no
//! deallocation; the allocator only has to carry the kernel through bring-up.

use kernel_info::memory_map::{MemoryMap, MemoryRegionKind};
use kernel_memory_addresses::{PAGE_SIZE, PhysicalAddress};
use kernel_vmem::FrameAlloc;
use log::error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameAllocError {
    /// No region of the requested kind has a page left.
    #[error("No {kind} pages left to reserve")]
    Exhausted { kind: MemoryRegionKind },
}

/// A reserved 4 KiB physical frame.
///
/// Only the allocator creates these. The handle remembers which region it was
/// carved from, so [`BootFrameAllocator::is_reserved`] can check it against the
/// live memory map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PhysicalFrame {
    base: PhysicalAddress,
    region: usize,
    kind: MemoryRegionKind,
}

impl PhysicalFrame {
    /// Start address of the frame.
    #[must_use]
    pub const fn base(&self) -> PhysicalAddress {
        self.base
    }

    /// Kind of the region the frame came from.
    #[must_use]
    pub const fn kind(&self) -> MemoryRegionKind {
        self.kind
    }
}

/// Owns the memory map after the firmware handoff and reserves frames from it.
#[derive(Debug)]
pub struct BootFrameAllocator<'a> {
    map: MemoryMap<'a>,
}

impl<'a> BootFrameAllocator<'a> {
    #[must_use]
    pub const fn new(map: MemoryMap<'a>) -> Self {
        Self { map }
    }

    /// Read-only view of the (partially consumed) memory map.
    #[must_use]
    pub const fn memory_map(&self) -> &MemoryMap<'a> {
        &self.map
    }

    /// Reserve one page from the first region of `kind` that has any left.
    ///
    /// # Errors
    /// [`FrameAllocError::Exhausted`] when every region of `kind` is empty.
    pub fn reserve_page(&mut self, kind: MemoryRegionKind) -> Result<PhysicalFrame, FrameAllocError> {
        let found = self
            .map
            .regions_mut()
            .iter_mut()
            .enumerate()
            .find(|(_, r)| r.kind == kind && r.page_count > 0);

        let Some((region, r)) = found else {
            error!("Unable to reserve a page. No {kind} region has pages left.");
            return Err(FrameAllocError::Exhausted { kind });
        };

        let base = r.base;
        r.base += PAGE_SIZE;
        r.page_count -= 1;
        Ok(PhysicalFrame { base, region, kind })
    }

    /// Whether `frame` was handed out by this allocator.
    ///
    /// The frame must lie below the current base of the region it names, on a
    /// page boundary, and the region must still be of the same kind.
    #[must_use]
    pub fn is_reserved(&self, frame: &PhysicalFrame) -> bool {
        self.map.regions().get(frame.region).is_some_and(|r| {
            r.kind == frame.kind
                && frame.base.is_page_aligned()
                && frame.base.as_u64() < r.base.as_u64()
        })
    }

    /// Pages still available across all regions of `kind`.
    #[must_use]
    pub fn remaining_pages(&self, kind: MemoryRegionKind) -> u64 {
        self.map.pages_of(kind)
    }
}

/// Page tables are carved out of [`MemoryRegionKind::Usable`] memory.
impl FrameAlloc for BootFrameAllocator<'_> {
    fn alloc_4k(&mut self) -> Option<PhysicalAddress> {
        self.reserve_page(MemoryRegionKind::Usable)
            .ok()
            .map(|frame| frame.base())
    }
}
