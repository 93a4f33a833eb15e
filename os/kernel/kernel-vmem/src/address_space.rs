//! # Address Space (x86-64, PML4-rooted)
//!
//! Builds and walks a **single** four-level translation tree rooted at a PML4.
//!
//! - [`AddressSpace::new`] reserves and zeroes a fresh root.
//! - [`AddressSpace::map_page`] installs one 4 KiB mapping, materialising
//!   missing intermediate tables as present + writable links.
//! - [`AddressSpace::translate`] / [`AddressSpace::leaf_entry`] walk the tree
//!   read-only.
//! - [`AddressSpace::identity_map`] maps a physical range 1:1.
//! - [`AddressSpace::activate`] loads CR3 with this space's root.
//!
//! ## Safety
//!
//! - Mutating active mappings requires **TLB maintenance** (`invlpg` per page
//!   or a CR3 reload). Bring-up only mutates the tree before activation.
//! - The provided [`PhysMapper`] must yield **writable** references to table
//!   frames.

use crate::page_table::{PageLevel, PageTable, PageTableEntry, PageTableIndices};
use crate::{FrameAlloc, PhysMapper};
use kernel_memory_addresses::{PAGE_SIZE, PhysicalAddress, VirtualAddress};
use kernel_registers::backend::CpuBackend;
use kernel_registers::cr3::Cr3;
use log::debug;

/// Result of a successful [`AddressSpace::map_page`] call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MapOutcome {
    /// The leaf now maps the requested frame.
    Mapped,
    /// The address needs 5-level paging; nothing was touched.
    Unsupported,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum MapError {
    /// No frame was available for a table at `level`.
    #[error("Out of memory while creating a {level} table")]
    OutOfMemory { level: PageLevel },
    /// Identity mappings must start on a page boundary.
    #[error("Identity map start {start} is not page aligned")]
    Unaligned { start: PhysicalAddress },
    /// The target frame is unaligned or beyond the 52-bit physical range.
    #[error("Cannot map frame {pa}: not page aligned or above 52 bits")]
    InvalidFrame { pa: PhysicalAddress },
}

/// Handle to a single, concrete address space.
pub struct AddressSpace<'m, M: PhysMapper> {
    root: PhysicalAddress,
    mapper: &'m M,
}

impl<'m, M: PhysMapper> AddressSpace<'m, M> {
    /// Reserve one frame from `alloc`, zero it and use it as the PML4.
    ///
    /// # Errors
    /// [`MapError::OutOfMemory`] when `alloc` has no frame left.
    pub fn new<A: FrameAlloc>(mapper: &'m M, alloc: &mut A) -> Result<Self, MapError> {
        let root = alloc.alloc_4k().ok_or(MapError::OutOfMemory {
            level: PageLevel::Pml4,
        })?;
        let space = Self { root, mapper };
        unsafe { space.table_mut(root) }.zero();
        debug!("Created PML4 at {root}");
        Ok(space)
    }

    /// Physical address of the PML4.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> PhysicalAddress {
        self.root
    }

    /// Borrow the table stored in the frame at `pa`.
    ///
    /// # Safety
    /// `pa` must be a table frame owned by this address space.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    unsafe fn table_mut<'a>(&self, pa: PhysicalAddress) -> &'a mut PageTable {
        unsafe { self.mapper.phys_to_mut::<PageTable>(pa) }
    }

    /// Map the 4 KiB page at `va` to the frame `pa` (present + writable).
    ///
    /// A nonzero level-5 index yields [`MapOutcome::Unsupported`] without
    /// touching any table. Any existing leaf for `va` is replaced.
    ///
    /// # Errors
    /// - [`MapError::InvalidFrame`] when `pa` cannot be encoded in an entry;
    ///   no table is touched.
    /// - [`MapError::OutOfMemory`] when an intermediate table cannot be
    ///   allocated. Tables created earlier in the same walk stay linked.
    pub fn map_page<A: FrameAlloc>(
        &mut self,
        alloc: &mut A,
        pa: PhysicalAddress,
        va: VirtualAddress,
    ) -> Result<MapOutcome, MapError> {
        if !PageTableEntry::can_point_at(pa) {
            return Err(MapError::InvalidFrame { pa });
        }

        let idx = PageTableIndices::of(va);
        if !idx.fits_four_levels() {
            return Ok(MapOutcome::Unsupported);
        }

        let mut table_pa = self.root;
        let mut level = PageLevel::Pml4;
        loop {
            let table = unsafe { self.table_mut(table_pa) };
            let i = idx.at(level);

            let Some(lower) = level.next_lower() else {
                table[i] = PageTableEntry::present_writable(pa);
                return Ok(MapOutcome::Mapped);
            };

            let entry = table[i];
            table_pa = if entry.present() {
                entry.frame()
            } else {
                let frame = alloc
                    .alloc_4k()
                    .ok_or(MapError::OutOfMemory { level: lower })?;
                unsafe { self.table_mut(frame) }.zero();
                table[i] = PageTableEntry::present_writable(frame);
                debug!("Created {lower} at {frame} for {va}");
                frame
            };
            level = lower;
        }
    }

    /// Map `bytes` of physical memory starting at `start` to the same virtual
    /// addresses. Returns the number of pages mapped.
    ///
    /// # Errors
    /// [`MapError::Unaligned`] for a misaligned `start`, otherwise whatever
    /// [`map_page`](Self::map_page) reports.
    pub fn identity_map<A: FrameAlloc>(
        &mut self,
        alloc: &mut A,
        start: PhysicalAddress,
        bytes: u64,
    ) -> Result<u64, MapError> {
        if !start.is_page_aligned() {
            return Err(MapError::Unaligned { start });
        }

        let pages = bytes.div_ceil(PAGE_SIZE);
        let mut mapped = 0;
        for page in 0..pages {
            let addr = start.as_u64() + page * PAGE_SIZE;
            let outcome = self.map_page(
                alloc,
                PhysicalAddress::new(addr),
                VirtualAddress::new(addr),
            )?;
            if outcome == MapOutcome::Mapped {
                mapped += 1;
            }
        }

        debug!("Identity mapped {mapped} pages from {start}");
        Ok(mapped)
    }

    /// The 4 KiB leaf entry for `va`, if every level down to it is present.
    #[must_use]
    pub fn leaf_entry(&self, va: VirtualAddress) -> Option<PageTableEntry> {
        let idx = PageTableIndices::of(va);
        if !idx.fits_four_levels() {
            return None;
        }

        let mut table_pa = self.root;
        let mut level = PageLevel::Pml4;
        loop {
            let entry = unsafe { self.table_mut(table_pa) }[idx.at(level)];
            if !entry.present() {
                return None;
            }
            match level.next_lower() {
                Some(lower) => {
                    table_pa = entry.frame();
                    level = lower;
                }
                None => return Some(entry),
            }
        }
    }

    /// Translate `va` to the physical address it maps to.
    #[must_use]
    pub fn translate(&self, va: VirtualAddress) -> Option<PhysicalAddress> {
        self.leaf_entry(va)
            .map(|e| e.frame() + va.page_offset())
    }

    /// Load CR3 with this address space's root.
    ///
    /// # Safety
    /// The tree must map the currently executing code, the stack and every
    /// structure still in use at their current virtual addresses.
    pub unsafe fn activate<B: CpuBackend>(&self, backend: &mut B) {
        debug!("Activating address space rooted at {}", self.root);
        unsafe {
            backend.load_page_root(Cr3::from_pml4(self.root));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BumpAlloc, TestPhys};
    use kernel_registers::descriptor_table::DescriptorTablePointer;

    fn space<'a>(phys: &'a TestPhys, alloc: &mut BumpAlloc) -> AddressSpace<'a, TestPhys> {
        AddressSpace::new(phys, alloc).expect("root")
    }

    #[test]
    fn map_page_creates_tables_and_leaf() {
        let phys = TestPhys::with_frames(16);
        let mut alloc = BumpAlloc::new(0, phys.end());
        let mut aspace = space(&phys, &mut alloc);

        let va = VirtualAddress::new(0x0000_7fff_ffe0_1000);
        let pa = PhysicalAddress::new(0x0030_0000);
        assert_eq!(aspace.map_page(&mut alloc, pa, va), Ok(MapOutcome::Mapped));

        // Root plus PDPT, PD and PT.
        assert_eq!(alloc.used(), 4);

        let leaf = aspace.leaf_entry(va).expect("leaf");
        assert!(leaf.present());
        assert!(leaf.writable());
        assert_eq!(leaf.frame(), pa);
        assert_eq!(
            aspace.translate(va + 0x123),
            Some(PhysicalAddress::new(0x0030_0123))
        );
    }

    #[test]
    fn neighbours_share_intermediate_tables() {
        let phys = TestPhys::with_frames(16);
        let mut alloc = BumpAlloc::new(0, phys.end());
        let mut aspace = space(&phys, &mut alloc);

        let va1 = VirtualAddress::new(0x4000_0000);
        let va2 = VirtualAddress::new(0x4000_1000);
        let pa1 = PhysicalAddress::new(0x8000);
        let pa2 = PhysicalAddress::new(0x9000);

        aspace.map_page(&mut alloc, pa1, va1).unwrap();
        let used = alloc.used();
        aspace.map_page(&mut alloc, pa2, va2).unwrap();

        assert_eq!(alloc.used(), used, "second mapping reuses L3/L2/L1");
        assert_eq!(aspace.translate(va1), Some(pa1));
        assert_eq!(aspace.translate(va2), Some(pa2));
    }

    #[test]
    fn remap_overwrites_leaf() {
        let phys = TestPhys::with_frames(16);
        let mut alloc = BumpAlloc::new(0, phys.end());
        let mut aspace = space(&phys, &mut alloc);

        let va = VirtualAddress::new(0x20_0000);
        aspace
            .map_page(&mut alloc, PhysicalAddress::new(0x5000), va)
            .unwrap();
        aspace
            .map_page(&mut alloc, PhysicalAddress::new(0x7000), va)
            .unwrap();
        assert_eq!(aspace.translate(va), Some(PhysicalAddress::new(0x7000)));
    }

    #[test]
    fn level5_address_is_a_silent_noop() {
        let phys = TestPhys::with_frames(8);
        let mut alloc = BumpAlloc::new(0, phys.end());
        let mut aspace = space(&phys, &mut alloc);
        let before = phys.snapshot();

        let va = VirtualAddress::new(1 << 48);
        let outcome = aspace.map_page(&mut alloc, PhysicalAddress::new(0x1000), va);

        assert_eq!(outcome, Ok(MapOutcome::Unsupported));
        assert_eq!(alloc.used(), 1);
        assert!(phys.snapshot() == before, "no table was touched");
        assert_eq!(aspace.translate(va), None);
    }

    #[test]
    fn unencodable_frames_are_rejected() {
        let phys = TestPhys::with_frames(8);
        let mut alloc = BumpAlloc::new(0, phys.end());
        let mut aspace = space(&phys, &mut alloc);
        let before = phys.snapshot();
        let va = VirtualAddress::new(0x40_0000);

        for pa in [
            PhysicalAddress::new(0x1234),
            PhysicalAddress::new(PageTableEntry::MAX_PHYS),
        ] {
            assert_eq!(
                aspace.map_page(&mut alloc, pa, va),
                Err(MapError::InvalidFrame { pa })
            );
        }

        assert_eq!(alloc.used(), 1);
        assert!(phys.snapshot() == before, "no table was touched");
        assert_eq!(aspace.translate(va), None);
        assert_eq!(
            MapError::InvalidFrame { pa: PhysicalAddress::new(0x1234) }.to_string(),
            "Cannot map frame 0x0000000000001234: not page aligned or above 52 bits"
        );
    }

    #[test]
    fn exhaustion_reports_level() {
        let phys = TestPhys::with_frames(2);
        let mut alloc = BumpAlloc::new(0, phys.end());
        let mut aspace = space(&phys, &mut alloc);

        let err = aspace
            .map_page(&mut alloc, PhysicalAddress::new(0), VirtualAddress::new(0))
            .unwrap_err();
        assert_eq!(err, MapError::OutOfMemory { level: PageLevel::Pd });
        assert_eq!(
            format!("{err}"),
            "Out of memory while creating a PD table"
        );
        // The PDPT created before the failure stays linked.
        assert_eq!(unsafe { phys.table(aspace.root()) }.present_entries(), 1);
    }

    #[test]
    fn root_allocation_failure() {
        let phys = TestPhys::with_frames(1);
        let mut alloc = BumpAlloc::new(0, 0);
        assert_eq!(
            AddressSpace::new(&phys, &mut alloc).err(),
            Some(MapError::OutOfMemory {
                level: PageLevel::Pml4
            })
        );
    }

    #[test]
    fn identity_map_counts_pages() {
        let phys = TestPhys::with_frames(16);
        let mut alloc = BumpAlloc::new(0, phys.end());
        let mut aspace = space(&phys, &mut alloc);

        let mapped = aspace
            .identity_map(&mut alloc, PhysicalAddress::new(0x1000), 3 * PAGE_SIZE + 1)
            .unwrap();
        assert_eq!(mapped, 4);
        for page in 1..=4u64 {
            let va = VirtualAddress::new(page * PAGE_SIZE);
            assert_eq!(aspace.translate(va), Some(PhysicalAddress::new(page * PAGE_SIZE)));
        }
        assert_eq!(aspace.translate(VirtualAddress::new(5 * PAGE_SIZE)), None);
    }

    #[test]
    fn identity_map_rejects_unaligned_start() {
        let phys = TestPhys::with_frames(4);
        let mut alloc = BumpAlloc::new(0, phys.end());
        let mut aspace = space(&phys, &mut alloc);
        let start = PhysicalAddress::new(0x1001);
        assert_eq!(
            aspace.identity_map(&mut alloc, start, PAGE_SIZE),
            Err(MapError::Unaligned { start })
        );
    }

    #[derive(Default)]
    struct CaptureCr3(Option<Cr3>);

    impl CpuBackend for CaptureCr3 {
        fn disable_interrupts(&mut self) {}
        fn enable_interrupts(&mut self) {}
        unsafe fn load_gdt(&mut self, _: &DescriptorTablePointer) {}
        unsafe fn reload_segments(&mut self, _: u16, _: u16) {}
        unsafe fn load_idt(&mut self, _: &DescriptorTablePointer) {}
        unsafe fn load_page_root(&mut self, cr3: Cr3) {
            self.0 = Some(cr3);
        }
    }

    #[test]
    fn activate_loads_root_into_cr3() {
        let phys = TestPhys::with_frames(4);
        let mut alloc = BumpAlloc::new(0x2000, phys.end());
        let aspace = space(&phys, &mut alloc);

        let mut backend = CaptureCr3::default();
        unsafe { aspace.activate(&mut backend) };
        assert_eq!(backend.0.map(|c| c.pml4()), Some(PhysicalAddress::new(0x2000)));
    }
}
