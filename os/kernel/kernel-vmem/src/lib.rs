//! # Virtual Memory Support
//!
//! Four-level x86-64 paging for early bring-up: a single PML4-rooted
//! [`AddressSpace`] that materialises intermediate tables on demand, maps
//! 4 KiB pages and activates itself through the architecture backend.
//!
//! ## x86-64 Virtual Address → Physical Address Walk
//!
//! A virtual address is divided into five index fields and a page offset:
//!
//! ```text
//! | 56‒48 | 47‒39 | 38‒30 | 29‒21 | 20‒12 | 11‒0   |
//! |  L5   |  PML4 |  PDPT |   PD  |   PT  | Offset |
//! ```
//!
//! Each field is 9 bits wide and masked with `0x1FF`. Only four levels are
//! walked; an address with a nonzero L5 field cannot be expressed and is
//! reported as [`MapOutcome::Unsupported`] without touching any table.
//!
//! ```text
//!  CR3 → PML4 → PDPT → PD → PT → 4 KiB frame
//! ```
//!
//! Intermediate entries created here are present + writable links; leaves are
//! present + writable mappings. Huge pages, user pages, NX and the global bit
//! are never set.
//!
//! ## Seams
//!
//! - [`FrameAlloc`] hands out the 4 KiB frames that hold page tables.
//! - [`PhysMapper`] turns a physical frame address into a usable reference.
//!   Bring-up runs identity-mapped; tests back it with an in-memory arena.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod address_space;
pub mod page_table;

pub use crate::address_space::{AddressSpace, MapError, MapOutcome};
pub use crate::page_table::{PageLevel, PageTable, PageTableEntry, PageTableIndices};
pub use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};

/// Minimal frame allocator used to obtain **physical** 4 KiB frames
/// for page tables.
///
/// Returned frames **must** be 4 KiB aligned and not in use for anything else.
/// Returns `None` on out-of-memory.
pub trait FrameAlloc {
    fn alloc_4k(&mut self) -> Option<PhysicalAddress>;
}

/// Converts physical addresses to usable references in the current virtual
/// address space (identity map during bring-up).
pub trait PhysMapper {
    /// Convert a *physical* address to a mutable reference.
    ///
    /// # Safety
    /// - `pa` must be mapped writable in the current page tables.
    /// - The mapping must remain valid for `'a`.
    /// - `T` must match the bytes at `pa`, and no other live reference may
    ///   alias them mutably.
    #[allow(clippy::mut_from_ref)]
    unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{FrameAlloc, PhysMapper};
    use crate::page_table::PageTable;
    use core::cell::UnsafeCell;
    use kernel_memory_addresses::{PAGE_SIZE, PhysicalAddress};

    /// A trivial **bump** allocator: always hands out the next 4 KiB frame.
    pub struct BumpAlloc {
        start: u64,
        next: u64,
        end: u64,
    }

    impl BumpAlloc {
        pub const fn new(start: u64, end: u64) -> Self {
            Self {
                start,
                next: start,
                end,
            }
        }

        /// Frames handed out so far.
        pub const fn used(&self) -> u64 {
            (self.next - self.start) / PAGE_SIZE
        }
    }

    impl FrameAlloc for BumpAlloc {
        fn alloc_4k(&mut self) -> Option<PhysicalAddress> {
            if self.next + PAGE_SIZE > self.end {
                return None;
            }
            let p = self.next;
            self.next += PAGE_SIZE;
            Some(PhysicalAddress::new(p))
        }
    }

    /// A 4 KiB-aligned raw frame of simulated RAM.
    #[repr(align(4096))]
    pub struct Aligned4K(UnsafeCell<[u8; 4096]>);

    /// In-memory "physical RAM": address `n * 4096` is frame `n`.
    pub struct TestPhys {
        frames: Vec<Aligned4K>,
    }

    impl TestPhys {
        pub fn with_frames(n: usize) -> Self {
            let frames = (0..n)
                .map(|_| Aligned4K(UnsafeCell::new([0xA5; 4096])))
                .collect();
            Self { frames }
        }

        /// Exclusive end of the simulated physical range.
        pub fn end(&self) -> u64 {
            self.frames.len() as u64 * PAGE_SIZE
        }

        /// Copy of every frame, for before/after comparisons.
        pub fn snapshot(&self) -> Vec<u8> {
            self.frames
                .iter()
                .flat_map(|f| unsafe { *f.0.get() })
                .collect()
        }

        pub unsafe fn table(&self, pa: PhysicalAddress) -> &PageTable {
            unsafe { self.phys_to_mut::<PageTable>(pa) }
        }
    }

    impl PhysMapper for TestPhys {
        unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T {
            assert_eq!(pa.page_offset(), 0, "tables live at frame starts");
            let idx = usize::try_from(pa.as_u64() / PAGE_SIZE).unwrap();
            unsafe { &mut *self.frames[idx].0.get().cast::<T>() }
        }
    }
}
