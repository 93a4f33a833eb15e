//! # Page Tables, Entries and Index Decomposition

use bitfield_struct::bitfield;
use core::fmt;
use core::ops::{Index, IndexMut};
use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};

/// Number of entries in every page-table level.
pub const ENTRIES_PER_TABLE: usize = 512;

/// One 64-bit x86-64 paging entry (any level, 4 KiB granularity).
///
/// An absent entry is all-zero. Entries produced by this crate only ever set
/// [`present`](Self::present) and [`writable`](Self::writable) besides the
/// frame address; the remaining architectural bits are modelled so walks can
/// observe what the hardware or firmware left behind.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct PageTableEntry {
    /// Bit 0 — P: entry is valid.
    pub present: bool,
    /// Bit 1 — R/W: writes allowed.
    pub writable: bool,
    /// Bit 2 — U/S: accessible from CPL3.
    pub user: bool,
    /// Bit 3 — PWT.
    pub write_through: bool,
    /// Bit 4 — PCD.
    pub cache_disable: bool,
    /// Bit 5 — A: set by the CPU on access.
    pub accessed: bool,
    /// Bit 6 — D: set by the CPU on write (leaf only).
    pub dirty: bool,
    /// Bit 7 — PS in PDPTE/PDE, PAT in PTE.
    pub huge_page: bool,
    /// Bit 8 — G.
    pub global: bool,
    /// Bits 9–11 — ignored by hardware.
    #[bits(3)]
    pub os_available_low: u8,
    /// Bits 12–51 — physical frame number.
    #[bits(40)]
    frame_4k: u64,
    /// Bits 52–62 — ignored by hardware.
    #[bits(11)]
    pub os_available_high: u16,
    /// Bit 63 — XD/NX.
    pub no_execute: bool,
}

impl PageTableEntry {
    /// Exclusive upper bound of the physical addresses an entry can encode.
    pub const MAX_PHYS: u64 = 1 << 52;

    /// Whether `frame` fits the 4 KiB frame field unchanged.
    #[must_use]
    pub const fn can_point_at(frame: PhysicalAddress) -> bool {
        frame.is_page_aligned() && frame.as_u64() < Self::MAX_PHYS
    }

    /// A present, writable entry pointing at `frame`.
    ///
    /// Used both for links to lower-level tables and for 4 KiB leaves.
    /// `frame` must satisfy [`can_point_at`](Self::can_point_at).
    #[must_use]
    pub const fn present_writable(frame: PhysicalAddress) -> Self {
        debug_assert!(Self::can_point_at(frame), "frame must be 4K-aligned and below 2^52");
        Self::new()
            .with_present(true)
            .with_writable(true)
            .with_frame_4k(frame.as_u64() >> 12)
    }

    /// Physical frame this entry points at.
    #[must_use]
    pub const fn frame(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.frame_4k() << 12)
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.into_bits() == 0
    }
}

/// One level of the paging hierarchy: 512 entries in a 4 KiB frame.
#[repr(C, align(4096))]
pub struct PageTable {
    entries: [PageTableEntry; ENTRIES_PER_TABLE],
}

const _: () = {
    assert!(size_of::<PageTableEntry>() == 8);
    assert!(size_of::<PageTable>() == 4096);
    assert!(align_of::<PageTable>() == 4096);
};

impl PageTable {
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            entries: [PageTableEntry::new(); ENTRIES_PER_TABLE],
        }
    }

    /// Clear every entry.
    pub fn zero(&mut self) {
        self.entries.fill(PageTableEntry::new());
    }

    #[must_use]
    pub fn present_entries(&self) -> usize {
        self.entries.iter().filter(|e| e.present()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageTableEntry> {
        self.entries.iter()
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Index<TableIndex> for PageTable {
    type Output = PageTableEntry;
    fn index(&self, i: TableIndex) -> &Self::Output {
        &self.entries[i.as_usize()]
    }
}

impl IndexMut<TableIndex> for PageTable {
    fn index_mut(&mut self, i: TableIndex) -> &mut Self::Output {
        &mut self.entries[i.as_usize()]
    }
}

/// A 9-bit index into one table level (`0..512`).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TableIndex(u16);

impl TableIndex {
    /// Index at `shift` in `va`; always in range.
    #[must_use]
    pub const fn from_va(va: VirtualAddress, shift: u32) -> Self {
        Self(va.table_index(shift))
    }

    /// `None` when `index >= 512`.
    #[must_use]
    pub const fn new(index: u16) -> Option<Self> {
        if (index as usize) < ENTRIES_PER_TABLE {
            Some(Self(index))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Page-table levels, named after the table that lives at that level.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PageLevel {
    /// Level 4, the root referenced by CR3.
    Pml4,
    /// Level 3.
    Pdpt,
    /// Level 2.
    Pd,
    /// Level 1, the leaf level for 4 KiB pages.
    Pt,
}

impl PageLevel {
    /// Bit offset of this level's index within a virtual address.
    #[must_use]
    pub const fn shift(self) -> u32 {
        match self {
            Self::Pml4 => 39,
            Self::Pdpt => 30,
            Self::Pd => 21,
            Self::Pt => 12,
        }
    }

    /// The level one step closer to the leaves.
    #[must_use]
    pub const fn next_lower(self) -> Option<Self> {
        match self {
            Self::Pml4 => Some(Self::Pdpt),
            Self::Pdpt => Some(Self::Pd),
            Self::Pd => Some(Self::Pt),
            Self::Pt => None,
        }
    }
}

impl fmt::Display for PageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pml4 => "PML4",
            Self::Pdpt => "PDPT",
            Self::Pd => "PD",
            Self::Pt => "PT",
        })
    }
}

/// Bit offset of the level-5 (LA57) index, which this kernel never uses.
pub const LEVEL5_SHIFT: u32 = 48;

/// The five 9-bit indices of a virtual address.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PageTableIndices {
    /// Bits 48–56. Nonzero means the address needs 5-level paging.
    pub l5: TableIndex,
    pub l4: TableIndex,
    pub l3: TableIndex,
    pub l2: TableIndex,
    pub l1: TableIndex,
}

impl PageTableIndices {
    #[must_use]
    pub const fn of(va: VirtualAddress) -> Self {
        Self {
            l5: TableIndex::from_va(va, LEVEL5_SHIFT),
            l4: TableIndex::from_va(va, PageLevel::Pml4.shift()),
            l3: TableIndex::from_va(va, PageLevel::Pdpt.shift()),
            l2: TableIndex::from_va(va, PageLevel::Pd.shift()),
            l1: TableIndex::from_va(va, PageLevel::Pt.shift()),
        }
    }

    /// Index used at `level`.
    #[must_use]
    pub const fn at(&self, level: PageLevel) -> TableIndex {
        match level {
            PageLevel::Pml4 => self.l4,
            PageLevel::Pdpt => self.l3,
            PageLevel::Pd => self.l2,
            PageLevel::Pt => self.l1,
        }
    }

    /// Whether four-level paging can express this address.
    #[must_use]
    pub const fn fits_four_levels(&self) -> bool {
        self.l5.is_zero()
    }
}
