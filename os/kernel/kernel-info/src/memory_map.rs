//! # Physical Memory Map

use kernel_memory_addresses::{PAGE_SIZE, PhysicalAddress};

/// Coarse classification of a firmware memory descriptor.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MemoryRegionKind {
    /// Reserved, MMIO, ACPI, unaccepted, … never handed out.
    Unknown = 0,
    /// Loader or boot-services code.
    BootCode = 1,
    /// Loader or boot-services data.
    BootData = 2,
    /// Conventional and runtime-services memory.
    Usable = 3,
}

impl MemoryRegionKind {
    /// Translate a raw `EFI_MEMORY_TYPE` value.
    #[must_use]
    pub const fn from_uefi_type(ty: u32) -> Self {
        match ty {
            uefi_type::LOADER_CODE | uefi_type::BOOT_SERVICES_CODE => Self::BootCode,
            uefi_type::LOADER_DATA | uefi_type::BOOT_SERVICES_DATA => Self::BootData,
            uefi_type::RUNTIME_SERVICES_CODE
            | uefi_type::RUNTIME_SERVICES_DATA
            | uefi_type::CONVENTIONAL => Self::Usable,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::BootCode => "BootCode",
            Self::BootData => "BootData",
            Self::Usable => "Usable",
        }
    }
}

impl core::fmt::Display for MemoryRegionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw `EFI_MEMORY_TYPE` values (UEFI 2.10, §7.2.1).
pub mod uefi_type {
    pub const RESERVED: u32 = 0;
    pub const LOADER_CODE: u32 = 1;
    pub const LOADER_DATA: u32 = 2;
    pub const BOOT_SERVICES_CODE: u32 = 3;
    pub const BOOT_SERVICES_DATA: u32 = 4;
    pub const RUNTIME_SERVICES_CODE: u32 = 5;
    pub const RUNTIME_SERVICES_DATA: u32 = 6;
    pub const CONVENTIONAL: u32 = 7;
    pub const UNUSABLE: u32 = 8;
    pub const ACPI_RECLAIM: u32 = 9;
    pub const ACPI_NON_VOLATILE: u32 = 10;
    pub const MMIO: u32 = 11;
    pub const MMIO_PORT_SPACE: u32 = 12;
    pub const PAL_CODE: u32 = 13;
    pub const PERSISTENT_MEMORY: u32 = 14;
}

/// A contiguous run of physical pages of one kind.
///
/// Allocation shrinks the region from the front: `base` moves up one page and
/// `page_count` drops by one. Regions are never merged or split.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MemoryRegion {
    pub kind: MemoryRegionKind,
    pub base: PhysicalAddress,
    pub page_count: u64,
}

impl MemoryRegion {
    #[must_use]
    pub const fn new(kind: MemoryRegionKind, base: PhysicalAddress, page_count: u64) -> Self {
        Self {
            kind,
            base,
            page_count,
        }
    }

    /// Build a region from the fields of a firmware memory descriptor.
    #[must_use]
    pub const fn from_uefi(ty: u32, phys_start: u64, page_count: u64) -> Self {
        Self::new(
            MemoryRegionKind::from_uefi_type(ty),
            PhysicalAddress::new(phys_start),
            page_count,
        )
    }

    /// First address past the end of the region.
    #[must_use]
    pub const fn end(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.base.as_u64() + self.page_count * PAGE_SIZE)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.page_count == 0
    }
}

/// Ordered list of physical memory regions handed over by the boot shim.
#[derive(Debug)]
pub struct MemoryMap<'a> {
    regions: &'a mut [MemoryRegion],
}

impl<'a> MemoryMap<'a> {
    #[must_use]
    pub const fn new(regions: &'a mut [MemoryRegion]) -> Self {
        Self { regions }
    }

    #[must_use]
    pub fn regions(&self) -> &[MemoryRegion] {
        &*self.regions
    }

    pub fn regions_mut(&mut self) -> &mut [MemoryRegion] {
        &mut *self.regions
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Total number of pages still available in regions of `kind`.
    #[must_use]
    pub fn pages_of(&self, kind: MemoryRegionKind) -> u64 {
        self.regions
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.page_count)
            .sum()
    }
}
