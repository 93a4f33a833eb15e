use bitfield_struct::bitfield;
use kernel_memory_addresses::PhysicalAddress;

#[cfg(feature = "asm")]
use crate::StoreRegisterUnsafe;

/// CR3 — Page-Map Level-4 Base Register (IA-32e, PCID disabled).
///
/// Holds the physical base address of the PML4 table and the cache-control
/// flags used for PML4 walks.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct Cr3 {
    /// Bits 0–2 — Reserved (must be 0).
    #[bits(3)]
    reserved0: u8,

    /// Bit 3 — PWT: Page-level Write-Through for PML4.
    pub pwt: bool,

    /// Bit 4 — PCD: Page-level Cache Disable for PML4.
    pub pcd: bool,

    /// Bits 5–11 — Reserved (must be 0 when written).
    #[bits(7)]
    reserved1: u8,

    /// Bits 12–51 — PML4 physical base >> 12.
    #[bits(40)]
    pml4_base_4k: u64,

    /// Bits 52–63 — Reserved.
    #[bits(12)]
    reserved2: u16,
}

impl Cr3 {
    /// CR3 value selecting `pml4` with write-back caching for the walk.
    ///
    /// `pml4` must be 4 KiB-aligned.
    #[must_use]
    pub const fn from_pml4(pml4: PhysicalAddress) -> Self {
        debug_assert!(pml4.is_page_aligned(), "PML4 base must be 4K-aligned");
        Self::new().with_pml4_base_4k(pml4.as_u64() >> 12)
    }

    /// Physical address of the PML4 table.
    #[must_use]
    pub const fn pml4(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.pml4_base_4k() << 12)
    }
}

#[cfg(feature = "asm")]
impl StoreRegisterUnsafe for Cr3 {
    unsafe fn store_unsafe(self) {
        let cr3 = self.into_bits();
        unsafe {
            core::arch::asm!("mov cr3, {}", in(reg) cr3, options(nostack, preserves_flags));
        }
    }
}
