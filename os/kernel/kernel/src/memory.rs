//! # Physical Memory Access During Bring-up
//!
//! The firmware hands over control with physical memory identity-mapped, and
//! the address space built by bring-up keeps the low range identity-mapped,
//! so a physical address can be dereferenced as-is.

use kernel_acpi::PhysMapRo;
use kernel_memory_addresses::PhysicalAddress;
use kernel_vmem::PhysMapper;

/// Maps physical addresses 1:1 onto virtual addresses.
#[derive(Debug, Default, Copy, Clone)]
pub struct IdentityMapper;

impl PhysMapper for IdentityMapper {
    #[allow(clippy::cast_possible_truncation)]
    unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T {
        unsafe { &mut *(pa.as_u64() as usize as *mut T) }
    }
}

impl PhysMapRo for IdentityMapper {
    #[allow(clippy::cast_possible_truncation)]
    unsafe fn map_ro<'a>(&self, paddr: u64, len: usize) -> &'a [u8] {
        unsafe { core::slice::from_raw_parts(paddr as usize as *const u8, len) }
    }
}
