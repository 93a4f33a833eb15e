//! # Kernel Boot Information

use crate::memory_map::MemoryMap;
use kernel_memory_addresses::PhysicalAddress;

/// Everything the kernel core needs right after `ExitBootServices`.
#[derive(Debug)]
pub struct KernelBootInfo<'a> {
    /// Translated firmware memory map; ownership passes to the frame allocator.
    pub memory_map: MemoryMap<'a>,

    /// Physical address of the ACPI RSDP, if the firmware published one.
    pub rsdp: Option<PhysicalAddress>,
}

/// Pick the RSDP pointer from the two firmware configuration-table entries.
///
/// The ACPI 2.0+ entry takes priority; null pointers count as absent.
#[must_use]
pub fn select_rsdp(acpi2: Option<u64>, acpi1: Option<u64>) -> Option<PhysicalAddress> {
    acpi2
        .filter(|&addr| addr != 0)
        .or_else(|| acpi1.filter(|&addr| addr != 0))
        .map(PhysicalAddress::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acpi2_wins_over_acpi1() {
        assert_eq!(
            select_rsdp(Some(0x7FE1_4014), Some(0x000F_05B0)),
            Some(PhysicalAddress::new(0x7FE1_4014))
        );
    }

    #[test]
    fn falls_back_to_acpi1() {
        assert_eq!(
            select_rsdp(None, Some(0x000F_05B0)),
            Some(PhysicalAddress::new(0x000F_05B0))
        );
        assert_eq!(
            select_rsdp(Some(0), Some(0x000F_05B0)),
            Some(PhysicalAddress::new(0x000F_05B0))
        );
    }

    #[test]
    fn none_when_neither_present() {
        assert_eq!(select_rsdp(None, None), None);
        assert_eq!(select_rsdp(Some(0), None), None);
    }
}
