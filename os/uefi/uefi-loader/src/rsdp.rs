//! # Root System Description Pointer

use kernel_info::boot::select_rsdp;
use kernel_memory_addresses::PhysicalAddress;
use uefi::system;
use uefi::table::cfg::{ACPI_GUID, ACPI2_GUID};

/// The physical address of the RSDP from the configuration table, preferring
/// the ACPI 2.0 entry.
pub fn find_rsdp() -> Option<PhysicalAddress> {
    system::with_config_table(|table| {
        let address_of = |guid| {
            table
                .iter()
                .find(|entry| entry.guid == guid)
                .map(|entry| entry.address as usize as u64)
        };
        select_rsdp(address_of(ACPI2_GUID), address_of(ACPI_GUID))
    })
}
