//! # Bring-up Configuration

use kernel_acpi::Signature;
use kernel_info::memory::IDENTITY_MAP_BYTES;

/// Knobs for [`bring_up`](crate::init::bring_up).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootConfig {
    /// Bytes of low physical memory to identity-map before switching CR3.
    pub identity_map_bytes: u64,

    /// ACPI tables to look up once the root table is validated. A missing
    /// table is reported but does not stop bring-up.
    pub acpi_tables: &'static [Signature],
}

impl BootConfig {
    pub const DEFAULT: Self = Self {
        identity_map_bytes: IDENTITY_MAP_BYTES,
        acpi_tables: &[Signature::APIC, Signature::FACP],
    };
}

impl Default for BootConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
