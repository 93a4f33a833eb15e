//! # ACPI (Advanced Configuration and Power Interface) Root Table Discovery
//!
//! Early discovery of firmware description tables. Starting from the RSDP
//! pointer the firmware publishes in its configuration table, this crate
//! validates the root structures and locates individual tables by signature.
//!
//! ## Architecture
//!
//! ```text
//! UEFI configuration table
//!     ↓
//! RSDP (Root System Description Pointer)
//!     ├─ revision 0 → RSDT (32-bit entries)
//!     └─ revision 2 → XSDT (64-bit entries)
//!                        ↓
//!           Individual tables (FACP, APIC, HPET, MCFG, …)
//! ```
//!
//! ## Key Components
//!
//! ### Physical Memory Mapping ([`PhysMapRo`])
//! Read-only view of physical memory. The kernel runs identity mapped during
//! bring-up; tests back the trait with byte images.
//!
//! ### RSDP Parsing ([`rsdp`])
//! * **Revision 0 (ACPI 1.0)**: 20-byte structure, checksum over 20 bytes.
//! * **Revision 2 (ACPI 2.0+)**: 36-byte structure, checksum over 36 bytes.
//! * Every other revision is rejected.
//!
//! ### Description Headers ([`sdt`])
//! The common 36-byte header and the four-character [`Signature`].
//!
//! ### Locator ([`tables`])
//! [`AcpiTables`] validates checksums, counts root-table entries, and finds
//! tables by signature (first match wins).
//!
//! ## Trust model
//!
//! Firmware pointers are followed as-is: no discovered address is checked
//! against the memory map. Checksum failures are reported and discovery
//! continues.
//!
//! ```rust
//! assert!(kernel_acpi::is_checksum_valid(&[0x10, 0xF0]));
//! assert!(!kernel_acpi::is_checksum_valid(&[0x10, 0xF1]));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod rsdp;
pub mod sdt;
pub mod tables;

pub use rsdp::{AcpiRevision, Rsdp};
pub use sdt::{SdtHeader, Signature};
pub use tables::{AcpiError, AcpiTables, Validation};

/// Map a physical region and return a *read-only* byte slice for its contents.
/// You provide the implementation (identity map, kmap, etc.).
pub trait PhysMapRo {
    /// # Safety
    /// The implementor must ensure the returned slice is valid for `len` bytes
    /// for as long as `'a`.
    unsafe fn map_ro<'a>(&self, paddr: u64, len: usize) -> &'a [u8];
}

/// ACPI checksum rule: all bytes of a structure sum to zero modulo 256.
#[must_use]
pub fn is_checksum_valid(bytes: &[u8]) -> bool {
    sum(bytes) == 0
}

fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |a, &b| a.wrapping_add(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sum_buffer_is_valid() {
        let mut bytes = [0x12u8, 0x34, 0x56, 0x78, 0x00];
        bytes[4] = 0u8.wrapping_sub(sum(&bytes[..4]));
        assert!(is_checksum_valid(&bytes));

        bytes[1] ^= 0x01;
        assert!(!is_checksum_valid(&bytes));
    }

    #[test]
    fn empty_buffer_sums_to_zero() {
        assert!(is_checksum_valid(&[]));
    }
}
