//! # Root System Description Pointer
//!
//! Layout (packed, little-endian):
//!
//! ```text
//! off  size  field
//!   0     8  "RSD PTR "
//!   8     1  checksum            (first 20 bytes sum to 0)
//!   9     6  OEM id
//!  15     1  revision            (0 = ACPI 1.0, 2 = ACPI 2.0+)
//!  16     4  RSDT address
//! ---------- revision 2 only ----------
//!  20     4  length
//!  24     8  XSDT address
//!  32     1  extended checksum   (all 36 bytes sum to 0)
//!  33     3  reserved
//! ```

use crate::sdt::{array, le_u32, le_u64};
use core::fmt;

/// Expected value of the first eight bytes.
pub const RSDP_SIGNATURE: [u8; 8] = *b"RSD PTR ";

/// Bytes covered by the revision 0 checksum.
pub const RSDP_V1_LEN: usize = 20;

/// Bytes covered by the revision 2 checksum.
pub const RSDP_V2_LEN: usize = 36;

/// The two RSDP layouts this kernel understands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AcpiRevision {
    /// Revision 0: RSDT with 32-bit entries.
    V1,
    /// Revision 2: XSDT with 64-bit entries.
    V2,
}

impl AcpiRevision {
    /// `None` for any revision byte other than 0 or 2.
    #[must_use]
    pub const fn from_raw(revision: u8) -> Option<Self> {
        match revision {
            0 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }

    /// Number of RSDP bytes the checksum covers.
    #[must_use]
    pub const fn rsdp_len(self) -> usize {
        match self {
            Self::V1 => RSDP_V1_LEN,
            Self::V2 => RSDP_V2_LEN,
        }
    }

    /// Width of one root-table entry in bytes.
    #[must_use]
    pub const fn entry_size(self) -> usize {
        match self {
            Self::V1 => size_of::<u32>(),
            Self::V2 => size_of::<u64>(),
        }
    }

    /// Name of the root table for this revision.
    #[must_use]
    pub const fn root_table_name(self) -> &'static str {
        match self {
            Self::V1 => "RSDT",
            Self::V2 => "XSDT",
        }
    }
}

impl fmt::Display for AcpiRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::V1 => "1.0",
            Self::V2 => "2.0",
        })
    }
}

/// Decoded RSDP. Revision 0 structures leave the extended fields zeroed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rsdp {
    pub signature: [u8; 8],
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub revision: u8,
    pub rsdt_address: u32,
    pub length: u32,
    pub xsdt_address: u64,
    pub extended_checksum: u8,
}

impl Rsdp {
    /// Decode an RSDP from `bytes`.
    ///
    /// At least [`RSDP_V1_LEN`] bytes are required. The extended fields are
    /// only read when [`RSDP_V2_LEN`] bytes are available.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < RSDP_V1_LEN {
            return None;
        }

        let mut rsdp = Self {
            signature: array(bytes, 0),
            checksum: bytes[8],
            oem_id: array(bytes, 9),
            revision: bytes[15],
            rsdt_address: le_u32(bytes, 16),
            length: 0,
            xsdt_address: 0,
            extended_checksum: 0,
        };

        if bytes.len() >= RSDP_V2_LEN {
            rsdp.length = le_u32(bytes, 20);
            rsdp.xsdt_address = le_u64(bytes, 24);
            rsdp.extended_checksum = bytes[32];
        }

        Some(rsdp)
    }

    #[must_use]
    pub fn has_valid_signature(&self) -> bool {
        self.signature == RSDP_SIGNATURE
    }

    /// Physical address of the RSDT or XSDT, depending on `revision`.
    #[must_use]
    pub fn root_table_address(&self, revision: AcpiRevision) -> u64 {
        match revision {
            AcpiRevision::V1 => u64::from(self.rsdt_address),
            AcpiRevision::V2 => self.xsdt_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v2_bytes() -> [u8; 36] {
        let mut b = [0u8; 36];
        b[..8].copy_from_slice(&RSDP_SIGNATURE);
        b[9..15].copy_from_slice(b"BOCHS ");
        b[15] = 2;
        b[16..20].copy_from_slice(&0x7FE1_5000u32.to_le_bytes());
        b[20..24].copy_from_slice(&36u32.to_le_bytes());
        b[24..32].copy_from_slice(&0x7FE1_6000u64.to_le_bytes());
        b
    }

    #[test]
    fn parses_extended_fields() {
        let rsdp = Rsdp::parse(&v2_bytes()).unwrap();
        assert!(rsdp.has_valid_signature());
        assert_eq!(&rsdp.oem_id, b"BOCHS ");
        assert_eq!(rsdp.revision, 2);
        assert_eq!(rsdp.length, 36);
        assert_eq!(rsdp.root_table_address(AcpiRevision::V1), 0x7FE1_5000);
        assert_eq!(rsdp.root_table_address(AcpiRevision::V2), 0x7FE1_6000);
    }

    #[test]
    fn v1_prefix_leaves_extension_zeroed() {
        let rsdp = Rsdp::parse(&v2_bytes()[..RSDP_V1_LEN]).unwrap();
        assert_eq!(rsdp.length, 0);
        assert_eq!(rsdp.xsdt_address, 0);
        assert!(Rsdp::parse(&[0u8; 19]).is_none());
    }

    #[test]
    fn only_revisions_zero_and_two() {
        assert_eq!(AcpiRevision::from_raw(0), Some(AcpiRevision::V1));
        assert_eq!(AcpiRevision::from_raw(1), None);
        assert_eq!(AcpiRevision::from_raw(2), Some(AcpiRevision::V2));
        assert_eq!(AcpiRevision::from_raw(3), None);
        assert_eq!(AcpiRevision::V1.entry_size(), 4);
        assert_eq!(AcpiRevision::V2.entry_size(), 8);
        assert_eq!(format!("{}", AcpiRevision::V2), "2.0");
    }
}
