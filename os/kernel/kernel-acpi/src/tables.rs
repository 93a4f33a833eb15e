//! # Root Table Locator
//!
//! [`AcpiTables`] ties an RSDP to its root table (RSDT or XSDT) and answers
//! questions about the entry array that follows the root table's header.

use crate::rsdp::{AcpiRevision, RSDP_V1_LEN, RSDP_V2_LEN, Rsdp};
use crate::sdt::{SDT_HEADER_LEN, SdtHeader, Signature, le_u32, le_u64};
use crate::{PhysMapRo, is_checksum_valid};
use kernel_memory_addresses::PhysicalAddress;
use log::{error, info, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcpiError {
    /// The firmware did not publish an RSDP.
    #[error("ACPI RSDP pointer is null")]
    NullRsdp,
    /// Only revisions 0 and 2 are understood.
    #[error("Invalid revision ({0}) in ACPI RSDP")]
    InvalidRevision(u8),
}

/// Outcome of [`AcpiTables::validate`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Validation {
    pub revision: AcpiRevision,
    pub rsdp_checksum_ok: bool,
    pub root_checksum_ok: bool,
}

impl Validation {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.rsdp_checksum_ok && self.root_checksum_ok
    }
}

/// Validated view of the firmware's root description tables.
pub struct AcpiTables<'m, M: PhysMapRo> {
    mapper: &'m M,
    rsdp_address: PhysicalAddress,
    rsdp: Rsdp,
    revision: AcpiRevision,
    root: PhysicalAddress,
    root_header: SdtHeader,
}

impl<'m, M: PhysMapRo> AcpiTables<'m, M> {
    /// Read the RSDP at `rsdp_address` and the header of the root table it
    /// points to.
    ///
    /// A missing `"RSD PTR "` signature is reported but not fatal.
    ///
    /// # Errors
    /// - [`AcpiError::NullRsdp`] for a zero address.
    /// - [`AcpiError::InvalidRevision`] for any revision other than 0 or 2.
    ///
    /// # Safety
    /// `rsdp_address`, the root table it names, and every entry of that table
    /// must be readable through `mapper`. Firmware-provided pointers are
    /// followed without further checks.
    pub unsafe fn from_rsdp(
        mapper: &'m M,
        rsdp_address: PhysicalAddress,
    ) -> Result<Self, AcpiError> {
        if rsdp_address.is_null() {
            return Err(AcpiError::NullRsdp);
        }

        let head = unsafe { mapper.map_ro(rsdp_address.as_u64(), RSDP_V1_LEN) };
        let Some(mut rsdp) = Rsdp::parse(head) else {
            return Err(AcpiError::NullRsdp);
        };
        if !rsdp.has_valid_signature() {
            warn!("ACPI RSDP at {rsdp_address} lacks the \"RSD PTR \" signature");
        }

        let revision =
            AcpiRevision::from_raw(rsdp.revision).ok_or(AcpiError::InvalidRevision(rsdp.revision))?;

        if revision == AcpiRevision::V2 {
            let full = unsafe { mapper.map_ro(rsdp_address.as_u64(), RSDP_V2_LEN) };
            rsdp = Rsdp::parse(full).unwrap_or(rsdp);
        }

        let root = PhysicalAddress::new(rsdp.root_table_address(revision));
        let root_header = unsafe { read_header(mapper, root) };

        Ok(Self {
            mapper,
            rsdp_address,
            rsdp,
            revision,
            root,
            root_header,
        })
    }

    /// Verify the RSDP and root-table checksums.
    ///
    /// Logs the ACPI version and one error line per failed checksum; the
    /// tables remain usable either way.
    pub fn validate(&self) -> Validation {
        info!("ACPI Version: {}", self.revision);

        let rsdp_bytes = unsafe {
            self.mapper
                .map_ro(self.rsdp_address.as_u64(), self.revision.rsdp_len())
        };
        let rsdp_checksum_ok = is_checksum_valid(rsdp_bytes);
        if !rsdp_checksum_ok {
            error!("Checksum for ACPI RSDP failed.");
        }

        let root_bytes = unsafe {
            self.mapper
                .map_ro(self.root.as_u64(), self.root_header.length as usize)
        };
        let root_checksum_ok = is_checksum_valid(root_bytes);
        if !root_checksum_ok {
            error!(
                "Checksum for ACPI {} failed.",
                self.revision.root_table_name()
            );
        }

        Validation {
            revision: self.revision,
            rsdp_checksum_ok,
            root_checksum_ok,
        }
    }

    #[must_use]
    pub const fn revision(&self) -> AcpiRevision {
        self.revision
    }

    #[must_use]
    pub const fn rsdp(&self) -> &Rsdp {
        &self.rsdp
    }

    /// Physical address of the RSDT or XSDT.
    #[must_use]
    pub const fn root_table_address(&self) -> PhysicalAddress {
        self.root
    }

    #[must_use]
    pub const fn root_header(&self) -> &SdtHeader {
        &self.root_header
    }

    /// Number of entries in the root table.
    #[must_use]
    pub const fn table_count(&self) -> usize {
        self.root_header.payload_len() / self.revision.entry_size()
    }

    /// Physical address stored in root-table entry `index`.
    #[must_use]
    pub fn table_address(&self, index: usize) -> Option<PhysicalAddress> {
        if index >= self.table_count() {
            return None;
        }

        let size = self.revision.entry_size();
        let at = self.root.as_u64() + (SDT_HEADER_LEN + index * size) as u64;
        let bytes = unsafe { self.mapper.map_ro(at, size) };
        let raw = match self.revision {
            AcpiRevision::V1 => u64::from(le_u32(bytes, 0)),
            AcpiRevision::V2 => le_u64(bytes, 0),
        };
        Some(PhysicalAddress::new(raw))
    }

    /// Every root-table entry in order.
    pub fn table_addresses(&self) -> impl Iterator<Item = PhysicalAddress> + '_ {
        (0..self.table_count()).filter_map(|i| self.table_address(i))
    }

    /// Address of the first table whose header carries `signature`.
    #[must_use]
    pub fn find_table(&self, signature: Signature) -> Option<PhysicalAddress> {
        self.table_addresses()
            .find(|&pa| unsafe { read_header(self.mapper, pa) }.signature == signature)
    }

    /// Read the description header at `pa`.
    ///
    /// # Safety
    /// `pa` must be readable through the mapper for at least 36 bytes.
    #[must_use]
    pub unsafe fn header_at(&self, pa: PhysicalAddress) -> SdtHeader {
        unsafe { read_header(self.mapper, pa) }
    }
}

/// # Safety
/// `pa` must be readable for [`SDT_HEADER_LEN`] bytes.
unsafe fn read_header<M: PhysMapRo>(mapper: &M, pa: PhysicalAddress) -> SdtHeader {
    let bytes = unsafe { mapper.map_ro(pa.as_u64(), SDT_HEADER_LEN) };
    // A mapper honouring its contract always yields the full header.
    SdtHeader::parse(bytes).unwrap_or_default()
}
