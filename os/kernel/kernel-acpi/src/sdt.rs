//! System Description Table header and signatures.

use core::fmt;

/// Size of the common description header in bytes.
pub const SDT_HEADER_LEN: usize = 36;

/// Four ASCII characters identifying a description table.
///
/// Stored the way firmware lays it out in memory: the first character in the
/// lowest byte of a little-endian `u32`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Signature(u32);

impl Signature {
    /// Multiple APIC Description Table (MADT).
    pub const APIC: Self = Self::from_bytes(*b"APIC");
    /// Fixed ACPI Description Table (FADT).
    pub const FACP: Self = Self::from_bytes(*b"FACP");
    /// High Precision Event Timer table.
    pub const HPET: Self = Self::from_bytes(*b"HPET");
    /// PCI Express memory-mapped configuration space table.
    pub const MCFG: Self = Self::from_bytes(*b"MCFG");
    /// Root System Description Table.
    pub const RSDT: Self = Self::from_bytes(*b"RSDT");
    /// Extended System Description Table.
    pub const XSDT: Self = Self::from_bytes(*b"XSDT");

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    #[must_use]
    pub const fn from_u32(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            let c = if b.is_ascii_graphic() || b == b' ' {
                char::from(b)
            } else {
                '?'
            };
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(\"{self}\")")
    }
}

/// The 36-byte header shared by every description table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SdtHeader {
    pub signature: Signature,
    /// Size of the whole table including this header.
    pub length: u32,
    pub revision: u8,
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub oem_table_id: [u8; 8],
    pub oem_revision: u32,
    pub creator_id: u32,
    pub creator_revision: u32,
}

impl SdtHeader {
    /// Decode a header from the first [`SDT_HEADER_LEN`] bytes of `bytes`.
    ///
    /// Returns `None` if `bytes` is too short.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; SDT_HEADER_LEN] = bytes.get(..SDT_HEADER_LEN)?.try_into().ok()?;
        Some(Self {
            signature: Signature::from_u32(le_u32(bytes, 0)),
            length: le_u32(bytes, 4),
            revision: bytes[8],
            checksum: bytes[9],
            oem_id: array(bytes, 10),
            oem_table_id: array(bytes, 16),
            oem_revision: le_u32(bytes, 24),
            creator_id: le_u32(bytes, 28),
            creator_revision: le_u32(bytes, 32),
        })
    }

    /// Number of bytes following the header, saturating at zero for a bogus
    /// short length.
    #[must_use]
    pub const fn payload_len(&self) -> usize {
        (self.length as usize).saturating_sub(SDT_HEADER_LEN)
    }
}

pub(crate) fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(array(bytes, at))
}

pub(crate) fn le_u64(bytes: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(array(bytes, at))
}

/// Copy `N` bytes starting at `at`. Callers guarantee the range is in bounds.
pub(crate) fn array<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[at..at + N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_little_endian_ascii() {
        assert_eq!(Signature::APIC.as_u32(), 0x4349_5041);
        assert_eq!(Signature::FACP.to_bytes(), *b"FACP");
        assert_eq!(format!("{}", Signature::HPET), "HPET");
        assert_eq!(format!("{:?}", Signature::MCFG), "Signature(\"MCFG\")");
        assert_eq!(format!("{}", Signature::from_bytes([b'A', 0, 0xFF, b'Z'])), "A??Z");
    }

    #[test]
    fn header_fields_decode() {
        let mut raw = [0u8; 40];
        raw[0..4].copy_from_slice(b"XSDT");
        raw[4..8].copy_from_slice(&52u32.to_le_bytes());
        raw[8] = 1;
        raw[9] = 0xAB;
        raw[10..16].copy_from_slice(b"BOCHS ");
        raw[16..24].copy_from_slice(b"BXPC    ");
        raw[24..28].copy_from_slice(&7u32.to_le_bytes());
        raw[28..32].copy_from_slice(b"BXPC");
        raw[32..36].copy_from_slice(&1u32.to_le_bytes());

        let h = SdtHeader::parse(&raw).unwrap();
        assert_eq!(h.signature, Signature::XSDT);
        assert_eq!(h.length, 52);
        assert_eq!(h.revision, 1);
        assert_eq!(h.checksum, 0xAB);
        assert_eq!(&h.oem_id, b"BOCHS ");
        assert_eq!(&h.oem_table_id, b"BXPC    ");
        assert_eq!(h.oem_revision, 7);
        assert_eq!(h.creator_id, u32::from_le_bytes(*b"BXPC"));
        assert_eq!(h.creator_revision, 1);
        assert_eq!(h.payload_len(), 16);
    }

    #[test]
    fn short_input_and_short_length() {
        assert!(SdtHeader::parse(&[0u8; 35]).is_none());

        let mut raw = [0u8; 36];
        raw[4..8].copy_from_slice(&10u32.to_le_bytes());
        assert_eq!(SdtHeader::parse(&raw).unwrap().payload_len(), 0);
    }
}
