//! Table discovery over hand-built firmware images.

use kernel_acpi::{AcpiError, AcpiRevision, AcpiTables, PhysMapRo, Signature};
use kernel_memory_addresses::PhysicalAddress;

const IMAGE_LEN: usize = 0x1000;
const RSDT_AT: usize = 0x100;
const FACP_AT: usize = 0x400;
const APIC_AT: usize = 0x500;
const HPET_AT: usize = 0x600;
const SECOND_APIC_AT: usize = 0x700;

/// Physical memory `0..IMAGE_LEN` as a byte buffer.
struct Image(Vec<u8>);

impl PhysMapRo for Image {
    unsafe fn map_ro<'a>(&self, paddr: u64, len: usize) -> &'a [u8] {
        let start = usize::try_from(paddr).unwrap();
        assert!(start + len <= self.0.len(), "read past {paddr:#x}+{len}");
        unsafe { core::slice::from_raw_parts(self.0.as_ptr().add(start), len) }
    }
}

impl Image {
    fn new() -> Self {
        Self(vec![0; IMAGE_LEN])
    }

    /// Set `self.0[at]` so that `range` sums to zero.
    fn seal(&mut self, range: core::ops::Range<usize>, at: usize) {
        self.0[at] = 0;
        let sum = self.0[range].iter().fold(0u8, |a, &b| a.wrapping_add(b));
        self.0[at] = 0u8.wrapping_sub(sum);
    }

    fn put(&mut self, at: usize, bytes: &[u8]) {
        self.0[at..at + bytes.len()].copy_from_slice(bytes);
    }

    fn table(&mut self, at: usize, signature: &[u8; 4], length: u32) {
        self.put(at, signature);
        self.put(at + 4, &length.to_le_bytes());
        self.put(at + 10, b"BOCHS ");
        self.seal(at..at + length as usize, at + 9);
    }

    fn rsdp_v1(&mut self, at: usize, rsdt: u32) {
        self.put(at, b"RSD PTR ");
        self.put(at + 9, b"BOCHS ");
        self.0[at + 15] = 0;
        self.put(at + 16, &rsdt.to_le_bytes());
        self.seal(at..at + 20, at + 8);
    }

    fn rsdp_v2(&mut self, at: usize, xsdt: u64) {
        self.put(at, b"RSD PTR ");
        self.0[at + 15] = 2;
        self.put(at + 20, &36u32.to_le_bytes());
        self.put(at + 24, &xsdt.to_le_bytes());
        self.seal(at..at + 20, at + 8);
        self.seal(at..at + 36, at + 32);
    }

    fn rsdt(&mut self, at: usize, entries: &[usize]) {
        for (i, &e) in entries.iter().enumerate() {
            let e = u32::try_from(e).unwrap();
            self.put(at + 36 + i * 4, &e.to_le_bytes());
        }
        self.table(at, b"RSDT", u32::try_from(36 + entries.len() * 4).unwrap());
    }

    fn xsdt(&mut self, at: usize, entries: &[usize]) {
        for (i, &e) in entries.iter().enumerate() {
            self.put(at + 36 + i * 8, &(e as u64).to_le_bytes());
        }
        self.table(at, b"XSDT", u32::try_from(36 + entries.len() * 8).unwrap());
    }

    fn description_tables(&mut self) {
        self.table(FACP_AT, b"FACP", 36);
        self.table(APIC_AT, b"APIC", 44);
        self.table(HPET_AT, b"HPET", 56);
    }
}

fn pa(at: usize) -> PhysicalAddress {
    PhysicalAddress::new(at as u64)
}

#[test]
fn revision0_rsdt_with_three_entries() {
    let mut img = Image::new();
    img.description_tables();
    img.rsdt(RSDT_AT, &[FACP_AT, APIC_AT, HPET_AT]);
    // Only the first 20 bytes of a revision 0 RSDP may be touched.
    let rsdp_at = IMAGE_LEN - 20;
    img.rsdp_v1(rsdp_at, u32::try_from(RSDT_AT).unwrap());

    let tables = unsafe { AcpiTables::from_rsdp(&img, pa(rsdp_at)) }.unwrap();
    assert_eq!(tables.revision(), AcpiRevision::V1);
    assert_eq!(tables.root_table_address(), pa(RSDT_AT));
    assert_eq!(tables.root_header().signature, Signature::RSDT);

    let validation = tables.validate();
    assert!(validation.is_valid());
    assert_eq!(validation.revision, AcpiRevision::V1);

    assert_eq!(tables.table_count(), 3);
    assert_eq!(tables.table_address(1), Some(pa(APIC_AT)));
    assert_eq!(tables.table_address(3), None);
    assert_eq!(tables.find_table(Signature::APIC), Some(pa(APIC_AT)));
    assert_eq!(tables.find_table(Signature::MCFG), None);
    assert_eq!(
        tables.table_addresses().collect::<Vec<_>>(),
        vec![pa(FACP_AT), pa(APIC_AT), pa(HPET_AT)]
    );
}

#[test]
fn revision2_xsdt_uses_wide_entries() {
    let mut img = Image::new();
    img.description_tables();
    img.xsdt(RSDT_AT, &[HPET_AT, FACP_AT]);
    img.rsdp_v2(0x40, RSDT_AT as u64);

    let tables = unsafe { AcpiTables::from_rsdp(&img, pa(0x40)) }.unwrap();
    assert_eq!(tables.revision(), AcpiRevision::V2);
    assert_eq!(tables.rsdp().xsdt_address, RSDT_AT as u64);

    let validation = tables.validate();
    assert!(validation.rsdp_checksum_ok);
    assert!(validation.root_checksum_ok);

    assert_eq!(tables.table_count(), 2);
    assert_eq!(tables.find_table(Signature::FACP), Some(pa(FACP_AT)));
    assert_eq!(tables.find_table(Signature::APIC), None);

    let hpet = unsafe { tables.header_at(pa(HPET_AT)) };
    assert_eq!(hpet.signature, Signature::HPET);
    assert_eq!(hpet.length, 56);
}

#[test]
fn first_matching_signature_wins() {
    let mut img = Image::new();
    img.description_tables();
    img.table(SECOND_APIC_AT, b"APIC", 36);
    img.rsdt(RSDT_AT, &[FACP_AT, SECOND_APIC_AT, APIC_AT]);
    img.rsdp_v1(0, u32::try_from(RSDT_AT).unwrap());

    let tables = unsafe { AcpiTables::from_rsdp(&img, pa(0)) };
    // Address zero is the null pointer; discovery refuses it outright.
    assert!(matches!(tables, Err(AcpiError::NullRsdp)));

    img.rsdp_v1(0x20, u32::try_from(RSDT_AT).unwrap());
    let tables = unsafe { AcpiTables::from_rsdp(&img, pa(0x20)) }.unwrap();
    assert_eq!(tables.find_table(Signature::APIC), Some(pa(SECOND_APIC_AT)));
}

#[test]
fn checksum_failures_are_soft() {
    let mut img = Image::new();
    img.description_tables();
    img.rsdt(RSDT_AT, &[FACP_AT, APIC_AT]);
    img.rsdp_v1(0x20, u32::try_from(RSDT_AT).unwrap());

    // Flip a byte inside the RSDT payload.
    img.0[RSDT_AT + 36] ^= 0x01;

    let tables = unsafe { AcpiTables::from_rsdp(&img, pa(0x20)) }.unwrap();
    let validation = tables.validate();
    assert!(validation.rsdp_checksum_ok);
    assert!(!validation.root_checksum_ok);
    assert!(!validation.is_valid());

    // Discovery still proceeds on the (now corrupted) entries.
    assert_eq!(tables.table_count(), 2);
}

#[test]
fn corrupt_rsdp_checksum_is_reported() {
    let mut img = Image::new();
    img.rsdt(RSDT_AT, &[]);
    img.rsdp_v2(0x40, RSDT_AT as u64);
    // Reserved byte: only the extended checksum covers it.
    img.0[0x40 + 33] ^= 0x80;

    let tables = unsafe { AcpiTables::from_rsdp(&img, pa(0x40)) }.unwrap();
    let validation = tables.validate();
    assert!(!validation.rsdp_checksum_ok);
    assert!(validation.root_checksum_ok);
    assert_eq!(tables.table_count(), 0);
}

#[test]
fn unsupported_revisions_stop_discovery() {
    for revision in [1u8, 3, 0xFF] {
        let mut img = Image::new();
        img.rsdt(RSDT_AT, &[FACP_AT]);
        img.rsdp_v1(0x20, u32::try_from(RSDT_AT).unwrap());
        img.0[0x20 + 15] = revision;

        let result = unsafe { AcpiTables::from_rsdp(&img, pa(0x20)) };
        assert!(matches!(result, Err(AcpiError::InvalidRevision(r)) if r == revision));
    }
}

#[test]
fn bogus_short_root_length_yields_no_entries() {
    let mut img = Image::new();
    img.table(RSDT_AT, b"RSDT", 20);
    img.rsdp_v1(0x20, u32::try_from(RSDT_AT).unwrap());

    let tables = unsafe { AcpiTables::from_rsdp(&img, pa(0x20)) }.unwrap();
    assert_eq!(tables.table_count(), 0);
    assert_eq!(tables.table_address(0), None);
    assert_eq!(tables.find_table(Signature::FACP), None);
}

#[test]
fn missing_signature_is_tolerated() {
    let mut img = Image::new();
    img.rsdt(RSDT_AT, &[FACP_AT]);
    img.description_tables();
    img.rsdp_v1(0x20, u32::try_from(RSDT_AT).unwrap());
    img.put(0x20, b"NOT PTR ");

    let tables = unsafe { AcpiTables::from_rsdp(&img, pa(0x20)) }.unwrap();
    assert!(!tables.rsdp().has_valid_signature());
    assert!(!tables.validate().rsdp_checksum_ok);
    assert_eq!(tables.find_table(Signature::FACP), Some(pa(FACP_AT)));
}
