//! # 64-bit GDT code/data descriptor encodings
//!
//! In long mode the **base** and **limit** fields of code/data descriptors are
//! ignored for address calculation; paging provides memory protection. What
//! still matters is the type nibble, the S bit, the DPL, the present bit and
//! the L bit of the code segment.
//!
//! The bring-up GDT encodes its two kernel segments with the same flags
//! nibble (`G=1`, `L=1`, `DB=0`), which yields the well-known raw values
//! `0x00A0_9A00_0000_0000` (code) and `0x00A0_9200_0000_0000` (data). The L
//! bit carries no meaning for a data segment.

use bitfield_struct::bitfield;

/// Bit layout of a code or data segment descriptor.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct SegmentDescriptor {
    pub limit_lo: u16, // [15:0]   (ignored in long mode)
    pub base_lo: u16,  // [31:16]  (ignored in long mode)
    pub base_mid: u8,  // [39:32]
    #[bits(4)]
    pub typ: u8, // [43:40] 0b1010 exec+read, 0b0010 read/write
    pub s: bool,       // [44]     = 1 (code/data)
    #[bits(2)]
    pub dpl: u8, // [46:45]
    pub p: bool,       // [47]     = 1
    #[bits(4)]
    pub limit_hi: u8, // [51:48]
    pub avl: bool,     // [52]
    pub l: bool,       // [53]     = 1 (64-bit code)
    pub db: bool,      // [54]     = 0 when L=1
    pub g: bool,       // [55]
    pub base_hi: u8,   // [63:56]
}

/// Execute + read.
const TYPE_CODE: u8 = 0b1010;

/// Read + write.
const TYPE_DATA: u8 = 0b0010;

impl SegmentDescriptor {
    /// The mandatory all-zero descriptor at index 0.
    pub const NULL: Self = Self::new();

    /// A present, ring-0, 64-bit code segment.
    #[must_use]
    pub const fn kernel_code() -> Self {
        Self::kernel_segment(TYPE_CODE)
    }

    /// A present, ring-0, read/write data segment.
    #[must_use]
    pub const fn kernel_data() -> Self {
        Self::kernel_segment(TYPE_DATA)
    }

    const fn kernel_segment(typ: u8) -> Self {
        Self::new()
            .with_typ(typ)
            .with_s(true)
            .with_dpl(0)
            .with_p(true)
            .with_l(true)
            .with_db(false)
            .with_g(true)
    }

    /// Raw 64-bit encoding as stored in the table.
    #[inline]
    #[must_use]
    pub const fn to_u64(self) -> u64 {
        self.into_bits()
    }
}

const _: () = {
    assert!(size_of::<SegmentDescriptor>() == 8);
    assert!(SegmentDescriptor::kernel_code().to_u64() == 0x00A0_9A00_0000_0000);
    assert!(SegmentDescriptor::kernel_data().to_u64() == 0x00A0_9200_0000_0000);
};
