//! # Segment selectors
//!
//! Segment selectors are 16-bit values loaded into CS/DS/ES/FS/GS/SS. Even in
//! long mode they carry an **RPL** and choose **GDT vs LDT**; their **index**
//! selects a GDT entry:
//!
//! ```text
//!  15            3 2  1  0
//! +----------------+--+----+
//! |   Index[12:0]  |TI| RPL|
//! +----------------+--+----+  (TI=0 → GDT, TI=1 → LDT; RPL=0..3)
//! ```

use bitfield_struct::bitfield;

/// Raw 16-bit selector encoding (index/TI/RPL).
#[bitfield(u16)]
#[derive(PartialEq, Eq)]
pub struct SegmentSelector {
    /// Requested Privilege Level (bits 0..1).
    #[bits(2)]
    pub rpl: u8,
    /// Table Indicator (bit 2): 0 = GDT, 1 = LDT.
    pub ldt: bool,
    /// Descriptor index (bits 3..15).
    #[bits(13)]
    pub index: u16,
}

impl SegmentSelector {
    /// A ring-0 selector for GDT entry `index`.
    #[must_use]
    pub const fn kernel(index: u16) -> Self {
        Self::new().with_index(index).with_ldt(false).with_rpl(0)
    }

    /// The selector as loaded into a segment register.
    #[inline]
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        self.into_bits()
    }
}
