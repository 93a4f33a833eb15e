//! # Global Descriptor Table (GDT) for long mode
//!
//! In 64-bit mode classic segmentation is largely disabled, but the CPU still
//! needs a code segment with `L=1` in CS and valid data selectors in the other
//! segment registers. Interrupt gates name the code segment explicitly, so
//! the IDT depends on this layout too.
//!
//! ## Layout
//! Index | Selector | Meaning
//! ------|----------|--------
//! 0     | 0x00     | Null
//! 1     | 0x08     | Kernel code (64-bit, DPL=0; [`KERNEL_CS`])
//! 2     | 0x10     | Kernel data (DPL=0; [`KERNEL_DS`])
//!
//! There are no user segments and no TSS: the core never leaves ring 0 and
//! installs no IST stacks.

pub mod descriptors;
pub mod selectors;

use crate::gdt::descriptors::SegmentDescriptor;
use crate::gdt::selectors::SegmentSelector;
use kernel_registers::descriptor_table::DescriptorTablePointer;

pub const KERNEL_CS_SEL: SegmentSelector = SegmentSelector::kernel(1);
pub const KERNEL_DS_SEL: SegmentSelector = SegmentSelector::kernel(2);

/// Encoded kernel code selector.
pub const KERNEL_CS: u16 = KERNEL_CS_SEL.to_u16();

/// Encoded kernel data selector.
pub const KERNEL_DS: u16 = KERNEL_DS_SEL.to_u16();

const _: () = {
    assert!(KERNEL_CS == 0x08);
    assert!(KERNEL_DS == 0x10);
};

/// The bring-up GDT: null, kernel code, kernel data.
#[repr(C, align(16))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gdt {
    entries: [SegmentDescriptor; 3],
}

const _: () = assert!(size_of::<[SegmentDescriptor; 3]>() == 24);

impl Default for Gdt {
    fn default() -> Self {
        Self::new()
    }
}

impl Gdt {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [
                SegmentDescriptor::NULL,
                SegmentDescriptor::kernel_code(),
                SegmentDescriptor::kernel_data(),
            ],
        }
    }

    #[must_use]
    pub const fn entries(&self) -> &[SegmentDescriptor; 3] {
        &self.entries
    }

    /// The `lgdt` operand covering exactly the three descriptors.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn pointer(&self) -> DescriptorTablePointer {
        let limit = (size_of::<[SegmentDescriptor; 3]>() - 1) as u16;
        DescriptorTablePointer::new(limit, self.entries.as_ptr() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_descriptor_values() {
        let raw = Gdt::new().entries().map(SegmentDescriptor::to_u64);
        assert_eq!(raw, [0, 0x00A0_9A00_0000_0000, 0x00A0_9200_0000_0000]);
    }

    #[test]
    fn selectors_index_the_table() {
        assert_eq!(KERNEL_CS_SEL.index(), 1);
        assert_eq!(KERNEL_DS_SEL.index(), 2);
        assert_eq!(KERNEL_CS_SEL.rpl(), 0);
        assert!(!KERNEL_DS_SEL.ldt());
    }

    #[test]
    fn pointer_covers_three_entries() {
        let gdt = Gdt::new();
        let ptr = gdt.pointer();
        assert_eq!(ptr.limit(), 23);
        assert_eq!(ptr.base(), core::ptr::from_ref(&gdt) as u64);
    }
}
