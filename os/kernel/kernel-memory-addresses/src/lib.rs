//! # Physical and Virtual Address Types
//!
//! Strongly typed wrappers for the raw 64-bit addresses handled during early
//! bring-up. The frame allocator hands out [`PhysicalAddress`] values, the
//! page-table manager decomposes [`VirtualAddress`] values into table indices,
//! and neither can be passed where the other is expected.
//!
//! Both types are `#[repr(transparent)]` over `u64`, `Copy`, ordered and
//! hashable, and every helper is a `const fn`.
//!
//! ## Page granularity
//!
//! Bring-up only deals in 4 KiB pages. [`PAGE_SIZE`] and [`PAGE_SHIFT`] are the
//! single source for that granularity; alignment helpers on both address types
//! are expressed in terms of them.
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let pa = PhysicalAddress::new(0x0010_2042);
//! assert!(!pa.is_page_aligned());
//! assert_eq!(pa.align_down().as_u64(), 0x0010_2000);
//! assert_eq!(pa.page_offset(), 0x42);
//!
//! let va = VirtualAddress::new(0x0000_0000_4020_1000);
//! assert_eq!(va.table_index(12), 1);
//! assert_eq!(va.table_index(21), 1);
//! assert_eq!(va.table_index(30), 1);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod physical_address;
mod virtual_address;

pub use physical_address::PhysicalAddress;
pub use virtual_address::VirtualAddress;

/// Size of a base page (and of every page-table frame) in bytes.
pub const PAGE_SIZE: u64 = 4096;

/// `log2(PAGE_SIZE)`.
pub const PAGE_SHIFT: u32 = 12;

const _: () = assert!(1 << PAGE_SHIFT == PAGE_SIZE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_helpers() {
        let pa = PhysicalAddress::new(0x12345);
        assert_eq!(pa.align_down().as_u64(), 0x12000);
        assert_eq!(pa.page_offset(), 0x345);
        assert!(PhysicalAddress::new(0x12000).is_page_aligned());
    }

    #[test]
    fn physical_add_moves_by_bytes() {
        let mut pa = PhysicalAddress::new(0x1000);
        pa += PAGE_SIZE;
        assert_eq!(pa, PhysicalAddress::new(0x2000));
        assert_eq!((pa + 0x10).as_u64(), 0x2010);
        assert_eq!(PhysicalAddress::new(u64::MAX).checked_add(1), None);
    }

    #[test]
    fn virtual_table_indices() {
        // L4 = 1, L3 = 2, L2 = 3, L1 = 4, offset = 5
        let va = VirtualAddress::new((1 << 39) | (2 << 30) | (3 << 21) | (4 << 12) | 5);
        assert_eq!(va.table_index(39), 1);
        assert_eq!(va.table_index(30), 2);
        assert_eq!(va.table_index(21), 3);
        assert_eq!(va.table_index(12), 4);
        assert_eq!(va.page_offset(), 5);
        assert_eq!(va.table_index(48), 0);
    }

    #[test]
    fn high_bits_show_up_in_level5_index() {
        let va = VirtualAddress::new(1 << 48);
        assert_eq!(va.table_index(48), 1);

        let kernel_half = VirtualAddress::new(0xFFFF_8000_0000_0000);
        assert_eq!(kernel_half.table_index(48), 0x1FF);
    }

    #[test]
    fn display_and_debug() {
        let pa = PhysicalAddress::new(0xABC000);
        assert_eq!(format!("{pa}"), "0x0000000000ABC000");
        assert_eq!(format!("{pa:?}"), "PA(0x0000000000ABC000)");
        let va = VirtualAddress::new(0x1000);
        assert_eq!(format!("{va:?}"), "VA(0x0000000000001000)");
    }
}
