//! # Kernel Physical Memory Allocation
//!
//! Physical frame accounting for early bring-up. After the firmware handoff
//! the kernel owns a [`MemoryMap`](kernel_info::memory_map::MemoryMap) and
//! nothing else; [`BootFrameAllocator`](frame_alloc::BootFrameAllocator) takes
//! ownership of it and hands out single 4 KiB frames by region kind.
//!
//! ```text
//! ┌──────────────── MemoryMap ────────────────┐
//! │ BootCode │ Usable ▓▓▓░░░░ │ BootData │ …  │   ▓ reserved, ░ free
//! └───────────────────────────────────────────┘
//!              ▲
//!              └─ base moves up one page per reservation
//! ```
//!
//! The allocator also implements [`kernel_vmem::FrameAlloc`], which is how
//! the page-table manager obtains frames for new tables.
//!
//! ## Usage
//!
//! ```rust
//! use kernel_alloc::frame_alloc::BootFrameAllocator;
//! use kernel_info::memory_map::{MemoryMap, MemoryRegion, MemoryRegionKind};
//! use kernel_memory_addresses::PhysicalAddress;
//!
//! let mut regions = [MemoryRegion::new(
//!     MemoryRegionKind::Usable,
//!     PhysicalAddress::new(0x10_0000),
//!     2,
//! )];
//! let mut alloc = BootFrameAllocator::new(MemoryMap::new(&mut regions));
//! let frame = alloc.reserve_page(MemoryRegionKind::Usable).unwrap();
//! assert_eq!(frame.base().as_u64(), 0x10_0000);
//! assert_eq!(alloc.remaining_pages(MemoryRegionKind::Usable), 1);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod frame_alloc;

pub use frame_alloc::{BootFrameAllocator, FrameAllocError, PhysicalFrame};
