//! # Kernel Configuration and Boot Interface
//!
//! Shared definitions for the firmware boot shim and the kernel core: the
//! physical memory map the shim hands over, the translation from UEFI memory
//! types into the kernel's coarse region kinds, and the compile-time constants
//! that shape bring-up.
//!
//! ## Modules
//!
//! ### Memory Map ([`memory_map`])
//! * **[`MemoryRegionKind`](memory_map::MemoryRegionKind)**: `Unknown`, `BootCode`, `BootData`, `Usable`
//! * **[`MemoryRegion`](memory_map::MemoryRegion)**: kind, page-aligned base, page count
//! * **[`MemoryMap`](memory_map::MemoryMap)**: an ordered, borrowed slice of regions
//!
//! The map is built once by the boot shim (after `ExitBootServices`, in a buffer
//! allocated beforehand) and from then on exclusively owned by the frame
//! allocator, which shrinks regions from the front as it hands out frames.
//!
//! ### Boot Handoff ([`boot`])
//! * **[`KernelBootInfo`](boot::KernelBootInfo)**: memory map plus optional RSDP address
//! * **[`select_rsdp`](boot::select_rsdp)**: ACPI 2.0 pointer wins over ACPI 1.0
//!
//! ### Constants ([`memory`])
//! Page size, the size of the identity map built during bring-up and the
//! default log level.
//!
//! ## UEFI type translation
//!
//! ```text
//! LoaderCode, BootServicesCode                         → BootCode
//! LoaderData, BootServicesData                         → BootData
//! RuntimeServicesCode, RuntimeServicesData, Conventional → Usable
//! everything else                                      → Unknown
//! ```
//!
//! `Unknown` regions are never allocated from.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod memory;
pub mod memory_map;
