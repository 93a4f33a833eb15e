//! # Memory Layout

use log::LevelFilter;

pub use kernel_memory_addresses::{PAGE_SHIFT, PAGE_SIZE};

/// One gibibyte.
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Amount of low physical memory identity-mapped by the bring-up page map.
///
/// The firmware hands over control with code, stack, ACPI tables and the
/// memory map itself living below this boundary, so switching CR3 to a map
/// that covers it keeps every live pointer valid.
pub const IDENTITY_MAP_BYTES: u64 = 4 * GIB;

/// Level filter installed for the diagnostic logger.
#[cfg(debug_assertions)]
pub const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

/// Level filter installed for the diagnostic logger.
#[cfg(not(debug_assertions))]
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

const _: () = {
    assert!(IDENTITY_MAP_BYTES.is_multiple_of(PAGE_SIZE));
    assert!(IDENTITY_MAP_BYTES <= 512 * GIB, "must fit a single PML4 slot");
};
