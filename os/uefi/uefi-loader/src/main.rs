//! # UEFI Boot Shim for the Kernel Core
//!
//! A UEFI application that collects what the kernel core needs from the
//! firmware and hands over control:
//!
//! ```text
//! UEFI Firmware
//!     ↓
//! 1. helpers::init, kernel logger (debugcon or COM1)
//! 2. RSDP from the configuration table (ACPI 2.0 preferred)
//! 3. descriptor-table storage
//! 4. memory-map buffer, ExitBootServices, translation
//!     ↓
//! kernel::kernel_main (never returns)
//! ```
//!
//! The core runs in the loader's own image: there is no separate kernel ELF,
//! no higher-half mapping and no CR3 switch before the handoff. The firmware's
//! identity map stays live until the core activates its own.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
#![allow(unsafe_code)]
extern crate alloc;

mod rsdp;
mod uefi_mmap;

use crate::rsdp::find_rsdp;
use crate::uefi_mmap::exit_boot_services;
use alloc::boxed::Box;
use kernel::init::CpuTables;
use kernel_info::boot::KernelBootInfo;
use log::{error, info};
use uefi::prelude::*;

#[entry]
fn efi_main() -> Status {
    if uefi::helpers::init().is_err() {
        return Status::UNSUPPORTED;
    }

    if kernel::diagnostics::init().is_err() {
        return Status::ABORTED;
    }
    info!("UEFI loader started");

    let rsdp = find_rsdp();
    match rsdp {
        Some(address) => info!("ACPI RSDP at {address}"),
        None => error!("No ACPI RSDP in the UEFI configuration table"),
    }

    let tables: &'static mut CpuTables = Box::leak(Box::new(CpuTables::new()));

    let memory_map = match exit_boot_services() {
        Ok(map) => map,
        Err(status) => return status,
    };

    kernel::kernel_main(KernelBootInfo { memory_map, rsdp }, tables)
}
