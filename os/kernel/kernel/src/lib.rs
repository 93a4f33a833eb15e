//! # Kernel Core
//!
//! The earliest-running part of the kernel. The UEFI loader calls
//! [`kernel_main`] right after `ExitBootServices` with the translated memory
//! map, the ACPI RSDP address and storage for the descriptor tables.
//!
//! ## Modules
//! * [`gdt`]: the three-entry long-mode GDT and its selectors.
//! * [`idt`]: the 256-entry IDT and its gate encoding.
//! * [`interrupts`]: exception trampolines, the saved frame and the fault
//!   dispatcher.
//! * [`init`]: the bring-up sequence (interrupts, ACPI, paging, CR3).
//! * [`config`]: bring-up knobs.
//! * [`memory`]: identity access to physical memory.
//! * [`diagnostics`]: the global logger.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod config;
pub mod diagnostics;
pub mod gdt;
pub mod idt;
pub mod init;
pub mod interrupts;
pub mod memory;

use crate::config::BootConfig;
use crate::init::{CpuTables, bring_up};
use crate::memory::IdentityMapper;
use kernel_info::boot::KernelBootInfo;
use kernel_registers::backend::X86_64;
use log::{error, info};

/// Bring the machine up and idle.
///
/// A failed bring-up is logged; either way the processor halts in a loop,
/// waking only to service exceptions.
pub fn kernel_main(boot: KernelBootInfo<'static>, tables: &'static mut CpuTables) -> ! {
    let mut backend = X86_64::new();

    // SAFETY: called once on the bootstrap processor at CPL0, right after
    // the firmware handed over an identity-mapped machine.
    let result = unsafe { bring_up(&mut backend, &IdentityMapper, boot, tables, &BootConfig::DEFAULT) };

    match result {
        Ok(report) => info!(
            "Kernel core up: {} pages identity mapped, {} usable pages left",
            report.identity_mapped_pages, report.usable_pages_left
        ),
        Err(err) => error!("Boot failed: {err}"),
    }

    loop {
        backend.halt();
    }
}
