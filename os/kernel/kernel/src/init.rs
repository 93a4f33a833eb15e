//! # Kernel Bring-up
//!
//! Turns the firmware's execution environment into the kernel's, strictly in
//! this order:
//!
//! 1. **Interrupts**: mask, install the GDT and reload the segment registers,
//!    install the IDT with the 32 exception trampolines, unmask.
//! 2. **ACPI**: validate the RSDP and its root table, look up the configured
//!    tables. Every problem here is reported and skipped.
//! 3. **Paging**: build a fresh PML4 from usable frames and identity-map the
//!    low physical range.
//! 4. **Activation**: load the new root into CR3.
//!
//! All state lives in explicit context objects; nothing here touches a
//! global besides the logger.

use crate::config::BootConfig;
use crate::gdt::{Gdt, KERNEL_CS, KERNEL_DS};
use crate::idt::Idt;
use crate::interrupts::exception_handlers;
use kernel_acpi::{AcpiRevision, AcpiTables, PhysMapRo, Signature};
use kernel_alloc::BootFrameAllocator;
use kernel_info::boot::KernelBootInfo;
use kernel_info::memory_map::MemoryRegionKind;
use kernel_memory_addresses::PhysicalAddress;
use kernel_registers::backend::CpuBackend;
use kernel_vmem::{AddressSpace, MapError, PhysMapper};
use log::{debug, error, info};

/// Storage for the descriptor tables. Must outlive their installation, hence
/// the `'static` borrows below.
pub struct CpuTables {
    gdt: Gdt,
    idt: Idt,
}

impl Default for CpuTables {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuTables {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            gdt: Gdt::new(),
            idt: Idt::new(),
        }
    }

    #[must_use]
    pub const fn gdt(&self) -> &Gdt {
        &self.gdt
    }

    #[must_use]
    pub const fn idt(&self) -> &Idt {
        &self.idt
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BootError {
    #[error(transparent)]
    Paging(#[from] MapError),
}

/// What ACPI discovery found.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AcpiReport {
    pub revision: AcpiRevision,
    /// Both the RSDP and the root table checksums matched.
    pub checksums_ok: bool,
    pub table_count: usize,
    /// How many of the configured tables were located.
    pub tables_found: usize,
}

/// Summary of a successful bring-up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BootReport {
    pub acpi: Option<AcpiReport>,
    pub page_root: PhysicalAddress,
    pub identity_mapped_pages: u64,
    pub usable_pages_left: u64,
}

/// Install the GDT and IDT held in `tables`.
///
/// Interrupts are masked from before `lgdt` until after `lidt`.
///
/// # Safety
/// Must run at CPL0 on the bootstrap processor, once. The currently executing
/// code must stay valid under the flat kernel code segment.
pub unsafe fn init_interrupts<B: CpuBackend>(
    backend: &mut B,
    tables: &'static mut CpuTables,
) -> &'static CpuTables {
    backend.disable_interrupts();

    let gdtr = tables.gdt.pointer();
    unsafe {
        backend.load_gdt(&gdtr);
        backend.reload_segments(KERNEL_CS, KERNEL_DS);
    }
    debug!("GDT loaded, CS={KERNEL_CS:#04x} DS={KERNEL_DS:#04x}");

    tables.idt.bind_exceptions(&exception_handlers());
    let idtr = tables.idt.pointer();
    unsafe {
        backend.load_idt(&idtr);
    }
    debug!("IDT loaded with exception vectors 0-31");

    backend.enable_interrupts();
    tables
}

/// Validate the firmware's ACPI tables and look up `wanted`.
///
/// Returns `None` when there is no usable RSDP; every failure is logged.
///
/// # Safety
/// `rsdp` and the tables it leads to must be readable through `mapper`.
pub unsafe fn discover_acpi<M: PhysMapRo>(
    mapper: &M,
    rsdp: Option<PhysicalAddress>,
    wanted: &[Signature],
) -> Option<AcpiReport> {
    let Some(rsdp) = rsdp else {
        error!("No ACPI RSDP provided by the firmware");
        return None;
    };

    let tables = match unsafe { AcpiTables::from_rsdp(mapper, rsdp) } {
        Ok(tables) => tables,
        Err(err) => {
            error!("{err}");
            return None;
        }
    };

    let validation = tables.validate();
    let mut tables_found = 0;
    for &signature in wanted {
        match tables.find_table(signature) {
            Some(pa) => {
                tables_found += 1;
                info!("ACPI table {signature} at {pa}");
            }
            None => error!("ACPI table {signature} not found"),
        }
    }

    Some(AcpiReport {
        revision: tables.revision(),
        checksums_ok: validation.is_valid(),
        table_count: tables.table_count(),
        tables_found,
    })
}

/// Run the full bring-up sequence.
///
/// # Errors
/// [`BootError::Paging`] when the memory map runs out of usable frames while
/// building the page tables. Tables created up to that point stay allocated
/// and CR3 is left untouched.
///
/// # Safety
/// - Everything [`init_interrupts`] and [`discover_acpi`] require.
/// - `mapper` must give writable access to every usable region of the memory
///   map.
/// - The identity-mapped range in `config` must cover the executing code, the
///   stack and every structure still in use.
pub unsafe fn bring_up<B, M>(
    backend: &mut B,
    mapper: &M,
    boot: KernelBootInfo<'_>,
    tables: &'static mut CpuTables,
    config: &BootConfig,
) -> Result<BootReport, BootError>
where
    B: CpuBackend,
    M: PhysMapper + PhysMapRo,
{
    let KernelBootInfo { memory_map, rsdp } = boot;
    info!("Bringing up the kernel with {} memory regions", memory_map.len());

    unsafe {
        init_interrupts(backend, tables);
    }

    let acpi = unsafe { discover_acpi(mapper, rsdp, config.acpi_tables) };

    let mut frames = BootFrameAllocator::new(memory_map);
    let mut space = AddressSpace::new(mapper, &mut frames)?;
    let identity_mapped_pages =
        space.identity_map(&mut frames, PhysicalAddress::zero(), config.identity_map_bytes)?;

    unsafe {
        space.activate(backend);
    }
    info!(
        "Paging root {} active, {identity_mapped_pages} pages identity mapped",
        space.root()
    );

    Ok(BootReport {
        acpi,
        page_root: space.root(),
        identity_mapped_pages,
        usable_pages_left: frames.remaining_pages(MemoryRegionKind::Usable),
    })
}
