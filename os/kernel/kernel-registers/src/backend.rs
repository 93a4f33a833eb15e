//! # Architecture Backend
//!
//! The minimal set of privileged operations bring-up needs: masking
//! interrupts, loading the GDTR and IDTR, reloading segment selectors and
//! switching the paging root. Table construction, index decomposition and
//! checksum logic never touch the processor directly; they hand finished
//! tables to a [`CpuBackend`].
//!
//! [`X86_64`] issues the real instructions (feature `asm`). Tests implement
//! the trait with a recorder to assert on call order and operands.

use crate::cr3::Cr3;
use crate::descriptor_table::DescriptorTablePointer;

#[cfg(feature = "asm")]
use crate::StoreRegisterUnsafe;

/// Privileged processor operations used during bring-up.
pub trait CpuBackend {
    /// Mask maskable interrupts (`cli`).
    fn disable_interrupts(&mut self);

    /// Unmask maskable interrupts (`sti`).
    fn enable_interrupts(&mut self);

    /// Load the GDTR.
    ///
    /// # Safety
    /// `gdtr` must describe a valid GDT that stays resident and unmodified
    /// for as long as it is installed.
    unsafe fn load_gdt(&mut self, gdtr: &DescriptorTablePointer);

    /// Reload DS/ES/FS/GS/SS with `data` and CS with `code` (far return).
    ///
    /// # Safety
    /// Both selectors must reference present descriptors of the right kind in
    /// the currently loaded GDT.
    unsafe fn reload_segments(&mut self, code: u16, data: u16);

    /// Load the IDTR.
    ///
    /// # Safety
    /// `idtr` must describe a valid IDT that stays resident for as long as it
    /// is installed, and every present gate must point at a valid handler.
    unsafe fn load_idt(&mut self, idtr: &DescriptorTablePointer);

    /// Switch the active paging root.
    ///
    /// # Safety
    /// The new hierarchy must map the currently executing code, the stack and
    /// every structure still in use at their current virtual addresses.
    unsafe fn load_page_root(&mut self, cr3: Cr3);
}

/// The bare-metal backend.
#[derive(Debug, Default, Copy, Clone)]
pub struct X86_64;

impl X86_64 {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Halt until the next interrupt.
    #[cfg(feature = "asm")]
    #[inline]
    pub fn halt(&self) {
        unsafe {
            core::arch::asm!("hlt", options(nomem, nostack, preserves_flags));
        }
    }
}

#[cfg(feature = "asm")]
impl CpuBackend for X86_64 {
    #[inline]
    fn disable_interrupts(&mut self) {
        unsafe {
            core::arch::asm!("cli", options(nomem, nostack));
        }
    }

    #[inline]
    fn enable_interrupts(&mut self) {
        unsafe {
            core::arch::asm!("sti", options(nomem, nostack));
        }
    }

    unsafe fn load_gdt(&mut self, gdtr: &DescriptorTablePointer) {
        unsafe {
            core::arch::asm!(
                "lgdt [{}]",
                in(reg) core::ptr::from_ref(gdtr),
                options(readonly, nostack, preserves_flags)
            );
        }
    }

    unsafe fn reload_segments(&mut self, code: u16, data: u16) {
        unsafe {
            core::arch::asm!(
                "mov ds, {0:x}",
                "mov es, {0:x}",
                "mov fs, {0:x}",
                "mov gs, {0:x}",
                "mov ss, {0:x}",
                in(reg) data,
                options(nostack, preserves_flags)
            );

            // A plain `mov` cannot load CS; push CS:RIP and far-return into it.
            core::arch::asm!(
                "push {cs}",
                "lea {tmp}, [rip + 2f]",
                "push {tmp}",
                "retfq",
                "2:",
                cs = in(reg) u64::from(code),
                tmp = lateout(reg) _,
                options(preserves_flags)
            );
        }
    }

    unsafe fn load_idt(&mut self, idtr: &DescriptorTablePointer) {
        unsafe {
            core::arch::asm!(
                "lidt [{}]",
                in(reg) core::ptr::from_ref(idtr),
                options(readonly, nostack, preserves_flags)
            );
        }
    }

    unsafe fn load_page_root(&mut self, cr3: Cr3) {
        unsafe {
            cr3.store_unsafe();
        }
    }
}
