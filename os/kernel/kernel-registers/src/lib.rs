//! # Typed `X86_64` Registers and the CPU Backend
//!
//! Everything in the kernel core that touches a privileged processor register
//! goes through this crate:
//!
//! * [`cr3::Cr3`]: typed paging-root register value.
//! * [`descriptor_table::DescriptorTablePointer`]: the `limit`/`base` operand
//!   of `lgdt` and `lidt`.
//! * [`backend::CpuBackend`]: the architecture boundary. Bring-up code builds
//!   tables in ordinary memory and asks the backend to install them; hosted
//!   tests substitute a recording backend.
//!
//! The real instructions are compiled in with the `asm` feature
//! ([`backend::X86_64`]).

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod backend;
pub mod cr3;
pub mod descriptor_table;

pub trait StoreRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// For example, the register access might be privileged and require kernel mode (Ring 0).
    unsafe fn store_unsafe(self);
}
