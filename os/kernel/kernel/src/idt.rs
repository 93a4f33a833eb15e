//! # x86-64 Interrupt Descriptor Table (IDT)
//!
//! 256 gate descriptors of 16 bytes each. Bring-up populates only the 32
//! architectural exception vectors; everything from 32 upwards stays absent
//! so a stray external interrupt raises `#GP` / `#NP` instead of jumping to
//! garbage.
//!
//! ```ignore
//! idt[13]
//!     .set_handler(handler_address)
//!     .selector(KERNEL_CS)
//!     .dpl(0)
//!     .gate_type(GateType::InterruptGate)
//!     .present(true);
//! ```
//!
//! ## Acronyms
//! - **IST** – *Interrupt Stack Table* (per-entry alternate stack from the TSS; unused here)
//! - **DPL** – *Descriptor Privilege Level* (0=kernel … 3=user)
//! - **P** – *Present* bit (must be 1 for a valid gate)

use crate::gdt::KERNEL_CS;
use bitfield_struct::bitfield;
use core::ops::{Index, IndexMut};
use kernel_registers::descriptor_table::DescriptorTablePointer;

/// Number of gate descriptors in the table.
pub const IDT_ENTRIES: usize = 256;

/// Number of architectural exception vectors.
pub const EXCEPTION_VECTORS: usize = 32;

const _: () = assert!(size_of::<IdtEntry>() == 16);
const _: () = assert!(align_of::<Idt>() == 16);
const _: () = assert!(size_of::<Idt>() == IDT_ENTRIES * 16);

/// The attribute word of an IDT entry:
///
/// - **low byte**: `IST` (3 bits) + 5 reserved zero bits
/// - **high byte**: `| P | DPL(2) | S(0) | Type(4) |`
#[bitfield(u16)]
#[derive(PartialEq, Eq)]
pub struct IdtGateAttr {
    /// IST index (0 disables IST switching).
    #[bits(3)]
    pub ist: u8,

    #[bits(5)]
    __zero0: u8,

    /// 0xE = interrupt gate, 0xF = trap gate.
    #[bits(4)]
    pub typ: u8,

    /// Must be `0` for interrupt/trap gates.
    pub s: bool,

    #[bits(2)]
    pub dpl: u8,

    pub present: bool,
}

/// Gate kinds supported by this IDT.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GateType {
    /// Clears `IF` on entry.
    InterruptGate,
    /// Leaves `IF` unchanged.
    TrapGate,
}

impl GateType {
    const fn type_bits(self) -> u8 {
        match self {
            Self::InterruptGate => 0xE,
            Self::TrapGate => 0xF,
        }
    }
}

/// A 256-entry **Interrupt Descriptor Table**.
#[repr(C, align(16))]
pub struct Idt {
    entries: [IdtEntry; IDT_ENTRIES],
}

impl Default for Idt {
    fn default() -> Self {
        Self::new()
    }
}

impl Idt {
    /// A table with every gate absent.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [IdtEntry::MISSING; IDT_ENTRIES],
        }
    }

    /// Bind vectors `0..32` to `handlers` as present, DPL 0 interrupt gates
    /// in the kernel code segment.
    pub fn bind_exceptions(&mut self, handlers: &[u64; EXCEPTION_VECTORS]) {
        for (entry, &handler) in self.entries.iter_mut().zip(handlers) {
            entry
                .set_handler(handler)
                .selector(KERNEL_CS)
                .dpl(0)
                .gate_type(GateType::InterruptGate)
                .present(true);
        }
    }

    /// The `lidt` operand covering the whole table.
    #[must_use]
    pub fn pointer(&self) -> DescriptorTablePointer {
        DescriptorTablePointer::for_table(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdtEntry> {
        self.entries.iter()
    }
}

impl Index<usize> for Idt {
    type Output = IdtEntry;
    fn index(&self, i: usize) -> &Self::Output {
        &self.entries[i]
    }
}

impl IndexMut<usize> for Idt {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.entries[i]
    }
}

/// One **16-byte** x86-64 IDT gate descriptor.
///
/// ```text
///  bytes 0‒1   offset[15:0]
///  bytes 2‒3   code segment selector
///  bytes 4‒5   IST / type / DPL / P   (IdtGateAttr)
///  bytes 6‒7   offset[31:16]
///  bytes 8‒11  offset[63:32]
///  bytes 12‒15 reserved, zero
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IdtEntry {
    offset_lo: u16,
    selector: u16,
    ist_type: u16,
    offset_mid: u16,
    offset_hi: u32,
    _reserved: u32,
}

impl IdtEntry {
    /// A zeroed, non-present entry.
    pub const MISSING: Self = Self {
        offset_lo: 0,
        selector: 0,
        ist_type: IdtGateAttr::new().into_bits(),
        offset_mid: 0,
        offset_hi: 0,
        _reserved: 0,
    };

    /// Store the handler address and return a builder for the remaining
    /// fields.
    ///
    /// Defaults: selector [`KERNEL_CS`], interrupt gate, DPL 0, IST 0, **not**
    /// present.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn set_handler(&mut self, handler: u64) -> IdtEntryBuilder<'_> {
        self.offset_lo = handler as u16;
        self.offset_mid = (handler >> 16) as u16;
        self.offset_hi = (handler >> 32) as u32;
        self.selector = KERNEL_CS;
        self.ist_type = IdtGateAttr::new()
            .with_typ(GateType::InterruptGate.type_bits())
            .with_s(false)
            .into_bits();

        IdtEntryBuilder { entry: self }
    }

    /// The handler address reassembled from its three parts.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.offset_lo) | (u64::from(self.offset_mid) << 16) | (u64::from(self.offset_hi) << 32)
    }

    #[must_use]
    pub const fn selector(&self) -> u16 {
        self.selector
    }

    #[must_use]
    pub const fn attributes(&self) -> IdtGateAttr {
        IdtGateAttr::from_bits(self.ist_type)
    }

    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.attributes().present()
    }
}

/// Fluent builder for an [`IdtEntry`].
pub struct IdtEntryBuilder<'a> {
    entry: &'a mut IdtEntry,
}

impl IdtEntryBuilder<'_> {
    const fn update(self, attr: IdtGateAttr) -> Self {
        self.entry.ist_type = attr.into_bits();
        self
    }

    /// Set the **Present** bit.
    #[inline]
    pub const fn present(self, p: bool) -> Self {
        let attr = self.entry.attributes().with_present(p);
        self.update(attr)
    }

    /// Set the DPL, 0..=3.
    #[inline]
    pub fn dpl(self, dpl: u8) -> Self {
        debug_assert!(dpl <= 3);
        let attr = self.entry.attributes().with_dpl(dpl);
        self.update(attr)
    }

    #[inline]
    pub const fn gate_type(self, gate_type: GateType) -> Self {
        let attr = self
            .entry
            .attributes()
            .with_typ(gate_type.type_bits())
            .with_s(false);
        self.update(attr)
    }

    /// Override the code segment selector.
    #[inline]
    pub const fn selector(self, sel: u16) -> Self {
        self.entry.selector = sel;
        self
    }
}
