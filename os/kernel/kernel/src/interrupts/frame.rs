/// Register snapshot built by the exception trampolines, lowest address
/// first.
///
/// The general-purpose registers and the `vector` / `error_code` pair are
/// pushed by software; `rip` through `ss` are the hardware frame. The layout
/// must match the push order in the common trampoline exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptFrame {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rdi: u64,
    pub rsi: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rbx: u64,
    pub rax: u64,
    pub rbp: u64,
    /// Exception vector pushed by the per-vector trampoline.
    pub vector: u64,
    /// CPU error code, or `0` for vectors that do not supply one.
    pub error_code: u64,
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

/// Number of registers the common trampoline pushes.
pub(crate) const SAVED_GPRS: usize = 15;

const _: () = {
    assert!(core::mem::offset_of!(InterruptFrame, vector) == SAVED_GPRS * 8);
    assert!(core::mem::offset_of!(InterruptFrame, error_code) == (SAVED_GPRS + 1) * 8);
    assert!(core::mem::offset_of!(InterruptFrame, rip) == (SAVED_GPRS + 2) * 8);
    assert!(size_of::<InterruptFrame>() == (SAVED_GPRS + 2 + 5) * 8);
    // The hardware frame starts 16-byte aligned, so the full frame keeps
    // `rsp` aligned for the call into Rust.
    assert!(size_of::<InterruptFrame>().is_multiple_of(16));
};
