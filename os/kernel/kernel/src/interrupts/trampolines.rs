//! # Exception entry trampolines
//!
//! One naked stub per exception vector. Stubs for vectors without a CPU error
//! code push a synthetic `0` so every frame has the same shape; each stub then
//! pushes its vector number and jumps to [`common_trampoline`], which saves
//! the general-purpose registers and calls into Rust with `rdi` pointing at
//! the resulting [`InterruptFrame`](super::InterruptFrame).

use crate::idt::EXCEPTION_VECTORS;
use crate::interrupts::dispatcher::dispatch_exception;
use core::arch::naked_asm;

/// Whether the CPU pushes an error code for `vector`.
#[must_use]
pub const fn has_error_code(vector: usize) -> bool {
    matches!(vector, 8 | 10..=14 | 17 | 21)
}

/// Stub for a vector without a CPU error code.
macro_rules! trampoline {
    ($name:ident, $vector:literal) => {
        #[unsafe(naked)]
        extern "C" fn $name() {
            naked_asm!(
                "push 0",
                "push {vector}",
                "jmp {common}",
                vector = const $vector,
                common = sym common_trampoline,
            );
        }
    };
}

/// Stub for a vector where the CPU already pushed an error code.
macro_rules! trampoline_with_error {
    ($name:ident, $vector:literal) => {
        #[unsafe(naked)]
        extern "C" fn $name() {
            naked_asm!(
                "push {vector}",
                "jmp {common}",
                vector = const $vector,
                common = sym common_trampoline,
            );
        }
    };
}

trampoline!(exception_0, 0);
trampoline!(exception_1, 1);
trampoline!(exception_2, 2);
trampoline!(exception_3, 3);
trampoline!(exception_4, 4);
trampoline!(exception_5, 5);
trampoline!(exception_6, 6);
trampoline!(exception_7, 7);
trampoline_with_error!(exception_8, 8);
trampoline!(exception_9, 9);
trampoline_with_error!(exception_10, 10);
trampoline_with_error!(exception_11, 11);
trampoline_with_error!(exception_12, 12);
trampoline_with_error!(exception_13, 13);
trampoline_with_error!(exception_14, 14);
trampoline!(exception_15, 15);
trampoline!(exception_16, 16);
trampoline_with_error!(exception_17, 17);
trampoline!(exception_18, 18);
trampoline!(exception_19, 19);
trampoline!(exception_20, 20);
trampoline_with_error!(exception_21, 21);
trampoline!(exception_22, 22);
trampoline!(exception_23, 23);
trampoline!(exception_24, 24);
trampoline!(exception_25, 25);
trampoline!(exception_26, 26);
trampoline!(exception_27, 27);
trampoline!(exception_28, 28);
trampoline!(exception_29, 29);
trampoline!(exception_30, 30);
trampoline!(exception_31, 31);

static TRAMPOLINES: [extern "C" fn(); EXCEPTION_VECTORS] = [
    exception_0,
    exception_1,
    exception_2,
    exception_3,
    exception_4,
    exception_5,
    exception_6,
    exception_7,
    exception_8,
    exception_9,
    exception_10,
    exception_11,
    exception_12,
    exception_13,
    exception_14,
    exception_15,
    exception_16,
    exception_17,
    exception_18,
    exception_19,
    exception_20,
    exception_21,
    exception_22,
    exception_23,
    exception_24,
    exception_25,
    exception_26,
    exception_27,
    exception_28,
    exception_29,
    exception_30,
    exception_31,
];

/// Entry addresses of the 32 exception trampolines, indexed by vector.
#[must_use]
pub fn exception_handlers() -> [u64; EXCEPTION_VECTORS] {
    TRAMPOLINES.map(|handler| handler as usize as u64)
}

/// Shared tail of every trampoline.
///
/// On entry the stack holds `vector, error_code` on top of the hardware
/// frame. Pushes `rbp, rax, rbx, rcx, rdx, rsi, rdi, r8 … r15` so that `rsp`
/// points at a complete [`InterruptFrame`](super::InterruptFrame), calls the
/// dispatcher, restores everything in reverse and discards the vector and
/// error code before `iretq`.
#[unsafe(naked)]
unsafe extern "C" fn common_trampoline() {
    naked_asm!(
        "push rbp",
        "push rax",
        "push rbx",
        "push rcx",
        "push rdx",
        "push rsi",
        "push rdi",
        "push r8",
        "push r9",
        "push r10",
        "push r11",
        "push r12",
        "push r13",
        "push r14",
        "push r15",

        "mov rdi, rsp",
        "cld",
        "call {dispatch}",

        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop r11",
        "pop r10",
        "pop r9",
        "pop r8",
        "pop rdi",
        "pop rsi",
        "pop rdx",
        "pop rcx",
        "pop rbx",
        "pop rax",
        "pop rbp",

        // vector + error code
        "add rsp, 16",
        "iretq",
        dispatch = sym dispatch_exception,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_vectors() {
        let with_code: Vec<usize> = (0..EXCEPTION_VECTORS).filter(|&v| has_error_code(v)).collect();
        assert_eq!(with_code, [8, 10, 11, 12, 13, 14, 17, 21]);
    }

    #[test]
    fn handlers_are_distinct_and_non_null() {
        let handlers = exception_handlers();
        assert!(handlers.iter().all(|&h| h != 0));
        let mut sorted = handlers.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), EXCEPTION_VECTORS);
    }
}
