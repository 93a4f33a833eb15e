//! # CPU Exception Handling
//!
//! Every architectural exception vector (0–31) enters through a small naked
//! trampoline that normalises the stack into an [`InterruptFrame`], after
//! which a single Rust dispatcher reports the fault through the logger and
//! returns with `iretq`.
//!
//! ```text
//!  CPU pushes ss, rsp, rflags, cs, rip [, error code]
//!    → trampoline: [push 0,] push vector, jmp common
//!    → common: push rbp, rax … r15; call dispatch_exception(rsp)
//!    → pop r15 … rbp; add rsp, 16; iretq
//! ```
//!
//! The handlers never halt. A fault that re-triggers on return (e.g. `#GP`
//! from the same instruction) is reported again on every iteration.

pub mod dispatcher;
pub mod frame;
pub mod trampolines;

pub use dispatcher::{FaultReport, describe, dispatch, fault_name};
pub use frame::InterruptFrame;
pub use trampolines::{exception_handlers, has_error_code};
