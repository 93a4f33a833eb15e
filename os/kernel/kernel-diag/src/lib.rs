//! # Kernel Diagnostics
//!
//! Byte-level diagnostic output for the earliest stages of the kernel, and a
//! [`log`] backend on top of it.
//!
//! ## Overview
//!
//! ```text
//! log::info!(…)
//!     ↓
//! KernelLogger<T>            "[ INFO  ] message\n"
//!     ↓
//! T: Transmitter
//!     ├─ SerialPort          16550 UART, COM1 = 0x3F8
//!     └─ DebugCon            QEMU debug console, port 0x402
//!     ↓
//! PortIo (out dx, al / in al, dx)
//! ```
//!
//! ## Feature System
//!
//! ### `enabled` Feature (default)
//! Port I/O instructions are compiled in. Without it, every port write is a
//! no-op and every port read returns `0xFF`, so the transmitters never block.
//!
//! ## QEMU Integration
//!
//! ```bash
//! # COM1 on stdio
//! qemu-system-x86_64 … -serial stdio
//!
//! # Debug console to a file
//! qemu-system-x86_64 … -debugcon file:debug.log
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod debugcon;
mod logger;
mod ports;
mod serial;
mod transmitter;

pub use debugcon::{DebugCon, QEMU_DEBUG_PORT};
pub use logger::{KernelLogger, level_tag};
pub use ports::{PortIo, Ports};
pub use serial::{COM1, SerialPort};
pub use transmitter::Transmitter;
