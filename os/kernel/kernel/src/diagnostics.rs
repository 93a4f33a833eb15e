//! # Kernel Diagnostics
//!
//! The global `log` backend. With the `qemu` feature lines go to QEMU's debug
//! console, otherwise to COM1.

use kernel_diag::KernelLogger;
use kernel_info::memory::LOG_LEVEL;
use log::SetLoggerError;

#[cfg(feature = "qemu")]
type Sink = kernel_diag::DebugCon;

#[cfg(not(feature = "qemu"))]
type Sink = kernel_diag::SerialPort;

#[cfg(feature = "qemu")]
const fn sink() -> Sink {
    kernel_diag::DebugCon::new()
}

#[cfg(not(feature = "qemu"))]
const fn sink() -> Sink {
    // SAFETY: nothing else in the kernel drives COM1.
    unsafe { kernel_diag::SerialPort::com1() }
}

static LOGGER: KernelLogger<Sink> = KernelLogger::new(sink(), LOG_LEVEL);

/// Program the transmitter and install the kernel logger.
///
/// # Errors
/// Fails if a logger is already installed.
pub fn init() -> Result<(), SetLoggerError> {
    #[cfg(not(feature = "qemu"))]
    LOGGER.transmitter().init();

    LOGGER.init()
}
