use crate::ports::{PortIo, Ports};
use crate::transmitter::Transmitter;

/// The port number for QEMU's debug console (`-debugcon`).
pub const QEMU_DEBUG_PORT: u16 = 0x402;

/// QEMU's debug console. Needs no setup and never blocks.
///
/// On real hardware the port is typically not decoded and writes vanish.
#[derive(Debug, Default)]
pub struct DebugCon<P = Ports> {
    io: P,
}

impl DebugCon<Ports> {
    #[must_use]
    pub const fn new() -> Self {
        Self { io: Ports }
    }
}

impl<P: PortIo> DebugCon<P> {
    #[must_use]
    pub const fn with_io(io: P) -> Self {
        Self { io }
    }
}

impl<P: PortIo> Transmitter for DebugCon<P> {
    fn transmit(&self, bytes: &[u8]) {
        for &b in bytes {
            // SAFETY: writes to the debug console port have no side effects
            // beyond emitting the byte.
            unsafe { self.io.write(QEMU_DEBUG_PORT, b) }
        }
    }
}
