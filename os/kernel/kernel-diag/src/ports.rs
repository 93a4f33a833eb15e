//! # x86 I/O Port Access
//!
//! Devices used for diagnostics live in the legacy 16-bit I/O port space and
//! are reached with `out dx, al` / `in al, dx`. [`PortIo`] puts a seam in
//! front of those instructions so register sequences can be checked in
//! hosted tests.

/// Byte-wide access to the I/O port space.
pub trait PortIo {
    /// Write one byte to `port`.
    ///
    /// # Safety
    /// - **Privilege:** Execute at CPL0 or with I/O permission for `port`;
    ///   otherwise the CPU raises `#GP`.
    /// - **Correct port:** `port` must belong to the intended device and the
    ///   device must be in a state that accepts this write.
    unsafe fn write(&self, port: u16, value: u8);

    /// Read one byte from `port`.
    ///
    /// # Safety
    /// Same requirements as [`write`](Self::write).
    unsafe fn read(&self, port: u16) -> u8;
}

impl<P: PortIo + ?Sized> PortIo for &P {
    unsafe fn write(&self, port: u16, value: u8) {
        unsafe { (**self).write(port, value) }
    }

    unsafe fn read(&self, port: u16) -> u8 {
        unsafe { (**self).read(port) }
    }
}

/// The processor's I/O port space.
#[derive(Debug, Default, Copy, Clone)]
pub struct Ports;

#[cfg(feature = "enabled")]
impl PortIo for Ports {
    #[inline]
    unsafe fn write(&self, port: u16, value: u8) {
        unsafe {
            core::arch::asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
        }
    }

    #[inline]
    unsafe fn read(&self, port: u16) -> u8 {
        let mut v: u8;
        unsafe {
            core::arch::asm!("in al, dx", in("dx") port, out("al") v, options(nomem, nostack, preserves_flags));
        }
        v
    }
}

#[cfg(not(feature = "enabled"))]
impl PortIo for Ports {
    #[inline]
    unsafe fn write(&self, _port: u16, _value: u8) {}

    #[inline]
    unsafe fn read(&self, _port: u16) -> u8 {
        0xFF
    }
}
