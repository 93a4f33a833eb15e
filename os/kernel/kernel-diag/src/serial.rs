//! # 16550 UART

use crate::ports::{PortIo, Ports};
use crate::transmitter::Transmitter;

/// Base port of the first serial controller.
pub const COM1: u16 = 0x3F8;

const DATA: u16 = 0;
const INTERRUPT_ENABLE: u16 = 1;
const FIFO_CONTROL: u16 = 2;
const LINE_CONTROL: u16 = 3;
const MODEM_CONTROL: u16 = 4;
const LINE_STATUS: u16 = 5;

/// LSR bit 5: transmit holding register empty.
const LSR_THR_EMPTY: u8 = 0x20;

/// A 16550-compatible UART driven by polling.
#[derive(Debug)]
pub struct SerialPort<P = Ports> {
    base: u16,
    io: P,
}

impl SerialPort<Ports> {
    /// COM1 through the processor's port space.
    ///
    /// # Safety
    /// COM1 must be a 16550-compatible UART (or absent) and nothing else may
    /// drive it while this value is in use.
    #[must_use]
    pub const unsafe fn com1() -> Self {
        unsafe { Self::new(COM1, Ports) }
    }
}

impl<P: PortIo> SerialPort<P> {
    /// # Safety
    /// `base` must be the base port of a UART this value exclusively drives,
    /// and `io` must honour the [`PortIo`] contract for `base..base + 8`.
    #[must_use]
    pub const unsafe fn new(base: u16, io: P) -> Self {
        Self { base, io }
    }

    /// Program 38400 baud, 8N1, FIFOs enabled and cleared, IRQs off.
    pub fn init(&self) {
        self.write_reg(LINE_CONTROL, 0x00);
        self.write_reg(INTERRUPT_ENABLE, 0x00);

        // Divisor latch: 115200 / 3 = 38400 baud.
        self.write_reg(LINE_CONTROL, 0x80);
        self.write_reg(DATA, 0x03);
        self.write_reg(INTERRUPT_ENABLE, 0x00);

        // 8 data bits, no parity, one stop bit; latch closed.
        self.write_reg(LINE_CONTROL, 0x03);

        // Enable FIFOs, clear both, 14-byte threshold.
        self.write_reg(FIFO_CONTROL, 0xC7);

        // DTR, RTS, OUT1, OUT2.
        self.write_reg(MODEM_CONTROL, 0x0F);
    }

    /// Block until the transmitter can take `byte`, then send it.
    pub fn send(&self, byte: u8) {
        while self.read_reg(LINE_STATUS) & LSR_THR_EMPTY == 0 {
            core::hint::spin_loop();
        }
        self.write_reg(DATA, byte);
    }

    fn write_reg(&self, offset: u16, value: u8) {
        // SAFETY: `new` guarantees exclusive ownership of the UART at `base`.
        unsafe { self.io.write(self.base + offset, value) }
    }

    fn read_reg(&self, offset: u16) -> u8 {
        // SAFETY: see `write_reg`.
        unsafe { self.io.read(self.base + offset) }
    }
}

impl<P: PortIo> Transmitter for SerialPort<P> {
    fn transmit(&self, bytes: &[u8]) {
        for &b in bytes {
            self.send(b);
        }
    }
}
