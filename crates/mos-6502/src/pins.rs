//! The pin bus word exchanged with the host on every cycle.
//!
//! Address bus, data bus and control lines are packed into one 64-bit value.
//! The layout is part of the host contract:
//!
//! ```text
//!  bits  0..=15  A0-A15   address bus
//!  bits 16..=23  D0-D7    data bus
//!  bit  24       RW       1 = read, 0 = write
//!  bit  25       SYNC     opcode fetch cycle
//!  bit  26       IRQ      interrupt request (level)
//!  bit  27       NMI      non-maskable interrupt (edge)
//!  bit  28       RDY      hold the current read cycle
//!  bit  29       AEC      address enable control (6510)
//!  bits 32..=37  P0-P5    I/O port lines (6510)
//! ```
//!
//! All other bits are reserved. The CPU never sets or clears them.

use std::fmt;

/// A snapshot of all CPU pins.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pins(pub u64);

impl Pins {
    pub const A0: u64 = 1 << 0;
    pub const A15: u64 = 1 << 15;
    pub const D0: u64 = 1 << 16;
    pub const D7: u64 = 1 << 23;

    /// Read (1) or write (0) cycle.
    pub const RW: u64 = 1 << 24;
    /// Opcode fetch cycle.
    pub const SYNC: u64 = 1 << 25;
    /// Maskable interrupt request.
    pub const IRQ: u64 = 1 << 26;
    /// Non-maskable interrupt request.
    pub const NMI: u64 = 1 << 27;
    /// Ready: when the host returns this set on a read, the read repeats.
    pub const RDY: u64 = 1 << 28;
    /// Address enable control (6510 only).
    pub const AEC: u64 = 1 << 29;

    pub const P0: u64 = 1 << 32;
    pub const P1: u64 = 1 << 33;
    pub const P2: u64 = 1 << 34;
    pub const P3: u64 = 1 << 35;
    pub const P4: u64 = 1 << 36;
    pub const P5: u64 = 1 << 37;

    /// All six 6510 port lines.
    pub const PORT_BITS: u64 =
        Self::P0 | Self::P1 | Self::P2 | Self::P3 | Self::P4 | Self::P5;

    /// Every bit that corresponds to a physical pin.
    pub const PIN_MASK: u64 = (1 << 40) - 1;

    const ADDR_MASK: u64 = 0xFFFF;
    const DATA_MASK: u64 = 0xFF_0000;

    /// Build a pin word from control lines, address and data.
    #[must_use]
    pub const fn new(ctrl: u64, addr: u16, data: u8) -> Self {
        Self(ctrl | ((data as u64) << 16) | addr as u64)
    }

    #[must_use]
    pub const fn addr(self) -> u16 {
        (self.0 & Self::ADDR_MASK) as u16
    }

    pub fn set_addr(&mut self, addr: u16) {
        self.0 = (self.0 & !Self::ADDR_MASK) | u64::from(addr);
    }

    #[must_use]
    pub const fn data(self) -> u8 {
        ((self.0 & Self::DATA_MASK) >> 16) as u8
    }

    pub fn set_data(&mut self, data: u8) {
        self.0 = (self.0 & !Self::DATA_MASK) | (u64::from(data) << 16);
    }

    /// Value on the six port lines, P0 in bit 0.
    #[must_use]
    pub const fn port(self) -> u8 {
        ((self.0 & Self::PORT_BITS) >> 32) as u8
    }

    /// Drive the port lines. Bits 6 and 7 have no pin and are dropped.
    pub fn set_port(&mut self, value: u8) {
        self.0 = (self.0 & !Self::PORT_BITS) | ((u64::from(value) << 32) & Self::PORT_BITS);
    }

    /// Check whether any of the given lines is high.
    #[must_use]
    pub const fn is_set(self, lines: u64) -> bool {
        self.0 & lines != 0
    }

    pub fn set(&mut self, lines: u64) {
        self.0 |= lines;
    }

    pub fn clear(&mut self, lines: u64) {
        self.0 &= !lines;
    }

    pub fn set_if(&mut self, lines: u64, condition: bool) {
        if condition {
            self.set(lines);
        } else {
            self.clear(lines);
        }
    }

    /// Return a copy with the given lines set.
    #[must_use]
    pub const fn with(self, lines: u64) -> Self {
        Self(self.0 | lines)
    }

    /// Return a copy with the given lines cleared.
    #[must_use]
    pub const fn without(self, lines: u64) -> Self {
        Self(self.0 & !lines)
    }

    #[must_use]
    pub const fn is_read(self) -> bool {
        self.is_set(Self::RW)
    }

    #[must_use]
    pub const fn is_write(self) -> bool {
        !self.is_read()
    }

    #[must_use]
    pub const fn sync(self) -> bool {
        self.is_set(Self::SYNC)
    }

    #[must_use]
    pub const fn irq(self) -> bool {
        self.is_set(Self::IRQ)
    }

    #[must_use]
    pub const fn nmi(self) -> bool {
        self.is_set(Self::NMI)
    }

    #[must_use]
    pub const fn rdy(self) -> bool {
        self.is_set(Self::RDY)
    }

    #[must_use]
    pub const fn aec(self) -> bool {
        self.is_set(Self::AEC)
    }

    /// True when the 6510 would route this cycle to its on-chip port
    /// (address `$0000` or `$0001`).
    #[must_use]
    pub const fn is_port_access(self) -> bool {
        self.0 & 0xFFFE == 0
    }
}

impl From<u64> for Pins {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<Pins> for u64 {
    fn from(pins: Pins) -> Self {
        pins.0
    }
}

impl fmt::Debug for Pins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pins {{ addr: ${:04X}, data: ${:02X}, {}",
            self.addr(),
            self.data(),
            if self.is_read() { "R" } else { "W" }
        )?;
        for (line, name) in [
            (Self::SYNC, "SYNC"),
            (Self::IRQ, "IRQ"),
            (Self::NMI, "NMI"),
            (Self::RDY, "RDY"),
            (Self::AEC, "AEC"),
        ] {
            if self.is_set(line) {
                write!(f, " {name}")?;
            }
        }
        if self.is_set(Self::PORT_BITS) {
            write!(f, ", port: %{:06b}", self.port())?;
        }
        write!(f, " }}")
    }
}
