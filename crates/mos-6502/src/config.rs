//! CPU construction options.

/// Options fixed when a CPU is created.
///
/// The two port fields only matter for the 6510. They describe the
/// board around the port lines: which lines have a pull-up resistor, and
/// which lines float when nothing drives them (those keep the last level
/// the CPU drove on them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Decimal-mode arithmetic for ADC/SBC and friends when D is set.
    pub bcd_enabled: bool,
    /// Port lines pulled high when configured as input.
    pub io_pullup: u8,
    /// Port lines that float when configured as input.
    pub io_floating: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bcd_enabled: true,
            io_pullup: 0,
            io_floating: 0,
        }
    }
}

impl Config {
    /// The Ricoh 2A03/2A07: a 6502 with the BCD adder cut out.
    #[must_use]
    pub const fn ricoh_2a03() -> Self {
        Self {
            bcd_enabled: false,
            io_pullup: 0,
            io_floating: 0,
        }
    }

    /// The 6510 as wired in the C64: P0-P2 and P4 pulled up, P3 (cassette
    /// write) floating along with the two bits that have no pin.
    #[must_use]
    pub const fn c64() -> Self {
        Self {
            bcd_enabled: true,
            io_pullup: 0x17,
            io_floating: 0xC8,
        }
    }
}
