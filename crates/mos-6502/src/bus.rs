//! The host side of a bus cycle.

use crate::Pins;

/// Everything outside the CPU: memory, I/O chips, interrupt sources.
///
/// The CPU calls [`tick`](Bus::tick) once per clock cycle with the address,
/// data and control lines it drives. The host performs the access and
/// returns the pin word as it stands at the end of the cycle:
///
/// - on a read (RW high) the data bus must carry the value read;
/// - IRQ and NMI reflect the current interrupt lines;
/// - RDY set on a read holds the CPU, and the same read repeats next cycle.
pub trait Bus {
    fn tick(&mut self, pins: Pins) -> Pins;
}

impl<F> Bus for F
where
    F: FnMut(Pins) -> Pins,
{
    fn tick(&mut self, pins: Pins) -> Pins {
        self(pins)
    }
}
