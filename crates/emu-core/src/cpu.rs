//! CPU inspection trait.

/// A CPU core, seen from the host between bus cycles.
///
/// Pin-level cores do not own memory and have no generic `tick` here: each
/// core defines the bus capability it drives, since the shape of a bus cycle
/// (pin word, wait lines, port lines) is chip specific. This trait covers
/// what every core exposes for debugging and test harnesses.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Returns the current program counter.
    ///
    /// Returns `u32` to support all CPU address widths. Narrower CPUs
    /// zero-extend.
    fn pc(&self) -> u32;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU has locked up and only a reset recovers it.
    fn is_halted(&self) -> bool;

    /// Returns true when the next bus cycle is an opcode fetch.
    fn is_instruction_complete(&self) -> bool;
}
