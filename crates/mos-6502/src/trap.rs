//! Execution traps.
//!
//! A trap is asked, at every instruction boundary inside
//! [`M6502::execute`](crate::M6502::execute), whether execution should stop.
//! Returning a non-zero id stops the run and the CPU reports that id from
//! [`M6502::trap_id`](crate::M6502::trap_id).

use crate::Pins;

/// Number of addresses a [`Breakpoints`] set can watch.
pub const MAX_TRAPS: usize = 8;

/// Instruction-boundary hook.
pub trait Trap {
    /// Called with the address of the next instruction, the ticks spent in
    /// the current `execute` call, and the pins after the last cycle.
    /// Return 0 to keep going, anything else to stop.
    fn check(&mut self, pc: u16, ticks: u32, pins: Pins) -> i32;
}

impl<F> Trap for F
where
    F: FnMut(u16, u32, Pins) -> i32,
{
    fn check(&mut self, pc: u16, ticks: u32, pins: Pins) -> i32 {
        self(pc, ticks, pins)
    }
}

/// A fixed set of PC breakpoints.
///
/// Slot `n` reports trap id `n + 1` when execution reaches its address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakpoints {
    slots: [Option<u16>; MAX_TRAPS],
}

impl Breakpoints {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None; MAX_TRAPS],
        }
    }

    /// Watch `addr` in `slot`.
    ///
    /// # Panics
    ///
    /// If `slot` is not below [`MAX_TRAPS`].
    pub fn set(&mut self, slot: usize, addr: u16) {
        assert!(slot < MAX_TRAPS, "breakpoint slot {slot} out of range");
        self.slots[slot] = Some(addr);
    }

    /// # Panics
    ///
    /// If `slot` is not below [`MAX_TRAPS`].
    pub fn clear(&mut self, slot: usize) {
        assert!(slot < MAX_TRAPS, "breakpoint slot {slot} out of range");
        self.slots[slot] = None;
    }

    pub fn clear_all(&mut self) {
        self.slots = [None; MAX_TRAPS];
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<u16> {
        self.slots.get(slot).copied().flatten()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

impl Trap for Breakpoints {
    fn check(&mut self, pc: u16, _ticks: u32, _pins: Pins) -> i32 {
        self.slots
            .iter()
            .position(|slot| *slot == Some(pc))
            .map_or(0, |index| index as i32 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_slot_wins() {
        let mut bp = Breakpoints::new();
        bp.set(3, 0x0400);
        bp.set(5, 0x0400);
        bp.set(0, 0x1000);
        assert_eq!(bp.check(0x0400, 0, Pins::default()), 4);
        assert_eq!(bp.check(0x1000, 0, Pins::default()), 1);
        assert_eq!(bp.check(0x2000, 0, Pins::default()), 0);
    }

    #[test]
    fn cleared_slot_stops_matching() {
        let mut bp = Breakpoints::new();
        bp.set(7, 0xC000);
        bp.clear(7);
        assert!(bp.is_empty());
        assert_eq!(bp.check(0xC000, 0, Pins::default()), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn slot_past_the_end_is_fatal() {
        Breakpoints::new().set(MAX_TRAPS, 0);
    }

    #[test]
    fn closures_are_traps() {
        let mut seen = Vec::new();
        let mut trap = |pc: u16, _: u32, _: Pins| {
            seen.push(pc);
            i32::from(pc == 0x0202)
        };
        assert_eq!(trap.check(0x0200, 2, Pins::default()), 0);
        assert_eq!(trap.check(0x0202, 4, Pins::default()), 1);
        drop(trap);
        assert_eq!(seen, [0x0200, 0x0202]);
    }
}
