//! The 6510's on-chip I/O port.
//!
//! Address $0000 is the data direction register (1 = output) and $0001 the
//! data register. Accesses to either are answered by the port rather than
//! by memory. Input lines take their level from the host, possibly pulled up
//! or left floating; floating lines keep the last level the CPU drove on them.

use emu_core::{Cpu, Observable, Value};
use log::trace;

use crate::{Bus, Config, M6502, Pins, Registers, Trap};

/// The host's view of the six port lines.
pub trait PortIo {
    /// Sample the external level of the port lines.
    fn port_input(&mut self) -> u8;

    /// The port's output changed. `value` has output bits from the data
    /// register and input bits from the pull-up mask.
    fn port_output(&mut self, value: u8);
}

/// Port register state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IoPort {
    /// Data direction register ($0000).
    pub ddr: u8,
    /// Data register as last written ($0001).
    pub out: u8,
    /// Last sampled input level.
    pub inp: u8,
    /// Level on the port pins.
    pub pins: u8,
    /// Last level the CPU drove on each line, kept while a line is an input.
    pub drive: u8,
    /// Lines with pull-up resistors.
    pub pullup: u8,
    /// Lines that float when not driven.
    pub floating: u8,
}

impl IoPort {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            pullup: config.io_pullup,
            floating: config.io_floating,
            ..Self::default()
        }
    }

    /// Clear the port registers. The floating drive level survives.
    pub fn reset(&mut self) {
        self.ddr = 0;
        self.out = 0;
        self.inp = 0;
        self.pins = 0;
    }

    /// Answer an access to $0000 or $0001.
    ///
    /// On reads the returned pins carry the register value on the data bus.
    /// Writes that change what the port drives are reported through
    /// [`PortIo::port_output`].
    pub fn iorq<P: PortIo + ?Sized>(&mut self, mut pins: Pins, io: &mut P) -> Pins {
        debug_assert!(pins.is_port_access());
        if pins.addr() & 1 == 0 {
            if pins.is_read() {
                pins.set_data(self.ddr);
            } else {
                self.ddr = pins.data();
                self.update_drive();
                io.port_output(self.output());
                self.pins = self.level();
            }
        } else {
            if pins.is_read() {
                self.inp = io.port_input();
                let floating = self.floating & self.drive;
                pins.set_data(((self.inp | floating) & !self.ddr) | (self.out & self.ddr));
            } else {
                self.out = pins.data();
                self.update_drive();
                io.port_output(self.output());
            }
            self.pins = self.level();
        }
        trace!(
            "6510 port: ddr=${:02X} out=${:02X} pins=${:02X}",
            self.ddr, self.out, self.pins
        );
        pins
    }

    fn update_drive(&mut self) {
        self.drive = (self.out & self.ddr) | (self.drive & !self.ddr);
    }

    /// What the port presents to the outside world.
    fn output(&self) -> u8 {
        (self.out & self.ddr) | (self.pullup & !self.ddr)
    }

    fn level(&self) -> u8 {
        (self.out & self.ddr) | (self.inp & !self.ddr)
    }
}

/// Routes port accesses to the [`IoPort`], everything else to the host.
///
/// The host still sees every cycle, port cycles included, so the bus trace
/// is complete.
struct PortBus<'a, B> {
    bus: &'a mut B,
    port: &'a mut IoPort,
}

impl<B: Bus + PortIo> Bus for PortBus<'_, B> {
    fn tick(&mut self, mut pins: Pins) -> Pins {
        pins.set_port(self.port.pins);
        let mut pins = self.bus.tick(pins);
        // A held read is answered once RDY is released.
        if pins.is_port_access() && (pins.is_write() || !pins.rdy()) {
            pins = self.port.iorq(pins, &mut *self.bus);
        }
        pins.set_port(self.port.pins);
        pins
    }
}

/// The MOS 6510: a 6502 with the I/O port at $0000/$0001.
#[derive(Debug)]
pub struct M6510 {
    pub cpu: M6502,
    pub port: IoPort,
}

impl Default for M6510 {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl M6510 {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            cpu: M6502::new(config),
            port: IoPort::new(&config),
        }
    }

    /// Reset the CPU and clear the port registers.
    pub fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.port.reset();
        self.cpu.reset(bus);
    }

    /// As [`M6502::execute`], with port accesses handled on chip.
    pub fn execute<B: Bus + PortIo>(&mut self, bus: &mut B, ticks: u32) -> u32 {
        let Self { cpu, port } = self;
        cpu.execute(&mut PortBus { bus, port }, ticks)
    }

    /// As [`M6502::tick`], with port accesses handled on chip.
    pub fn tick<B: Bus + PortIo>(&mut self, bus: &mut B) {
        let Self { cpu, port } = self;
        cpu.tick(&mut PortBus { bus, port });
    }

    /// Answer a port access made outside [`execute`](Self::execute).
    pub fn iorq<P: PortIo + ?Sized>(&mut self, pins: Pins, io: &mut P) -> Pins {
        self.port.iorq(pins, io)
    }

    pub fn set_trap(&mut self, trap: impl Trap + 'static) {
        self.cpu.set_trap(trap);
    }

    pub fn clear_trap(&mut self) {
        self.cpu.clear_trap();
    }

    #[must_use]
    pub fn trap_id(&self) -> Option<i32> {
        self.cpu.trap_id()
    }

    #[must_use]
    pub fn is_instruction_complete(&self) -> bool {
        self.cpu.is_instruction_complete()
    }
}

impl Cpu for M6510 {
    type Registers = Registers;

    fn pc(&self) -> u32 {
        u32::from(self.cpu.regs.pc)
    }

    fn registers(&self) -> Self::Registers {
        self.cpu.regs
    }

    fn is_halted(&self) -> bool {
        self.cpu.is_jammed()
    }

    fn is_instruction_complete(&self) -> bool {
        self.cpu.is_instruction_complete()
    }
}

impl Observable for M6510 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "port.ddr" => Some(self.port.ddr.into()),
            "port.out" => Some(self.port.out.into()),
            "port.inp" => Some(self.port.inp.into()),
            "port.pins" => Some(self.port.pins.into()),
            "port.drive" => Some(self.port.drive.into()),
            _ => self.cpu.query(path),
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "a",
            "x",
            "y",
            "s",
            "p",
            "flags.c",
            "flags.z",
            "flags.i",
            "flags.d",
            "flags.v",
            "flags.n",
            "cycle",
            "halted",
            "irq_latch",
            "nmi_pending",
            "pins",
            "pins.addr",
            "pins.data",
            "pins.lines",
            "port.ddr",
            "port.out",
            "port.inp",
            "port.pins",
            "port.drive",
        ]
    }
}
