//! Shared test bus for the integration tests.

#![allow(dead_code)]

use mos_6502::{Bus, Config, M6502, Pins, PortIo};

/// Program origin used by [`boot`].
pub const ORIGIN: u16 = 0x0200;
/// IRQ/BRK handler installed by [`boot`].
pub const IRQ_HANDLER: u16 = 0x0300;
/// NMI handler installed by [`boot`].
pub const NMI_HANDLER: u16 = 0x0380;

/// Flat 64KB RAM with a cycle trace and scripted control lines.
///
/// Cycle numbers count ticks since the trace was last cleared.
pub struct TestBus {
    pub ram: Vec<u8>,
    pub trace: Vec<Pins>,
    /// Hold IRQ high from this cycle on.
    pub irq_from: Option<usize>,
    /// Hold NMI high from this cycle on.
    pub nmi_from: Option<usize>,
    /// Answer reads with RDY set during `start..end`.
    pub hold: Option<(usize, usize)>,
    /// Level the port lines read as.
    pub port_in: u8,
    /// How many times the 6510 sampled the port lines.
    pub port_reads: usize,
    /// Every value the 6510 port reported.
    pub port_out: Vec<u8>,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            ram: vec![0; 0x1_0000],
            trace: Vec::new(),
            irq_from: None,
            nmi_from: None,
            hold: None,
            port_in: 0,
            port_reads: 0,
            port_out: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let start = usize::from(addr);
        self.ram[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn set_vector(&mut self, vector: u16, target: u16) {
        self.load(vector, &target.to_le_bytes());
    }

    pub fn peek(&self, addr: u16) -> u8 {
        self.ram[usize::from(addr)]
    }

    /// `(addr, data, is_read)` for every traced cycle.
    pub fn cycles(&self) -> Vec<(u16, u8, bool)> {
        self.trace
            .iter()
            .map(|p| (p.addr(), p.data(), p.is_read()))
            .collect()
    }

    pub fn addrs(&self) -> Vec<u16> {
        self.trace.iter().map(|p| p.addr()).collect()
    }
}

impl Bus for TestBus {
    fn tick(&mut self, mut pins: Pins) -> Pins {
        let cycle = self.trace.len();
        pins.set_if(Pins::IRQ, self.irq_from.is_some_and(|from| cycle >= from));
        pins.set_if(Pins::NMI, self.nmi_from.is_some_and(|from| cycle >= from));
        let held = pins.is_read()
            && self
                .hold
                .is_some_and(|(start, end)| (start..end).contains(&cycle));
        pins.set_if(Pins::RDY, held);

        let addr = usize::from(pins.addr());
        if pins.is_read() {
            pins.set_data(self.ram[addr]);
        } else {
            self.ram[addr] = pins.data();
        }
        self.trace.push(pins);
        pins
    }
}

impl PortIo for TestBus {
    fn port_input(&mut self) -> u8 {
        self.port_reads += 1;
        self.port_in
    }

    fn port_output(&mut self, value: u8) {
        self.port_out.push(value);
    }
}

/// Load `program` at [`ORIGIN`], install vectors and handlers (each a
/// single RTI), reset, and clear the trace.
pub fn boot(program: &[u8]) -> (M6502, TestBus) {
    boot_with(Config::default(), program)
}

pub fn boot_with(config: Config, program: &[u8]) -> (M6502, TestBus) {
    let mut bus = TestBus::new();
    bus.load(ORIGIN, program);
    bus.set_vector(0xFFFC, ORIGIN);
    bus.set_vector(0xFFFE, IRQ_HANDLER);
    bus.set_vector(0xFFFA, NMI_HANDLER);
    bus.load(IRQ_HANDLER, &[0x40]);
    bus.load(NMI_HANDLER, &[0x40]);

    let mut cpu = M6502::new(config);
    cpu.reset(&mut bus);
    bus.trace.clear();
    (cpu, bus)
}

/// Run one instruction, plus any interrupt sequence it lets in, returning
/// the cycle count.
pub fn step(cpu: &mut M6502, bus: &mut TestBus) -> u32 {
    cpu.execute(bus, 0)
}

/// Run `n` instructions.
pub fn run(cpu: &mut M6502, bus: &mut TestBus, n: usize) {
    for _ in 0..n {
        step(cpu, bus);
    }
}
