//! 6502 CPU implementation.
//!
//! Cycle-accurate emulation where each `tick()` performs exactly one bus
//! cycle. After the opcode fetch, an instruction is a program of micro-ops
//! (see `decode`), and the CPU keeps its place in the program between ticks.
//!
//! Interrupts are polled when an instruction retires. IRQ is sampled against
//! the I flag as it stood at the start of the instruction's last cycle, so
//! CLI, SEI and PLP take effect one instruction late, as on silicon. NMI is
//! edge triggered: a low-to-high transition of the NMI pin on any cycle
//! latches a request that is serviced at the next instruction boundary.

use std::fmt;

use emu_core::{Cpu, Observable, Ticks, Value};
use log::{debug, trace, warn};

use crate::alu;
use crate::decode::{INTERRUPT, Instr, MicroOp, OPCODES, Op};
use crate::flags::{self, C, D, I, N, V, Z};
use crate::{Bus, Config, Pins, Registers, Status, Trap};

/// NMI vector address.
pub const NMI_VECTOR: u16 = 0xFFFA;
/// Reset vector address.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ/BRK vector address.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Where the CPU is in its instruction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Next cycle is an opcode fetch.
    Fetch,
    /// Running a micro-op program.
    Execute,
    /// Locked up by a JAM opcode. Only reset recovers.
    Jammed,
}

/// The MOS 6502 CPU.
///
/// Owns no memory: every bus cycle goes through the [`Bus`] passed to
/// [`execute`](Self::execute) or [`tick`](Self::tick).
pub struct M6502 {
    /// CPU registers.
    pub regs: Registers,

    /// Pin word after the last bus cycle.
    pins: Pins,

    bcd_enabled: bool,

    phase: Phase,

    /// Instruction being executed.
    instr: Instr,

    /// Micro-op program of the current instruction or interrupt.
    program: &'static [MicroOp],

    /// Next micro-op to run.
    step: usize,

    /// Effective address latch.
    ad: u16,

    /// Operand latch.
    data: u8,

    /// Indexing carried into the high byte of `ad`.
    crossed: bool,

    /// Vector for the BRK/IRQ/NMI sequence in progress.
    vector: u16,

    /// Interrupts are polled when the current program ends. False for
    /// BRK and interrupt sequences: the handler's first instruction always
    /// runs.
    polls: bool,

    /// NMI edge seen, not yet serviced.
    nmi_pending: bool,

    /// I flag as sampled for the IRQ check at the last instruction boundary.
    irq_latch: bool,

    /// Cycles spent in the current `execute` call.
    ticks: u32,

    /// Cycles since construction, reset included.
    total: Ticks,

    trap: Option<Box<dyn Trap>>,
    trap_id: Option<i32>,
}

impl Default for M6502 {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl M6502 {
    /// Create a CPU in power-on state.
    ///
    /// PC is 0 until [`reset`](Self::reset) loads the reset vector.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            regs: Registers::new(),
            pins: Pins(Pins::RW),
            bcd_enabled: config.bcd_enabled,
            phase: Phase::Fetch,
            instr: OPCODES[0xEA],
            program: &[],
            step: 0,
            ad: 0,
            data: 0,
            crossed: false,
            vector: IRQ_VECTOR,
            polls: true,
            nmi_pending: false,
            irq_latch: true,
            ticks: 0,
            total: Ticks::ZERO,
            trap: None,
            trap_id: None,
        }
    }

    /// Run the reset sequence: two reads at $FFFC/$FFFD, then fetch from
    /// the loaded address.
    ///
    /// A, X and Y keep their values. The two reads are plain ticks: RDY and
    /// interrupt lines in the responses are ignored.
    pub fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.regs.p = Status::from_byte(I);
        self.regs.s = 0xFD;
        self.pins = Pins(Pins::RW);

        let lo = bus.tick(Pins::new(Pins::RW, RESET_VECTOR, 0)).data();
        let hi = bus.tick(Pins::new(Pins::RW, RESET_VECTOR + 1, 0)).data();
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        self.total += Ticks::new(2);

        self.phase = Phase::Fetch;
        self.program = &[];
        self.step = 0;
        self.crossed = false;
        self.nmi_pending = false;
        self.irq_latch = true;
        debug!("6502 reset, PC=${:04X}", self.regs.pc);
    }

    /// Run whole instructions until at least `ticks` cycles have passed or
    /// a trap fires. Returns the number of cycles executed.
    ///
    /// At least one instruction always runs, so the result can exceed the
    /// request by up to one instruction (plus any RDY wait cycles). A call
    /// that starts mid-instruction finishes that instruction first.
    pub fn execute<B: Bus>(&mut self, bus: &mut B, ticks: u32) -> u32 {
        self.trap_id = None;
        self.ticks = 0;
        loop {
            self.tick(bus);
            match self.phase {
                Phase::Fetch => {
                    if let Some(trap) = self.trap.as_mut() {
                        let id = trap.check(self.regs.pc, self.ticks, self.pins);
                        if id != 0 {
                            debug!("trap {id} at PC=${:04X}", self.regs.pc);
                            self.trap_id = Some(id);
                            break;
                        }
                    }
                    if self.ticks >= ticks {
                        break;
                    }
                }
                Phase::Jammed if self.ticks >= ticks => break,
                _ => {}
            }
        }
        self.ticks
    }

    /// Run exactly one bus cycle (plus any RDY wait cycles on a read).
    ///
    /// Traps are not checked; they belong to [`execute`](Self::execute).
    pub fn tick<B: Bus>(&mut self, bus: &mut B) {
        match self.phase {
            Phase::Fetch => self.fetch(bus),
            Phase::Execute => self.run_micro_op(bus),
            Phase::Jammed => {
                self.read(bus, 0xFFFF);
            }
        }
    }

    /// True when the next cycle is an opcode fetch.
    #[must_use]
    pub fn is_instruction_complete(&self) -> bool {
        self.phase == Phase::Fetch
    }

    /// True after a JAM opcode, until reset.
    #[must_use]
    pub fn is_jammed(&self) -> bool {
        self.phase == Phase::Jammed
    }

    /// Install the trap checked at every instruction boundary, replacing any
    /// previous one.
    pub fn set_trap(&mut self, trap: impl Trap + 'static) {
        self.trap = Some(Box::new(trap));
    }

    pub fn clear_trap(&mut self) {
        self.trap = None;
    }

    #[must_use]
    pub fn has_trap(&self) -> bool {
        self.trap.is_some()
    }

    /// Id returned by the trap that stopped the last `execute` call.
    #[must_use]
    pub fn trap_id(&self) -> Option<i32> {
        self.trap_id
    }

    /// Pin word after the last bus cycle.
    #[must_use]
    pub fn pins(&self) -> Pins {
        self.pins
    }

    /// Replace the pin word between calls, e.g. to raise IRQ or NMI without
    /// waiting for a bus response. A rising NMI latches a request.
    pub fn set_pins(&mut self, pins: Pins) {
        if pins.nmi() && !self.pins.nmi() {
            self.nmi_pending = true;
        }
        self.pins = pins;
    }

    /// Cycles since construction, including reset cycles.
    #[must_use]
    pub fn total_ticks(&self) -> Ticks {
        self.total
    }

    #[must_use]
    pub fn bcd_enabled(&self) -> bool {
        self.bcd_enabled
    }

    #[must_use]
    pub fn a(&self) -> u8 {
        self.regs.a
    }

    #[must_use]
    pub fn x(&self) -> u8 {
        self.regs.x
    }

    #[must_use]
    pub fn y(&self) -> u8 {
        self.regs.y
    }

    #[must_use]
    pub fn s(&self) -> u8 {
        self.regs.s
    }

    #[must_use]
    pub fn p(&self) -> u8 {
        self.regs.p.0
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn set_a(&mut self, value: u8) {
        self.regs.a = value;
    }

    pub fn set_x(&mut self, value: u8) {
        self.regs.x = value;
    }

    pub fn set_y(&mut self, value: u8) {
        self.regs.y = value;
    }

    pub fn set_s(&mut self, value: u8) {
        self.regs.s = value;
    }

    /// Set P. The unused bit always reads back as 1.
    pub fn set_p(&mut self, value: u8) {
        self.regs.p = Status::from_byte(value);
    }

    /// Set PC. The next instruction boundary fetches from here.
    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }

    // ========================================================================
    // Bus cycles
    // ========================================================================

    /// One clock: hand the pins to the host and latch what comes back.
    fn cycle<B: Bus>(&mut self, bus: &mut B) {
        let nmi_was_high = self.pins.nmi();
        self.pins = bus.tick(self.pins);
        self.ticks = self.ticks.wrapping_add(1);
        self.total += Ticks::new(1);
        if self.pins.nmi() && !nmi_was_high {
            self.nmi_pending = true;
        }
    }

    /// Read cycle. Repeats for as long as the host answers with RDY set.
    fn read<B: Bus>(&mut self, bus: &mut B, addr: u16) -> u8 {
        self.pins.set_addr(addr);
        self.pins.set(Pins::RW);
        loop {
            self.pins.clear(Pins::RDY);
            self.cycle(bus);
            if !self.pins.rdy() {
                break;
            }
        }
        self.pins.data()
    }

    /// Write cycle. RDY does not stop writes.
    fn write<B: Bus>(&mut self, bus: &mut B, addr: u16, value: u8) {
        self.pins.set_addr(addr);
        self.pins.set_data(value);
        self.pins.clear(Pins::RW);
        self.cycle(bus);
    }

    /// Read the byte at PC and advance PC.
    fn fetch_pc<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let pc = self.regs.inc_pc();
        self.read(bus, pc)
    }

    // ========================================================================
    // Instruction sequencing
    // ========================================================================

    fn fetch<B: Bus>(&mut self, bus: &mut B) {
        let pc = self.regs.inc_pc();
        self.pins.set(Pins::SYNC);
        let opcode = self.read(bus, pc);
        self.pins.clear(Pins::SYNC);

        let instr = OPCODES[usize::from(opcode)];
        trace!("${pc:04X}: ${opcode:02X} {:?} {:?}", instr.op, instr.mode);
        self.start(instr, instr.program());
    }

    fn start(&mut self, instr: Instr, program: &'static [MicroOp]) {
        self.instr = instr;
        self.program = program;
        self.step = 0;
        self.crossed = false;
        self.vector = IRQ_VECTOR;
        self.polls = instr.op != Op::Brk;
        self.phase = Phase::Execute;
    }

    fn start_interrupt(&mut self, vector: u16) {
        trace!("interrupt via ${vector:04X} at PC=${:04X}", self.regs.pc);
        self.start(self.instr, INTERRUPT);
        self.vector = vector;
        self.polls = false;
    }

    fn run_micro_op<B: Bus>(&mut self, bus: &mut B) {
        let mut op = self.program[self.step];
        if op == MicroOp::FixupIfCrossed && !self.crossed {
            self.step += 1;
            op = self.program[self.step];
        }
        self.step += 1;

        let i_before = self.regs.p.is_set(I);
        self.micro_op(bus, op);

        if self.phase == Phase::Execute && self.step >= self.program.len() {
            self.irq_latch = i_before;
            if self.polls {
                self.retire();
            } else {
                self.phase = Phase::Fetch;
            }
        }
    }

    /// End the current program early; it retires after this cycle.
    fn finish(&mut self) {
        self.step = self.program.len();
    }

    /// Instruction boundary: start a pending interrupt or go back to fetch.
    fn retire(&mut self) {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.start_interrupt(NMI_VECTOR);
        } else if self.pins.irq() && !self.irq_latch {
            self.start_interrupt(IRQ_VECTOR);
        } else {
            self.phase = Phase::Fetch;
        }
    }

    /// Index `base` by `index`, noting whether the high byte changed.
    fn index(&mut self, base: u16, index: u8) {
        self.ad = base.wrapping_add(u16::from(index));
        self.crossed = (base ^ self.ad) & 0xFF00 != 0;
    }

    /// The address before the page carry was applied.
    fn unfixed(&self) -> u16 {
        if self.crossed {
            self.ad.wrapping_sub(0x100)
        } else {
            self.ad
        }
    }

    fn micro_op<B: Bus>(&mut self, bus: &mut B, op: MicroOp) {
        match op {
            MicroOp::Implied => {
                self.read(bus, self.regs.pc);
                self.implied();
            }
            MicroOp::Immediate => {
                let val = self.fetch_pc(bus);
                self.operate(val);
            }
            MicroOp::FetchZp | MicroOp::FetchAbsLo => {
                self.ad = u16::from(self.fetch_pc(bus));
            }
            MicroOp::FetchAbsHi => {
                self.ad |= u16::from(self.fetch_pc(bus)) << 8;
            }
            MicroOp::FetchAbsHiX => {
                let base = self.ad | u16::from(self.fetch_pc(bus)) << 8;
                self.index(base, self.regs.x);
            }
            MicroOp::FetchAbsHiY => {
                let base = self.ad | u16::from(self.fetch_pc(bus)) << 8;
                self.index(base, self.regs.y);
            }
            MicroOp::IndexZpX => {
                self.read(bus, self.ad);
                self.ad = u16::from((self.ad as u8).wrapping_add(self.regs.x));
            }
            MicroOp::IndexZpY => {
                self.read(bus, self.ad);
                self.ad = u16::from((self.ad as u8).wrapping_add(self.regs.y));
            }
            MicroOp::PointerLo => {
                self.data = self.read(bus, self.ad);
            }
            MicroOp::PointerHi => {
                let hi = self.read(bus, next_in_page(self.ad));
                self.ad = u16::from_le_bytes([self.data, hi]);
            }
            MicroOp::PointerHiY => {
                let hi = self.read(bus, next_in_page(self.ad));
                self.index(u16::from_le_bytes([self.data, hi]), self.regs.y);
            }
            MicroOp::FixupIfCrossed | MicroOp::Fixup => {
                self.read(bus, self.unfixed());
            }
            MicroOp::Read => {
                let val = self.read(bus, self.ad);
                self.operate(val);
            }
            MicroOp::Write => {
                let val = self.store_value();
                self.write(bus, self.ad, val);
            }
            MicroOp::RmwRead => {
                self.data = self.read(bus, self.ad);
            }
            MicroOp::RmwDummyWrite => {
                self.write(bus, self.ad, self.data);
                self.data = self.modify(self.data);
            }
            MicroOp::RmwWrite => {
                self.write(bus, self.ad, self.data);
            }
            MicroOp::StackDummy => {
                self.read(bus, self.regs.stack_addr());
            }
            MicroOp::PushPch => {
                let addr = self.regs.push();
                self.write(bus, addr, (self.regs.pc >> 8) as u8);
            }
            MicroOp::PushPcl => {
                let addr = self.regs.push();
                self.write(bus, addr, self.regs.pc as u8);
            }
            MicroOp::PushStatusBrk => {
                let addr = self.regs.push();
                self.write(bus, addr, self.regs.p.to_byte_brk());
            }
            MicroOp::PushStatusIrq => {
                let addr = self.regs.push();
                self.write(bus, addr, self.regs.p.to_byte_irq());
            }
            MicroOp::PushA => {
                let addr = self.regs.push();
                self.write(bus, addr, self.regs.a);
            }
            MicroOp::PullStatus => {
                let addr = self.regs.pop();
                let val = self.read(bus, addr);
                // B has no storage in P.
                self.regs.p = Status::from_byte(val & !flags::B);
            }
            MicroOp::PullA => {
                let addr = self.regs.pop();
                self.regs.a = self.read(bus, addr);
                self.regs.p.update_nz(self.regs.a);
            }
            MicroOp::PullPcl => {
                let addr = self.regs.pop();
                self.data = self.read(bus, addr);
            }
            MicroOp::PullPch => {
                let addr = self.regs.pop();
                let hi = self.read(bus, addr);
                self.regs.pc = u16::from_le_bytes([self.data, hi]);
            }
            MicroOp::IncPc | MicroOp::BrkPad => {
                self.fetch_pc(bus);
            }
            MicroOp::JsrHi | MicroOp::JmpAbs => {
                let hi = self.read(bus, self.regs.pc);
                self.regs.pc = self.ad | u16::from(hi) << 8;
            }
            MicroOp::JmpIndirect => {
                // The pointer's high byte never carries into the next page.
                let hi = self.read(bus, next_in_page(self.ad));
                self.regs.pc = u16::from_le_bytes([self.data, hi]);
            }
            MicroOp::InterruptDummy => {
                self.read(bus, self.regs.pc);
            }
            MicroOp::VectorLo => {
                // An NMI edge during BRK or IRQ steals the vector fetch.
                if self.vector == IRQ_VECTOR && self.nmi_pending {
                    self.nmi_pending = false;
                    self.vector = NMI_VECTOR;
                }
                self.data = self.read(bus, self.vector);
                self.regs.p.set(I);
            }
            MicroOp::VectorHi => {
                let hi = self.read(bus, self.vector.wrapping_add(1));
                self.regs.pc = u16::from_le_bytes([self.data, hi]);
            }
            MicroOp::BranchOffset => {
                self.data = self.fetch_pc(bus);
                if !self.branch_taken() {
                    self.finish();
                }
            }
            MicroOp::BranchTaken => {
                // Polls like any instruction; the same-page IRQ delay is not modelled.
                self.read(bus, self.regs.pc);
                let target = self.regs.pc.wrapping_add_signed(i16::from(self.data as i8));
                if (target ^ self.regs.pc) & 0xFF00 == 0 {
                    self.regs.pc = target;
                    self.finish();
                } else {
                    self.ad = target;
                }
            }
            MicroOp::BranchFixup => {
                self.read(bus, (self.regs.pc & 0xFF00) | (self.ad & 0x00FF));
                self.regs.pc = self.ad;
            }
            MicroOp::Jam => {
                self.read(bus, 0xFFFF);
                warn!(
                    "6502 jammed by opcode {:?} at PC=${:04X}",
                    self.instr.op,
                    self.regs.pc.wrapping_sub(1)
                );
                self.phase = Phase::Jammed;
            }
        }
    }

    fn branch_taken(&self) -> bool {
        let p = self.regs.p;
        match self.instr.op {
            Op::Bpl => !p.is_set(N),
            Op::Bmi => p.is_set(N),
            Op::Bvc => !p.is_set(V),
            Op::Bvs => p.is_set(V),
            Op::Bcc => !p.is_set(C),
            Op::Bcs => p.is_set(C),
            Op::Bne => !p.is_set(Z),
            Op::Beq => p.is_set(Z),
            _ => false,
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Register, flag and accumulator-mode operations.
    fn implied(&mut self) {
        let r = &mut self.regs;
        match self.instr.op {
            Op::Tax => {
                r.x = r.a;
                r.p.update_nz(r.x);
            }
            Op::Tay => {
                r.y = r.a;
                r.p.update_nz(r.y);
            }
            Op::Txa => {
                r.a = r.x;
                r.p.update_nz(r.a);
            }
            Op::Tya => {
                r.a = r.y;
                r.p.update_nz(r.a);
            }
            Op::Tsx => {
                r.x = r.s;
                r.p.update_nz(r.x);
            }
            // TXS leaves flags alone.
            Op::Txs => r.s = r.x,
            Op::Inx => {
                r.x = r.x.wrapping_add(1);
                r.p.update_nz(r.x);
            }
            Op::Iny => {
                r.y = r.y.wrapping_add(1);
                r.p.update_nz(r.y);
            }
            Op::Dex => {
                r.x = r.x.wrapping_sub(1);
                r.p.update_nz(r.x);
            }
            Op::Dey => {
                r.y = r.y.wrapping_sub(1);
                r.p.update_nz(r.y);
            }
            Op::Clc => r.p.clear(C),
            Op::Sec => r.p.set(C),
            Op::Cli => r.p.clear(I),
            Op::Sei => r.p.set(I),
            Op::Clv => r.p.clear(V),
            Op::Cld => r.p.clear(D),
            Op::Sed => r.p.set(D),
            Op::Asl => r.a = alu::asl(&mut r.p, r.a),
            Op::Lsr => r.a = alu::lsr(&mut r.p, r.a),
            Op::Rol => r.a = alu::rol(&mut r.p, r.a),
            Op::Ror => r.a = alu::ror(&mut r.p, r.a),
            // NOP, and the first cycle of stack and control instructions.
            _ => {}
        }
    }

    /// Operations that consume a value read from memory or the operand.
    fn operate(&mut self, val: u8) {
        let bcd = self.bcd_enabled;
        let r = &mut self.regs;
        match self.instr.op {
            Op::Lda => {
                r.a = val;
                r.p.update_nz(val);
            }
            Op::Ldx => {
                r.x = val;
                r.p.update_nz(val);
            }
            Op::Ldy => {
                r.y = val;
                r.p.update_nz(val);
            }
            Op::Lax => {
                r.a = val;
                r.x = val;
                r.p.update_nz(val);
            }
            Op::Adc => alu::adc(r, bcd, val),
            Op::Sbc => alu::sbc(r, bcd, val),
            Op::And => {
                r.a &= val;
                r.p.update_nz(r.a);
            }
            Op::Ora => {
                r.a |= val;
                r.p.update_nz(r.a);
            }
            Op::Eor => {
                r.a ^= val;
                r.p.update_nz(r.a);
            }
            Op::Cmp => alu::compare(&mut r.p, r.a, val),
            Op::Cpx => alu::compare(&mut r.p, r.x, val),
            Op::Cpy => alu::compare(&mut r.p, r.y, val),
            Op::Bit => alu::bit(&mut r.p, r.a, val),
            Op::Anc => {
                r.a &= val;
                r.p.update_nz(r.a);
                r.p.set_if(C, r.a & 0x80 != 0);
            }
            Op::Alr => {
                r.a &= val;
                r.a = alu::lsr(&mut r.p, r.a);
            }
            Op::Arr => alu::arr(r, bcd, val),
            Op::Ane => {
                r.a = (r.a | 0xEE) & r.x & val;
                r.p.update_nz(r.a);
            }
            Op::Lxa => {
                r.a = (r.a | 0xEE) & val;
                r.x = r.a;
                r.p.update_nz(r.a);
            }
            Op::Sbx => {
                let ax = r.a & r.x;
                r.p.set_if(C, ax >= val);
                r.x = ax.wrapping_sub(val);
                r.p.update_nz(r.x);
            }
            Op::Las => {
                let v = val & r.s;
                r.a = v;
                r.x = v;
                r.s = v;
                r.p.update_nz(v);
            }
            _ => {}
        }
    }

    /// The modify step of a read-modify-write instruction.
    fn modify(&mut self, val: u8) -> u8 {
        let bcd = self.bcd_enabled;
        let r = &mut self.regs;
        match self.instr.op {
            Op::Asl => alu::asl(&mut r.p, val),
            Op::Lsr => alu::lsr(&mut r.p, val),
            Op::Rol => alu::rol(&mut r.p, val),
            Op::Ror => alu::ror(&mut r.p, val),
            Op::Inc => {
                let v = val.wrapping_add(1);
                r.p.update_nz(v);
                v
            }
            Op::Dec => {
                let v = val.wrapping_sub(1);
                r.p.update_nz(v);
                v
            }
            Op::Slo => {
                let v = alu::asl(&mut r.p, val);
                r.a |= v;
                r.p.update_nz(r.a);
                v
            }
            Op::Rla => {
                let v = alu::rol(&mut r.p, val);
                r.a &= v;
                r.p.update_nz(r.a);
                v
            }
            Op::Sre => {
                let v = alu::lsr(&mut r.p, val);
                r.a ^= v;
                r.p.update_nz(r.a);
                v
            }
            Op::Rra => {
                let v = alu::ror(&mut r.p, val);
                alu::adc(r, bcd, v);
                v
            }
            Op::Dcp => {
                let v = val.wrapping_sub(1);
                alu::compare(&mut r.p, r.a, v);
                v
            }
            Op::Isc => {
                let v = val.wrapping_add(1);
                alu::sbc(r, bcd, v);
                v
            }
            _ => val,
        }
    }

    /// Value for a store, adjusting `ad` for the unstable SH* stores.
    fn store_value(&mut self) -> u8 {
        let r = &mut self.regs;
        let src = match self.instr.op {
            Op::Sta => return r.a,
            Op::Stx => return r.x,
            Op::Sty => return r.y,
            Op::Sax => return r.a & r.x,
            Op::Sha => r.a & r.x,
            Op::Shx => r.x,
            Op::Shy => r.y,
            Op::Tas => {
                r.s = r.a & r.x;
                r.s
            }
            _ => return r.a,
        };

        // SHA/SHX/SHY/TAS AND the value with the base address high byte
        // plus one. On a page cross that value also replaces the high byte
        // of the address.
        let hi = (self.ad >> 8) as u8;
        let base_hi = if self.crossed { hi.wrapping_sub(1) } else { hi };
        let val = src & base_hi.wrapping_add(1);
        if self.crossed {
            self.ad = u16::from_le_bytes([self.ad as u8, val]);
        }
        val
    }
}

/// `addr + 1` with the carry out of the low byte dropped.
fn next_in_page(addr: u16) -> u16 {
    (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF)
}

// ============================================================================
// Trait implementations
// ============================================================================

impl fmt::Debug for M6502 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("M6502")
            .field("regs", &self.regs)
            .field("pins", &self.pins)
            .field("phase", &self.phase)
            .field("instr", &self.instr)
            .field("step", &self.step)
            .field("nmi_pending", &self.nmi_pending)
            .field("irq_latch", &self.irq_latch)
            .field("total", &self.total)
            .field("has_trap", &self.trap.is_some())
            .field("trap_id", &self.trap_id)
            .finish_non_exhaustive()
    }
}

impl Cpu for M6502 {
    type Registers = Registers;

    fn pc(&self) -> u32 {
        u32::from(self.regs.pc)
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.is_jammed()
    }

    fn is_instruction_complete(&self) -> bool {
        M6502::is_instruction_complete(self)
    }
}

/// Control lines reported by the `pins.lines` query, followed by the
/// port lines as one byte.
const LINES: [(u64, &str); 6] = [
    (Pins::RW, "rw"),
    (Pins::SYNC, "sync"),
    (Pins::IRQ, "irq"),
    (Pins::NMI, "nmi"),
    (Pins::RDY, "rdy"),
    (Pins::AEC, "aec"),
];

impl Observable for M6502 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.p.0.into()),
            "flags.c" | "c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" | "z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" | "i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" | "d" => Some(self.regs.p.is_set(D).into()),
            "flags.v" | "v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" | "n" => Some(self.regs.p.is_set(N).into()),
            "cycle" => Some(self.total.get().into()),
            "halted" => Some(self.is_jammed().into()),
            "irq_latch" => Some(self.irq_latch.into()),
            "nmi_pending" => Some(self.nmi_pending.into()),
            "pins" => Some(self.pins.0.into()),
            "pins.addr" => Some(self.pins.addr().into()),
            "pins.data" => Some(self.pins.data().into()),
            "pins.lines" => Some(Value::List(
                LINES
                    .iter()
                    .map(|&(line, name)| (name.to_string(), self.pins.is_set(line).into()))
                    .chain([("port".to_string(), self.pins.port().into())])
                    .collect(),
            )),
            _ => None,
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
        ]
    }
}
