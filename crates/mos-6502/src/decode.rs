//! Opcode decode table and per-instruction micro-op programs.
//!
//! Each opcode maps to an operation and an addressing mode. Together they
//! select a program: an ordered list of micro-ops, one bus cycle each, that
//! follows the opcode fetch. The CPU steps through the program with an index,
//! so it can stop at any cycle boundary and pick up again on the next tick.

/// Operation performed by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    // Loads and stores
    Lda,
    Ldx,
    Ldy,
    Sta,
    Stx,
    Sty,
    // ALU
    Adc,
    Sbc,
    And,
    Ora,
    Eor,
    Cmp,
    Cpx,
    Cpy,
    Bit,
    // Read-modify-write
    Asl,
    Lsr,
    Rol,
    Ror,
    Inc,
    Dec,
    // Register and flag ops
    Tax,
    Tay,
    Txa,
    Tya,
    Tsx,
    Txs,
    Inx,
    Iny,
    Dex,
    Dey,
    Clc,
    Sec,
    Cli,
    Sei,
    Clv,
    Cld,
    Sed,
    Nop,
    // Control flow and stack
    Brk,
    Jsr,
    Rts,
    Rti,
    JmpAbs,
    JmpInd,
    Pha,
    Php,
    Pla,
    Plp,
    Bpl,
    Bmi,
    Bvc,
    Bvs,
    Bcc,
    Bcs,
    Bne,
    Beq,
    // Undocumented
    Lax,
    Sax,
    Slo,
    Rla,
    Sre,
    Rra,
    Dcp,
    Isc,
    Anc,
    Alr,
    Arr,
    Ane,
    Lxa,
    Sbx,
    Las,
    Sha,
    Shx,
    Shy,
    Tas,
    Jam,
}

/// Addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Implied, or a stack/control instruction with its own program.
    Imp,
    /// Accumulator (shifts and rotates on A).
    Acc,
    Imm,
    Zp,
    Zpx,
    Zpy,
    Abs,
    Abx,
    Aby,
    /// `(abs)`, JMP only.
    Ind,
    /// `(zp,X)`
    Izx,
    /// `(zp),Y`
    Izy,
    /// Branch offset.
    Rel,
}

/// How an operation uses its effective address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
    Rmw,
}

impl Op {
    const fn access(self) -> Access {
        match self {
            Op::Sta | Op::Stx | Op::Sty | Op::Sax | Op::Sha | Op::Shx | Op::Shy | Op::Tas => {
                Access::Write
            }
            Op::Asl
            | Op::Lsr
            | Op::Rol
            | Op::Ror
            | Op::Inc
            | Op::Dec
            | Op::Slo
            | Op::Rla
            | Op::Sre
            | Op::Rra
            | Op::Dcp
            | Op::Isc => Access::Rmw,
            _ => Access::Read,
        }
    }
}

/// One bus cycle of an instruction.
///
/// `AD` is the effective-address latch, `DATA` the operand latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MicroOp {
    /// Read PC (discarded), then run an implied or accumulator operation.
    Implied,
    /// Read operand at PC, PC++, run the operation.
    Immediate,
    /// Read PC, PC++: AD = zero page address.
    FetchZp,
    /// Read PC, PC++: AD = low byte.
    FetchAbsLo,
    /// Read PC, PC++: AD |= high byte << 8.
    FetchAbsHi,
    /// Read PC, PC++: AD = (high:low) + X, note page crossing.
    FetchAbsHiX,
    /// Read PC, PC++: AD = (high:low) + Y, note page crossing.
    FetchAbsHiY,
    /// Dummy read at AD: AD = (AD + X) & $FF.
    IndexZpX,
    /// Dummy read at AD: AD = (AD + Y) & $FF.
    IndexZpY,
    /// Read AD: DATA = pointer low byte.
    PointerLo,
    /// Read AD + 1 without carry into the high byte: AD = pointer.
    PointerHi,
    /// As `PointerHi`, then AD += Y, note page crossing.
    PointerHiY,
    /// Dummy read at the un-fixed address. Takes no cycle when no page
    /// was crossed: the next read then hits the right address directly.
    FixupIfCrossed,
    /// Dummy read at the un-fixed address, always taken.
    Fixup,
    /// Read AD, run the operation.
    Read,
    /// Write the operation's value to AD.
    Write,
    /// Read AD: DATA = value to modify.
    RmwRead,
    /// Write DATA back unmodified, then modify it.
    RmwDummyWrite,
    /// Write the modified DATA.
    RmwWrite,
    /// Dummy read at the current stack address.
    StackDummy,
    PushPch,
    PushPcl,
    /// Push P with B set (BRK, PHP).
    PushStatusBrk,
    /// Push P with B clear (IRQ, NMI).
    PushStatusIrq,
    PushA,
    PullStatus,
    PullA,
    PullPcl,
    /// Pull PC high byte: PC = high:low.
    PullPch,
    /// Read PC, PC++ (last cycle of RTS).
    IncPc,
    /// Read target high byte at PC: PC = target (last cycle of JSR).
    JsrHi,
    /// Read target high byte at PC: PC = target (JMP abs).
    JmpAbs,
    /// Read AD + 1 without page carry: PC = target (JMP (ind)).
    JmpIndirect,
    /// Read PC, PC++ (BRK's padding byte).
    BrkPad,
    /// Read PC, no increment (first cycles of IRQ/NMI).
    InterruptDummy,
    /// Read vector low byte, set I.
    VectorLo,
    /// Read vector high byte: PC = vector target.
    VectorHi,
    /// Read offset at PC, PC++. Ends the instruction if not taken.
    BranchOffset,
    /// Dummy read at PC, add offset. Ends the instruction if no page cross.
    BranchTaken,
    /// Dummy read at the un-fixed target, PC = target.
    BranchFixup,
    /// Lock up. The CPU never leaves this micro-op until reset.
    Jam,
}

use MicroOp as M;

const IMPLIED: &[MicroOp] = &[M::Implied];
const IMMEDIATE: &[MicroOp] = &[M::Immediate];

const ZP_READ: &[MicroOp] = &[M::FetchZp, M::Read];
const ZP_WRITE: &[MicroOp] = &[M::FetchZp, M::Write];
const ZP_RMW: &[MicroOp] = &[M::FetchZp, M::RmwRead, M::RmwDummyWrite, M::RmwWrite];

const ZPX_READ: &[MicroOp] = &[M::FetchZp, M::IndexZpX, M::Read];
const ZPX_WRITE: &[MicroOp] = &[M::FetchZp, M::IndexZpX, M::Write];
const ZPX_RMW: &[MicroOp] = &[
    M::FetchZp,
    M::IndexZpX,
    M::RmwRead,
    M::RmwDummyWrite,
    M::RmwWrite,
];

const ZPY_READ: &[MicroOp] = &[M::FetchZp, M::IndexZpY, M::Read];
const ZPY_WRITE: &[MicroOp] = &[M::FetchZp, M::IndexZpY, M::Write];

const ABS_READ: &[MicroOp] = &[M::FetchAbsLo, M::FetchAbsHi, M::Read];
const ABS_WRITE: &[MicroOp] = &[M::FetchAbsLo, M::FetchAbsHi, M::Write];
const ABS_RMW: &[MicroOp] = &[
    M::FetchAbsLo,
    M::FetchAbsHi,
    M::RmwRead,
    M::RmwDummyWrite,
    M::RmwWrite,
];

const ABX_READ: &[MicroOp] = &[M::FetchAbsLo, M::FetchAbsHiX, M::FixupIfCrossed, M::Read];
const ABX_WRITE: &[MicroOp] = &[M::FetchAbsLo, M::FetchAbsHiX, M::Fixup, M::Write];
const ABX_RMW: &[MicroOp] = &[
    M::FetchAbsLo,
    M::FetchAbsHiX,
    M::Fixup,
    M::RmwRead,
    M::RmwDummyWrite,
    M::RmwWrite,
];

const ABY_READ: &[MicroOp] = &[M::FetchAbsLo, M::FetchAbsHiY, M::FixupIfCrossed, M::Read];
const ABY_WRITE: &[MicroOp] = &[M::FetchAbsLo, M::FetchAbsHiY, M::Fixup, M::Write];
const ABY_RMW: &[MicroOp] = &[
    M::FetchAbsLo,
    M::FetchAbsHiY,
    M::Fixup,
    M::RmwRead,
    M::RmwDummyWrite,
    M::RmwWrite,
];

const IZX_READ: &[MicroOp] = &[M::FetchZp, M::IndexZpX, M::PointerLo, M::PointerHi, M::Read];
const IZX_WRITE: &[MicroOp] = &[M::FetchZp, M::IndexZpX, M::PointerLo, M::PointerHi, M::Write];
const IZX_RMW: &[MicroOp] = &[
    M::FetchZp,
    M::IndexZpX,
    M::PointerLo,
    M::PointerHi,
    M::RmwRead,
    M::RmwDummyWrite,
    M::RmwWrite,
];

const IZY_READ: &[MicroOp] = &[
    M::FetchZp,
    M::PointerLo,
    M::PointerHiY,
    M::FixupIfCrossed,
    M::Read,
];
const IZY_WRITE: &[MicroOp] = &[M::FetchZp, M::PointerLo, M::PointerHiY, M::Fixup, M::Write];
const IZY_RMW: &[MicroOp] = &[
    M::FetchZp,
    M::PointerLo,
    M::PointerHiY,
    M::Fixup,
    M::RmwRead,
    M::RmwDummyWrite,
    M::RmwWrite,
];

const BRK: &[MicroOp] = &[
    M::BrkPad,
    M::PushPch,
    M::PushPcl,
    M::PushStatusBrk,
    M::VectorLo,
    M::VectorHi,
];
const JSR: &[MicroOp] = &[M::FetchAbsLo, M::StackDummy, M::PushPch, M::PushPcl, M::JsrHi];
const RTS: &[MicroOp] = &[M::Implied, M::StackDummy, M::PullPcl, M::PullPch, M::IncPc];
const RTI: &[MicroOp] = &[M::Implied, M::StackDummy, M::PullStatus, M::PullPcl, M::PullPch];
const JMP_ABS: &[MicroOp] = &[M::FetchAbsLo, M::JmpAbs];
const JMP_IND: &[MicroOp] = &[M::FetchAbsLo, M::FetchAbsHi, M::PointerLo, M::JmpIndirect];
const PHA: &[MicroOp] = &[M::Implied, M::PushA];
const PHP: &[MicroOp] = &[M::Implied, M::PushStatusBrk];
const PLA: &[MicroOp] = &[M::Implied, M::StackDummy, M::PullA];
const PLP: &[MicroOp] = &[M::Implied, M::StackDummy, M::PullStatus];
const BRANCH: &[MicroOp] = &[M::BranchOffset, M::BranchTaken, M::BranchFixup];
const JAM: &[MicroOp] = &[M::Jam];

/// IRQ and NMI response. Runs in place of an opcode fetch.
pub(crate) const INTERRUPT: &[MicroOp] = &[
    M::InterruptDummy,
    M::InterruptDummy,
    M::PushPch,
    M::PushPcl,
    M::PushStatusIrq,
    M::VectorLo,
    M::VectorHi,
];

/// A decoded opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Instr {
    pub op: Op,
    pub mode: Mode,
}

impl Instr {
    /// The micro-op program that follows the opcode fetch.
    pub(crate) const fn program(self) -> &'static [MicroOp] {
        match self.op {
            Op::Brk => BRK,
            Op::Jsr => JSR,
            Op::Rts => RTS,
            Op::Rti => RTI,
            Op::JmpAbs => JMP_ABS,
            Op::JmpInd => JMP_IND,
            Op::Pha => PHA,
            Op::Php => PHP,
            Op::Pla => PLA,
            Op::Plp => PLP,
            Op::Jam => JAM,
            Op::Bpl | Op::Bmi | Op::Bvc | Op::Bvs | Op::Bcc | Op::Bcs | Op::Bne | Op::Beq => {
                BRANCH
            }
            _ => match (self.mode, self.op.access()) {
                (Mode::Imp | Mode::Acc | Mode::Ind | Mode::Rel, _) => IMPLIED,
                (Mode::Imm, _) => IMMEDIATE,
                (Mode::Zp, Access::Read) => ZP_READ,
                (Mode::Zp, Access::Write) => ZP_WRITE,
                (Mode::Zp, Access::Rmw) => ZP_RMW,
                (Mode::Zpx, Access::Read) => ZPX_READ,
                (Mode::Zpx, Access::Write) => ZPX_WRITE,
                (Mode::Zpx, Access::Rmw) => ZPX_RMW,
                // No RMW opcode uses zp,Y.
                (Mode::Zpy, Access::Read | Access::Rmw) => ZPY_READ,
                (Mode::Zpy, Access::Write) => ZPY_WRITE,
                (Mode::Abs, Access::Read) => ABS_READ,
                (Mode::Abs, Access::Write) => ABS_WRITE,
                (Mode::Abs, Access::Rmw) => ABS_RMW,
                (Mode::Abx, Access::Read) => ABX_READ,
                (Mode::Abx, Access::Write) => ABX_WRITE,
                (Mode::Abx, Access::Rmw) => ABX_RMW,
                (Mode::Aby, Access::Read) => ABY_READ,
                (Mode::Aby, Access::Write) => ABY_WRITE,
                (Mode::Aby, Access::Rmw) => ABY_RMW,
                (Mode::Izx, Access::Read) => IZX_READ,
                (Mode::Izx, Access::Write) => IZX_WRITE,
                (Mode::Izx, Access::Rmw) => IZX_RMW,
                (Mode::Izy, Access::Read) => IZY_READ,
                (Mode::Izy, Access::Write) => IZY_WRITE,
                (Mode::Izy, Access::Rmw) => IZY_RMW,
            },
        }
    }
}

const fn i(op: Op, mode: Mode) -> Instr {
    Instr { op, mode }
}

use Mode::{Abs, Abx, Aby, Acc, Imm, Imp, Ind, Izx, Izy, Rel, Zp, Zpx, Zpy};
use Op::*;

/// NMOS 6502 opcode matrix, documented and undocumented.
#[rustfmt::skip]
pub(crate) static OPCODES: [Instr; 256] = [
    // $00
    i(Brk, Imp), i(Ora, Izx), i(Jam, Imp), i(Slo, Izx), i(Nop, Zp),  i(Ora, Zp),  i(Asl, Zp),  i(Slo, Zp),
    i(Php, Imp), i(Ora, Imm), i(Asl, Acc), i(Anc, Imm), i(Nop, Abs), i(Ora, Abs), i(Asl, Abs), i(Slo, Abs),
    // $10
    i(Bpl, Rel), i(Ora, Izy), i(Jam, Imp), i(Slo, Izy), i(Nop, Zpx), i(Ora, Zpx), i(Asl, Zpx), i(Slo, Zpx),
    i(Clc, Imp), i(Ora, Aby), i(Nop, Imp), i(Slo, Aby), i(Nop, Abx), i(Ora, Abx), i(Asl, Abx), i(Slo, Abx),
    // $20
    i(Jsr, Abs), i(And, Izx), i(Jam, Imp), i(Rla, Izx), i(Bit, Zp),  i(And, Zp),  i(Rol, Zp),  i(Rla, Zp),
    i(Plp, Imp), i(And, Imm), i(Rol, Acc), i(Anc, Imm), i(Bit, Abs), i(And, Abs), i(Rol, Abs), i(Rla, Abs),
    // $30
    i(Bmi, Rel), i(And, Izy), i(Jam, Imp), i(Rla, Izy), i(Nop, Zpx), i(And, Zpx), i(Rol, Zpx), i(Rla, Zpx),
    i(Sec, Imp), i(And, Aby), i(Nop, Imp), i(Rla, Aby), i(Nop, Abx), i(And, Abx), i(Rol, Abx), i(Rla, Abx),
    // $40
    i(Rti, Imp), i(Eor, Izx), i(Jam, Imp), i(Sre, Izx), i(Nop, Zp),  i(Eor, Zp),  i(Lsr, Zp),  i(Sre, Zp),
    i(Pha, Imp), i(Eor, Imm), i(Lsr, Acc), i(Alr, Imm), i(JmpAbs, Abs), i(Eor, Abs), i(Lsr, Abs), i(Sre, Abs),
    // $50
    i(Bvc, Rel), i(Eor, Izy), i(Jam, Imp), i(Sre, Izy), i(Nop, Zpx), i(Eor, Zpx), i(Lsr, Zpx), i(Sre, Zpx),
    i(Cli, Imp), i(Eor, Aby), i(Nop, Imp), i(Sre, Aby), i(Nop, Abx), i(Eor, Abx), i(Lsr, Abx), i(Sre, Abx),
    // $60
    i(Rts, Imp), i(Adc, Izx), i(Jam, Imp), i(Rra, Izx), i(Nop, Zp),  i(Adc, Zp),  i(Ror, Zp),  i(Rra, Zp),
    i(Pla, Imp), i(Adc, Imm), i(Ror, Acc), i(Arr, Imm), i(JmpInd, Ind), i(Adc, Abs), i(Ror, Abs), i(Rra, Abs),
    // $70
    i(Bvs, Rel), i(Adc, Izy), i(Jam, Imp), i(Rra, Izy), i(Nop, Zpx), i(Adc, Zpx), i(Ror, Zpx), i(Rra, Zpx),
    i(Sei, Imp), i(Adc, Aby), i(Nop, Imp), i(Rra, Aby), i(Nop, Abx), i(Adc, Abx), i(Ror, Abx), i(Rra, Abx),
    // $80
    i(Nop, Imm), i(Sta, Izx), i(Nop, Imm), i(Sax, Izx), i(Sty, Zp),  i(Sta, Zp),  i(Stx, Zp),  i(Sax, Zp),
    i(Dey, Imp), i(Nop, Imm), i(Txa, Imp), i(Ane, Imm), i(Sty, Abs), i(Sta, Abs), i(Stx, Abs), i(Sax, Abs),
    // $90
    i(Bcc, Rel), i(Sta, Izy), i(Jam, Imp), i(Sha, Izy), i(Sty, Zpx), i(Sta, Zpx), i(Stx, Zpy), i(Sax, Zpy),
    i(Tya, Imp), i(Sta, Aby), i(Txs, Imp), i(Tas, Aby), i(Shy, Abx), i(Sta, Abx), i(Shx, Aby), i(Sha, Aby),
    // $A0
    i(Ldy, Imm), i(Lda, Izx), i(Ldx, Imm), i(Lax, Izx), i(Ldy, Zp),  i(Lda, Zp),  i(Ldx, Zp),  i(Lax, Zp),
    i(Tay, Imp), i(Lda, Imm), i(Tax, Imp), i(Lxa, Imm), i(Ldy, Abs), i(Lda, Abs), i(Ldx, Abs), i(Lax, Abs),
    // $B0
    i(Bcs, Rel), i(Lda, Izy), i(Jam, Imp), i(Lax, Izy), i(Ldy, Zpx), i(Lda, Zpx), i(Ldx, Zpy), i(Lax, Zpy),
    i(Clv, Imp), i(Lda, Aby), i(Tsx, Imp), i(Las, Aby), i(Ldy, Abx), i(Lda, Abx), i(Ldx, Aby), i(Lax, Aby),
    // $C0
    i(Cpy, Imm), i(Cmp, Izx), i(Nop, Imm), i(Dcp, Izx), i(Cpy, Zp),  i(Cmp, Zp),  i(Dec, Zp),  i(Dcp, Zp),
    i(Iny, Imp), i(Cmp, Imm), i(Dex, Imp), i(Sbx, Imm), i(Cpy, Abs), i(Cmp, Abs), i(Dec, Abs), i(Dcp, Abs),
    // $D0
    i(Bne, Rel), i(Cmp, Izy), i(Jam, Imp), i(Dcp, Izy), i(Nop, Zpx), i(Cmp, Zpx), i(Dec, Zpx), i(Dcp, Zpx),
    i(Cld, Imp), i(Cmp, Aby), i(Nop, Imp), i(Dcp, Aby), i(Nop, Abx), i(Cmp, Abx), i(Dec, Abx), i(Dcp, Abx),
    // $E0
    i(Cpx, Imm), i(Sbc, Izx), i(Nop, Imm), i(Isc, Izx), i(Cpx, Zp),  i(Sbc, Zp),  i(Inc, Zp),  i(Isc, Zp),
    i(Inx, Imp), i(Sbc, Imm), i(Nop, Imp), i(Sbc, Imm), i(Cpx, Abs), i(Sbc, Abs), i(Inc, Abs), i(Isc, Abs),
    // $F0
    i(Beq, Rel), i(Sbc, Izy), i(Jam, Imp), i(Isc, Izy), i(Nop, Zpx), i(Sbc, Zpx), i(Inc, Zpx), i(Isc, Zpx),
    i(Sed, Imp), i(Sbc, Aby), i(Nop, Imp), i(Isc, Aby), i(Nop, Abx), i(Sbc, Abx), i(Inc, Abx), i(Isc, Abx),
];
