//! Arithmetic primitives.
//!
//! These touch only A and P. `bcd` is the CPU's decimal-mode-enabled
//! setting; decimal arithmetic happens only when it is true *and* D is set
//! (the 2A03 in the NES, for example, has the D flag but no BCD adder).
//!
//! The decimal paths reproduce NMOS behaviour, including the flag values and
//! results for non-BCD operands.

use crate::Registers;
use crate::flags::{C, D, N, V, Z};
use crate::Status;

fn decimal(regs: &Registers, bcd: bool) -> bool {
    bcd && regs.p.is_set(D)
}

/// ADC: A = A + operand + C.
pub fn adc(regs: &mut Registers, bcd: bool, val: u8) {
    if decimal(regs, bcd) {
        adc_decimal(regs, val);
    } else {
        adc_binary(regs, val);
    }
}

fn adc_binary(regs: &mut Registers, val: u8) {
    let a = regs.a;
    let sum = u16::from(a) + u16::from(val) + u16::from(regs.p.is_set(C));
    let result = sum as u8;
    regs.p.set_if(C, sum > 0xFF);
    regs.p.set_if(V, !(a ^ val) & (a ^ result) & 0x80 != 0);
    regs.p.update_nz(result);
    regs.a = result;
}

fn adc_decimal(regs: &mut Registers, val: u8) {
    let a = regs.a;
    let c = u8::from(regs.p.is_set(C));
    regs.p.clear(N | V | Z | C);

    let mut al = (a & 0x0F) + (val & 0x0F) + c;
    if al > 9 {
        al += 6;
    }
    let mut ah = (a >> 4) + (val >> 4) + u8::from(al > 0x0F);

    // Z comes from the binary sum, N and V from the uncorrected high nibble.
    if a.wrapping_add(val).wrapping_add(c) == 0 {
        regs.p.set(Z);
    } else if ah & 0x08 != 0 {
        regs.p.set(N);
    }
    if !(a ^ val) & (a ^ (ah << 4)) & 0x80 != 0 {
        regs.p.set(V);
    }
    if ah > 9 {
        ah += 6;
    }
    if ah > 15 {
        regs.p.set(C);
    }
    regs.a = (ah << 4) | (al & 0x0F);
}

/// SBC: A = A - operand - !C.
pub fn sbc(regs: &mut Registers, bcd: bool, val: u8) {
    if decimal(regs, bcd) {
        sbc_decimal(regs, val);
    } else {
        sbc_binary(regs, val);
    }
}

fn sbc_binary(regs: &mut Registers, val: u8) {
    let a = regs.a;
    let borrow = u16::from(!regs.p.is_set(C));
    let diff = u16::from(a).wrapping_sub(u16::from(val)).wrapping_sub(borrow);
    let result = diff as u8;
    regs.p.set_if(C, diff & 0xFF00 == 0);
    regs.p.set_if(V, (a ^ val) & (a ^ result) & 0x80 != 0);
    regs.p.update_nz(result);
    regs.a = result;
}

fn sbc_decimal(regs: &mut Registers, val: u8) {
    let a = regs.a;
    let borrow = u8::from(!regs.p.is_set(C));
    regs.p.clear(N | V | Z | C);

    // All flags come from the binary difference.
    let diff = u16::from(a)
        .wrapping_sub(u16::from(val))
        .wrapping_sub(u16::from(borrow));
    let mut al = (a & 0x0F).wrapping_sub(val & 0x0F).wrapping_sub(borrow);
    if (al as i8) < 0 {
        al = al.wrapping_sub(6);
    }
    let mut ah = (a >> 4)
        .wrapping_sub(val >> 4)
        .wrapping_sub(u8::from((al as i8) < 0));

    if diff as u8 == 0 {
        regs.p.set(Z);
    } else if diff & 0x80 != 0 {
        regs.p.set(N);
    }
    if (a ^ val) & (a ^ diff as u8) & 0x80 != 0 {
        regs.p.set(V);
    }
    if diff & 0xFF00 == 0 {
        regs.p.set(C);
    }
    if ah & 0x80 != 0 {
        ah = ah.wrapping_sub(6);
    }
    regs.a = (ah << 4) | (al & 0x0F);
}

/// ARR (undocumented): A &= operand, then rotate A right through carry.
///
/// C and V come out of the adder that the opcode half-enables, so they
/// follow bits 6 and 5 of the rotated value rather than the shifted-out bit.
pub fn arr(regs: &mut Registers, bcd: bool, val: u8) {
    regs.a &= val;
    let and = regs.a;
    let carry_in = if regs.p.is_set(C) { 0x80 } else { 0 };
    let rotated = (and >> 1) | carry_in;
    regs.p.clear(N | V | Z | C);
    regs.p.update_nz(rotated);

    if decimal(regs, bcd) {
        if (rotated ^ and) & 0x40 != 0 {
            regs.p.set(V);
        }
        let mut result = rotated;
        if and & 0x0F >= 0x05 {
            result = (result.wrapping_add(6) & 0x0F) | (result & 0xF0);
        }
        if and & 0xF0 >= 0x50 {
            result = result.wrapping_add(0x60);
            regs.p.set(C);
        }
        regs.a = result;
    } else {
        if rotated & 0x40 != 0 {
            regs.p.set(V | C);
        }
        if rotated & 0x20 != 0 {
            regs.p.0 ^= V;
        }
        regs.a = rotated;
    }
}

/// Compare a register against an operand (CMP/CPX/CPY/DCP).
pub(crate) fn compare(p: &mut Status, reg: u8, val: u8) {
    p.set_if(C, reg >= val);
    p.update_nz(reg.wrapping_sub(val));
}

pub(crate) fn asl(p: &mut Status, val: u8) -> u8 {
    p.set_if(C, val & 0x80 != 0);
    let result = val << 1;
    p.update_nz(result);
    result
}

pub(crate) fn lsr(p: &mut Status, val: u8) -> u8 {
    p.set_if(C, val & 0x01 != 0);
    let result = val >> 1;
    p.update_nz(result);
    result
}

pub(crate) fn rol(p: &mut Status, val: u8) -> u8 {
    let carry = u8::from(p.is_set(C));
    p.set_if(C, val & 0x80 != 0);
    let result = (val << 1) | carry;
    p.update_nz(result);
    result
}

pub(crate) fn ror(p: &mut Status, val: u8) -> u8 {
    let carry = if p.is_set(C) { 0x80 } else { 0 };
    p.set_if(C, val & 0x01 != 0);
    let result = (val >> 1) | carry;
    p.update_nz(result);
    result
}

pub(crate) fn bit(p: &mut Status, a: u8, val: u8) {
    p.set_if(Z, a & val == 0);
    p.set_if(N, val & 0x80 != 0);
    p.set_if(V, val & 0x40 != 0);
}
