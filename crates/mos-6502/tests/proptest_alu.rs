//! Property-based tests for the arithmetic unit.
//!
//! Binary-mode ADC/SBC are checked against plain integer arithmetic, and
//! decimal mode against a digit-by-digit BCD reference for valid operands.

use mos_6502::flags::{C, D, N, U, V, Z};
use mos_6502::{Registers, Status, alu};
use proptest::prelude::*;

fn regs(a: u8, p: u8) -> Registers {
    Registers {
        a,
        p: Status::from_byte(p),
        ..Registers::new()
    }
}

fn bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

fn from_bcd(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

proptest! {
    /// Property: binary ADC matches 9-bit addition, with V set exactly when
    /// two operands of the same sign produce a result of the other sign.
    #[test]
    fn prop_adc_binary_matches_integer_add(a in any::<u8>(), b in any::<u8>(), carry in any::<bool>()) {
        let mut r = regs(a, if carry { C } else { 0 });
        alu::adc(&mut r, true, b);

        let sum = u16::from(a) + u16::from(b) + u16::from(carry);
        let signed = i16::from(a as i8) + i16::from(b as i8) + i16::from(carry);
        prop_assert_eq!(r.a, sum as u8);
        prop_assert_eq!(r.p.is_set(C), sum > 0xFF);
        prop_assert_eq!(r.p.is_set(V), !(-128..=127).contains(&signed));
        prop_assert_eq!(r.p.is_set(Z), r.a == 0);
        prop_assert_eq!(r.p.is_set(N), r.a & 0x80 != 0);
    }

    /// Property: binary SBC is ADC of the one's complement.
    #[test]
    fn prop_sbc_is_adc_of_complement(a in any::<u8>(), b in any::<u8>(), carry in any::<bool>()) {
        let p = if carry { C } else { 0 };
        let mut sub = regs(a, p);
        alu::sbc(&mut sub, true, b);
        let mut add = regs(a, p);
        alu::adc(&mut add, true, !b);
        prop_assert_eq!(sub, add);
    }

    /// Property: decimal ADC on valid BCD operands gives the BCD sum.
    #[test]
    fn prop_adc_decimal_valid_bcd(x in 0u8..100, y in 0u8..100, carry in any::<bool>()) {
        let mut r = regs(bcd(x), D | if carry { C } else { 0 });
        alu::adc(&mut r, true, bcd(y));
        let sum = x + y + u8::from(carry);
        prop_assert_eq!(from_bcd(r.a), sum % 100);
        prop_assert_eq!(r.p.is_set(C), sum >= 100);
    }

    /// Property: decimal SBC on valid BCD operands gives the BCD difference.
    #[test]
    fn prop_sbc_decimal_valid_bcd(x in 0u8..100, y in 0u8..100, carry in any::<bool>()) {
        let mut r = regs(bcd(x), D | if carry { C } else { 0 });
        alu::sbc(&mut r, true, bcd(y));
        let diff = i16::from(x) - i16::from(y) - i16::from(!carry);
        prop_assert_eq!(i16::from(from_bcd(r.a)), diff.rem_euclid(100));
        prop_assert_eq!(r.p.is_set(C), diff >= 0);
    }

    /// Property: with BCD disabled, D changes nothing.
    #[test]
    fn prop_bcd_disabled_ignores_d(a in any::<u8>(), b in any::<u8>(), p in any::<u8>()) {
        let mut with_d = regs(a, p | D);
        alu::adc(&mut with_d, false, b);
        let mut without_d = regs(a, p & !D);
        alu::adc(&mut without_d, false, b);
        prop_assert_eq!(with_d.a, without_d.a);
        prop_assert_eq!(with_d.p.0 | D, without_d.p.0 | D);
    }

    /// Property: no ALU operation ever clears the unused bit.
    #[test]
    fn prop_unused_bit_survives(a in any::<u8>(), b in any::<u8>(), p in any::<u8>(), decimal in any::<bool>()) {
        for op in [alu::adc, alu::sbc, alu::arr] {
            let mut r = regs(a, p);
            op(&mut r, decimal, b);
            prop_assert!(r.p.is_set(U));
        }
    }
}
