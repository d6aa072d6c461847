//! Property coverage for flag tables, ALU primitives and the run loop.

#![allow(clippy::pedantic, clippy::nursery, clippy::cast_possible_truncation)]

use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

use proptest::prelude::*;
use z80_core::execute::alu::{adc16, adc8, daa, sbc16, sbc8};
use z80_core::{
    init_tables, FlatBus, Z80, FLAG_3, FLAG_5, FLAG_C, FLAG_H, FLAG_N, FLAG_PV, FLAG_S, FLAG_Z,
};

fn reference_adc8(a: u8, b: u8, carry: bool) -> (u8, u8) {
    let c = u16::from(carry);
    let wide = u16::from(a) + u16::from(b) + c;
    let result = wide as u8;
    let signed = i16::from(a as i8) + i16::from(b as i8) + c as i16;
    let mut f = result & (FLAG_S | FLAG_3 | FLAG_5);
    if result == 0 {
        f |= FLAG_Z;
    }
    if wide > 0xFF {
        f |= FLAG_C;
    }
    if !(-128..=127).contains(&signed) {
        f |= FLAG_PV;
    }
    if (a & 0x0F) + (b & 0x0F) + c as u8 > 0x0F {
        f |= FLAG_H;
    }
    (result, f)
}

fn reference_sbc8(a: u8, b: u8, carry: bool) -> (u8, u8) {
    let c = i16::from(carry);
    let wide = i16::from(a) - i16::from(b) - c;
    let result = wide as u8;
    let signed = i16::from(a as i8) - i16::from(b as i8) - c;
    let mut f = FLAG_N | (result & (FLAG_S | FLAG_3 | FLAG_5));
    if result == 0 {
        f |= FLAG_Z;
    }
    if wide < 0 {
        f |= FLAG_C;
    }
    if !(-128..=127).contains(&signed) {
        f |= FLAG_PV;
    }
    if i16::from(a & 0x0F) - i16::from(b & 0x0F) - c < 0 {
        f |= FLAG_H;
    }
    (result, f)
}

const fn is_bcd(value: u8) -> bool {
    value & 0x0F <= 9 && value >> 4 <= 9
}

fn from_bcd(value: u8) -> u16 {
    u16::from(value >> 4) * 10 + u16::from(value & 0x0F)
}

proptest! {
    #[test]
    fn property_parity_table_matches_popcount(value in any::<u8>()) {
        let tables = init_tables();
        let even = value.count_ones() % 2 == 0;
        prop_assert_eq!(tables.parity(value) & FLAG_PV != 0, even);
        prop_assert_eq!(tables.sz53(value) & FLAG_Z != 0, value == 0);
        prop_assert_eq!(tables.sz53(value) & FLAG_S, value & FLAG_S);
        prop_assert_eq!(tables.sz53p(value), tables.sz53(value) | tables.parity(value));
    }

    #[test]
    fn property_adc8_matches_reference(a in any::<u8>(), b in any::<u8>(), carry in any::<bool>()) {
        let tables = init_tables();
        let flags = if carry { FLAG_C } else { 0 };
        prop_assert_eq!(adc8(tables, a, b, flags), reference_adc8(a, b, carry));
    }

    #[test]
    fn property_sbc8_matches_reference(a in any::<u8>(), b in any::<u8>(), carry in any::<bool>()) {
        let tables = init_tables();
        let flags = if carry { FLAG_C } else { 0 };
        prop_assert_eq!(sbc8(tables, a, b, flags), reference_sbc8(a, b, carry));
    }

    #[test]
    fn property_adc16_and_sbc16_invert(hl in any::<u16>(), value in any::<u16>()) {
        let tables = init_tables();
        let (sum, f) = adc16(hl, value, 0);
        prop_assert_eq!(f & FLAG_C != 0, u32::from(hl) + u32::from(value) > 0xFFFF);
        prop_assert_eq!(f & FLAG_Z != 0, sum == 0);
        let (back, g) = sbc16(tables, sum, value, 0);
        prop_assert_eq!(back, hl);
        prop_assert_eq!(g & FLAG_N, FLAG_N);
    }

    #[test]
    fn property_daa_after_bcd_add_yields_decimal_sum(
        a in any::<u8>().prop_filter("bcd", |v| is_bcd(*v)),
        b in any::<u8>().prop_filter("bcd", |v| is_bcd(*v)),
    ) {
        let tables = init_tables();
        let (raw, f) = adc8(tables, a, b, 0);
        let (adjusted, g) = daa(tables, raw, f);
        let sum = from_bcd(a) + from_bcd(b);
        prop_assert!(is_bcd(adjusted));
        prop_assert_eq!(from_bcd(adjusted), sum % 100);
        prop_assert_eq!(g & FLAG_C != 0, sum >= 100);
    }

    #[test]
    fn property_every_instruction_takes_at_least_four_tstates(
        program in proptest::collection::vec(any::<u8>(), 1..8),
    ) {
        let mut cpu = Z80::new();
        let mut bus = FlatBus::with_program(0, &program);
        let elapsed = cpu.step(&mut bus);
        prop_assert!(elapsed >= 4);
        prop_assert_eq!(cpu.tstates(), elapsed);
    }
}
