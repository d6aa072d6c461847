//! Flag-computing arithmetic and logic primitives.
//!
//! Every function is pure: it takes the operands and the incoming `F`
//! where it matters and returns the result together with the new `F`.

use crate::flags::{
    FlagTables, FLAG_35, FLAG_3, FLAG_5, FLAG_C, FLAG_H, FLAG_N, FLAG_PV, FLAG_S, FLAG_S35,
    FLAG_Z,
};

/// Flags `RLCA`-style accumulator rotates and `SCF`/`CCF` keep.
const KEEP_SZP: u8 = FLAG_PV | FLAG_Z | FLAG_S;

/// `ADC A,b`.
#[must_use]
pub fn adc8(tables: &FlagTables, a: u8, b: u8, flags: u8) -> (u8, u8) {
    let carry = u16::from(flags & FLAG_C);
    let wide = u16::from(a) + u16::from(b) + carry;
    let result = wide as u8;
    let mut f = tables.sz53(result);
    if wide > 0xFF {
        f |= FLAG_C;
    }
    if (a ^ !b) & (a ^ result) & 0x80 != 0 {
        f |= FLAG_PV;
    }
    if u16::from(a & 0x0F) + u16::from(b & 0x0F) + carry >= 0x10 {
        f |= FLAG_H;
    }
    (result, f)
}

/// `SBC A,b`.
#[must_use]
pub fn sbc8(tables: &FlagTables, a: u8, b: u8, flags: u8) -> (u8, u8) {
    let carry = i32::from(flags & FLAG_C);
    let wide = i32::from(a) - i32::from(b) - carry;
    let result = wide as u8;
    let mut f = FLAG_N | tables.sz53(result);
    if wide < 0 {
        f |= FLAG_C;
    }
    if (a ^ b) & (a ^ result) & 0x80 != 0 {
        f |= FLAG_PV;
    }
    if i32::from(a & 0x0F) - i32::from(b & 0x0F) - carry < 0 {
        f |= FLAG_H;
    }
    (result, f)
}

/// `ADD A,b`.
#[must_use]
pub fn add8(tables: &FlagTables, a: u8, b: u8) -> (u8, u8) {
    adc8(tables, a, b, 0)
}

/// `SUB b`.
#[must_use]
pub fn sub8(tables: &FlagTables, a: u8, b: u8) -> (u8, u8) {
    sbc8(tables, a, b, 0)
}

/// `CP b`: subtraction flags, undocumented bits taken from the operand.
#[must_use]
pub fn cp8(a: u8, b: u8) -> u8 {
    let result = a.wrapping_sub(b);
    let mut f = FLAG_N | (result & FLAG_S) | (b & FLAG_35);
    if result == 0 {
        f |= FLAG_Z;
    }
    if a < b {
        f |= FLAG_C;
    }
    if (a ^ b) & (a ^ result) & 0x80 != 0 {
        f |= FLAG_PV;
    }
    if a & 0x0F < b & 0x0F {
        f |= FLAG_H;
    }
    f
}

/// `AND b`.
#[must_use]
pub fn and8(tables: &FlagTables, a: u8, b: u8) -> (u8, u8) {
    let result = a & b;
    (result, tables.sz53p(result) | FLAG_H)
}

/// `OR b`.
#[must_use]
pub fn or8(tables: &FlagTables, a: u8, b: u8) -> (u8, u8) {
    let result = a | b;
    (result, tables.sz53p(result))
}

/// `XOR b`.
#[must_use]
pub fn xor8(tables: &FlagTables, a: u8, b: u8) -> (u8, u8) {
    let result = a ^ b;
    (result, tables.sz53p(result))
}

/// Applies ALU operation `op` (`ADD ADC SUB SBC AND XOR OR CP`) to `A`.
#[must_use]
pub fn alu_op(tables: &FlagTables, op: u8, a: u8, b: u8, flags: u8) -> (u8, u8) {
    match op & 0x07 {
        0 => add8(tables, a, b),
        1 => adc8(tables, a, b, flags),
        2 => sub8(tables, a, b),
        3 => sbc8(tables, a, b, flags),
        4 => and8(tables, a, b),
        5 => xor8(tables, a, b),
        6 => or8(tables, a, b),
        _ => (a, cp8(a, b)),
    }
}

/// `INC r`; carry preserved.
#[must_use]
pub fn inc8(tables: &FlagTables, value: u8, flags: u8) -> (u8, u8) {
    let result = value.wrapping_add(1);
    let mut f = (flags & FLAG_C) | tables.sz53(result);
    if value == 0x7F {
        f |= FLAG_PV;
    }
    if result & 0x0F == 0 {
        f |= FLAG_H;
    }
    (result, f)
}

/// `DEC r`; carry preserved.
#[must_use]
pub fn dec8(tables: &FlagTables, value: u8, flags: u8) -> (u8, u8) {
    let result = value.wrapping_sub(1);
    let mut f = (flags & FLAG_C) | FLAG_N | tables.sz53(result);
    if value == 0x80 {
        f |= FLAG_PV;
    }
    if value & 0x0F == 0 {
        f |= FLAG_H;
    }
    (result, f)
}

/// `RLCA`.
#[must_use]
pub const fn rlca(a: u8, flags: u8) -> (u8, u8) {
    let result = a.rotate_left(1);
    (result, (result & FLAG_C) | (result & FLAG_35) | (flags & KEEP_SZP))
}

/// `RRCA`.
#[must_use]
pub const fn rrca(a: u8, flags: u8) -> (u8, u8) {
    let result = a.rotate_right(1);
    (result, (a & FLAG_C) | (result & FLAG_35) | (flags & KEEP_SZP))
}

/// `RLA`.
#[must_use]
pub const fn rla(a: u8, flags: u8) -> (u8, u8) {
    let result = (a << 1) | (flags & FLAG_C);
    (result, (a >> 7) | (result & FLAG_35) | (flags & KEEP_SZP))
}

/// `RRA`.
#[must_use]
pub const fn rra(a: u8, flags: u8) -> (u8, u8) {
    let result = (a >> 1) | ((flags & FLAG_C) << 7);
    (result, (a & FLAG_C) | (result & FLAG_35) | (flags & KEEP_SZP))
}

/// `CB`-group rotate or shift selected by `op` (`RLC RRC RL RR SLA SRA SLL
/// SRL`).
#[must_use]
pub fn shift_op(tables: &FlagTables, op: u8, value: u8, flags: u8) -> (u8, u8) {
    let (result, carry) = match op & 0x07 {
        0 => (value.rotate_left(1), value >> 7),
        1 => (value.rotate_right(1), value & 0x01),
        2 => ((value << 1) | (flags & FLAG_C), value >> 7),
        3 => ((value >> 1) | ((flags & FLAG_C) << 7), value & 0x01),
        4 => (value << 1, value >> 7),
        5 => ((value >> 1) | (value & 0x80), value & 0x01),
        6 => ((value << 1) | 0x01, value >> 7),
        _ => (value >> 1, value & 0x01),
    };
    (result, tables.sz53p(result) | carry)
}

/// `BIT n,value`. Indirect forms pass the high byte of `MEMPTR`, which
/// supplies the undocumented bits instead of the operand.
#[must_use]
pub const fn bit(bit: u8, value: u8, flags: u8, memptr_high: Option<u8>) -> u8 {
    let mask = 1 << (bit & 0x07);
    let mut f = FLAG_H | (flags & FLAG_C) | (value & FLAG_35);
    if value & mask == 0 {
        f |= FLAG_PV | FLAG_Z;
    }
    if bit & 0x07 == 7 {
        f |= value & FLAG_S;
    }
    if let Some(high) = memptr_high {
        f = (f & !FLAG_35) | (high & FLAG_35);
    }
    f
}

/// `ADD HL,value`; sign, zero and parity are preserved.
#[must_use]
pub fn add16(hl: u16, value: u16, flags: u8) -> (u16, u8) {
    const HALF_CARRY: [u8; 8] = [0, FLAG_H, FLAG_H, FLAG_H, 0, 0, 0, FLAG_H];
    let wide = u32::from(value) + u32::from(hl);
    let result = wide as u16;
    let lookup = ((value & 0x0800) >> 11) | ((hl & 0x0800) >> 10) | ((result & 0x0800) >> 9);
    let mut f = (flags & KEEP_SZP) | ((result >> 8) as u8 & FLAG_35) | HALF_CARRY[lookup as usize];
    if wide > 0xFFFF {
        f |= FLAG_C;
    }
    (result, f)
}

/// `ADC HL,value`.
#[must_use]
pub fn adc16(hl: u16, value: u16, flags: u8) -> (u16, u8) {
    let carry = u32::from(flags & FLAG_C);
    let wide = u32::from(value) + u32::from(hl) + carry;
    let result = wide as u16;
    let mut f = (result >> 8) as u8 & FLAG_S35;
    if result == 0 {
        f |= FLAG_Z;
    }
    if wide > 0xFFFF {
        f |= FLAG_C;
    }
    if (u32::from(value) ^ u32::from(!hl)) & (u32::from(value) ^ wide) & 0x8000 != 0 {
        f |= FLAG_PV;
    }
    if u32::from(value & 0x0FFF) + u32::from(hl & 0x0FFF) + carry >= 0x1000 {
        f |= FLAG_H;
    }
    (result, f)
}

/// `SBC HL,value`, computed as two chained byte subtractions.
#[must_use]
pub fn sbc16(tables: &FlagTables, hl: u16, value: u16, flags: u8) -> (u16, u8) {
    let [hl_lo, hl_hi] = hl.to_le_bytes();
    let [value_lo, value_hi] = value.to_le_bytes();
    let (lo, f) = sbc8(tables, hl_lo, value_lo, flags);
    let (hi, f) = sbc8(tables, hl_hi, value_hi, f);
    let result = u16::from_le_bytes([lo, hi]);
    let f = if result == 0 { f | FLAG_Z } else { f & !FLAG_Z };
    (result, f)
}

/// `DAA`.
#[must_use]
pub fn daa(tables: &FlagTables, a: u8, flags: u8) -> (u8, u8) {
    let mut correction = 0;
    let mut carry = flags & FLAG_C;
    if flags & FLAG_H != 0 || a & 0x0F > 9 {
        correction = 0x06;
    }
    if carry != 0 || a > 0x99 {
        correction |= 0x60;
    }
    if a > 0x99 {
        carry = FLAG_C;
    }
    let (result, f) = if flags & FLAG_N != 0 {
        sub8(tables, a, correction)
    } else {
        add8(tables, a, correction)
    };
    (result, (f & !(FLAG_C | FLAG_PV)) | carry | tables.parity(result))
}

/// `CPL`.
#[must_use]
pub const fn cpl(a: u8, flags: u8) -> (u8, u8) {
    let result = !a;
    (
        result,
        (result & FLAG_35) | FLAG_N | FLAG_H | (flags & (FLAG_C | KEEP_SZP)),
    )
}

/// `SCF`.
#[must_use]
pub const fn scf(a: u8, flags: u8) -> u8 {
    (flags & KEEP_SZP) | (a & FLAG_35) | FLAG_C
}

/// `CCF`: half carry receives the old carry.
#[must_use]
pub const fn ccf(a: u8, flags: u8) -> u8 {
    let base = (flags & KEEP_SZP) | (a & FLAG_35);
    if flags & FLAG_C != 0 {
        base | FLAG_H
    } else {
        base | FLAG_C
    }
}

/// Flags after `LD A,I` or `LD A,R`: `P/V` mirrors `IFF2`.
#[must_use]
pub fn ld_a_ir(tables: &FlagTables, value: u8, flags: u8, iff2: bool) -> u8 {
    let f = tables.sz53(value) | (flags & FLAG_C);
    if iff2 {
        f | FLAG_PV
    } else {
        f
    }
}

/// Flags after `RRD`/`RLD`, `IN r,(C)` and similar: `SZ53P` of the result
/// with carry preserved.
#[must_use]
pub fn szp_keep_carry(tables: &FlagTables, value: u8, flags: u8) -> u8 {
    tables.sz53p(value) | (flags & FLAG_C)
}

/// Undocumented bits produced by `LDI`-family and `CPI`-family transfers:
/// bit 3 from `n` and bit 5 from `n` bit 1.
#[must_use]
pub const fn block_35(n: u8) -> u8 {
    let mut f = n & FLAG_3;
    if n & 0x02 != 0 {
        f |= FLAG_5;
    }
    f
}
