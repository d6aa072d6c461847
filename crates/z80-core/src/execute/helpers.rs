//! Operand decoding shared by every opcode group.

#![allow(clippy::pedantic, clippy::nursery, unknown_lints, missing_docs)]

use crate::cpu::Z80;
use crate::flags::{FLAG_C, FLAG_PV, FLAG_S, FLAG_Z};

/// Whether the instruction loop keeps going after an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// Index prefix state for the instruction being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Prefix {
    /// A `DD` or `FD` prefix selected `IX` or `IY`.
    pub indexed: bool,
    /// Signed displacement, zero unless the opcode takes one.
    pub disp: i8,
}

/// Opcodes that address `(HL)` and so take a displacement byte under an
/// index prefix. `HALT` is excluded.
pub(crate) const fn takes_displacement(opcode: u8) -> bool {
    match opcode {
        0x34..=0x36 | 0xCB => true,
        0x76 => false,
        0x70..=0x77 => true,
        0x40..=0xBF => opcode & 0x07 == 0x06,
        _ => false,
    }
}

impl Z80 {
    /// Reads register operand `code` (`B C D E H L - A`). `H` and `L` follow
    /// the index selector. Code 6 is the memory operand and is handled by
    /// the caller.
    pub(crate) fn reg8(&self, code: u8) -> u8 {
        match code & 0x07 {
            0 => self.regs.b(),
            1 => self.regs.c(),
            2 => self.regs.d(),
            3 => self.regs.e(),
            4 => self.regs.index_h(),
            5 => self.regs.index_l(),
            _ => self.regs.a(),
        }
    }

    pub(crate) fn set_reg8(&mut self, code: u8, value: u8) {
        match code & 0x07 {
            0 => self.regs.set_b(value),
            1 => self.regs.set_c(value),
            2 => self.regs.set_d(value),
            3 => self.regs.set_e(value),
            4 => self.regs.set_index_h(value),
            5 => self.regs.set_index_l(value),
            _ => self.regs.set_a(value),
        }
    }

    /// Like [`Self::reg8`] but `H` and `L` always name the real `HL`.
    pub(crate) fn reg8_hl(&self, code: u8) -> u8 {
        match code & 0x07 {
            4 => self.regs.h(),
            5 => self.regs.l(),
            _ => self.reg8(code),
        }
    }

    pub(crate) fn set_reg8_hl(&mut self, code: u8, value: u8) {
        match code & 0x07 {
            4 => self.regs.set_h(value),
            5 => self.regs.set_l(value),
            _ => self.set_reg8(code, value),
        }
    }

    /// Register pair `code` from bits 4-5 (`BC DE HL SP`), `HL` following
    /// the index selector.
    pub(crate) fn pair_sp(&self, code: u8) -> u16 {
        match code & 0x03 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.index_reg(),
            _ => self.regs.sp(),
        }
    }

    pub(crate) fn set_pair_sp(&mut self, code: u8, value: u16) {
        match code & 0x03 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_index_reg(value),
            _ => self.regs.set_sp(value),
        }
    }

    /// Register pair `code` for `PUSH`/`POP` (`BC DE HL AF`).
    pub(crate) fn pair_af(&self, code: u8) -> u16 {
        match code & 0x03 {
            3 => self.regs.af(),
            _ => self.pair_sp(code),
        }
    }

    pub(crate) fn set_pair_af(&mut self, code: u8, value: u16) {
        match code & 0x03 {
            3 => self.regs.set_af(value),
            _ => self.set_pair_sp(code, value),
        }
    }

    /// Condition `cc` from bits 3-5 (`NZ Z NC C PO PE P M`).
    pub(crate) fn condition(&self, cc: u8) -> bool {
        let f = self.regs.f();
        let (mask, set) = match cc & 0x07 {
            0 => (FLAG_Z, false),
            1 => (FLAG_Z, true),
            2 => (FLAG_C, false),
            3 => (FLAG_C, true),
            4 => (FLAG_PV, false),
            5 => (FLAG_PV, true),
            6 => (FLAG_S, false),
            _ => (FLAG_S, true),
        };
        (f & mask != 0) == set
    }

    /// Effective address of the memory operand: `HL`, or `IX+d`/`IY+d`.
    pub(crate) fn operand_addr(&self, prefix: Prefix) -> u16 {
        self.regs
            .index_reg()
            .wrapping_add_signed(i16::from(prefix.disp))
    }

    /// Internal cycles the indexed forms spend on the displacement byte.
    pub(crate) fn contend_displacement<B: crate::api::Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        prefix: Prefix,
        count: i32,
    ) {
        if prefix.indexed {
            let addr = self.regs.pc().wrapping_sub(1);
            self.contend_by1(bus, addr, count);
        }
    }
}
