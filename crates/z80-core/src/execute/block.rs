//! `LDI`/`CPI`/`INI`/`OUTI` families and their decrementing and
//! repeating forms.
//!
//! Opcode bit 3 selects the decrementing direction and bit 4 the repeating
//! form. A repeating instruction that has not finished rewinds `PC` onto
//! itself, so each iteration is a separate pass through the run loop and
//! interrupts can land between iterations.

use super::alu;
use crate::api::{Bus, MemAccess};
use crate::cpu::Z80;
use crate::flags::{FLAG_C, FLAG_H, FLAG_N, FLAG_PV, FLAG_S, FLAG_Z};
use crate::timing::BLOCK_REPEAT;

const fn repeats(opcode: u8) -> bool {
    opcode & 0x10 != 0
}

const fn step(opcode: u8) -> i16 {
    if opcode & 0x08 != 0 {
        -1
    } else {
        1
    }
}

impl Z80 {
    fn rewind_block_instruction(&mut self) {
        self.regs.set_pc(self.regs.pc().wrapping_sub(2));
    }

    pub(super) fn block_transfer<B: Bus + ?Sized>(&mut self, bus: &mut B, opcode: u8) {
        let hl = self.regs.hl();
        let de = self.regs.de();
        let value = self.read_3t(bus, hl);
        self.write_3t(bus, de, value);
        self.contend_by1(bus, de, 2);
        let bc = self.regs.bc().wrapping_sub(1);
        self.regs.set_bc(bc);

        let n = value.wrapping_add(self.regs.a());
        let mut f = alu::block_35(n) | (self.regs.f() & (FLAG_C | FLAG_Z | FLAG_S));
        if bc != 0 {
            f |= FLAG_PV;
        }
        self.regs.set_f(f);

        if repeats(opcode) && bc != 0 {
            self.contend_by1(bus, de, BLOCK_REPEAT);
            self.rewind_block_instruction();
            self.regs.set_memptr(self.regs.pc().wrapping_add(1));
        }
        let delta = step(opcode);
        self.regs.set_hl(hl.wrapping_add_signed(delta));
        self.regs.set_de(de.wrapping_add_signed(delta));
    }

    pub(super) fn block_compare<B: Bus + ?Sized>(&mut self, bus: &mut B, opcode: u8) {
        let hl = self.regs.hl();
        let a = self.regs.a();
        let delta = step(opcode);

        // MEMPTR points back at the instruction while it keeps repeating.
        let will_repeat = repeats(opcode)
            && !(self.regs.bc() == 1 || bus.read_memory(hl, MemAccess::Other) == a);
        if will_repeat {
            self.regs.set_memptr(self.regs.org_pc().wrapping_add(1));
        } else {
            self.regs
                .set_memptr(self.regs.memptr().wrapping_add_signed(delta));
        }

        let value = self.read_3t(bus, hl);
        self.contend_by1(bus, hl, 5);
        let bc = self.regs.bc().wrapping_sub(1);
        self.regs.set_bc(bc);

        let mut f = FLAG_N | (self.regs.f() & FLAG_C);
        if bc != 0 {
            f |= FLAG_PV;
        }
        if a & 0x0F < value & 0x0F {
            f |= FLAG_H;
        }
        let mut diff = a.wrapping_sub(value);
        if diff == 0 {
            f |= FLAG_Z;
        }
        f |= diff & FLAG_S;
        if f & FLAG_H != 0 {
            diff = diff.wrapping_sub(1);
        }
        f |= alu::block_35(diff);
        self.regs.set_f(f);

        if repeats(opcode) && f & (FLAG_Z | FLAG_PV) == FLAG_PV {
            self.contend_by1(bus, hl, BLOCK_REPEAT);
            self.rewind_block_instruction();
        }
        self.regs.set_hl(hl.wrapping_add_signed(delta));
    }

    /// `INI`/`IND`/`OUTI`/`OUTD` and repeats. Opcode bit 0 selects output.
    pub(super) fn block_io<B: Bus + ?Sized>(&mut self, bus: &mut B, opcode: u8) {
        let output = opcode & 0x01 != 0;
        let delta = step(opcode);
        if output {
            self.regs.set_b(self.regs.b().wrapping_sub(1));
        }
        self.regs
            .set_memptr(self.regs.bc().wrapping_add_signed(delta));
        self.contend_ir_by1(bus, 1);

        let hl = self.regs.hl();
        let (value, sum) = if output {
            let value = self.read_3t(bus, hl);
            self.port_out(bus, self.regs.bc(), value);
            let next_l = hl.wrapping_add_signed(delta) as u8;
            (value, value.wrapping_add(next_l))
        } else {
            let value = self.port_in(bus, self.regs.bc());
            self.write_3t(bus, hl, value);
            self.regs.set_b(self.regs.b().wrapping_sub(1));
            let c = self.regs.c();
            let sum = if delta < 0 {
                value.wrapping_add(c).wrapping_sub(1)
            } else {
                value.wrapping_add(c).wrapping_add(1)
            };
            (value, sum)
        };

        let b = self.regs.b();
        let mut f = self.tables.parity((sum & 0x07) ^ b) | self.tables.sz53(b);
        if value & 0x80 != 0 {
            f |= FLAG_N;
        }
        if sum < value {
            f |= FLAG_H | FLAG_C;
        }
        self.regs.set_f(f);

        if repeats(opcode) && b != 0 {
            let addr = if output { self.regs.bc() } else { hl };
            self.contend_by1(bus, addr, BLOCK_REPEAT);
            self.rewind_block_instruction();
        }
        self.regs.set_hl(hl.wrapping_add_signed(delta));
    }
}

#[cfg(test)]
mod tests {
    use super::{repeats, step};

    #[test]
    fn opcode_bits_select_direction_and_repeat() {
        assert_eq!(step(0xA0), 1);
        assert_eq!(step(0xA8), -1);
        assert!(!repeats(0xA1));
        assert!(repeats(0xB9));
    }
}
