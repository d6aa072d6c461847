//! `ED`-prefixed opcodes.

use tracing::debug;

use super::alu;
use super::helpers::Flow;
use crate::api::Bus;
use crate::cpu::Z80;
use crate::state::{InterruptMode, IrqBlock};

impl Z80 {
    /// Executes `ED opcode`. `HL` is always the real `HL` here, even after an
    /// index prefix.
    pub(super) fn execute_extended<B: Bus + ?Sized>(&mut self, bus: &mut B, opcode: u8) -> Flow {
        match opcode {
            0xA0 | 0xA8 | 0xB0 | 0xB8 => self.block_transfer(bus, opcode),
            0xA1 | 0xA9 | 0xB1 | 0xB9 => self.block_compare(bus, opcode),
            0xA2 | 0xA3 | 0xAA | 0xAB | 0xB2 | 0xB3 | 0xBA | 0xBB => self.block_io(bus, opcode),
            0x40..=0x7F => return self.execute_ed_misc(bus, opcode),
            _ => {
                debug!(
                    opcode,
                    pc = self.regs.org_pc(),
                    "unknown ED opcode"
                );
                if let Some(trap) = bus.opcode_trap() {
                    if trap.unknown_ed(&mut self.regs, opcode) {
                        return Flow::Stop;
                    }
                }
            }
        }
        Flow::Continue
    }

    fn execute_ed_misc<B: Bus + ?Sized>(&mut self, bus: &mut B, opcode: u8) -> Flow {
        let y = (opcode >> 3) & 0x07;
        let p = (opcode >> 4) & 0x03;
        match opcode & 0x07 {
            0 => {
                let bc = self.regs.bc();
                self.regs.set_memptr(bc.wrapping_add(1));
                let value = self.port_in(bus, bc);
                self.regs
                    .set_f(alu::szp_keep_carry(self.tables, value, self.regs.f()));
                // `IN (C)` (y == 6) only sets flags.
                if y != 6 {
                    self.set_reg8(y, value);
                }
            }
            1 => {
                let bc = self.regs.bc();
                self.regs.set_memptr(bc.wrapping_add(1));
                let value = if y == 6 { 0 } else { self.reg8(y) };
                self.port_out(bus, bc, value);
            }
            2 => {
                self.contend_ir_by1(bus, 7);
                let hl = self.regs.hl();
                let value = self.pair_sp(p);
                let flags = self.regs.f();
                let (result, f) = if opcode & 0x08 != 0 {
                    alu::adc16(hl, value, flags)
                } else {
                    alu::sbc16(self.tables, hl, value, flags)
                };
                self.regs.set_memptr(hl.wrapping_add(1));
                self.regs.set_hl(result);
                self.regs.set_f(f);
            }
            3 => {
                let addr = self.fetch_word_pc(bus, 0);
                self.regs.set_memptr(addr.wrapping_add(1));
                if opcode & 0x08 != 0 {
                    let value = self.read_word_6t(bus, addr);
                    self.set_pair_sp(p, value);
                } else {
                    let value = self.pair_sp(p);
                    self.write_word_6t(bus, addr, value);
                }
            }
            4 => {
                let (a, f) = alu::sub8(self.tables, 0, self.regs.a());
                self.regs.set_a(a);
                self.regs.set_f(f);
            }
            5 => {
                let iff2 = self.regs.iff2();
                self.regs.set_iff(iff2, iff2);
                let target = self.pop_6t(bus);
                self.regs.set_pc(target);
                self.regs.set_memptr(target);
                if let Some(trap) = bus.return_trap() {
                    if trap.on_return(&mut self.regs, opcode) {
                        return Flow::Stop;
                    }
                }
            }
            6 => {
                let mode = match opcode {
                    0x56 | 0x76 => InterruptMode::Mode1,
                    0x5E | 0x7E => InterruptMode::Mode2,
                    _ => InterruptMode::Mode0,
                };
                self.regs.set_im(mode);
            }
            _ => self.execute_ed_special(bus, opcode),
        }
        Flow::Continue
    }

    /// `LD I,A`, `LD R,A`, `LD A,I`, `LD A,R`, `RRD`, `RLD`; the two
    /// remaining codes (`ED 77`, `ED 7F`) do nothing.
    fn execute_ed_special<B: Bus + ?Sized>(&mut self, bus: &mut B, opcode: u8) {
        match opcode {
            0x47 => {
                self.contend_ir_by1(bus, 1);
                self.regs.set_i(self.regs.a());
            }
            0x4F => {
                self.contend_ir_by1(bus, 1);
                self.regs.set_r(self.regs.a());
            }
            0x57 | 0x5F => {
                let value = if opcode == 0x57 {
                    self.regs.i()
                } else {
                    self.regs.r()
                };
                self.regs.set_a(value);
                self.regs.set_irq_block(IrqBlock::LoadAFromIr);
                self.contend_ir_by1(bus, 1);
                let f = alu::ld_a_ir(self.tables, value, self.regs.f(), self.regs.iff2());
                self.regs.set_f(f);
            }
            0x67 | 0x6F => {
                let hl = self.regs.hl();
                let value = self.read_3t(bus, hl);
                self.regs.set_memptr(hl.wrapping_add(1));
                self.contend_by1(bus, hl, 4);
                let a = self.regs.a();
                let (memory, a) = if opcode == 0x67 {
                    ((a << 4) | (value >> 4), (a & 0xF0) | (value & 0x0F))
                } else {
                    ((value << 4) | (a & 0x0F), (a & 0xF0) | (value >> 4))
                };
                self.write_3t(bus, hl, memory);
                self.regs.set_a(a);
                self.regs
                    .set_f(alu::szp_keep_carry(self.tables, a, self.regs.f()));
            }
            _ => {}
        }
    }
}
