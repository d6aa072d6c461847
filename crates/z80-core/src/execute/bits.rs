//! `CB`-prefixed rotates, shifts, `BIT`, `RES` and `SET`.

use super::alu;
use super::helpers::Prefix;
use crate::api::{Bus, MemAccess, MemRequest};
use crate::cpu::Z80;
use crate::timing::MEMORY_ACCESS;

impl Z80 {
    /// Under an index prefix the displacement was already consumed and the
    /// opcode byte that follows it is read without an M1 cycle, so `R` does
    /// not advance. The indexed forms always operate on `(IX+d)`; for
    /// register codes other than 6 the result is also copied into the
    /// register (the undocumented `LD r,RLC (IX+d)` forms).
    pub(super) fn execute_bits<B: Bus + ?Sized>(&mut self, bus: &mut B, prefix: Prefix) {
        let opcode = if prefix.indexed {
            let pc = self.regs.pc();
            self.contend(bus, pc, MEMORY_ACCESS, MemRequest::Read, MemAccess::OpcodeExt);
            let opcode = bus.read_memory(pc, MemAccess::OpcodeExt);
            self.contend_pc_by1(bus, 2);
            self.regs.set_pc(pc.wrapping_add(1));
            opcode
        } else {
            self.fetch_opcode_ext(bus)
        };

        let reg = opcode & 0x07;
        let y = (opcode >> 3) & 0x07;
        let addr = self.operand_addr(prefix);
        let value = if prefix.indexed {
            let value = self.read_3t(bus, addr);
            self.contend_by1(bus, addr, 1);
            value
        } else if reg == 6 {
            let value = self.read_3t(bus, addr);
            self.contend(bus, addr, 1, MemRequest::Read, MemAccess::Data);
            value
        } else {
            self.reg8(reg)
        };

        let flags = self.regs.f();
        let result = match opcode >> 6 {
            0 => {
                let (result, f) = alu::shift_op(self.tables, y, value, flags);
                self.regs.set_f(f);
                result
            }
            1 => {
                let memptr_high = (prefix.indexed || reg == 6).then(|| self.regs.memptr_h());
                self.regs.set_f(alu::bit(y, value, flags, memptr_high));
                return;
            }
            2 => value & !(1 << y),
            _ => value | (1 << y),
        };

        if prefix.indexed && reg != 6 {
            self.write_3t(bus, addr, result);
        }
        if reg == 6 {
            self.write_3t(bus, addr, result);
        } else {
            self.set_reg8_hl(reg, result);
        }
    }
}
