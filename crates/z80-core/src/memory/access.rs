//! Every bus cycle the interpreter performs, with its T-state cost.
//!
//! With no contention hook installed the fixed costs from
//! [`crate::timing`] are added directly; otherwise the hook is trusted to
//! advance the clock by at least the requested amount.

use crate::api::{Bus, MemAccess, MemRequest, PortAccess, PortPhase};
use crate::cpu::Z80;
use crate::timing::{MEMORY_ACCESS, OPCODE_FETCH, PORT_COMPLETION, PORT_EARLY, PORT_LATE};

impl Z80 {
    pub(crate) fn contend<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        addr: u16,
        tstates: i32,
        request: MemRequest,
        access: MemAccess,
    ) {
        match bus.memory_contention() {
            Some(hook) => hook.contend(&mut self.clock, addr, tstates, request, access),
            None => self.clock.advance(tstates),
        }
    }

    /// Internal cycles with `addr` on the bus, one hook call per T-state.
    pub(crate) fn contend_by1<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16, count: i32) {
        match bus.memory_contention() {
            Some(hook) => {
                for _ in 0..count {
                    hook.contend(&mut self.clock, addr, 1, MemRequest::None, MemAccess::Other);
                }
            }
            None => self.clock.advance(count),
        }
    }

    pub(crate) fn contend_ir_by1<B: Bus + ?Sized>(&mut self, bus: &mut B, count: i32) {
        let ir = self.regs.ir();
        self.contend_by1(bus, ir, count);
    }

    pub(crate) fn contend_pc_by1<B: Bus + ?Sized>(&mut self, bus: &mut B, count: i32) {
        let pc = self.regs.pc();
        self.contend_by1(bus, pc, count);
    }

    pub(crate) fn read_3t<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) -> u8 {
        self.contend(bus, addr, MEMORY_ACCESS, MemRequest::Read, MemAccess::Data);
        bus.read_memory(addr, MemAccess::Data)
    }

    pub(crate) fn read_arg_3t<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) -> u8 {
        self.contend(bus, addr, MEMORY_ACCESS, MemRequest::Read, MemAccess::OpcodeArg);
        bus.read_memory(addr, MemAccess::OpcodeArg)
    }

    pub(crate) fn write_3t<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16, value: u8) {
        self.contend(bus, addr, MEMORY_ACCESS, MemRequest::Write, MemAccess::Data);
        bus.write_memory(addr, value, MemAccess::Data);
    }

    pub(crate) fn read_word_6t<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) -> u16 {
        let lo = self.read_3t(bus, addr);
        let hi = self.read_3t(bus, addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn write_word_6t<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write_3t(bus, addr, lo);
        self.write_3t(bus, addr.wrapping_add(1), hi);
    }

    /// High byte first, as `EX (SP),HL` stores it.
    pub(crate) fn write_word_6t_inverted<B: Bus + ?Sized>(
        &mut self,
        bus: &mut B,
        addr: u16,
        value: u16,
    ) {
        let [lo, hi] = value.to_le_bytes();
        self.write_3t(bus, addr.wrapping_add(1), hi);
        self.write_3t(bus, addr, lo);
    }

    /// Reads the byte at `PC` as an operand and steps past it.
    pub(crate) fn fetch_arg<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let pc = self.regs.pc();
        let value = self.read_arg_3t(bus, pc);
        self.regs.set_pc(pc.wrapping_add(1));
        value
    }

    /// Reads a little-endian operand word at `PC`. `wait` internal T-states
    /// are spent on the high byte's address before `PC` moves past it.
    pub(crate) fn fetch_word_pc<B: Bus + ?Sized>(&mut self, bus: &mut B, wait: i32) -> u16 {
        let lo = self.fetch_arg(bus);
        let pc = self.regs.pc();
        let hi = self.read_arg_3t(bus, pc);
        if wait > 0 {
            self.contend_pc_by1(bus, wait);
        }
        self.regs.set_pc(pc.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn pop_6t<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let sp = self.regs.sp();
        let lo = self.read_3t(bus, sp);
        let sp = sp.wrapping_add(1);
        let hi = self.read_3t(bus, sp);
        self.regs.set_sp(sp.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn push_6t<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        let sp = self.regs.sp().wrapping_sub(1);
        self.regs.set_sp(sp);
        self.write_3t(bus, sp, hi);
        let sp = sp.wrapping_sub(1);
        self.regs.set_sp(sp);
        self.write_3t(bus, sp, lo);
    }

    /// M1 cycle: fetch at `PC`, step `PC` and refresh `R`.
    pub(crate) fn fetch_opcode<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let pc = self.regs.pc();
        self.contend(bus, pc, OPCODE_FETCH, MemRequest::Read, MemAccess::Opcode);
        if self.even_m1 && self.clock.tstates & 1 != 0 {
            self.clock.advance(1);
        }
        let opcode = bus.read_memory(pc, MemAccess::Opcode);
        self.regs.set_pc(pc.wrapping_add(1));
        self.regs.inc_r();
        opcode
    }

    /// Opcode fetch after a prefix; never padded for even M1.
    pub(crate) fn fetch_opcode_ext<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let pc = self.regs.pc();
        self.contend(bus, pc, OPCODE_FETCH, MemRequest::Read, MemAccess::OpcodeExt);
        let opcode = bus.read_memory(pc, MemAccess::OpcodeExt);
        self.regs.set_pc(pc.wrapping_add(1));
        self.regs.inc_r();
        opcode
    }

    pub(crate) fn port_in<B: Bus + ?Sized>(&mut self, bus: &mut B, port: u16) -> u8 {
        match bus.port_contention() {
            Some(hook) => {
                let early = PortPhase {
                    input: true,
                    early: true,
                };
                let late = PortPhase {
                    input: true,
                    early: false,
                };
                hook.contend_port(&mut self.clock, port, PORT_EARLY, early);
                hook.contend_port(&mut self.clock, port, PORT_LATE, late);
            }
            None => self.clock.advance(PORT_EARLY + PORT_LATE),
        }
        let value = bus.read_port(port, PortAccess::Normal);
        self.clock.advance(PORT_COMPLETION);
        value
    }

    pub(crate) fn port_out<B: Bus + ?Sized>(&mut self, bus: &mut B, port: u16, value: u8) {
        let early = PortPhase {
            input: false,
            early: true,
        };
        match bus.port_contention() {
            Some(hook) => hook.contend_port(&mut self.clock, port, PORT_EARLY, early),
            None => self.clock.advance(PORT_EARLY),
        }
        bus.write_port(port, value, PortAccess::Normal);
        let late = PortPhase {
            input: false,
            early: false,
        };
        match bus.port_contention() {
            Some(hook) => hook.contend_port(&mut self.clock, port, PORT_LATE, late),
            None => self.clock.advance(PORT_LATE),
        }
        self.clock.advance(PORT_COMPLETION);
    }
}
