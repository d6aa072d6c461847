//! Decode-execute loop and the unprefixed opcode groups.
//!
//! Each pass through the loop runs the pager, asks the breakpoint hook,
//! fetches one opcode, resolves `DD`/`FD` into the index selector and
//! dispatches to:
//! 1. the `ED` table ([`extended`], with block transfers in [`block`]),
//! 2. the `CB` table ([`bits`]),
//! 3. one of four groups picked by the opcode's two high bits.
//!
//! Every memory and port cycle goes through [`crate::memory::access`] so
//! contention hooks see accesses at the exact T-state they happen.

#![allow(
    clippy::pedantic,
    clippy::nursery,
    clippy::similar_names,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    unknown_lints,
    missing_docs
)]

pub mod alu;
mod bits;
mod block;
mod extended;
mod helpers;

use tracing::debug;

use crate::api::{Bus, ExitReason, MemAccess};
use crate::cpu::Z80;
use crate::state::{IndexRegister, IrqBlock};
use helpers::{takes_displacement, Flow, Prefix};

impl Z80 {
    /// Runs instructions while `tstates < next_event`.
    ///
    /// An instruction is never split: the last one may overshoot the
    /// boundary. A halted processor keeps re-fetching the `HALT` opcode
    /// until an interrupt resumes it.
    pub fn execute<B: Bus + ?Sized>(&mut self, bus: &mut B) -> ExitReason {
        while self.clock.before_event() {
            if let Some(pager) = bus.pager() {
                pager.page(&self.regs);
            }
            if let Some(breakpoints) = bus.breakpoints() {
                if breakpoints.hit(&self.regs, &self.clock) {
                    debug!(
                        pc = self.regs.pc(),
                        tstates = self.clock.tstates,
                        "run loop stopped by breakpoint"
                    );
                    return ExitReason::Breakpoint;
                }
            }
            self.regs.begin_instruction();
            let opcode = self.fetch_opcode(bus);
            self.regs.set_irq_block(IrqBlock::None);
            self.regs.select(IndexRegister::Hl);
            if self.regs.halted() {
                self.regs.set_pc(self.regs.pc().wrapping_sub(1));
                continue;
            }
            if self.dispatch(bus, opcode) == Flow::Stop {
                debug!(
                    pc = self.regs.pc(),
                    org_pc = self.regs.org_pc(),
                    tstates = self.clock.tstates,
                    "run loop stopped by trap"
                );
                return ExitReason::Trapped;
            }
        }
        ExitReason::BoundaryReached
    }

    /// Executes exactly one instruction (or one halted re-fetch) and returns
    /// the T-states it took. The scheduling boundary is left as it was.
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> i32 {
        let saved_event = self.clock.next_event;
        let start = self.clock.tstates;
        self.clock.next_event = start.wrapping_add(1);
        self.execute(bus);
        self.clock.next_event = saved_event;
        self.clock.tstates.wrapping_sub(start)
    }

    /// Restarts the clock at zero and runs until at least `tstates` have
    /// elapsed. Returns the T-states actually executed, or zero without
    /// touching any state when `tstates` is not positive.
    pub fn run_for<B: Bus + ?Sized>(&mut self, bus: &mut B, tstates: i32) -> i32 {
        if tstates <= 0 {
            return 0;
        }
        self.clock.tstates = 0;
        self.clock.next_event = tstates;
        self.execute(bus);
        self.clock.tstates
    }

    fn dispatch<B: Bus + ?Sized>(&mut self, bus: &mut B, first: u8) -> Flow {
        let mut opcode = first;
        let mut prefix = Prefix::default();

        if let Some(index) = IndexRegister::from_prefix(opcode) {
            // Another index prefix cancels this one: it executed as a 4 T-state
            // no-op that still blocks interrupts.
            let next = bus.read_memory(self.regs.pc(), MemAccess::Other);
            if IndexRegister::from_prefix(next).is_some() {
                self.regs.set_irq_block(IrqBlock::EiOrPrefix);
                return Flow::Continue;
            }
            self.regs.select(index);
            opcode = self.fetch_opcode_ext(bus);
            if takes_displacement(opcode) {
                prefix.disp = self.fetch_arg(bus) as i8;
                let addr = self.operand_addr(prefix);
                self.regs.set_memptr(addr);
            }
            prefix.indexed = true;
        }

        match opcode {
            0xED => {
                self.regs.select(IndexRegister::Hl);
                let opcode = self.fetch_opcode_ext(bus);
                self.execute_extended(bus, opcode)
            }
            0xCB => {
                self.execute_bits(bus, prefix);
                Flow::Continue
            }
            0x00..=0x3F => {
                self.execute_misc(bus, opcode, prefix);
                Flow::Continue
            }
            0x40..=0x7F => {
                self.execute_load8(bus, opcode, prefix);
                Flow::Continue
            }
            0x80..=0xBF => {
                let value = self.read_operand(bus, opcode, prefix);
                self.apply_alu(opcode >> 3, value);
                Flow::Continue
            }
            _ => {
                self.execute_control(bus, opcode);
                Flow::Continue
            }
        }
    }

    fn apply_alu(&mut self, op: u8, value: u8) {
        let (a, f) = alu::alu_op(self.tables, op, self.regs.a(), value, self.regs.f());
        self.regs.set_a(a);
        self.regs.set_f(f);
    }

    /// Source operand for the `ALU A,r` group; `(IX+d)` spends 5 internal
    /// T-states on the displacement.
    fn read_operand<B: Bus + ?Sized>(&mut self, bus: &mut B, opcode: u8, prefix: Prefix) -> u8 {
        if opcode & 0x07 == 6 {
            self.contend_displacement(bus, prefix, 5);
            let addr = self.operand_addr(prefix);
            self.read_3t(bus, addr)
        } else {
            self.reg8(opcode)
        }
    }

    /// `0x00..=0x3F`: relative jumps, 16-bit loads and arithmetic, indirect
    /// accumulator loads, `INC`/`DEC`, immediate loads and the accumulator
    /// rotate/adjust block.
    fn execute_misc<B: Bus + ?Sized>(&mut self, bus: &mut B, opcode: u8, prefix: Prefix) {
        let y = (opcode >> 3) & 0x07;
        let p = (opcode >> 4) & 0x03;
        match opcode & 0x07 {
            0 => {
                if opcode & 0x30 == 0 {
                    if opcode != 0 {
                        self.regs.ex_af();
                    }
                    return;
                }
                let taken = if opcode & 0x20 != 0 {
                    self.condition(y & 0x03)
                } else if opcode & 0x08 == 0 {
                    self.contend_ir_by1(bus, 1);
                    let b = self.regs.b().wrapping_sub(1);
                    self.regs.set_b(b);
                    b != 0
                } else {
                    true
                };
                let pc = self.regs.pc();
                let disp = self.read_arg_3t(bus, pc) as i8;
                if taken {
                    self.contend_pc_by1(bus, 5);
                    let target = pc.wrapping_add(1).wrapping_add_signed(i16::from(disp));
                    self.regs.set_pc(target);
                    self.regs.set_memptr(target);
                } else {
                    self.regs.set_pc(pc.wrapping_add(1));
                }
            }
            1 => {
                if opcode & 0x08 != 0 {
                    self.contend_ir_by1(bus, 7);
                    let hl = self.regs.index_reg();
                    let value = self.pair_sp(p);
                    let (result, f) = alu::add16(hl, value, self.regs.f());
                    self.regs.set_memptr(hl.wrapping_add(1));
                    self.regs.set_index_reg(result);
                    self.regs.set_f(f);
                } else {
                    let value = self.fetch_word_pc(bus, 0);
                    self.set_pair_sp(p, value);
                }
            }
            2 => self.execute_indirect_load(bus, y),
            3 => {
                self.contend_ir_by1(bus, 2);
                let value = self.pair_sp(p);
                let value = if opcode & 0x08 != 0 {
                    value.wrapping_sub(1)
                } else {
                    value.wrapping_add(1)
                };
                self.set_pair_sp(p, value);
            }
            4 | 5 => {
                let decrement = opcode & 0x01 != 0;
                let step = |cpu: &Self, value: u8| {
                    if decrement {
                        alu::dec8(cpu.tables, value, cpu.regs.f())
                    } else {
                        alu::inc8(cpu.tables, value, cpu.regs.f())
                    }
                };
                if y == 6 {
                    self.contend_displacement(bus, prefix, 5);
                    let addr = self.operand_addr(prefix);
                    let value = self.read_3t(bus, addr);
                    self.contend_by1(bus, addr, 1);
                    let (result, f) = step(self, value);
                    self.regs.set_f(f);
                    self.write_3t(bus, addr, result);
                } else {
                    let (result, f) = step(self, self.reg8(y));
                    self.regs.set_f(f);
                    self.set_reg8(y, result);
                }
            }
            6 => {
                let value = self.fetch_arg(bus);
                if y == 6 {
                    self.contend_displacement(bus, prefix, 2);
                    let addr = self.operand_addr(prefix);
                    self.write_3t(bus, addr, value);
                } else {
                    self.set_reg8(y, value);
                }
            }
            _ => {
                let a = self.regs.a();
                let f = self.regs.f();
                let (a, f) = match y {
                    0 => alu::rlca(a, f),
                    1 => alu::rrca(a, f),
                    2 => alu::rla(a, f),
                    3 => alu::rra(a, f),
                    4 => alu::daa(self.tables, a, f),
                    5 => alu::cpl(a, f),
                    6 => (a, alu::scf(a, f)),
                    _ => (a, alu::ccf(a, f)),
                };
                self.regs.set_a(a);
                self.regs.set_f(f);
            }
        }
    }

    /// `LD (BC),A` through `LD A,(nn)`.
    fn execute_indirect_load<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8) {
        let a = self.regs.a();
        match y {
            0 | 2 => {
                let addr = if y == 0 {
                    self.regs.bc()
                } else {
                    self.regs.de()
                };
                self.write_3t(bus, addr, a);
                self.regs
                    .set_memptr(u16::from_le_bytes([(addr as u8).wrapping_add(1), a]));
            }
            1 | 3 => {
                let addr = if y == 1 {
                    self.regs.bc()
                } else {
                    self.regs.de()
                };
                let value = self.read_3t(bus, addr);
                self.regs.set_a(value);
                self.regs.set_memptr(addr.wrapping_add(1));
            }
            4 => {
                let addr = self.fetch_word_pc(bus, 0);
                self.regs.set_memptr(addr.wrapping_add(1));
                let value = self.regs.index_reg();
                self.write_word_6t(bus, addr, value);
            }
            5 => {
                let addr = self.fetch_word_pc(bus, 0);
                self.regs.set_memptr(addr.wrapping_add(1));
                let value = self.read_word_6t(bus, addr);
                self.regs.set_index_reg(value);
            }
            6 => {
                let addr = self.fetch_word_pc(bus, 0);
                self.regs
                    .set_memptr(u16::from_le_bytes([(addr as u8).wrapping_add(1), a]));
                self.write_3t(bus, addr, a);
            }
            _ => {
                let addr = self.fetch_word_pc(bus, 0);
                self.regs.set_memptr(addr.wrapping_add(1));
                let value = self.read_3t(bus, addr);
                self.regs.set_a(value);
            }
        }
    }

    /// `0x40..=0x7F`: `LD r,r'` and `HALT`.
    ///
    /// When one side is `(IX+d)` the other side's `H`/`L` are the real
    /// `HL` halves rather than the index halves.
    fn execute_load8<B: Bus + ?Sized>(&mut self, bus: &mut B, opcode: u8, prefix: Prefix) {
        if opcode == 0x76 {
            self.regs.set_halted(true);
            self.regs.set_pc(self.regs.pc().wrapping_sub(1));
            return;
        }
        let src = opcode & 0x07;
        let dst = (opcode >> 3) & 0x07;
        let value = if src == 6 {
            self.contend_displacement(bus, prefix, 5);
            let addr = self.operand_addr(prefix);
            self.read_3t(bus, addr)
        } else if prefix.indexed && dst == 6 {
            self.reg8_hl(src)
        } else {
            self.reg8(src)
        };
        if dst == 6 {
            self.contend_displacement(bus, prefix, 5);
            let addr = self.operand_addr(prefix);
            self.write_3t(bus, addr, value);
        } else if prefix.indexed && src == 6 {
            self.set_reg8_hl(dst, value);
        } else {
            self.set_reg8(dst, value);
        }
    }

    /// `0xC0..=0xFF`: returns, jumps, calls, stack, restarts, exchanges,
    /// `DI`/`EI` and immediate-port I/O.
    fn execute_control<B: Bus + ?Sized>(&mut self, bus: &mut B, opcode: u8) {
        let y = (opcode >> 3) & 0x07;
        let p = (opcode >> 4) & 0x03;
        match opcode & 0x07 {
            0 => {
                self.contend_ir_by1(bus, 1);
                if self.condition(y) {
                    let target = self.pop_6t(bus);
                    self.regs.set_pc(target);
                    self.regs.set_memptr(target);
                }
            }
            1 => {
                if opcode & 0x08 == 0 {
                    let value = self.pop_6t(bus);
                    self.set_pair_af(p, value);
                    return;
                }
                match p {
                    0 => {
                        let target = self.pop_6t(bus);
                        self.regs.set_pc(target);
                        self.regs.set_memptr(target);
                    }
                    1 => self.regs.exx(),
                    2 => self.regs.set_pc(self.regs.index_reg()),
                    _ => {
                        self.contend_ir_by1(bus, 2);
                        self.regs.set_sp(self.regs.index_reg());
                    }
                }
            }
            2 => {
                let target = self.fetch_word_pc(bus, 0);
                self.regs.set_memptr(target);
                if self.condition(y) {
                    self.regs.set_pc(target);
                }
            }
            3 => self.execute_special(bus, y),
            4 => {
                let taken = self.condition(y);
                let target = self.fetch_word_pc(bus, i32::from(taken));
                self.regs.set_memptr(target);
                if taken {
                    let ret = self.regs.pc();
                    self.push_6t(bus, ret);
                    self.regs.set_pc(target);
                }
            }
            5 => {
                if opcode & 0x08 == 0 {
                    self.contend_ir_by1(bus, 1);
                    let value = self.pair_af(p);
                    self.push_6t(bus, value);
                } else if p == 0 {
                    let target = self.fetch_word_pc(bus, 1);
                    self.regs.set_memptr(target);
                    let ret = self.regs.pc();
                    self.push_6t(bus, ret);
                    self.regs.set_pc(target);
                }
                // DD, ED and FD never reach here: the loop consumes them as
                // prefixes.
            }
            6 => {
                let value = self.fetch_arg(bus);
                self.apply_alu(y, value);
            }
            _ => {
                self.contend_ir_by1(bus, 1);
                let ret = self.regs.pc();
                self.push_6t(bus, ret);
                let target = u16::from(opcode & 0x38);
                self.regs.set_pc(target);
                self.regs.set_memptr(target);
            }
        }
    }

    /// `JP nn`, `OUT (n),A`, `IN A,(n)`, `EX (SP),HL`, `EX DE,HL`, `DI`, `EI`.
    fn execute_special<B: Bus + ?Sized>(&mut self, bus: &mut B, y: u8) {
        match y {
            0 => {
                let target = self.fetch_word_pc(bus, 0);
                self.regs.set_pc(target);
                self.regs.set_memptr(target);
            }
            2 => {
                let n = self.fetch_arg(bus);
                let a = self.regs.a();
                self.regs
                    .set_memptr(u16::from_le_bytes([n.wrapping_add(1), a]));
                self.port_out(bus, u16::from_le_bytes([n, a]), a);
            }
            3 => {
                let n = self.fetch_arg(bus);
                let port = u16::from_le_bytes([n, self.regs.a()]);
                self.regs.set_memptr(port.wrapping_add(1));
                let value = self.port_in(bus, port);
                self.regs.set_a(value);
            }
            4 => {
                let sp = self.regs.sp();
                let value = self.read_word_6t(bus, sp);
                self.contend_by1(bus, sp.wrapping_add(1), 1);
                let hl = self.regs.index_reg();
                self.write_word_6t_inverted(bus, sp, hl);
                self.contend_by1(bus, sp, 2);
                self.regs.set_index_reg(value);
                self.regs.set_memptr(value);
            }
            5 => self.regs.ex_de_hl(),
            6 => self.regs.set_iff(false, false),
            7 => {
                self.regs.set_iff(true, true);
                self.regs.set_irq_block(IrqBlock::EiOrPrefix);
            }
            // 0xCB is decoded before the group dispatch.
            _ => {}
        }
    }
}
