//! Maskable interrupt and NMI acceptance.

use tracing::trace;

use crate::api::Bus;
use crate::cpu::Z80;
use crate::error::InterruptRejected;
use crate::flags::FLAG_PV;
use crate::state::{InterruptMode, IrqBlock};
use crate::timing::{IM0_SURCHARGE, INTERRUPT_ACK, NMI_ACK};

/// Restart address for mode 0/1 interrupts.
pub const IM1_VECTOR: u16 = 0x0038;
/// Restart address for the non-maskable interrupt.
pub const NMI_VECTOR: u16 = 0x0066;

impl Z80 {
    /// Requests a maskable interrupt and returns the T-states the
    /// acknowledge sequence took.
    ///
    /// When the previous instruction was `LD A,I` or `LD A,R`, the check
    /// itself clears the parity/overflow flag whether or not the request is
    /// then accepted.
    ///
    /// # Errors
    ///
    /// Returns [`InterruptRejected`] with no other state change when `IFF1`
    /// is off or the previous instruction was `EI` or a lone index prefix.
    pub fn interrupt<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Result<i32, InterruptRejected> {
        if self.regs.irq_block() == IrqBlock::LoadAFromIr {
            self.regs.set_irq_block(IrqBlock::None);
            self.regs.set_f(self.regs.f() & !FLAG_PV);
        }
        if !self.regs.iff1() {
            trace!(pc = self.regs.pc(), "interrupt rejected: disabled");
            return Err(InterruptRejected::Disabled);
        }
        if self.regs.irq_block() == IrqBlock::EiOrPrefix {
            trace!(pc = self.regs.pc(), "interrupt rejected: blocked");
            return Err(InterruptRejected::Blocked);
        }

        let start = self.clock.tstates;
        self.leave_halt();
        self.regs.set_iff(false, false);

        let vector = match self.regs.im() {
            InterruptMode::Mode0 => {
                // The data bus is assumed to carry a `CALL`, costing extra
                // T-states before the `RST 38h` path.
                self.clock.advance(IM0_SURCHARGE);
                self.acknowledge(bus, INTERRUPT_ACK);
                IM1_VECTOR
            }
            InterruptMode::Mode1 => {
                self.acknowledge(bus, INTERRUPT_ACK);
                IM1_VECTOR
            }
            InterruptMode::Mode2 => {
                self.acknowledge(bus, INTERRUPT_ACK);
                let table = u16::from_le_bytes([0xFF, self.regs.i()]);
                self.read_word_6t(bus, table)
            }
        };
        self.regs.set_pc(vector);
        self.regs.set_memptr(vector);

        let elapsed = self.clock.tstates.wrapping_sub(start);
        trace!(vector, elapsed, "interrupt accepted");
        Ok(elapsed)
    }

    /// Triggers a non-maskable interrupt and returns the T-states taken.
    ///
    /// `IFF2` keeps its value so `RETN` can restore `IFF1` from it.
    pub fn nmi<B: Bus + ?Sized>(&mut self, bus: &mut B) -> i32 {
        let start = self.clock.tstates;
        self.regs.set_irq_block(IrqBlock::None);
        self.leave_halt();
        let iff2 = self.regs.iff2();
        self.regs.set_iff(false, iff2);
        self.acknowledge(bus, NMI_ACK);
        self.regs.set_pc(NMI_VECTOR);
        self.regs.set_memptr(NMI_VECTOR);

        let elapsed = self.clock.tstates.wrapping_sub(start);
        trace!(elapsed, "nmi accepted");
        elapsed
    }

    fn leave_halt(&mut self) {
        if self.regs.halted() {
            self.regs.set_halted(false);
            self.regs.set_pc(self.regs.pc().wrapping_add(1));
        }
    }

    /// Acknowledge M1 cycle followed by pushing `PC`.
    fn acknowledge<B: Bus + ?Sized>(&mut self, bus: &mut B, cycles: i32) {
        self.regs.inc_r();
        self.clock.advance(cycles);
        let pc = self.regs.pc();
        self.push_6t(bus, pc);
    }
}

#[cfg(test)]
mod tests {
    use super::{IM1_VECTOR, NMI_VECTOR};
    use crate::cpu::Z80;
    use crate::error::InterruptRejected;
    use crate::flags::FLAG_PV;
    use crate::memory::FlatBus;
    use crate::state::{InterruptMode, IrqBlock};

    fn enabled_cpu(mode: InterruptMode) -> Z80 {
        let mut cpu = Z80::new();
        let regs = cpu.regs_mut();
        regs.set_sp(0x8000);
        regs.set_pc(0x1234);
        regs.set_iff(true, true);
        regs.set_im(mode);
        cpu
    }

    #[test]
    fn disabled_request_changes_nothing() {
        let mut cpu = Z80::new();
        let mut bus = FlatBus::new();
        let before = cpu.snapshot();

        assert_eq!(cpu.interrupt(&mut bus), Err(InterruptRejected::Disabled));
        assert_eq!(cpu.snapshot(), before);
    }

    #[test]
    fn request_right_after_ei_is_blocked() {
        let mut cpu = enabled_cpu(InterruptMode::Mode1);
        let mut bus = FlatBus::new();
        cpu.regs_mut().set_irq_block(IrqBlock::EiOrPrefix);

        assert_eq!(cpu.interrupt(&mut bus), Err(InterruptRejected::Blocked));
        assert_eq!(cpu.tstates(), 0);
        assert_eq!(cpu.regs().pc(), 0x1234);
    }

    #[test]
    fn mode1_pushes_pc_and_restarts_at_38h() {
        let mut cpu = enabled_cpu(InterruptMode::Mode1);
        let mut bus = FlatBus::new();

        assert_eq!(cpu.interrupt(&mut bus), Ok(13));
        assert_eq!(cpu.regs().pc(), IM1_VECTOR);
        assert_eq!(cpu.regs().memptr(), IM1_VECTOR);
        assert_eq!(cpu.regs().sp(), 0x7FFE);
        assert_eq!(bus.memory()[0x7FFE], 0x34);
        assert_eq!(bus.memory()[0x7FFF], 0x12);
        assert!(!cpu.regs().iff1());
        assert!(!cpu.regs().iff2());
        assert_eq!(cpu.regs().r(), 1);
    }

    #[test]
    fn mode0_costs_six_more_than_mode1() {
        let mut cpu = enabled_cpu(InterruptMode::Mode0);
        let mut bus = FlatBus::new();

        assert_eq!(cpu.interrupt(&mut bus), Ok(19));
        assert_eq!(cpu.regs().pc(), IM1_VECTOR);
    }

    #[test]
    fn mode2_jumps_through_vector_table() {
        let mut cpu = enabled_cpu(InterruptMode::Mode2);
        cpu.regs_mut().set_i(0x40);
        let mut bus = FlatBus::with_program(0x40FF, &[0x00, 0x90]);

        assert_eq!(cpu.interrupt(&mut bus), Ok(19));
        assert_eq!(cpu.regs().pc(), 0x9000);
        assert_eq!(cpu.regs().memptr(), 0x9000);
    }

    #[test]
    fn halted_processor_resumes_after_halt() {
        let mut cpu = enabled_cpu(InterruptMode::Mode1);
        cpu.regs_mut().set_halted(true);
        let mut bus = FlatBus::new();

        assert!(cpu.interrupt(&mut bus).is_ok());
        assert!(!cpu.regs().halted());
        assert_eq!(bus.memory()[0x7FFE], 0x35);
    }

    #[test]
    fn check_after_ld_a_i_clears_parity_even_when_rejected() {
        let mut cpu = Z80::new();
        let mut bus = FlatBus::new();
        cpu.regs_mut().set_f(FLAG_PV);
        cpu.regs_mut().set_irq_block(IrqBlock::LoadAFromIr);

        assert_eq!(cpu.interrupt(&mut bus), Err(InterruptRejected::Disabled));
        assert_eq!(cpu.regs().f() & FLAG_PV, 0);
        assert_eq!(cpu.regs().irq_block(), IrqBlock::None);
    }

    #[test]
    fn nmi_preserves_iff2_and_ignores_blocking() {
        let mut cpu = enabled_cpu(InterruptMode::Mode2);
        cpu.regs_mut().set_irq_block(IrqBlock::EiOrPrefix);
        let mut bus = FlatBus::new();

        assert_eq!(cpu.nmi(&mut bus), 11);
        assert_eq!(cpu.regs().pc(), NMI_VECTOR);
        assert!(!cpu.regs().iff1());
        assert!(cpu.regs().iff2());
        assert_eq!(cpu.regs().irq_block(), IrqBlock::None);
    }
}
