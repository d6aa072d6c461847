use std::fmt;

use tracing::debug;

use crate::api::{Bus, CoreConfig, CpuSnapshot, MemAccess, SnapshotVersion};
use crate::error::SnapshotError;
use crate::flags::{init_tables, FlagTables};
use crate::state::{Clock, Registers};

/// One Z80 processor: register file, T-state clock and host tag.
///
/// The processor holds no memory. Every execution entry point borrows a
/// [`Bus`] for the duration of the call.
#[derive(Clone)]
pub struct Z80 {
    pub(crate) regs: Registers,
    pub(crate) clock: Clock,
    pub(crate) tag: u64,
    pub(crate) even_m1: bool,
    pub(crate) tables: &'static FlagTables,
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Z80 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Z80")
            .field("regs", &self.regs)
            .field("clock", &self.clock)
            .field("tag", &self.tag)
            .field("even_m1", &self.even_m1)
            .finish_non_exhaustive()
    }
}

impl Z80 {
    /// Creates a processor in the reset state with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&CoreConfig::default())
    }

    /// Creates a processor in the reset state.
    #[must_use]
    pub fn with_config(config: &CoreConfig) -> Self {
        Self {
            regs: Registers::default(),
            clock: Clock::default(),
            tag: config.tag,
            even_m1: config.even_m1,
            tables: init_tables(),
        }
    }

    /// Zeroes every register, selects `HL`, clears the interrupt, halt and
    /// blocking state and rewinds the clock. The scheduling boundary and
    /// host tag are kept.
    pub fn reset(&mut self) {
        self.tables = init_tables();
        self.regs = Registers::default();
        self.clock.tstates = 0;
        debug!(tag = self.tag, "z80 reset");
    }

    /// Register file.
    #[must_use]
    pub const fn regs(&self) -> &Registers {
        &self.regs
    }

    /// Mutable register file.
    pub const fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    /// T-state clock.
    #[must_use]
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Mutable T-state clock.
    pub const fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Elapsed T-states.
    #[must_use]
    pub const fn tstates(&self) -> i32 {
        self.clock.tstates
    }

    /// Opaque host tag.
    #[must_use]
    pub const fn tag(&self) -> u64 {
        self.tag
    }

    /// Replaces the host tag.
    pub const fn set_tag(&mut self, tag: u64) {
        self.tag = tag;
    }

    /// Returns `true` when odd-aligned opcode fetches are padded.
    #[must_use]
    pub const fn even_m1(&self) -> bool {
        self.even_m1
    }

    /// Enables or disables M1 padding.
    pub const fn set_even_m1(&mut self, enabled: bool) {
        self.even_m1 = enabled;
    }

    /// Pushes `value` without charging T-states or contention.
    pub fn push<B: Bus + ?Sized>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        let sp = self.regs.sp().wrapping_sub(1);
        bus.write_memory(sp, hi, MemAccess::Other);
        let sp = sp.wrapping_sub(1);
        bus.write_memory(sp, lo, MemAccess::Other);
        self.regs.set_sp(sp);
    }

    /// Pops a word without charging T-states or contention.
    pub fn pop<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let sp = self.regs.sp();
        let lo = bus.read_memory(sp, MemAccess::Other);
        let sp = sp.wrapping_add(1);
        let hi = bus.read_memory(sp, MemAccess::Other);
        self.regs.set_sp(sp.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Captures the complete processor state.
    #[must_use]
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            version: SnapshotVersion::CURRENT.as_u16(),
            registers: self.regs.clone(),
            clock: self.clock,
            tag: self.tag,
            even_m1: self.even_m1,
        }
    }

    /// Restores state captured by [`Self::snapshot`].
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnsupportedVersion`] when the snapshot was
    /// written by an unknown schema revision; the processor is left untouched.
    pub fn restore(&mut self, snapshot: &CpuSnapshot) -> Result<(), SnapshotError> {
        if SnapshotVersion::from_u16(snapshot.version).is_none() {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
            });
        }
        self.regs = snapshot.registers.clone();
        self.clock = snapshot.clock;
        self.tag = snapshot.tag;
        self.even_m1 = snapshot.even_m1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Z80;
    use crate::api::CoreConfig;
    use crate::error::SnapshotError;
    use crate::memory::FlatBus;
    use crate::state::{IndexRegister, InterruptMode, IrqBlock};

    #[test]
    fn reset_clears_registers_and_latches() {
        let mut cpu = Z80::with_config(&CoreConfig {
            even_m1: false,
            tag: 0xFEED,
        });
        let regs = cpu.regs_mut();
        regs.set_af(0x1234);
        regs.set_ix(0x5678);
        regs.set_pc(0x8000);
        regs.set_iff(true, true);
        regs.set_im(InterruptMode::Mode2);
        regs.set_halted(true);
        regs.set_irq_block(IrqBlock::EiOrPrefix);
        regs.select(IndexRegister::Iy);
        cpu.clock_mut().tstates = 999;
        cpu.clock_mut().next_event = 70_000;

        cpu.reset();

        let regs = cpu.regs();
        assert_eq!(regs.af(), 0);
        assert_eq!(regs.ix(), 0);
        assert_eq!(regs.pc(), 0);
        assert!(!regs.iff1());
        assert!(!regs.iff2());
        assert_eq!(regs.im(), InterruptMode::Mode0);
        assert!(!regs.halted());
        assert_eq!(regs.irq_block(), IrqBlock::None);
        assert_eq!(regs.selected(), IndexRegister::Hl);
        assert_eq!(cpu.tstates(), 0);
        assert_eq!(cpu.clock().next_event, 70_000);
        assert_eq!(cpu.tag(), 0xFEED);
    }

    #[test]
    fn untimed_stack_helpers_store_little_endian_and_skip_the_clock() {
        let mut cpu = Z80::new();
        let mut bus = FlatBus::new();
        cpu.regs_mut().set_sp(0x0000);

        cpu.push(&mut bus, 0xBEEF);
        assert_eq!(cpu.regs().sp(), 0xFFFE);
        assert_eq!(bus.memory()[0xFFFE], 0xEF);
        assert_eq!(bus.memory()[0xFFFF], 0xBE);

        assert_eq!(cpu.pop(&mut bus), 0xBEEF);
        assert_eq!(cpu.regs().sp(), 0x0000);
        assert_eq!(cpu.tstates(), 0);
    }

    #[test]
    fn snapshot_restores_exact_state() {
        let mut cpu = Z80::new();
        cpu.regs_mut().set_bc(0x4242);
        cpu.regs_mut().set_r(0x81);
        cpu.clock_mut().tstates = 1234;
        cpu.set_tag(7);
        let saved = cpu.snapshot();

        let mut other = Z80::new();
        other.restore(&saved).expect("current snapshot version restores");
        assert_eq!(other.regs(), cpu.regs());
        assert_eq!(other.clock(), cpu.clock());
        assert_eq!(other.tag(), 7);
    }

    #[test]
    fn snapshot_with_unknown_version_is_rejected() {
        let mut cpu = Z80::new();
        let mut saved = cpu.snapshot();
        saved.version = 99;
        cpu.regs_mut().set_pc(0x1234);

        assert_eq!(
            cpu.restore(&saved),
            Err(SnapshotError::UnsupportedVersion { found: 99 })
        );
        assert_eq!(cpu.regs().pc(), 0x1234);
    }
}
