//! Host-facing contracts for embedding the interpreter.
//!
//! A host supplies one [`Bus`] implementation. The four data-path methods are
//! required; every timing or control hook is an optional capability exposed
//! through an accessor that returns `None` by default, so the uncontended
//! fast path stays distinguishable from an installed hook.

use crate::state::{Clock, Registers};

/// Kind of memory access reported with every read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MemAccess {
    /// M1 opcode fetch.
    Opcode,
    /// Opcode byte following a `CB`, `ED`, `DD` or `FD` prefix.
    OpcodeExt,
    /// Immediate operand, displacement or jump target.
    OpcodeArg,
    /// Data read or write.
    Data,
    /// Internal access that never contends and should not trip breakpoints.
    ///
    /// The run loop also uses it to look one byte ahead without charging
    /// time: after every `DD`/`FD` prefix (to spot a doubled prefix) and at
    /// `(HL)` before each `CPIR`/`CPDR` iteration. Such reads are repeated
    /// by the real cycle that follows, so they must have no side effects.
    Other,
}

/// Bus request signalled to a memory contention hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MemRequest {
    /// Internal T-state with the address bus driven but no `MREQ`.
    None,
    /// `MREQ` with `RD`.
    Read,
    /// `MREQ` with `WR`.
    Write,
}

/// Origin of a port access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PortAccess {
    /// Issued by an executing instruction.
    Normal,
    /// Issued by a debugger or other code outside the run loop.
    Internal,
}

/// Phase of an I/O machine cycle handed to a port contention hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PortPhase {
    /// `true` for `IN`-type cycles.
    pub input: bool,
    /// `true` for the first T-state (request of 1), `false` for the
    /// remaining contended T-states (request of 2).
    pub early: bool,
}

/// Stretches memory cycles the way a host machine's ULA or gate array would.
pub trait MemoryContention {
    /// Advances `clock.tstates` by at least `tstates` for an access at `addr`.
    fn contend(
        &mut self,
        clock: &mut Clock,
        addr: u16,
        tstates: i32,
        request: MemRequest,
        access: MemAccess,
    );
}

/// Stretches I/O cycles.
pub trait PortContention {
    /// Advances `clock.tstates` by at least `tstates` for an access to `port`.
    fn contend_port(&mut self, clock: &mut Clock, port: u16, tstates: i32, phase: PortPhase);
}

/// Receives `ED`-prefixed opcodes the processor does not define.
pub trait OpcodeTrap {
    /// Called with the second opcode byte. Return `true` to stop the run loop
    /// after this instruction.
    fn unknown_ed(&mut self, regs: &mut Registers, opcode: u8) -> bool;
}

/// Observes `RETI` and `RETN` after `IFF1` and `PC` have been restored.
pub trait ReturnTrap {
    /// Called with the second opcode byte; bit 3 set means `RETI`. Return
    /// `true` to stop the run loop.
    fn on_return(&mut self, regs: &mut Registers, opcode: u8) -> bool;
}

/// Remaps memory before every opcode fetch.
pub trait Pager {
    /// Called with the registers as they stand before the fetch.
    fn page(&mut self, regs: &Registers);
}

/// Decides whether execution stops before the next instruction.
pub trait Breakpoints {
    /// Return `true` to leave the run loop without fetching.
    fn hit(&mut self, regs: &Registers, clock: &Clock) -> bool;
}

/// Memory and I/O space the processor executes against.
///
/// The processor owns no memory; every byte comes from here. None of the
/// methods may call back into the processor's execution entry points.
pub trait Bus {
    /// Reads one byte of memory.
    ///
    /// Reads tagged [`MemAccess::Other`] are lookahead peeks and may hit
    /// the same address again as a timed cycle.
    fn read_memory(&mut self, addr: u16, access: MemAccess) -> u8;

    /// Writes one byte of memory.
    fn write_memory(&mut self, addr: u16, value: u8, access: MemAccess);

    /// Reads from an I/O port. Timing is charged by the processor.
    fn read_port(&mut self, port: u16, access: PortAccess) -> u8;

    /// Writes to an I/O port. Timing is charged by the processor.
    fn write_port(&mut self, port: u16, value: u8, access: PortAccess);

    /// Optional memory contention model.
    fn memory_contention(&mut self) -> Option<&mut dyn MemoryContention> {
        None
    }

    /// Optional port contention model.
    fn port_contention(&mut self) -> Option<&mut dyn PortContention> {
        None
    }

    /// Optional handler for undefined `ED` opcodes.
    fn opcode_trap(&mut self) -> Option<&mut dyn OpcodeTrap> {
        None
    }

    /// Optional observer for `RETI` and `RETN`.
    fn return_trap(&mut self) -> Option<&mut dyn ReturnTrap> {
        None
    }

    /// Optional per-instruction memory pager.
    fn pager(&mut self) -> Option<&mut dyn Pager> {
        None
    }

    /// Optional per-instruction breakpoint check.
    fn breakpoints(&mut self) -> Option<&mut dyn Breakpoints> {
        None
    }
}

/// Top-level configuration for a processor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Pads opcode fetches that start on an odd T-state by one T-state, as
    /// the 128K and Scorpion machines do.
    pub even_m1: bool,
    /// Opaque host value carried by the processor.
    pub tag: u64,
}

/// Why a run-loop call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    /// Elapsed T-states reached the scheduling boundary.
    BoundaryReached,
    /// The breakpoint hook asked to stop before a fetch.
    Breakpoint,
    /// An opcode or return trap asked to stop after an instruction.
    Trapped,
}

/// Stable snapshot wire-version identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision.
    V1 = 1,
}

impl SnapshotVersion {
    /// Latest revision written by [`crate::Z80::snapshot`].
    pub const CURRENT: Self = Self::V1;

    /// Converts wire value to known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Complete processor state for save/restore and replay fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuSnapshot {
    /// Raw schema version; see [`SnapshotVersion`].
    pub version: u16,
    /// Register file and control latches.
    pub registers: Registers,
    /// T-state clock.
    pub clock: Clock,
    /// Host tag.
    pub tag: u64,
    /// M1 padding setting.
    pub even_m1: bool,
}

#[cfg(test)]
mod tests {
    use super::{Bus, CoreConfig, MemAccess, PortAccess, SnapshotVersion};

    struct NullBus;

    impl Bus for NullBus {
        fn read_memory(&mut self, _addr: u16, _access: MemAccess) -> u8 {
            0xFF
        }

        fn write_memory(&mut self, _addr: u16, _value: u8, _access: MemAccess) {}

        fn read_port(&mut self, _port: u16, _access: PortAccess) -> u8 {
            0xFF
        }

        fn write_port(&mut self, _port: u16, _value: u8, _access: PortAccess) {}
    }

    #[test]
    fn default_config_disables_m1_padding() {
        let config = CoreConfig::default();
        assert!(!config.even_m1);
        assert_eq!(config.tag, 0);
    }

    #[test]
    fn optional_capabilities_default_to_absent() {
        let mut bus = NullBus;
        assert!(bus.memory_contention().is_none());
        assert!(bus.port_contention().is_none());
        assert!(bus.opcode_trap().is_none());
        assert!(bus.return_trap().is_none());
        assert!(bus.pager().is_none());
        assert!(bus.breakpoints().is_none());
    }

    #[test]
    fn snapshot_version_roundtrip_is_stable() {
        assert_eq!(SnapshotVersion::from_u16(1), Some(SnapshotVersion::V1));
        assert_eq!(SnapshotVersion::from_u16(2), None);
        assert_eq!(SnapshotVersion::CURRENT.as_u16(), 1);
    }
}
