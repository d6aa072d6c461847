//! Cycle-accurate Z80 interpreter core.
//!
//! The processor owns its registers and T-state clock; memory, ports and
//! every optional hook (contention, traps, paging, breakpoints) live behind
//! the host's [`Bus`].

/// Host-facing bus trait, hook traits and configuration types.
pub mod api;
pub use api::{
    Breakpoints, Bus, CoreConfig, CpuSnapshot, ExitReason, MemAccess, MemRequest,
    MemoryContention, OpcodeTrap, Pager, PortAccess, PortContention, PortPhase, ReturnTrap,
    SnapshotVersion,
};

/// Processor instance, reset and snapshots.
pub mod cpu;
pub use cpu::Z80;

/// Error types for rejected interrupts and snapshot restore.
pub mod error;
pub use error::{InterruptRejected, SnapshotError};

/// Decode-execute loop, execution driver and ALU primitives.
pub mod execute;

/// Flag bit masks and precomputed flag lookup tables.
pub mod flags;
pub use flags::{
    init_tables, tables_ready, FlagTables, FLAG_3, FLAG_5, FLAG_C, FLAG_H, FLAG_N, FLAG_PV,
    FLAG_S, FLAG_Z,
};

/// Maskable interrupt and NMI acceptance.
pub mod interrupt;
pub use interrupt::{IM1_VECTOR, NMI_VECTOR};

/// Address space helpers and a flat 64K bus.
pub mod memory;
pub use memory::{new_address_space, FlatBus, ADDRESS_SPACE_BYTES};

/// Register file, control latches and clock.
pub mod state;
pub use state::{
    Clock, IndexRegister, InterruptMode, IrqBlock, Registers, INDEX_REGISTER_COUNT,
};

/// Base T-state costs of bus cycles and acknowledge sequences.
pub mod timing;
pub use timing::{cycle_cost, CycleCostKind, CYCLE_COST_TABLE};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
