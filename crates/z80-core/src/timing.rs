/// Bus cycles and internal sequences with a fixed T-state cost when no
/// contention hook is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CycleCostKind {
    /// M1 opcode fetch including refresh.
    OpcodeFetch,
    /// Memory read or write machine cycle.
    MemoryAccess,
    /// First T-state of an I/O cycle.
    PortEarly,
    /// Remaining contended T-states of an I/O cycle.
    PortLate,
    /// Uncontended T-state closing every I/O cycle.
    PortCompletion,
    /// Maskable interrupt acknowledge in modes 1 and 2.
    InterruptAck,
    /// Extra cost of the bus-supplied instruction in mode 0.
    InterruptMode0Surcharge,
    /// Non-maskable interrupt acknowledge.
    NmiAck,
    /// Internal cycles spent rewinding a repeating block instruction.
    BlockRepeat,
}

/// Single source-of-truth table of fixed access costs.
pub const CYCLE_COST_TABLE: &[(CycleCostKind, i32)] = &[
    (CycleCostKind::OpcodeFetch, 4),
    (CycleCostKind::MemoryAccess, 3),
    (CycleCostKind::PortEarly, 1),
    (CycleCostKind::PortLate, 2),
    (CycleCostKind::PortCompletion, 1),
    (CycleCostKind::InterruptAck, 7),
    (CycleCostKind::InterruptMode0Surcharge, 6),
    (CycleCostKind::NmiAck, 5),
    (CycleCostKind::BlockRepeat, 5),
];

impl CycleCostKind {
    /// Looks up this kind in [`CYCLE_COST_TABLE`]; usable in constant context.
    #[must_use]
    pub const fn cycles(self) -> i32 {
        let mut idx = 0;
        while idx < CYCLE_COST_TABLE.len() {
            let (kind, cycles) = CYCLE_COST_TABLE[idx];
            if kind as u8 == self as u8 {
                return cycles;
            }
            idx += 1;
        }
        0
    }
}

/// Looks up the cycle cost for a cycle-cost kind.
#[must_use]
pub fn cycle_cost(kind: CycleCostKind) -> Option<i32> {
    CYCLE_COST_TABLE
        .iter()
        .find_map(|(entry_kind, cycles)| (*entry_kind == kind).then_some(*cycles))
}

pub(crate) const OPCODE_FETCH: i32 = CycleCostKind::OpcodeFetch.cycles();
pub(crate) const MEMORY_ACCESS: i32 = CycleCostKind::MemoryAccess.cycles();
pub(crate) const PORT_EARLY: i32 = CycleCostKind::PortEarly.cycles();
pub(crate) const PORT_LATE: i32 = CycleCostKind::PortLate.cycles();
pub(crate) const PORT_COMPLETION: i32 = CycleCostKind::PortCompletion.cycles();
pub(crate) const INTERRUPT_ACK: i32 = CycleCostKind::InterruptAck.cycles();
pub(crate) const IM0_SURCHARGE: i32 = CycleCostKind::InterruptMode0Surcharge.cycles();
pub(crate) const NMI_ACK: i32 = CycleCostKind::NmiAck.cycles();
pub(crate) const BLOCK_REPEAT: i32 = CycleCostKind::BlockRepeat.cycles();
