//! Processor register file, control latches and T-state clock.

/// Elapsed T-state counter and scheduling boundary.
pub mod clock;
/// Interrupt mode and interrupt-blocking latches.
pub mod control;
/// Main, shadow, index and internal register storage.
pub mod registers;

pub use clock::Clock;
pub use control::{InterruptMode, IrqBlock};
pub use registers::{IndexRegister, Registers, INDEX_REGISTER_COUNT};
