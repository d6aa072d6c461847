//! Timed bus cycles and a flat 64 KiB reference bus.

/// Contended memory, opcode and port cycles charged against the clock.
pub mod access;

use crate::api::{Bus, MemAccess, PortAccess};

/// Size in bytes of the flat address space (64 KiB).
pub const ADDRESS_SPACE_BYTES: usize = u16::MAX as usize + 1;

/// Allocates a zeroed 64 KiB backing store.
#[must_use]
pub fn new_address_space() -> Box<[u8]> {
    vec![0; ADDRESS_SPACE_BYTES].into_boxed_slice()
}

/// Uncontended 64 KiB RAM with an open I/O bus.
///
/// Port reads return `0xFF`; port writes are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatBus {
    memory: Box<[u8]>,
}

impl Default for FlatBus {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatBus {
    /// Creates a bus backed by zeroed RAM.
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: new_address_space(),
        }
    }

    /// Creates a bus with `program` copied to `origin`.
    #[must_use]
    pub fn with_program(origin: u16, program: &[u8]) -> Self {
        let mut bus = Self::new();
        bus.load(origin, program);
        bus
    }

    /// Copies `bytes` to `origin`, wrapping at the top of the address space.
    pub fn load(&mut self, origin: u16, bytes: &[u8]) {
        let mut addr = origin;
        for byte in bytes {
            self.memory[usize::from(addr)] = *byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Backing store.
    #[must_use]
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Mutable backing store.
    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}

impl Bus for FlatBus {
    fn read_memory(&mut self, addr: u16, _access: MemAccess) -> u8 {
        self.memory[usize::from(addr)]
    }

    fn write_memory(&mut self, addr: u16, value: u8, _access: MemAccess) {
        self.memory[usize::from(addr)] = value;
    }

    fn read_port(&mut self, _port: u16, _access: PortAccess) -> u8 {
        0xFF
    }

    fn write_port(&mut self, _port: u16, _value: u8, _access: PortAccess) {}
}
