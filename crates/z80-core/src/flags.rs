//! `F` register bit layout and the process-wide flag lookup tables.

use std::sync::OnceLock;

/// Carry.
pub const FLAG_C: u8 = 0x01;
/// Add/subtract (set by the last subtraction-like operation).
pub const FLAG_N: u8 = 0x02;
/// Parity/overflow.
pub const FLAG_PV: u8 = 0x04;
/// Undocumented bit 3, usually a copy of result bit 3.
pub const FLAG_3: u8 = 0x08;
/// Half carry out of bit 3.
pub const FLAG_H: u8 = 0x10;
/// Undocumented bit 5, usually a copy of result bit 5.
pub const FLAG_5: u8 = 0x20;
/// Zero.
pub const FLAG_Z: u8 = 0x40;
/// Sign.
pub const FLAG_S: u8 = 0x80;

/// Both undocumented bits.
pub const FLAG_35: u8 = FLAG_3 | FLAG_5;
/// Sign plus both undocumented bits.
pub const FLAG_S35: u8 = FLAG_S | FLAG_3 | FLAG_5;

/// Per-byte flag components shared by every ALU primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagTables {
    parity: [u8; 256],
    sz53: [u8; 256],
    sz53p: [u8; 256],
}

static TABLES: OnceLock<FlagTables> = OnceLock::new();

/// Builds the flag tables on first use and returns the shared instance.
///
/// Calling this again is a cheap lookup. Hosts that run several cores on
/// different threads should call it once during startup.
pub fn init_tables() -> &'static FlagTables {
    TABLES.get_or_init(FlagTables::build)
}

/// Returns `true` once [`init_tables`] has completed.
#[must_use]
pub fn tables_ready() -> bool {
    TABLES.get().is_some()
}

impl FlagTables {
    fn build() -> Self {
        let mut parity = [0; 256];
        let mut sz53 = [0; 256];
        let mut sz53p = [0; 256];

        for value in 0..=u8::MAX {
            let idx = usize::from(value);
            sz53[idx] = value & FLAG_S35;
            parity[idx] = if value.count_ones() % 2 == 0 { FLAG_PV } else { 0 };
            sz53p[idx] = sz53[idx] | parity[idx];
        }
        sz53[0] |= FLAG_Z;
        sz53p[0] |= FLAG_Z;

        Self {
            parity,
            sz53,
            sz53p,
        }
    }

    /// `FLAG_PV` when `value` has even parity, else zero.
    #[must_use]
    pub fn parity(&self, value: u8) -> u8 {
        self.parity[usize::from(value)]
    }

    /// Sign, zero and undocumented bits of `value`.
    #[must_use]
    pub fn sz53(&self, value: u8) -> u8 {
        self.sz53[usize::from(value)]
    }

    /// [`Self::sz53`] combined with [`Self::parity`].
    #[must_use]
    pub fn sz53p(&self, value: u8) -> u8 {
        self.sz53p[usize::from(value)]
    }
}
