/// Maskable-interrupt dispatch strategy selected by `IM n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InterruptMode {
    /// Execute the instruction on the data bus; approximated as `RST 38h`
    /// with the timing of a bus-supplied `CALL`.
    #[default]
    Mode0,
    /// Fixed restart at `0x0038`.
    Mode1,
    /// Vectored through the table addressed by the `I` register.
    Mode2,
}

impl InterruptMode {
    /// Decodes a raw mode number. Only the low two bits are significant and
    /// the undefined mode 3 rounds down to mode 0.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            1 => Self::Mode1,
            2 => Self::Mode2,
            _ => Self::Mode0,
        }
    }

    /// Returns the mode number (`0..=2`).
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Mode0 => 0,
            Self::Mode1 => 1,
            Self::Mode2 => 2,
        }
    }
}

/// What the previous instruction means for the next maskable interrupt check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum IrqBlock {
    /// No restriction.
    #[default]
    None,
    /// `EI` or a standalone index prefix: the next request is refused.
    EiOrPrefix,
    /// `LD A,I` or `LD A,R`: the next check clears `P/V`.
    LoadAFromIr,
}
