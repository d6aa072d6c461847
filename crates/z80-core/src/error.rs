use thiserror::Error;

/// Reason a maskable interrupt request was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InterruptRejected {
    /// `IFF1` is clear.
    #[error("maskable interrupts are disabled")]
    Disabled,
    /// The previous instruction was `EI` or a standalone index prefix.
    #[error("interrupt blocked by the preceding EI or index prefix")]
    Blocked,
}

/// Failure restoring processor state from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SnapshotError {
    /// Snapshot was written by a schema revision this build does not know.
    #[error("unsupported snapshot version {found}")]
    UnsupportedVersion {
        /// Raw version number carried by the snapshot.
        found: u16,
    },
}
