//! Errors surfaced by the fleet core.

/// Failures the core reports to its callers.
///
/// Running short of nicknames during growth is not one of them: that is a
/// partial success and shows up in [`crate::ReconcileReport::pool_exhausted`].
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// A user-entered value (client count, port) did not parse or is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `draw` was called on an empty pool.
    #[error("nickname pool is exhausted")]
    PoolExhausted,

    /// A reconciliation is already running; the trigger was dropped.
    #[error("a reconciliation is already in progress")]
    Busy,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
