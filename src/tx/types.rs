//! Transaction identifier and state types.

use std::fmt;

/// Transaction ID, allocated sequentially from 1 by the
/// [`TransactionManager`](super::TransactionManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId(u64);

impl TxId {
    /// Create a new transaction ID.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// Started and not yet finished.
    InProgress,
    /// Finished successfully.
    Committed,
    /// Rolled back.
    Aborted,
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxState::InProgress => "in progress",
            TxState::Committed => "committed",
            TxState::Aborted => "aborted",
        };
        write!(f, "{}", name)
    }
}
