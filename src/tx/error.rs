//! Transaction manager errors.

use std::fmt;

use super::types::{TxId, TxState};

/// Error returned when finishing a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    /// The transaction was never started by this manager.
    Unknown(TxId),
    /// Commit or abort of a transaction that already finished.
    AlreadyFinished { txid: TxId, state: TxState },
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxError::Unknown(txid) => write!(f, "transaction {} was never started", txid),
            TxError::AlreadyFinished { txid, state } => {
                write!(f, "transaction {} is already {}", txid, state)
            }
        }
    }
}

impl std::error::Error for TxError {}
