//! Transaction manager.
//!
//! Allocates TxIds and tracks commit/abort state. Isolation and durability
//! are out of scope: the manager only answers whether a transaction may
//! still write.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use super::error::TxError;
use super::{TxId, TxState};

/// Internal state protected by a single mutex to ensure atomicity
/// between txid allocation and state registration.
struct TxManagerState {
    /// Next transaction ID to allocate.
    next_txid: u64,
    /// Transaction state map (in-progress, committed, aborted).
    tx_states: HashMap<TxId, TxState>,
}

/// Transaction manager.
///
/// Responsibilities:
/// - Allocate sequential TxIds starting from 1
/// - Maintain transaction commit/abort state
pub struct TransactionManager {
    state: Mutex<TxManagerState>,
}

impl TransactionManager {
    /// Create a new transaction manager.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TxManagerState {
                next_txid: 1,
                tx_states: HashMap::new(),
            }),
        }
    }

    /// Begin a new transaction and mark it as in-progress.
    pub fn begin(&self) -> TxId {
        let mut state = self.state.lock();
        let txid = TxId::new(state.next_txid);
        state.next_txid += 1;
        state.tx_states.insert(txid, TxState::InProgress);
        debug!(%txid, "transaction started");
        txid
    }

    /// Commit a transaction.
    pub fn commit(&self, txid: TxId) -> Result<(), TxError> {
        self.complete(txid, TxState::Committed)
    }

    /// Abort a transaction.
    ///
    /// Writes already applied on behalf of `txid` are not undone here.
    pub fn abort(&self, txid: TxId) -> Result<(), TxError> {
        self.complete(txid, TxState::Aborted)
    }

    /// Marks an in-progress transaction as `new_state`.
    fn complete(&self, txid: TxId, new_state: TxState) -> Result<(), TxError> {
        let mut state = self.state.lock();
        match state.tx_states.get_mut(&txid) {
            Some(current @ TxState::InProgress) => {
                *current = new_state;
                debug!(%txid, state = %new_state, "transaction finished");
                Ok(())
            }
            Some(current) => Err(TxError::AlreadyFinished {
                txid,
                state: *current,
            }),
            None => Err(TxError::Unknown(txid)),
        }
    }

    /// Get the state of a transaction, or `None` if it was never started here.
    pub fn state(&self, txid: TxId) -> Option<TxState> {
        self.state.lock().tx_states.get(&txid).copied()
    }

    /// Returns true if `txid` is in progress.
    pub fn is_active(&self, txid: TxId) -> bool {
        self.state(txid) == Some(TxState::InProgress)
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}
