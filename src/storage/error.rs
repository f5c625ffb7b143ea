//! Storage layer errors.

use crate::catalog::TableId;
use crate::tuple::RecordId;
use crate::tx::TxId;

/// Storage layer errors.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error from the underlying medium.
    Io(std::io::Error),

    /// The table has no storage registered.
    TableNotFound(TableId),

    /// The page does not exist in the table.
    PageNotFound { table_id: TableId, page: usize },

    /// No live tuple is stored at this location.
    RecordNotFound(RecordId),

    /// A delete was requested for a tuple that was never stored.
    MissingRecordId,

    /// The transaction is no longer allowed to access storage.
    ///
    /// Raised when the owning transaction has been aborted (or otherwise
    /// finished) by the transaction manager.
    TransactionAborted(TxId),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::TableNotFound(id) => write!(f, "no storage for table {}", id),
            StorageError::PageNotFound { table_id, page } => {
                write!(f, "page {} not found in table {}", page, table_id)
            }
            StorageError::RecordNotFound(rid) => write!(f, "no tuple at {}", rid),
            StorageError::MissingRecordId => write!(f, "tuple has no record id"),
            StorageError::TransactionAborted(txid) => {
                write!(f, "transaction {} aborted", txid)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}
