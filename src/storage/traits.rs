//! Tuple store trait definition.

use crate::catalog::TableId;
use crate::tuple::{RecordId, Tuple};
use crate::tx::TxId;

use super::StorageError;

/// Transactional tuple storage used by operators.
///
/// Every call is scoped to a transaction. Implementations decide how pages
/// are cached, locked and made durable; callers only see success, an
/// [`StorageError::Io`] failure, or [`StorageError::TransactionAborted`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so that one store can be shared by
/// many operator trees through an `Arc`.
pub trait TupleStore: Send + Sync {
    /// Stores `tuple` in `table_id` and returns its new location.
    fn insert_tuple(
        &self,
        txid: TxId,
        table_id: TableId,
        tuple: &Tuple,
    ) -> Result<RecordId, StorageError>;

    /// Removes the stored tuple addressed by `tuple`'s record id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingRecordId` if the tuple was never stored.
    fn delete_tuple(&self, txid: TxId, tuple: &Tuple) -> Result<(), StorageError>;

    /// Returns the number of pages currently allocated to `table_id`.
    fn page_count(&self, table_id: TableId) -> Result<usize, StorageError>;

    /// Returns the live tuples on one page, each carrying its record id.
    fn read_page(
        &self,
        txid: TxId,
        table_id: TableId,
        page: usize,
    ) -> Result<Vec<Tuple>, StorageError>;
}
