//! In-memory tuple store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::catalog::TableId;
use crate::tuple::{RecordId, Tuple};
use crate::tx::{TransactionManager, TxId};

use super::{StorageError, TupleStore};

/// Default number of tuple slots per page.
pub const DEFAULT_TUPLES_PER_PAGE: usize = 64;

/// Pages of one table. A `None` slot is free.
#[derive(Default)]
struct TableHeap {
    pages: Vec<Vec<Option<Tuple>>>,
}

/// Tuple store that keeps every table in memory.
///
/// Tables are split into pages of a fixed number of slots. Inserts reuse the
/// first free slot, so deleted space is recycled. When constructed with a
/// [`TransactionManager`], every call first checks that the transaction is
/// still in progress and fails with [`StorageError::TransactionAborted`]
/// otherwise.
///
/// The lock is held only for the duration of a single call; no
/// transaction-level locking is performed.
pub struct MemoryStore {
    tables: RwLock<HashMap<TableId, TableHeap>>,
    tuples_per_page: usize,
    tx_manager: Option<Arc<TransactionManager>>,
}

impl MemoryStore {
    /// Creates an empty store with `tuples_per_page` slots per page.
    pub fn new(tuples_per_page: usize) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            tuples_per_page: tuples_per_page.max(1),
            tx_manager: None,
        }
    }

    /// Creates an empty store that rejects calls from finished transactions.
    pub fn with_tx_manager(tuples_per_page: usize, tx_manager: Arc<TransactionManager>) -> Self {
        Self {
            tx_manager: Some(tx_manager),
            ..Self::new(tuples_per_page)
        }
    }

    /// Allocates empty storage for `table_id`. Existing storage is kept.
    pub fn create_table(&self, table_id: TableId) {
        self.tables.write().entry(table_id).or_default();
    }

    /// Returns the number of live tuples in `table_id`.
    pub fn tuple_count(&self, table_id: TableId) -> Result<usize, StorageError> {
        let tables = self.tables.read();
        let heap = tables
            .get(&table_id)
            .ok_or(StorageError::TableNotFound(table_id))?;
        Ok(heap.pages.iter().flatten().filter(|t| t.is_some()).count())
    }

    fn check_active(&self, txid: TxId) -> Result<(), StorageError> {
        match &self.tx_manager {
            Some(manager) if !manager.is_active(txid) => Err(StorageError::TransactionAborted(txid)),
            _ => Ok(()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_TUPLES_PER_PAGE)
    }
}

impl TupleStore for MemoryStore {
    fn insert_tuple(
        &self,
        txid: TxId,
        table_id: TableId,
        tuple: &Tuple,
    ) -> Result<RecordId, StorageError> {
        self.check_active(txid)?;
        let mut tables = self.tables.write();
        let heap = tables
            .get_mut(&table_id)
            .ok_or(StorageError::TableNotFound(table_id))?;

        let mut target = None;
        for (page_no, page) in heap.pages.iter().enumerate() {
            if let Some(slot) = page.iter().position(Option::is_none) {
                target = Some((page_no, slot));
                break;
            }
            if page.len() < self.tuples_per_page {
                target = Some((page_no, page.len()));
                break;
            }
        }
        let (page, slot) = match target {
            Some(location) => location,
            None => {
                heap.pages.push(Vec::with_capacity(self.tuples_per_page));
                (heap.pages.len() - 1, 0)
            }
        };

        let rid = RecordId {
            table_id,
            page,
            slot,
        };
        let mut stored = tuple.clone();
        stored.set_record_id(Some(rid));

        let slots = &mut heap.pages[page];
        if slot == slots.len() {
            slots.push(Some(stored));
        } else {
            slots[slot] = Some(stored);
        }
        trace!(%txid, %rid, "tuple inserted");
        Ok(rid)
    }

    fn delete_tuple(&self, txid: TxId, tuple: &Tuple) -> Result<(), StorageError> {
        self.check_active(txid)?;
        let rid = tuple.record_id().ok_or(StorageError::MissingRecordId)?;
        let mut tables = self.tables.write();
        let heap = tables
            .get_mut(&rid.table_id)
            .ok_or(StorageError::TableNotFound(rid.table_id))?;
        let slot = heap
            .pages
            .get_mut(rid.page)
            .and_then(|page| page.get_mut(rid.slot))
            .ok_or(StorageError::RecordNotFound(rid))?;
        if slot.take().is_none() {
            return Err(StorageError::RecordNotFound(rid));
        }
        trace!(%txid, %rid, "tuple deleted");
        Ok(())
    }

    fn page_count(&self, table_id: TableId) -> Result<usize, StorageError> {
        self.tables
            .read()
            .get(&table_id)
            .map(|heap| heap.pages.len())
            .ok_or(StorageError::TableNotFound(table_id))
    }

    fn read_page(
        &self,
        txid: TxId,
        table_id: TableId,
        page: usize,
    ) -> Result<Vec<Tuple>, StorageError> {
        self.check_active(txid)?;
        let tables = self.tables.read();
        let heap = tables
            .get(&table_id)
            .ok_or(StorageError::TableNotFound(table_id))?;
        let slots = heap
            .pages
            .get(page)
            .ok_or(StorageError::PageNotFound { table_id, page })?;
        Ok(slots.iter().flatten().cloned().collect())
    }
}
