//! Data modification operators (INSERT, DELETE).
//!
//! Both operators are one-shot: the first pull after `open`/`rewind` drains
//! the child, applies each tuple to the store, and yields a single `(count)`
//! tuple. Later pulls report end-of-stream until the operator is rewound or
//! reopened. A failed drain is not rolled back here; tuples written before
//! the failure stay in the store and undoing them belongs to the
//! transaction's owner.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{Catalog, TableId};
use crate::datum::{Field, Type};
use crate::storage::TupleStore;
use crate::tuple::{Column, Schema, Tuple};
use crate::tx::TxId;

use super::error::ExecutorError;
use super::node::{single_child, BoxedIterator, OpIterator, Operator, Phase};

/// Schema of the single summary row: one `Int` column named `count`.
fn count_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![Column::named(Type::Int, "count")]))
}

/// Pulls every tuple out of `child`, applying `apply` to each.
///
/// Returns the number of tuples applied, or the first error.
fn drain<F>(child: &mut dyn OpIterator, mut apply: F) -> Result<usize, ExecutorError>
where
    F: FnMut(&Tuple) -> Result<(), ExecutorError>,
{
    let mut count = 0;
    while child.has_next()? {
        let tuple = child.next()?;
        apply(&tuple)?;
        count += 1;
    }
    Ok(count)
}

/// Builds the `(count)` row, or fails if `count` does not fit in an `Int`.
fn count_tuple(schema: &Arc<Schema>, count: usize) -> Result<Tuple, ExecutorError> {
    let count = i32::try_from(count).map_err(|_| ExecutorError::IntegerOverflow)?;
    Ok(Tuple::new(Arc::clone(schema), vec![Field::Int(count)])?)
}

/// Inserts every tuple produced by its child into a table.
pub struct Insert {
    txid: TxId,
    table_id: TableId,
    table_schema: Arc<Schema>,
    child: BoxedIterator,
    store: Arc<dyn TupleStore>,
    schema: Arc<Schema>,
    phase: Phase,
}

impl Insert {
    /// Creates an insert of `child`'s tuples into `table_id`.
    ///
    /// Fails with [`ExecutorError::SchemaMismatch`] if the child's schema
    /// differs from the table's (column names are ignored).
    pub fn new(
        txid: TxId,
        child: BoxedIterator,
        table_id: TableId,
        catalog: &dyn Catalog,
        store: Arc<dyn TupleStore>,
    ) -> Result<Self, ExecutorError> {
        let table_schema = catalog.table_schema(table_id)?;
        check_schema(&table_schema, child.as_ref())?;
        Ok(Self {
            txid,
            table_id,
            table_schema,
            child,
            store,
            schema: count_schema(),
            phase: Phase::NotStarted,
        })
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }
}

fn check_schema(table_schema: &Schema, child: &dyn OpIterator) -> Result<(), ExecutorError> {
    if **child.schema() != *table_schema {
        return Err(ExecutorError::SchemaMismatch {
            expected: table_schema.clone(),
            found: (**child.schema()).clone(),
        });
    }
    Ok(())
}

impl Operator for Insert {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn open(&mut self) -> Result<(), ExecutorError> {
        self.child.open()?;
        self.phase = Phase::NotStarted;
        Ok(())
    }

    fn close(&mut self) {
        self.child.close();
        self.phase = Phase::NotStarted;
    }

    fn rewind(&mut self) -> Result<(), ExecutorError> {
        self.child.rewind()?;
        self.phase = Phase::NotStarted;
        Ok(())
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        match self.phase {
            Phase::NotStarted => {}
            Phase::Produced | Phase::Exhausted => {
                self.phase = Phase::Exhausted;
                return Ok(None);
            }
        }

        let (txid, table_id, store) = (self.txid, self.table_id, &self.store);
        let result = drain(self.child.as_mut(), |tuple| {
            store.insert_tuple(txid, table_id, tuple)?;
            Ok(())
        });
        let inserted = match result {
            Ok(inserted) => inserted,
            Err(e) => {
                self.phase = Phase::Exhausted;
                warn!(%txid, %table_id, error = %e, "insert aborted");
                return Err(e);
            }
        };

        self.phase = Phase::Produced;
        debug!(%txid, %table_id, inserted, "insert complete");
        count_tuple(&self.schema, inserted).map(Some)
    }

    fn children(&self) -> Vec<&dyn OpIterator> {
        vec![self.child.as_ref()]
    }

    fn set_children(
        &mut self,
        children: Vec<BoxedIterator>,
    ) -> Result<Vec<BoxedIterator>, ExecutorError> {
        let child = single_child(children)?;
        check_schema(&self.table_schema, child.as_ref())?;
        Ok(vec![std::mem::replace(&mut self.child, child)])
    }
}

/// Deletes every tuple produced by its child from the store.
///
/// Child tuples must carry the record id they were read from, as produced by
/// [`SeqScan`](super::SeqScan).
pub struct Delete {
    txid: TxId,
    child: BoxedIterator,
    store: Arc<dyn TupleStore>,
    schema: Arc<Schema>,
    phase: Phase,
}

impl Delete {
    pub fn new(txid: TxId, child: BoxedIterator, store: Arc<dyn TupleStore>) -> Self {
        Self {
            txid,
            child,
            store,
            schema: count_schema(),
            phase: Phase::NotStarted,
        }
    }
}

impl Operator for Delete {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn open(&mut self) -> Result<(), ExecutorError> {
        self.child.open()?;
        self.phase = Phase::NotStarted;
        Ok(())
    }

    fn close(&mut self) {
        self.child.close();
        self.phase = Phase::NotStarted;
    }

    fn rewind(&mut self) -> Result<(), ExecutorError> {
        self.child.rewind()?;
        self.phase = Phase::NotStarted;
        Ok(())
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        if self.phase != Phase::NotStarted {
            self.phase = Phase::Exhausted;
            return Ok(None);
        }

        let (txid, store) = (self.txid, &self.store);
        let result = drain(self.child.as_mut(), |tuple| {
            store.delete_tuple(txid, tuple)?;
            Ok(())
        });
        let deleted = match result {
            Ok(deleted) => deleted,
            Err(e) => {
                self.phase = Phase::Exhausted;
                warn!(%txid, error = %e, "delete aborted");
                return Err(e);
            }
        };

        self.phase = Phase::Produced;
        debug!(%txid, deleted, "delete complete");
        count_tuple(&self.schema, deleted).map(Some)
    }

    fn children(&self) -> Vec<&dyn OpIterator> {
        vec![self.child.as_ref()]
    }

    fn set_children(
        &mut self,
        children: Vec<BoxedIterator>,
    ) -> Result<Vec<BoxedIterator>, ExecutorError> {
        let child = single_child(children)?;
        Ok(vec![std::mem::replace(&mut self.child, child)])
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::executor::{collect_all, SeqScan, ValuesScan};
    use crate::storage::{MemoryStore, StorageError};
    use crate::tuple::RecordId;

    /// Store whose inserts fail with an I/O error after `ok_inserts` successes.
    struct FlakyStore {
        inner: MemoryStore,
        ok_inserts: parking_lot::Mutex<usize>,
    }

    impl TupleStore for FlakyStore {
        fn insert_tuple(
            &self,
            txid: TxId,
            table_id: TableId,
            tuple: &Tuple,
        ) -> Result<RecordId, StorageError> {
            let mut remaining = self.ok_inserts.lock();
            if *remaining == 0 {
                return Err(io::Error::other("disk full").into());
            }
            *remaining -= 1;
            self.inner.insert_tuple(txid, table_id, tuple)
        }

        fn delete_tuple(&self, txid: TxId, tuple: &Tuple) -> Result<(), StorageError> {
            self.inner.delete_tuple(txid, tuple)
        }

        fn page_count(&self, table_id: TableId) -> Result<usize, StorageError> {
            self.inner.page_count(table_id)
        }

        fn read_page(
            &self,
            txid: TxId,
            table_id: TableId,
            page: usize,
        ) -> Result<Vec<Tuple>, StorageError> {
            self.inner.read_page(txid, table_id, page)
        }
    }

    fn setup() -> (MemoryCatalog, Arc<MemoryStore>, TableId) {
        let catalog = MemoryCatalog::new();
        let store = Arc::new(MemoryStore::new(4));
        let schema = Schema::with_names(&[Type::Int, Type::Text], &["id", "name"]);
        let table = catalog.add_table("users", Arc::new(schema)).unwrap();
        store.create_table(table);
        (catalog, store, table)
    }

    fn users(n: i32) -> BoxedIterator {
        let schema = Arc::new(Schema::from_types(&[Type::Int, Type::Text]));
        let rows = (0..n)
            .map(|i| vec![Field::Int(i), Field::text(format!("user{}", i))])
            .collect();
        ValuesScan::from_rows(schema, rows).unwrap().boxed()
    }

    fn single_count(iter: &mut dyn OpIterator) -> i32 {
        let rows = collect_all(iter).unwrap();
        assert_eq!(rows.len(), 1);
        rows[0].field(0).unwrap().as_int().unwrap()
    }

    // ========================================
    // Insert
    // ========================================

    #[test]
    fn test_insert_yields_count_once() {
        let (catalog, store, table) = setup();
        let txid = TxId::new(1);
        let mut insert = Insert::new(txid, users(3), table, &catalog, store.clone())
            .unwrap()
            .boxed();

        assert_eq!(insert.schema().column_name(0).unwrap(), Some("count"));
        insert.open().unwrap();
        assert_eq!(single_count(insert.as_mut()), 3);
        assert!(!insert.has_next().unwrap());
        assert!(matches!(insert.next(), Err(ExecutorError::NoSuchElement)));
        assert_eq!(store.tuple_count(table).unwrap(), 3);
    }

    #[test]
    fn test_insert_empty_child() {
        let (catalog, store, table) = setup();
        let mut insert = Insert::new(TxId::new(1), users(0), table, &catalog, store.clone())
            .unwrap()
            .boxed();
        insert.open().unwrap();
        assert_eq!(single_count(insert.as_mut()), 0);
        assert_eq!(store.tuple_count(table).unwrap(), 0);
    }

    #[test]
    fn test_insert_rewind_runs_again() {
        let (catalog, store, table) = setup();
        let mut insert = Insert::new(TxId::new(1), users(2), table, &catalog, store.clone())
            .unwrap()
            .boxed();
        insert.open().unwrap();
        assert_eq!(single_count(insert.as_mut()), 2);
        insert.rewind().unwrap();
        assert_eq!(single_count(insert.as_mut()), 2);
        assert_eq!(store.tuple_count(table).unwrap(), 4);
    }

    #[test]
    fn test_insert_schema_mismatch() {
        let (catalog, store, table) = setup();
        let schema = Arc::new(Schema::from_types(&[Type::Int]));
        let child = ValuesScan::new(schema, Vec::new()).boxed();
        let err = Insert::new(TxId::new(1), child, table, &catalog, store)
            .err()
            .unwrap();
        assert!(matches!(err, ExecutorError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_insert_set_children_revalidates() {
        let (catalog, store, table) = setup();
        let mut insert = Insert::new(TxId::new(1), users(1), table, &catalog, store)
            .unwrap()
            .boxed();
        let schema = Arc::new(Schema::from_types(&[Type::Text, Type::Int]));
        let wrong = ValuesScan::new(schema, Vec::new()).boxed();
        assert!(matches!(
            insert.set_children(vec![wrong]),
            Err(ExecutorError::SchemaMismatch { .. })
        ));
        let old = insert.set_children(vec![users(5)]).unwrap();
        assert_eq!(old.len(), 1);
        insert.open().unwrap();
        assert_eq!(single_count(insert.as_mut()), 5);
    }

    #[test]
    fn test_insert_io_error_stops_drain() {
        let (catalog, _, table) = setup();
        let inner = MemoryStore::new(4);
        inner.create_table(table);
        let store = Arc::new(FlakyStore {
            inner,
            ok_inserts: parking_lot::Mutex::new(1),
        });
        let mut insert = Insert::new(TxId::new(1), users(3), table, &catalog, store.clone())
            .unwrap()
            .boxed();
        insert.open().unwrap();

        let err = insert.next().unwrap_err();
        assert!(matches!(err, ExecutorError::Storage(StorageError::Io(_))));
        assert!(std::error::Error::source(&err).is_some());
        // No rollback of the tuple written before the failure
        assert_eq!(store.inner.tuple_count(table).unwrap(), 1);
        // Exhausted until rewind
        assert!(!insert.has_next().unwrap());
    }

    // ========================================
    // Delete
    // ========================================

    #[test]
    fn test_delete_scanned_tuples() {
        let (catalog, store, table) = setup();
        let txid = TxId::new(1);
        let mut insert = Insert::new(txid, users(4), table, &catalog, store.clone())
            .unwrap()
            .boxed();
        insert.open().unwrap();
        assert_eq!(single_count(insert.as_mut()), 4);

        let scan = SeqScan::new(txid, table, &catalog, store.clone()).unwrap();
        let mut delete = Delete::new(txid, scan.boxed(), store.clone()).boxed();
        delete.open().unwrap();
        assert_eq!(single_count(delete.as_mut()), 4);
        assert_eq!(store.tuple_count(table).unwrap(), 0);

        // Rewinding scans an empty table
        delete.rewind().unwrap();
        assert_eq!(single_count(delete.as_mut()), 0);
    }

    #[test]
    fn test_delete_requires_record_ids() {
        let (_, store, _) = setup();
        let mut delete = Delete::new(TxId::new(1), users(1), store).boxed();
        delete.open().unwrap();
        let err = delete.next().unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::Storage(StorageError::MissingRecordId)
        ));
    }
}
