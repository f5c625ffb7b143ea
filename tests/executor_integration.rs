//! Integration tests for operator trees running against a Database.
//!
//! These tests drive Insert, SeqScan, Filter, Delete and Aggregate through
//! the public iterator protocol, with storage provided by the in-memory
//! collaborators or by a failing test double.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use tupledb::catalog::{Catalog, MemoryCatalog, TableId};
use tupledb::datum::{Field, Type};
use tupledb::db::Database;
use tupledb::executor::{
    collect_all, Aggregate, AggregateOp, BoxedIterator, Delete, ExecutorError, Filter, Insert,
    OpIterator, Operator, Predicate, PredicateOp, SeqScan, ValuesScan,
};
use tupledb::storage::{StorageError, TupleStore};
use tupledb::tuple::{RecordId, Schema, Tuple};
use tupledb::tx::TxId;

fn people_schema() -> Schema {
    Schema::with_names(&[Type::Int, Type::Text, Type::Int], &["id", "city", "age"])
}

fn people(rows: &[(i32, &str, i32)]) -> BoxedIterator {
    let schema = Arc::new(Schema::from_types(&[Type::Int, Type::Text, Type::Int]));
    let rows = rows
        .iter()
        .map(|&(id, city, age)| vec![Field::Int(id), Field::text(city), Field::Int(age)])
        .collect();
    ValuesScan::from_rows(schema, rows).unwrap().boxed()
}

fn run_count(iter: &mut dyn OpIterator) -> i32 {
    iter.open().unwrap();
    let rows = collect_all(iter).unwrap();
    iter.close();
    assert_eq!(rows.len(), 1);
    rows[0].field(0).unwrap().as_int().unwrap()
}

fn scan_all(db: &Database, txid: TxId, table: TableId) -> Vec<Tuple> {
    let mut scan = SeqScan::new(txid, table, &**db.catalog(), db.store().clone())
        .unwrap()
        .boxed();
    scan.open().unwrap();
    collect_all(scan.as_mut()).unwrap()
}

// ========================================
// Insert
// ========================================

#[test]
fn test_insert_three_tuples_then_scan() {
    let db = Database::default();
    let table = db.create_table("people", people_schema()).unwrap();
    let txid = db.tx_manager().begin();

    let child = people(&[(1, "Oslo", 30), (2, "Lima", 41), (3, "Oslo", 25)]);
    let insert = Insert::new(txid, child, table, &**db.catalog(), db.store().clone());
    let mut insert = insert.unwrap().boxed();

    assert_eq!(run_count(insert.as_mut()), 3);

    let stored = scan_all(&db, txid, table);
    let ids: Vec<_> = stored
        .iter()
        .map(|t| t.field(0).unwrap().as_int().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(stored.iter().all(|t| t.record_id().is_some()));
    db.tx_manager().commit(txid).unwrap();
}

#[test]
fn test_insert_is_one_shot_until_rewind() {
    let db = Database::default();
    let table = db.create_table("people", people_schema()).unwrap();
    let txid = db.tx_manager().begin();

    let child = people(&[(1, "Oslo", 30)]);
    let mut insert = Insert::new(txid, child, table, &**db.catalog(), db.store().clone())
        .unwrap()
        .boxed();
    insert.open().unwrap();
    assert_eq!(insert.next().unwrap().field(0).unwrap(), &Field::Int(1));
    for _ in 0..3 {
        assert!(!insert.has_next().unwrap());
    }
    assert!(matches!(insert.next(), Err(ExecutorError::NoSuchElement)));

    insert.rewind().unwrap();
    assert!(insert.has_next().unwrap());
    insert.next().unwrap();
    assert_eq!(db.store().tuple_count(table).unwrap(), 2);
}

#[test]
fn test_insert_select_from_same_table_terminates() {
    let db = Database::new(2);
    let table = db.create_table("people", people_schema()).unwrap();
    let txid = db.tx_manager().begin();
    let rows = [(1, "Oslo", 30), (2, "Lima", 41), (3, "Oslo", 25), (4, "Rome", 60)];
    let mut seed = Insert::new(txid, people(&rows), table, &**db.catalog(), db.store().clone())
        .unwrap()
        .boxed();
    assert_eq!(run_count(seed.as_mut()), 4);

    let scan = SeqScan::new(txid, table, &**db.catalog(), db.store().clone()).unwrap();
    let mut copy = Insert::new(txid, scan.boxed(), table, &**db.catalog(), db.store().clone())
        .unwrap()
        .boxed();
    assert_eq!(run_count(copy.as_mut()), 4);
    assert_eq!(db.store().tuple_count(table).unwrap(), 8);
}

#[test]
fn test_insert_into_unknown_table() {
    let db = Database::default();
    let err = Insert::new(
        TxId::new(1),
        people(&[]),
        TableId::new(42),
        &**db.catalog(),
        db.store().clone(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, ExecutorError::Catalog(_)));
}

#[test]
fn test_insert_after_abort_surfaces_transaction_aborted() {
    let db = Database::default();
    let table = db.create_table("people", people_schema()).unwrap();
    let txid = db.tx_manager().begin();
    db.tx_manager().abort(txid).unwrap();

    let child = people(&[(1, "Oslo", 30)]);
    let mut insert = Insert::new(txid, child, table, &**db.catalog(), db.store().clone())
        .unwrap()
        .boxed();
    insert.open().unwrap();
    let err = insert.next().unwrap_err();
    assert!(matches!(err, ExecutorError::TransactionAborted(t) if t == txid));
    assert_eq!(db.store().tuple_count(table).unwrap(), 0);
}

/// Tuple store whose every insert fails with an I/O error, recording attempts.
struct BrokenDisk {
    attempts: Mutex<usize>,
}

impl TupleStore for BrokenDisk {
    fn insert_tuple(&self, _: TxId, _: TableId, _: &Tuple) -> Result<RecordId, StorageError> {
        *self.attempts.lock() += 1;
        Err(io::Error::other("write failed").into())
    }

    fn delete_tuple(&self, _: TxId, _: &Tuple) -> Result<(), StorageError> {
        Err(StorageError::MissingRecordId)
    }

    fn page_count(&self, table_id: TableId) -> Result<usize, StorageError> {
        Err(StorageError::TableNotFound(table_id))
    }

    fn read_page(&self, _: TxId, table_id: TableId, _: usize) -> Result<Vec<Tuple>, StorageError> {
        Err(StorageError::TableNotFound(table_id))
    }
}

#[test]
fn test_insert_io_failure_aborts_drain() {
    let catalog = MemoryCatalog::new();
    let table = catalog.add_table("people", Arc::new(people_schema())).unwrap();
    let disk = Arc::new(BrokenDisk {
        attempts: Mutex::new(0),
    });

    let child = people(&[(1, "Oslo", 30), (2, "Lima", 41)]);
    let mut insert = Insert::new(TxId::new(1), child, table, &catalog, disk.clone())
        .unwrap()
        .boxed();
    insert.open().unwrap();

    let err = insert.next().unwrap_err();
    assert!(matches!(err, ExecutorError::Storage(StorageError::Io(_))));
    let cause = std::error::Error::source(&err).unwrap();
    assert!(cause.to_string().contains("write failed"));
    // The first failure stops the drain
    assert_eq!(*disk.attempts.lock(), 1);
    assert!(!insert.has_next().unwrap());
}

// ========================================
// Scan, filter, delete
// ========================================

#[test]
fn test_filtered_delete() {
    let db = Database::new(2);
    let table = db.create_table("people", people_schema()).unwrap();
    let txid = db.tx_manager().begin();
    let rows = [(1, "Oslo", 30), (2, "Lima", 41), (3, "Oslo", 25), (4, "Rome", 60), (5, "Oslo", 19)];
    let mut insert = Insert::new(txid, people(&rows), table, &**db.catalog(), db.store().clone())
        .unwrap()
        .boxed();
    assert_eq!(run_count(insert.as_mut()), 5);

    let scan = SeqScan::new(txid, table, &**db.catalog(), db.store().clone()).unwrap();
    let filter = Filter::new(Predicate::new(1, PredicateOp::Equals, "Oslo"), scan.boxed());
    let mut delete = Delete::new(txid, filter.boxed(), db.store().clone()).boxed();
    assert_eq!(delete.children().len(), 1);
    assert_eq!(run_count(delete.as_mut()), 3);

    let cities: Vec<_> = scan_all(&db, txid, table)
        .iter()
        .map(|t| t.field(1).unwrap().to_string())
        .collect();
    assert_eq!(cities, vec!["Lima", "Rome"]);
}

#[test]
fn test_operators_require_open() {
    let db = Database::default();
    let table = db.create_table("people", people_schema()).unwrap();
    let mut scan = SeqScan::new(TxId::new(1), table, &**db.catalog(), db.store().clone())
        .unwrap()
        .boxed();
    assert!(matches!(scan.has_next(), Err(ExecutorError::NotOpen)));
    assert!(matches!(scan.rewind(), Err(ExecutorError::NotOpen)));
    assert_eq!(scan.schema().index_of("age"), Some(2));
}

// ========================================
// Aggregate
// ========================================

#[test]
fn test_aggregate_over_table() {
    let db = Database::default();
    let table = db.create_table("people", people_schema()).unwrap();
    let txid = db.tx_manager().begin();
    let rows = [(1, "Oslo", 30), (2, "Lima", 41), (3, "Oslo", 25), (4, "Lima", 60), (5, "Oslo", 20)];
    let mut insert = Insert::new(txid, people(&rows), table, &**db.catalog(), db.store().clone())
        .unwrap()
        .boxed();
    run_count(insert.as_mut());

    let scan = SeqScan::new(txid, table, &**db.catalog(), db.store().clone()).unwrap();
    let mut avg = Aggregate::new(scan.boxed(), 2, Some(1), AggregateOp::Avg)
        .unwrap()
        .boxed();
    assert_eq!(avg.schema().column_name(1).unwrap(), Some("AVG(age)"));

    avg.open().unwrap();
    let mut out: Vec<_> = collect_all(avg.as_mut())
        .unwrap()
        .iter()
        .map(|t| (t.field(0).unwrap().to_string(), t.field(1).unwrap().as_int().unwrap()))
        .collect();
    out.sort();
    assert_eq!(out, vec![("Lima".to_string(), 50), ("Oslo".to_string(), 25)]);

    // Rewinding recomputes from a fresh state
    avg.rewind().unwrap();
    assert_eq!(collect_all(avg.as_mut()).unwrap().len(), 2);
}

#[test]
fn test_ungrouped_count_over_text_column() {
    let db = Database::default();
    let table = db.create_table("people", people_schema()).unwrap();
    let txid = db.tx_manager().begin();
    let scan = SeqScan::new(txid, table, &**db.catalog(), db.store().clone()).unwrap();
    let mut count = Aggregate::new(scan.boxed(), 1, None, AggregateOp::Count)
        .unwrap()
        .boxed();

    // Empty table: no row at all
    count.open().unwrap();
    assert!(!count.has_next().unwrap());
    count.close();

    let mut insert = Insert::new(
        txid,
        people(&[(1, "Oslo", 30), (2, "Lima", 41)]),
        table,
        &**db.catalog(),
        db.store().clone(),
    )
    .unwrap()
    .boxed();
    run_count(insert.as_mut());
    assert_eq!(run_count(count.as_mut()), 2);
}

#[test]
fn test_catalog_lookup_by_name() {
    let db = Database::default();
    let table = db.create_table("people", people_schema()).unwrap();
    let catalog: &dyn Catalog = &**db.catalog();
    assert_eq!(catalog.table_id("people").unwrap(), table);
    assert_eq!(*catalog.table_schema(table).unwrap(), people_schema());
}
