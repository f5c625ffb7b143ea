//! Leaf operators: materialized values and sequential table scans.

use std::sync::Arc;
use std::vec;

use crate::catalog::{Catalog, TableId};
use crate::datum::Field;
use crate::storage::TupleStore;
use crate::tuple::{Schema, Tuple};
use crate::tx::TxId;

use super::error::ExecutorError;
use super::node::Operator;

/// Yields a fixed list of tuples. Rewindable.
///
/// Used for literal inputs and for materialized results such as aggregate
/// snapshots.
pub struct ValuesScan {
    schema: Arc<Schema>,
    tuples: Vec<Tuple>,
    position: usize,
}

impl ValuesScan {
    /// Creates a scan over `tuples`, which must all conform to `schema`.
    pub fn new(schema: Arc<Schema>, tuples: Vec<Tuple>) -> Self {
        Self {
            schema,
            tuples,
            position: 0,
        }
    }

    /// Builds a scan from raw field rows, validating each against `schema`.
    pub fn from_rows(
        schema: Arc<Schema>,
        rows: Vec<Vec<Field>>,
    ) -> Result<Self, ExecutorError> {
        let tuples = rows
            .into_iter()
            .map(|fields| Tuple::new(Arc::clone(&schema), fields))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(schema, tuples))
    }

    /// Returns the number of tuples held.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

impl Operator for ValuesScan {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn open(&mut self) -> Result<(), ExecutorError> {
        self.position = 0;
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), ExecutorError> {
        self.position = 0;
        Ok(())
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        let tuple = self.tuples.get(self.position).cloned();
        if tuple.is_some() {
            self.position += 1;
        }
        Ok(tuple)
    }
}

/// Scans every tuple of a table, one page at a time.
///
/// Pages are read lazily as the scan advances, so only one page of tuples is
/// buffered. Each returned tuple carries its [`RecordId`](crate::tuple::RecordId)
/// and the table's catalog schema.
///
/// The page count is taken on `open` and `rewind`; pages appended during a
/// pass are not visited until the next one.
pub struct SeqScan {
    txid: TxId,
    table_id: TableId,
    schema: Arc<Schema>,
    store: Arc<dyn TupleStore>,
    next_page: usize,
    end_page: usize,
    buffer: vec::IntoIter<Tuple>,
}

impl SeqScan {
    /// Creates a scan of `table_id` under transaction `txid`.
    pub fn new(
        txid: TxId,
        table_id: TableId,
        catalog: &dyn Catalog,
        store: Arc<dyn TupleStore>,
    ) -> Result<Self, ExecutorError> {
        let schema = catalog.table_schema(table_id)?;
        Ok(Self {
            txid,
            table_id,
            schema,
            store,
            next_page: 0,
            end_page: 0,
            buffer: Vec::new().into_iter(),
        })
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    fn restart(&mut self) {
        self.next_page = 0;
        self.end_page = 0;
        self.buffer = Vec::new().into_iter();
    }

    /// Starts a new pass over the pages that exist right now.
    fn start_pass(&mut self) -> Result<(), ExecutorError> {
        self.restart();
        self.end_page = self.store.page_count(self.table_id)?;
        Ok(())
    }
}

impl Operator for SeqScan {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn open(&mut self) -> Result<(), ExecutorError> {
        self.start_pass()
    }

    fn close(&mut self) {
        self.restart();
    }

    fn rewind(&mut self) -> Result<(), ExecutorError> {
        self.start_pass()
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        loop {
            if let Some(tuple) = self.buffer.next() {
                return Ok(Some(tuple.with_schema(Arc::clone(&self.schema))?));
            }
            if self.next_page >= self.end_page {
                return Ok(None);
            }
            let page = self
                .store
                .read_page(self.txid, self.table_id, self.next_page)?;
            self.next_page += 1;
            self.buffer = page.into_iter();
        }
    }
}
