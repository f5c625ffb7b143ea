//! In-memory catalog.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Catalog, CatalogError, TableId};
use crate::tuple::Schema;

/// A registered table.
struct TableEntry {
    name: String,
    schema: Arc<Schema>,
}

/// Catalog state protected by a single lock so that name and id indexes
/// never disagree.
#[derive(Default)]
struct CatalogState {
    /// Name → table_id index for O(1) name lookups.
    table_ids: HashMap<String, TableId>,
    /// table_id → table entry.
    tables: HashMap<TableId, TableEntry>,
    /// Next identifier to hand out.
    next_table_id: u32,
}

/// Catalog that keeps table metadata in memory.
///
/// Identifiers are allocated sequentially starting from 1.
#[derive(Default)]
pub struct MemoryCatalog {
    state: RwLock<CatalogState>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table and returns its new identifier.
    pub fn add_table(&self, name: &str, schema: Arc<Schema>) -> Result<TableId, CatalogError> {
        let mut state = self.state.write();
        if state.table_ids.contains_key(name) {
            return Err(CatalogError::TableAlreadyExists {
                name: name.to_string(),
            });
        }
        state.next_table_id += 1;
        let table_id = TableId::new(state.next_table_id);
        state.table_ids.insert(name.to_string(), table_id);
        state.tables.insert(
            table_id,
            TableEntry {
                name: name.to_string(),
                schema,
            },
        );
        Ok(table_id)
    }
}

impl Catalog for MemoryCatalog {
    fn table_schema(&self, table_id: TableId) -> Result<Arc<Schema>, CatalogError> {
        self.state
            .read()
            .tables
            .get(&table_id)
            .map(|entry| Arc::clone(&entry.schema))
            .ok_or(CatalogError::TableNotFound(table_id))
    }

    fn table_name(&self, table_id: TableId) -> Result<String, CatalogError> {
        self.state
            .read()
            .tables
            .get(&table_id)
            .map(|entry| entry.name.clone())
            .ok_or(CatalogError::TableNotFound(table_id))
    }

    fn table_id(&self, name: &str) -> Result<TableId, CatalogError> {
        self.state
            .read()
            .table_ids
            .get(name)
            .copied()
            .ok_or_else(|| CatalogError::TableNameNotFound {
                name: name.to_string(),
            })
    }

    fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<_> = self.state.read().tables.keys().copied().collect();
        ids.sort();
        ids
    }
}
