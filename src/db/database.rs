//! Database orchestrator for catalog, tuple store and transaction manager.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{CatalogError, MemoryCatalog, TableId};
use crate::storage::MemoryStore;
use crate::storage::memory::DEFAULT_TUPLES_PER_PAGE;
use crate::tuple::Schema;
use crate::tx::TransactionManager;

/// Database orchestrates the in-memory collaborators.
///
/// Operators never take a `Database`; they take `&dyn Catalog` and
/// `Arc<dyn TupleStore>`, which the accessors here hand out.
pub struct Database {
    catalog: Arc<MemoryCatalog>,
    store: Arc<MemoryStore>,
    tx_manager: Arc<TransactionManager>,
}

impl Database {
    /// Creates an empty database whose store holds `tuples_per_page` tuples per page.
    pub fn new(tuples_per_page: usize) -> Self {
        let tx_manager = Arc::new(TransactionManager::new());
        let store = Arc::new(MemoryStore::with_tx_manager(
            tuples_per_page,
            Arc::clone(&tx_manager),
        ));
        Self {
            catalog: Arc::new(MemoryCatalog::new()),
            store,
            tx_manager,
        }
    }

    /// Registers a table in the catalog and allocates its storage.
    pub fn create_table(&self, name: &str, schema: Schema) -> Result<TableId, CatalogError> {
        let table_id = self.catalog.add_table(name, Arc::new(schema))?;
        self.store.create_table(table_id);
        debug!(%table_id, name, "table created");
        Ok(table_id)
    }

    /// Returns a reference to the catalog.
    pub fn catalog(&self) -> &Arc<MemoryCatalog> {
        &self.catalog
    }

    /// Returns a reference to the tuple store.
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Returns a reference to the transaction manager.
    pub fn tx_manager(&self) -> &Arc<TransactionManager> {
        &self.tx_manager
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new(DEFAULT_TUPLES_PER_PAGE)
    }
}
