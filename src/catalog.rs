//! Catalog of tables and their schemas.
//!
//! The [`Catalog`] trait is the seam through which operators resolve a
//! [`TableId`] to its [`Schema`]. Operators receive the catalog as an explicit
//! parameter, so tests can substitute their own implementation.
//! [`MemoryCatalog`] is the in-process implementation used by
//! [`Database`](crate::db::Database).

mod error;
mod memory;

pub use error::CatalogError;
pub use memory::MemoryCatalog;

use std::fmt;
use std::sync::Arc;

use crate::tuple::Schema;

/// Opaque table identifier assigned by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(u32);

impl TableId {
    /// Creates a table identifier.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only table metadata lookups.
pub trait Catalog: Send + Sync {
    /// Returns the schema registered for `table_id`.
    fn table_schema(&self, table_id: TableId) -> Result<Arc<Schema>, CatalogError>;

    /// Returns the name registered for `table_id`.
    fn table_name(&self, table_id: TableId) -> Result<String, CatalogError>;

    /// Resolves a table name to its identifier.
    fn table_id(&self, name: &str) -> Result<TableId, CatalogError>;

    /// Returns every registered table identifier, in ascending order.
    fn table_ids(&self) -> Vec<TableId>;
}
