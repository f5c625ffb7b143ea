//! Catalog-specific errors.

use super::TableId;

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No table is registered under this identifier.
    TableNotFound(TableId),

    /// No table is registered under this name.
    TableNameNotFound { name: String },

    /// Table already exists.
    TableAlreadyExists { name: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::TableNotFound(id) => write!(f, "table {} does not exist", id),
            CatalogError::TableNameNotFound { name } => {
                write!(f, "table \"{}\" does not exist", name)
            }
            CatalogError::TableAlreadyExists { name } => {
                write!(f, "table \"{}\" already exists", name)
            }
        }
    }
}

impl std::error::Error for CatalogError {}
