//! Executor-specific errors.

use crate::catalog::CatalogError;
use crate::datum::Type;
use crate::storage::StorageError;
use crate::tuple::{Schema, TupleError};
use crate::tx::TxId;

use super::AggregateOp;

/// Errors that can occur during query execution.
#[derive(Debug)]
pub enum ExecutorError {
    /// Retrieval or rewind on an operator that has not been opened.
    NotOpen,

    /// `next()` was called after the operator reached end-of-stream.
    NoSuchElement,

    /// `set_children` received the wrong number of operators.
    ChildCount { expected: usize, found: usize },

    /// Children cannot be replaced while the operator is open.
    ChildrenWhileOpen,

    /// Child output schema does not match the target table's schema.
    SchemaMismatch { expected: Schema, found: Schema },

    /// Aggregate operator not supported by the chosen aggregator.
    UnsupportedAggregate { op: AggregateOp },

    /// Field type differs from the type an operator was configured for.
    TypeMismatch { expected: Type, found: Type },

    /// Integer result does not fit in an `Int` field.
    IntegerOverflow,

    /// Tuple construction or field access failed.
    Tuple(TupleError),

    /// Catalog error during table lookup.
    Catalog(CatalogError),

    /// Storage failure; carries the underlying cause.
    Storage(StorageError),

    /// The storage layer aborted the owning transaction.
    TransactionAborted(TxId),
}

impl std::fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorError::NotOpen => write!(f, "operator not open"),
            ExecutorError::NoSuchElement => write!(f, "no more tuples"),
            ExecutorError::ChildCount { expected, found } => {
                write!(f, "expected {} child operators, got {}", expected, found)
            }
            ExecutorError::ChildrenWhileOpen => {
                write!(f, "cannot replace children of an open operator")
            }
            ExecutorError::SchemaMismatch { expected, found } => {
                write!(
                    f,
                    "schema mismatch: table has [{}], child produces [{}]",
                    expected, found
                )
            }
            ExecutorError::UnsupportedAggregate { op } => {
                write!(f, "aggregate {} is not supported for this column type", op)
            }
            ExecutorError::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            ExecutorError::IntegerOverflow => write!(f, "integer overflow"),
            ExecutorError::Tuple(e) => write!(f, "{}", e),
            ExecutorError::Catalog(e) => write!(f, "{}", e),
            ExecutorError::Storage(e) => write!(f, "storage error: {}", e),
            ExecutorError::TransactionAborted(txid) => {
                write!(f, "transaction {} aborted", txid)
            }
        }
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecutorError::Tuple(e) => Some(e),
            ExecutorError::Catalog(e) => Some(e),
            ExecutorError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TupleError> for ExecutorError {
    fn from(e: TupleError) -> Self {
        ExecutorError::Tuple(e)
    }
}

impl From<CatalogError> for ExecutorError {
    fn from(e: CatalogError) -> Self {
        ExecutorError::Catalog(e)
    }
}

/// Transaction aborts are surfaced as-is; every other storage failure is
/// wrapped with its cause.
impl From<StorageError> for ExecutorError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::TransactionAborted(txid) => ExecutorError::TransactionAborted(txid),
            other => ExecutorError::Storage(other),
        }
    }
}
