//! Tuple construction and access errors.

use crate::datum::Type;

/// Errors raised when a tuple would stop conforming to its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TupleError {
    /// Number of fields differs from the number of schema columns.
    ArityMismatch { expected: usize, found: usize },

    /// Field type differs from the column type at `index`.
    TypeMismatch {
        index: usize,
        expected: Type,
        found: Type,
    },

    /// Column index exceeds the number of columns.
    IndexOutOfBounds { index: usize, len: usize },
}

impl std::fmt::Display for TupleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TupleError::ArityMismatch { expected, found } => {
                write!(f, "tuple has {} fields, schema has {}", found, expected)
            }
            TupleError::TypeMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "field {} has type {}, schema expects {}",
                index, found, expected
            ),
            TupleError::IndexOutOfBounds { index, len } => {
                write!(
                    f,
                    "column index {} out of bounds for tuple with {} columns",
                    index, len
                )
            }
        }
    }
}

impl std::error::Error for TupleError {}
