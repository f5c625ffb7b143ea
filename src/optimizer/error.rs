//! Statistics errors.

use crate::catalog::CatalogError;
use crate::datum::Type;
use crate::executor::ExecutorError;

/// Errors that can occur while building or querying statistics.
#[derive(Debug)]
pub enum StatsError {
    /// A histogram needs at least one bucket.
    InvalidBucketCount(usize),

    /// Histogram range with `min > max`.
    InvalidRange { min: i32, max: i32 },

    /// Value outside the histogram's `[min, max]` range.
    ValueOutOfRange { value: i32, min: i32, max: i32 },

    /// Column index past the end of the table schema.
    ColumnIndexOutOfBounds { index: usize, len: usize },

    /// Constant type differs from the column's type.
    TypeMismatch {
        index: usize,
        expected: Type,
        found: Type,
    },

    /// Catalog error during table lookup.
    Catalog(CatalogError),

    /// Error while scanning the table.
    Executor(ExecutorError),
}

impl std::fmt::Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsError::InvalidBucketCount(n) => {
                write!(f, "histogram needs at least one bucket, got {}", n)
            }
            StatsError::InvalidRange { min, max } => {
                write!(f, "invalid histogram range: min {} > max {}", min, max)
            }
            StatsError::ValueOutOfRange { value, min, max } => {
                write!(f, "value {} outside histogram range [{}, {}]", value, min, max)
            }
            StatsError::ColumnIndexOutOfBounds { index, len } => {
                write!(f, "column index {} out of bounds (len: {})", index, len)
            }
            StatsError::TypeMismatch {
                index,
                expected,
                found,
            } => {
                write!(
                    f,
                    "column {} is {}, but the constant is {}",
                    index, expected, found
                )
            }
            StatsError::Catalog(e) => write!(f, "{}", e),
            StatsError::Executor(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StatsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StatsError::Catalog(e) => Some(e),
            StatsError::Executor(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CatalogError> for StatsError {
    fn from(e: CatalogError) -> Self {
        StatsError::Catalog(e)
    }
}

impl From<ExecutorError> for StatsError {
    fn from(e: ExecutorError) -> Self {
        StatsError::Executor(e)
    }
}
