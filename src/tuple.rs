//! Rows and row shapes.
//!
//! This module provides:
//! - [`Schema`]: an ordered list of typed, optionally named columns
//! - [`Tuple`]: a row of [`Field`](crate::datum::Field)s conforming to a schema
//! - [`RecordId`]: the physical location of a stored tuple
//!
//! Schema equality compares column types position by position; column names
//! are descriptive only. A tuple always matches its schema exactly, which is
//! checked on construction and on every field update.

mod error;
mod row;
mod schema;

pub use error::TupleError;
pub use row::{RecordId, Tuple};
pub use schema::{Column, Schema};
