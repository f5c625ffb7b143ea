//! Query executor implementing the Volcano iterator model.
//!
//! Operators form a tree; the caller drives the root with
//! `has_next`/`next` and every operator pulls from its children the same
//! way. Data flows bottom-up one tuple at a time, except for blocking
//! operators (aggregation) and one-shot DML operators that drain their child
//! before producing output.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   |
//! Insert ── (count)
//!   └── Filter
//!         └── SeqScan ── TupleStore::read_page
//! ```
//!
//! # Components
//!
//! - [`OpIterator`] / [`Operator`] / [`Node`]: the pull protocol
//! - [`ValuesScan`], [`SeqScan`]: leaf operators
//! - [`Filter`] with [`Predicate`]: selection
//! - [`Insert`], [`Delete`]: one-shot mutation operators
//! - [`Aggregate`] over [`CountAggregator`] / [`IntegerAggregator`]: grouping

mod aggregate;
mod dml;
mod error;
mod filter;
mod hash_aggregate;
mod node;
mod predicate;
mod scan;

pub use aggregate::{
    AggregateOp, Aggregator, CountAggregator, GroupBy, GroupKey, IntegerAggregator,
};
pub use dml::{Delete, Insert};
pub use error::ExecutorError;
pub use filter::Filter;
pub use hash_aggregate::Aggregate;
pub use node::{collect_all, BoxedIterator, Node, OpIterator, Operator};
pub use predicate::{Predicate, PredicateOp};
pub use scan::{SeqScan, ValuesScan};
