//! Transaction identifiers and lifecycle.
//!
//! Operators never interpret a [`TxId`]; they only pass it along on every
//! storage call. The [`TransactionManager`] allocates ids and records whether
//! each transaction is in progress, committed or aborted, which the
//! in-memory store consults to reject writes from finished transactions.

pub mod error;
pub mod manager;
pub mod types;

pub use error::TxError;
pub use manager::TransactionManager;
pub use types::{TxId, TxState};
