//! Database handle bundling the collaborators an operator tree needs.
//!
//! The [`Database`] type wires a [`MemoryCatalog`](crate::catalog::MemoryCatalog),
//! a [`MemoryStore`](crate::storage::MemoryStore) and a
//! [`TransactionManager`](crate::tx::TransactionManager) together so that
//! tables can be registered in one step.
//!
//! # Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |                           Database                            |
//! |                                                               |
//! |  +--------------------+  +------------------+  +------------+ |
//! |  | Arc<MemoryCatalog> |  | Arc<MemoryStore> |  | Arc<TxMgr> | |
//! |  | (TableId -> Schema)|  | (paged tuples)   |  | (TxIds)    | |
//! |  +--------------------+  +--------+---------+  +------+-----+ |
//! |                                   |   checks tx state  |       |
//! |                                   +--------------------+       |
//! +---------------------------------------------------------------+
//! ```

mod database;

pub use database::Database;
