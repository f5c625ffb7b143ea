//! Transactional tuple storage.
//!
//! Operators write and read tables exclusively through the [`TupleStore`]
//! trait, always passing the owning [`TxId`](crate::tx::TxId). Tables are
//! addressed page by page so that scans can load one page at a time.
//!
//! # Architecture
//!
//! ```text
//! +-------------------+
//! | Operators         |  Insert / Delete / SeqScan / TableStats
//! +-------------------+
//!          |
//!          v
//! +-------------------+
//! | TupleStore trait  |
//! +-------------------+
//!          |
//!          v
//! +-------------------+
//! | MemoryStore       |  paged, transaction-checked, in memory
//! +-------------------+
//! ```

pub mod error;
pub mod memory;
pub mod traits;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use traits::TupleStore;
