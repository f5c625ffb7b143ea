pub mod catalog;
pub mod datum;
pub mod db;
pub mod executor;
pub mod optimizer;
pub mod storage;
pub mod tuple;
pub mod tx;
