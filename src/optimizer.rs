//! Statistics for cost-based optimization.
//!
//! Per-column histograms estimate the fraction of a table's tuples that
//! satisfy a `column OP constant` predicate; [`TableStats`] combines them
//! with page counts into the scan-cost and cardinality estimates a planner
//! consumes.
//!
//! ```text
//! TableStats (per table)
//!   ├── pages, total tuples ── estimate_scan_cost / estimate_table_cardinality
//!   └── one histogram per column
//!         ├── IntHistogram     (Int columns)
//!         └── StringHistogram  (Text columns, via IntHistogram)
//! ```

mod config;
mod error;
mod histogram;
mod string_histogram;
mod table_stats;

pub use config::StatsConfig;
pub use error::StatsError;
pub use histogram::IntHistogram;
pub use string_histogram::StringHistogram;
pub use table_stats::{compute_statistics, TableStats};
