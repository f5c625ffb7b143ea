//! Per-table statistics.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::catalog::{Catalog, TableId};
use crate::datum::{Field, Type};
use crate::executor::{ExecutorError, Operator, PredicateOp, SeqScan};
use crate::storage::TupleStore;
use crate::tuple::Schema;
use crate::tx::TxId;

use super::config::StatsConfig;
use super::error::StatsError;
use super::histogram::IntHistogram;
use super::string_histogram::StringHistogram;

/// Histogram of one column, by column type.
#[derive(Debug, Clone)]
enum ColumnHistogram {
    Int(IntHistogram),
    Text(StringHistogram),
}

impl ColumnHistogram {
    fn ty(&self) -> Type {
        match self {
            ColumnHistogram::Int(_) => Type::Int,
            ColumnHistogram::Text(_) => Type::Text,
        }
    }

    fn add(&mut self, field: &Field) {
        match (self, field) {
            (ColumnHistogram::Int(h), Field::Int(v)) => h.add_value(*v),
            (ColumnHistogram::Text(h), Field::Text(s)) => h.add_value(s),
            // Stored tuples conform to the table schema.
            _ => {}
        }
    }

    fn avg_selectivity(&self) -> f64 {
        match self {
            ColumnHistogram::Int(h) => h.avg_selectivity(),
            ColumnHistogram::Text(h) => h.avg_selectivity(),
        }
    }
}

/// Statistics about one table: its size and a histogram per column.
///
/// Computed by [`TableStats::compute`] with two sequential scans. The first
/// counts tuples and finds each `Int` column's range; the second fills the
/// histograms.
///
/// `Int` histograms cover `[min, max + 1]` so the column maximum is
/// recorded. A column whose maximum is `i32::MAX` cannot be extended; its
/// `i32::MAX` values count towards [`total_tuples`](Self::total_tuples) but
/// not towards the histogram, so `column = i32::MAX` estimates 0.0.
#[derive(Debug, Clone)]
pub struct TableStats {
    table_id: TableId,
    pages: usize,
    total_tuples: usize,
    io_cost_per_page: f64,
    histograms: Vec<ColumnHistogram>,
}

impl TableStats {
    /// Scans `table_id` under `txid` and builds its statistics.
    pub fn compute(
        txid: TxId,
        table_id: TableId,
        catalog: &dyn Catalog,
        store: Arc<dyn TupleStore>,
        config: &StatsConfig,
    ) -> Result<Self, StatsError> {
        let span = debug_span!("table_stats", %table_id);
        let _enter = span.enter();

        let pages = store
            .page_count(table_id)
            .map_err(ExecutorError::from)?;
        let mut scan = SeqScan::new(txid, table_id, catalog, store)?.boxed();
        let schema = Arc::clone(scan.schema());
        scan.open()?;

        // Pass 1: tuple count and integer ranges.
        let mut ranges: Vec<Option<(i32, i32)>> = vec![None; schema.len()];
        let mut total_tuples = 0usize;
        while scan.has_next()? {
            let tuple = scan.next()?;
            total_tuples += 1;
            for (range, field) in ranges.iter_mut().zip(tuple.fields()) {
                if let Field::Int(v) = *field {
                    *range = Some(match *range {
                        Some((lo, hi)) => (lo.min(v), hi.max(v)),
                        None => (v, v),
                    });
                }
            }
        }

        // Pass 2: histograms.
        let mut histograms = build_histograms(&schema, &ranges, config.histogram_buckets)?;
        scan.rewind()?;
        while scan.has_next()? {
            let tuple = scan.next()?;
            for (histogram, field) in histograms.iter_mut().zip(tuple.fields()) {
                histogram.add(field);
            }
        }
        scan.close();

        debug!(pages, total_tuples, "table statistics computed");
        Ok(Self {
            table_id,
            pages,
            total_tuples,
            io_cost_per_page: config.io_cost_per_page,
            histograms,
        })
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Number of pages in the table when the statistics were computed.
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn total_tuples(&self) -> usize {
        self.total_tuples
    }

    /// Estimated cost of a sequential scan: every page is read once.
    pub fn estimate_scan_cost(&self) -> f64 {
        self.pages as f64 * self.io_cost_per_page
    }

    /// Estimated number of tuples left after applying a predicate with
    /// `selectivity`.
    pub fn estimate_table_cardinality(&self, selectivity: f64) -> usize {
        (self.total_tuples as f64 * selectivity.clamp(0.0, 1.0)).floor() as usize
    }

    /// Estimates the selectivity of `column OP constant`.
    pub fn estimate_selectivity(
        &self,
        column: usize,
        op: PredicateOp,
        constant: &Field,
    ) -> Result<f64, StatsError> {
        let histogram = self.histogram(column)?;
        let estimate = match (histogram, constant) {
            (ColumnHistogram::Int(h), Field::Int(v)) => h.estimate_selectivity(op, *v),
            (ColumnHistogram::Text(h), Field::Text(s)) => h.estimate_selectivity(op, s),
            (histogram, constant) => {
                return Err(StatsError::TypeMismatch {
                    index: column,
                    expected: histogram.ty(),
                    found: constant.ty(),
                });
            }
        };
        // No tuple of an empty table satisfies anything.
        if self.total_tuples == 0 {
            return Ok(0.0);
        }
        Ok(estimate)
    }

    /// Average selectivity of predicates on `column`.
    pub fn avg_selectivity(&self, column: usize) -> Result<f64, StatsError> {
        Ok(self.histogram(column)?.avg_selectivity())
    }

    fn histogram(&self, column: usize) -> Result<&ColumnHistogram, StatsError> {
        self.histograms
            .get(column)
            .ok_or(StatsError::ColumnIndexOutOfBounds {
                index: column,
                len: self.histograms.len(),
            })
    }
}

/// Creates empty histograms for each column of `schema`.
///
/// `Int` histograms span the observed range, extended by one so that the
/// maximum value is recorded (except at `i32::MAX`).
fn build_histograms(
    schema: &Schema,
    ranges: &[Option<(i32, i32)>],
    buckets: usize,
) -> Result<Vec<ColumnHistogram>, StatsError> {
    schema
        .types()
        .zip(ranges)
        .map(|(ty, range)| match ty {
            Type::Int => {
                let (min, max) = range.unwrap_or((0, 0));
                IntHistogram::new(buckets, min, max.saturating_add(1)).map(ColumnHistogram::Int)
            }
            Type::Text => StringHistogram::new(buckets).map(ColumnHistogram::Text),
        })
        .collect()
}

/// Computes statistics for every table in the catalog, keyed by table name.
pub fn compute_statistics(
    txid: TxId,
    catalog: &dyn Catalog,
    store: Arc<dyn TupleStore>,
    config: &StatsConfig,
) -> Result<HashMap<String, TableStats>, StatsError> {
    let mut stats = HashMap::new();
    for table_id in catalog.table_ids() {
        let name = catalog.table_name(table_id)?;
        let table_stats = TableStats::compute(txid, table_id, catalog, Arc::clone(&store), config)?;
        stats.insert(name, table_stats);
    }
    Ok(stats)
}
