//! Grouping aggregators and accumulators.
//!
//! An [`Aggregator`] is fed tuples one at a time through
//! [`merge`](Aggregator::merge) and keeps one piece of state per distinct
//! group key. [`iterator`](Aggregator::iterator) snapshots that state into a
//! materialized, rewindable operator producing one row per group:
//!
//! - grouped: `(groupVal, aggregateVal)`
//! - ungrouped: `(aggregateVal)`
//!
//! Row order is unspecified. An ungrouped aggregator that has seen no input
//! produces no rows.
//!
//! - [`CountAggregator`]: COUNT over a column of any type
//! - [`IntegerAggregator`]: MIN/MAX/SUM/AVG/COUNT over an `Int` column

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::datum::{Field, Type};
use crate::tuple::{Column, Schema, Tuple};

use super::error::ExecutorError;
use super::node::{BoxedIterator, Operator};
use super::scan::ValuesScan;

/// Supported aggregate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateOp::Min => write!(f, "MIN"),
            AggregateOp::Max => write!(f, "MAX"),
            AggregateOp::Sum => write!(f, "SUM"),
            AggregateOp::Avg => write!(f, "AVG"),
            AggregateOp::Count => write!(f, "COUNT"),
        }
    }
}

/// Grouping configuration of an aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    /// A single group spanning all input.
    None,
    /// Group by the field at `index`, which must be of type `ty`.
    Column { index: usize, ty: Type },
}

impl GroupBy {
    /// Extracts the group key of `tuple`.
    fn key(&self, tuple: &Tuple) -> Result<GroupKey, ExecutorError> {
        match *self {
            GroupBy::None => Ok(GroupKey::Ungrouped),
            GroupBy::Column { index, ty } => {
                let field = tuple.field(index)?;
                if field.ty() != ty {
                    return Err(ExecutorError::TypeMismatch {
                        expected: ty,
                        found: field.ty(),
                    });
                }
                Ok(GroupKey::Value(field.clone()))
            }
        }
    }

    /// Builds the result schema: `(groupVal, aggregateVal)` or `(aggregateVal)`.
    fn result_schema(&self) -> Arc<Schema> {
        let aggregate = Column::named(Type::Int, "aggregateVal");
        let columns = match *self {
            GroupBy::None => vec![aggregate],
            GroupBy::Column { ty, .. } => vec![Column::named(ty, "groupVal"), aggregate],
        };
        Arc::new(Schema::new(columns))
    }
}

/// HashMap key identifying one group.
///
/// Equality and hashing follow [`Field`]: values of different variants are
/// distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Ungrouped,
    Value(Field),
}

impl GroupKey {
    /// Builds the output row for this group with aggregate value `value`.
    fn into_row(self, schema: &Arc<Schema>, value: i32) -> Result<Tuple, ExecutorError> {
        let fields = match self {
            GroupKey::Ungrouped => vec![Field::Int(value)],
            GroupKey::Value(group) => vec![group, Field::Int(value)],
        };
        Ok(Tuple::new(Arc::clone(schema), fields)?)
    }
}

/// Incrementally computes an aggregate over a stream of tuples.
pub trait Aggregator: Send {
    /// Folds one tuple into its group's state.
    fn merge(&mut self, tuple: &Tuple) -> Result<(), ExecutorError>;

    /// Materializes the current per-group results. The returned operator is
    /// closed; callers must open it.
    fn iterator(&self) -> Result<BoxedIterator, ExecutorError>;

    /// Schema of the rows produced by [`iterator`](Aggregator::iterator).
    fn schema(&self) -> &Arc<Schema>;

    /// Discards all accumulated state.
    fn reset(&mut self);
}

fn count_to_int(count: i64) -> Result<i32, ExecutorError> {
    i32::try_from(count).map_err(|_| ExecutorError::IntegerOverflow)
}

// ========================================
// COUNT
// ========================================

/// Counts tuples per group. The aggregate column may be of any type; its
/// value is never inspected.
pub struct CountAggregator {
    group_by: GroupBy,
    agg_index: usize,
    schema: Arc<Schema>,
    counts: HashMap<GroupKey, i64>,
}

impl CountAggregator {
    /// Creates a COUNT aggregator.
    ///
    /// Fails with [`ExecutorError::UnsupportedAggregate`] for any operator
    /// other than [`AggregateOp::Count`].
    pub fn new(group_by: GroupBy, agg_index: usize, op: AggregateOp) -> Result<Self, ExecutorError> {
        if op != AggregateOp::Count {
            return Err(ExecutorError::UnsupportedAggregate { op });
        }
        Ok(Self {
            group_by,
            agg_index,
            schema: group_by.result_schema(),
            counts: HashMap::new(),
        })
    }

    /// Number of distinct groups seen so far.
    pub fn group_count(&self) -> usize {
        self.counts.len()
    }
}

impl Aggregator for CountAggregator {
    fn merge(&mut self, tuple: &Tuple) -> Result<(), ExecutorError> {
        let key = self.group_by.key(tuple)?;
        tuple.field(self.agg_index)?;
        *self.counts.entry(key).or_insert(0) += 1;
        Ok(())
    }

    fn iterator(&self) -> Result<BoxedIterator, ExecutorError> {
        let rows = self
            .counts
            .iter()
            .map(|(key, &count)| key.clone().into_row(&self.schema, count_to_int(count)?))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(groups = rows.len(), "count aggregate materialized");
        Ok(ValuesScan::new(Arc::clone(&self.schema), rows).boxed())
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn reset(&mut self) {
        self.counts.clear();
    }
}

// ========================================
// Integer aggregates
// ========================================

/// Stateful computation of one group's aggregate.
///
/// Follows a three-phase lifecycle: creation, feed, finish.
trait Accumulator: Send {
    /// Feeds a single value into the accumulator.
    fn feed(&mut self, value: i32) -> Result<(), ExecutorError>;

    /// Produces the aggregate result.
    fn finish(&self) -> Result<i32, ExecutorError>;
}

fn create_accumulator(op: AggregateOp) -> Box<dyn Accumulator> {
    match op {
        AggregateOp::Count => Box::new(CountAccumulator { count: 0 }),
        AggregateOp::Sum => Box::new(SumAccumulator { sum: 0 }),
        AggregateOp::Avg => Box::new(AvgAccumulator { sum: 0, count: 0 }),
        AggregateOp::Min => Box::new(MinAccumulator { min: None }),
        AggregateOp::Max => Box::new(MaxAccumulator { max: None }),
    }
}

struct CountAccumulator {
    count: i64,
}

impl Accumulator for CountAccumulator {
    fn feed(&mut self, _value: i32) -> Result<(), ExecutorError> {
        self.count += 1;
        Ok(())
    }

    fn finish(&self) -> Result<i32, ExecutorError> {
        count_to_int(self.count)
    }
}

/// Sums in 64 bits; the result must fit in an `Int`.
struct SumAccumulator {
    sum: i64,
}

impl Accumulator for SumAccumulator {
    fn feed(&mut self, value: i32) -> Result<(), ExecutorError> {
        self.sum = self
            .sum
            .checked_add(i64::from(value))
            .ok_or(ExecutorError::IntegerOverflow)?;
        Ok(())
    }

    fn finish(&self) -> Result<i32, ExecutorError> {
        i32::try_from(self.sum).map_err(|_| ExecutorError::IntegerOverflow)
    }
}

/// Integer average, truncated toward zero.
struct AvgAccumulator {
    sum: i64,
    count: i64,
}

impl Accumulator for AvgAccumulator {
    fn feed(&mut self, value: i32) -> Result<(), ExecutorError> {
        self.sum = self
            .sum
            .checked_add(i64::from(value))
            .ok_or(ExecutorError::IntegerOverflow)?;
        self.count += 1;
        Ok(())
    }

    fn finish(&self) -> Result<i32, ExecutorError> {
        if self.count == 0 {
            return Ok(0);
        }
        i32::try_from(self.sum / self.count).map_err(|_| ExecutorError::IntegerOverflow)
    }
}

struct MinAccumulator {
    min: Option<i32>,
}

impl Accumulator for MinAccumulator {
    fn feed(&mut self, value: i32) -> Result<(), ExecutorError> {
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        Ok(())
    }

    fn finish(&self) -> Result<i32, ExecutorError> {
        Ok(self.min.unwrap_or_default())
    }
}

struct MaxAccumulator {
    max: Option<i32>,
}

impl Accumulator for MaxAccumulator {
    fn feed(&mut self, value: i32) -> Result<(), ExecutorError> {
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        Ok(())
    }

    fn finish(&self) -> Result<i32, ExecutorError> {
        Ok(self.max.unwrap_or_default())
    }
}

/// Computes MIN, MAX, SUM, AVG or COUNT over an `Int` column.
pub struct IntegerAggregator {
    group_by: GroupBy,
    agg_index: usize,
    op: AggregateOp,
    schema: Arc<Schema>,
    groups: HashMap<GroupKey, Box<dyn Accumulator>>,
}

impl IntegerAggregator {
    pub fn new(group_by: GroupBy, agg_index: usize, op: AggregateOp) -> Self {
        Self {
            group_by,
            agg_index,
            op,
            schema: group_by.result_schema(),
            groups: HashMap::new(),
        }
    }

    pub fn op(&self) -> AggregateOp {
        self.op
    }
}

impl Aggregator for IntegerAggregator {
    fn merge(&mut self, tuple: &Tuple) -> Result<(), ExecutorError> {
        let key = self.group_by.key(tuple)?;
        let value = match tuple.field(self.agg_index)? {
            Field::Int(v) => *v,
            other => {
                return Err(ExecutorError::TypeMismatch {
                    expected: Type::Int,
                    found: other.ty(),
                });
            }
        };
        let op = self.op;
        self.groups
            .entry(key)
            .or_insert_with(|| create_accumulator(op))
            .feed(value)
    }

    fn iterator(&self) -> Result<BoxedIterator, ExecutorError> {
        let rows = self
            .groups
            .iter()
            .map(|(key, acc)| key.clone().into_row(&self.schema, acc.finish()?))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(op = %self.op, groups = rows.len(), "integer aggregate materialized");
        Ok(ValuesScan::new(Arc::clone(&self.schema), rows).boxed())
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn reset(&mut self) {
        self.groups.clear();
    }
}
