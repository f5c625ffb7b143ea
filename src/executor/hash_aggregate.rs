//! Blocking hash aggregation operator.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::datum::Type;
use crate::tuple::{Column, Schema, Tuple};

use super::aggregate::{AggregateOp, Aggregator, CountAggregator, GroupBy, IntegerAggregator};
use super::error::ExecutorError;
use super::node::{single_child, BoxedIterator, OpIterator, Operator, Phase};

/// Computes one aggregate over its child, optionally grouped by one column.
///
/// The first pull drains the child into an [`Aggregator`] and then streams
/// the materialized groups. `Int` aggregate columns support every
/// [`AggregateOp`]; `Text` columns support only COUNT.
///
/// Output columns are named after the group column and `OP(column)`.
///
/// If draining the child fails, the error is returned once and the operator
/// reports end-of-stream until it is rewound or reopened.
pub struct Aggregate {
    child: BoxedIterator,
    agg_index: usize,
    group_index: Option<usize>,
    op: AggregateOp,
    aggregator: Box<dyn Aggregator>,
    schema: Arc<Schema>,
    results: Option<BoxedIterator>,
    phase: Phase,
}

impl Aggregate {
    pub fn new(
        child: BoxedIterator,
        agg_index: usize,
        group_index: Option<usize>,
        op: AggregateOp,
    ) -> Result<Self, ExecutorError> {
        let input = Arc::clone(child.schema());
        let agg_type = input.column_type(agg_index)?;
        let group_by = match group_index {
            Some(index) => GroupBy::Column {
                index,
                ty: input.column_type(index)?,
            },
            None => GroupBy::None,
        };

        let aggregator: Box<dyn Aggregator> = match agg_type {
            Type::Int => Box::new(IntegerAggregator::new(group_by, agg_index, op)),
            Type::Text => Box::new(CountAggregator::new(group_by, agg_index, op)?),
        };

        let agg_name = input.column_name(agg_index)?.unwrap_or("aggregateVal");
        let mut columns = Vec::with_capacity(2);
        if let Some(index) = group_index {
            let name = input.column_name(index)?.unwrap_or("groupVal");
            columns.push(Column::named(input.column_type(index)?, name));
        }
        columns.push(Column::named(Type::Int, format!("{}({})", op, agg_name)));

        Ok(Self {
            child,
            agg_index,
            group_index,
            op,
            aggregator,
            schema: Arc::new(Schema::new(columns)),
            results: None,
            phase: Phase::NotStarted,
        })
    }

    pub fn agg_index(&self) -> usize {
        self.agg_index
    }

    pub fn group_index(&self) -> Option<usize> {
        self.group_index
    }

    pub fn op(&self) -> AggregateOp {
        self.op
    }

    /// Drops any materialized output and accumulated state.
    fn reset(&mut self) {
        if let Some(mut results) = self.results.take() {
            results.close();
        }
        self.aggregator.reset();
        self.phase = Phase::NotStarted;
    }

    /// Drains the child and returns the opened result iterator.
    fn materialize(&mut self) -> Result<BoxedIterator, ExecutorError> {
        let mut merged = 0usize;
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            self.aggregator.merge(&tuple)?;
            merged += 1;
        }
        let mut results = self.aggregator.iterator()?;
        results.open()?;
        debug!(op = %self.op, merged, "aggregate input drained");
        Ok(results)
    }
}

impl Operator for Aggregate {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn open(&mut self) -> Result<(), ExecutorError> {
        self.reset();
        self.child.open()
    }

    fn close(&mut self) {
        self.reset();
        self.child.close();
    }

    fn rewind(&mut self) -> Result<(), ExecutorError> {
        self.reset();
        self.child.rewind()
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        match self.phase {
            Phase::NotStarted => match self.materialize() {
                Ok(results) => {
                    self.results = Some(results);
                    self.phase = Phase::Produced;
                }
                Err(e) => {
                    self.phase = Phase::Exhausted;
                    warn!(op = %self.op, error = %e, "aggregate aborted");
                    return Err(e);
                }
            },
            Phase::Produced => {}
            Phase::Exhausted => return Ok(None),
        }
        let Some(results) = self.results.as_mut() else {
            return Ok(None);
        };
        if !results.has_next()? {
            self.phase = Phase::Exhausted;
            return Ok(None);
        }
        let tuple = results.next()?;
        Ok(Some(tuple.with_schema(Arc::clone(&self.schema))?))
    }

    fn children(&self) -> Vec<&dyn OpIterator> {
        vec![self.child.as_ref()]
    }

    fn set_children(
        &mut self,
        children: Vec<BoxedIterator>,
    ) -> Result<Vec<BoxedIterator>, ExecutorError> {
        let child = single_child(children)?;
        if child.schema() != self.child.schema() {
            return Err(ExecutorError::SchemaMismatch {
                expected: (**self.child.schema()).clone(),
                found: (**child.schema()).clone(),
            });
        }
        Ok(vec![std::mem::replace(&mut self.child, child)])
    }
}
