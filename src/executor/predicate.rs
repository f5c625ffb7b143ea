//! Comparison predicates over a single tuple field.

use std::fmt;

use crate::datum::Field;
use crate::tuple::Tuple;

use super::error::ExecutorError;

/// Comparison operators understood by predicates and histograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateOp {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEq,
    GreaterThan,
    GreaterThanOrEq,
    /// Substring containment for text, equality for integers.
    Like,
}

impl fmt::Display for PredicateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PredicateOp::Equals => "=",
            PredicateOp::NotEquals => "<>",
            PredicateOp::LessThan => "<",
            PredicateOp::LessThanOrEq => "<=",
            PredicateOp::GreaterThan => ">",
            PredicateOp::GreaterThanOrEq => ">=",
            PredicateOp::Like => "LIKE",
        };
        write!(f, "{}", s)
    }
}

/// Compares one field of a tuple against a constant: `t[field] OP operand`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: usize,
    op: PredicateOp,
    operand: Field,
}

impl Predicate {
    pub fn new(field: usize, op: PredicateOp, operand: impl Into<Field>) -> Self {
        Self {
            field,
            op,
            operand: operand.into(),
        }
    }

    pub fn field(&self) -> usize {
        self.field
    }

    pub fn op(&self) -> PredicateOp {
        self.op
    }

    pub fn operand(&self) -> &Field {
        &self.operand
    }

    /// Returns true if `tuple` satisfies the predicate.
    ///
    /// Fails if the tuple has no field at the predicate's index.
    pub fn filter(&self, tuple: &Tuple) -> Result<bool, ExecutorError> {
        Ok(tuple.field(self.field)?.compare(self.op, &self.operand))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} {} {}", self.field, self.op, self.operand)
    }
}
