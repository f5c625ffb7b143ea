//! Selection operator.

use std::sync::Arc;

use crate::tuple::{Schema, Tuple};

use super::error::ExecutorError;
use super::node::{single_child, BoxedIterator, OpIterator, Operator};
use super::predicate::Predicate;

/// Passes through the child tuples that satisfy a [`Predicate`].
pub struct Filter {
    predicate: Predicate,
    child: BoxedIterator,
}

impl Filter {
    pub fn new(predicate: Predicate, child: BoxedIterator) -> Self {
        Self { predicate, child }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl Operator for Filter {
    fn schema(&self) -> &Arc<Schema> {
        self.child.schema()
    }

    fn open(&mut self) -> Result<(), ExecutorError> {
        self.child.open()
    }

    fn close(&mut self) {
        self.child.close();
    }

    fn rewind(&mut self) -> Result<(), ExecutorError> {
        self.child.rewind()
    }

    fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        while self.child.has_next()? {
            let tuple = self.child.next()?;
            if self.predicate.filter(&tuple)? {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    fn children(&self) -> Vec<&dyn OpIterator> {
        vec![self.child.as_ref()]
    }

    fn set_children(
        &mut self,
        children: Vec<BoxedIterator>,
    ) -> Result<Vec<BoxedIterator>, ExecutorError> {
        let child = single_child(children)?;
        Ok(vec![std::mem::replace(&mut self.child, child)])
    }
}
