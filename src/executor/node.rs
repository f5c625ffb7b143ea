//! The pull-iterator protocol shared by every operator.
//!
//! Operators are composed into a tree where each parent pulls tuples from its
//! children. Two traits split the work:
//!
//! - [`Operator`] is what a concrete operator implements: a single primitive
//!   [`fetch_next`](Operator::fetch_next) returning `Some(tuple)` or `None` at
//!   end-of-stream, plus open/close/rewind hooks.
//! - [`OpIterator`] is what callers and parent operators use. [`Node`]
//!   implements it for any `Operator`, tracking the open/closed state and
//!   caching one look-ahead tuple so that `has_next` never consumes.
//!
//! ```text
//!            caller
//!              |  has_next / next
//!              v
//!   Node<Insert> (state, look-ahead)
//!              |  fetch_next
//!              v
//!   Insert ---- pulls ----> Box<dyn OpIterator> (child)
//! ```

use std::sync::Arc;

use tracing::trace;

use crate::tuple::{Schema, Tuple};

use super::error::ExecutorError;

/// A type-erased operator, as stored in a parent's child list.
pub type BoxedIterator = Box<dyn OpIterator>;

/// The caller-facing iterator contract implemented by every operator.
///
/// Operators start Closed. `has_next`, `next` and `rewind` fail with
/// [`ExecutorError::NotOpen`] until `open` succeeds. `schema` is available
/// in any state.
pub trait OpIterator: Send {
    /// Returns the schema of the tuples this operator produces.
    fn schema(&self) -> &Arc<Schema>;

    /// Opens the operator (and its children).
    fn open(&mut self) -> Result<(), ExecutorError>;

    /// Closes the operator (and its children). Closing twice is a no-op.
    fn close(&mut self);

    /// Restarts the operator from the beginning of its current data.
    fn rewind(&mut self) -> Result<(), ExecutorError>;

    /// Returns true if another tuple is available, without consuming it.
    fn has_next(&mut self) -> Result<bool, ExecutorError>;

    /// Returns the next tuple.
    ///
    /// Fails with [`ExecutorError::NoSuchElement`] at end-of-stream.
    ///
    /// This follows the Volcano iterator naming convention, not
    /// `std::iter::Iterator`, because it is fallible and paired with `has_next`.
    #[allow(clippy::should_implement_trait)]
    fn next(&mut self) -> Result<Tuple, ExecutorError>;

    /// Returns the child operators, for plan introspection.
    fn children(&self) -> Vec<&dyn OpIterator>;

    /// Replaces the child operators and returns the previous ones.
    ///
    /// Only valid while closed; `children` must match the operator's arity.
    fn set_children(
        &mut self,
        children: Vec<BoxedIterator>,
    ) -> Result<Vec<BoxedIterator>, ExecutorError>;
}

/// The primitive a concrete operator implements.
///
/// Open/close/rewind hooks are responsible for the operator's own state and
/// for propagating the call to its children. State checks and look-ahead
/// are handled by [`Node`].
pub trait Operator: Send {
    /// Returns the schema of the tuples this operator produces.
    fn schema(&self) -> &Arc<Schema>;

    /// Called by [`Node::open`].
    fn open(&mut self) -> Result<(), ExecutorError> {
        Ok(())
    }

    /// Called by [`Node::close`] when the node is open.
    fn close(&mut self) {}

    /// Called by [`Node::rewind`] while open.
    fn rewind(&mut self) -> Result<(), ExecutorError>;

    /// Produces the next tuple, or `None` at end-of-stream.
    fn fetch_next(&mut self) -> Result<Option<Tuple>, ExecutorError>;

    /// Returns the child operators.
    fn children(&self) -> Vec<&dyn OpIterator> {
        Vec::new()
    }

    /// Replaces the child operators and returns the previous ones.
    fn set_children(
        &mut self,
        children: Vec<BoxedIterator>,
    ) -> Result<Vec<BoxedIterator>, ExecutorError> {
        expect_children(0, children.len())?;
        Ok(Vec::new())
    }

    /// Wraps this operator in a [`Node`] and boxes it.
    fn boxed(self) -> BoxedIterator
    where
        Self: Sized + 'static,
    {
        Box::new(Node::new(self))
    }
}

/// Fails with [`ExecutorError::ChildCount`] unless `found == expected`.
pub(crate) fn expect_children(expected: usize, found: usize) -> Result<(), ExecutorError> {
    if expected == found {
        Ok(())
    } else {
        Err(ExecutorError::ChildCount { expected, found })
    }
}

/// Takes the single element out of a one-child list.
pub(crate) fn single_child(
    mut children: Vec<BoxedIterator>,
) -> Result<BoxedIterator, ExecutorError> {
    expect_children(1, children.len())?;
    children.pop().ok_or(ExecutorError::ChildCount {
        expected: 1,
        found: 0,
    })
}

/// Progress of an operator that produces its whole output in one step
/// (DML summaries, materialized aggregates).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Nothing produced since the last open/rewind.
    NotStarted,
    /// The result has been computed and is being handed out.
    Produced,
    /// End-of-stream has been reported.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Closed,
    Open,
}

/// What is known about the element after the current position.
enum Lookahead {
    /// Nothing fetched yet.
    Unknown,
    /// A tuple was fetched by `has_next` and not yet returned.
    Ready(Tuple),
    /// The operator reported end-of-stream.
    End,
}

/// Shared protocol layer wrapping a concrete [`Operator`].
pub struct Node<O> {
    op: O,
    state: NodeState,
    lookahead: Lookahead,
}

impl<O: Operator> Node<O> {
    /// Wraps `op`. The node starts closed.
    pub fn new(op: O) -> Self {
        Self {
            op,
            state: NodeState::Closed,
            lookahead: Lookahead::Unknown,
        }
    }

    /// Returns the wrapped operator.
    pub fn operator(&self) -> &O {
        &self.op
    }

    /// Returns true between `open` and `close`.
    pub fn is_open(&self) -> bool {
        self.state == NodeState::Open
    }

    fn ensure_open(&self) -> Result<(), ExecutorError> {
        match self.state {
            NodeState::Open => Ok(()),
            NodeState::Closed => Err(ExecutorError::NotOpen),
        }
    }

    fn fill(&mut self) -> Result<(), ExecutorError> {
        if let Lookahead::Unknown = self.lookahead {
            self.lookahead = match self.op.fetch_next()? {
                Some(tuple) => Lookahead::Ready(tuple),
                None => Lookahead::End,
            };
        }
        Ok(())
    }
}

impl<O: Operator> OpIterator for Node<O> {
    fn schema(&self) -> &Arc<Schema> {
        self.op.schema()
    }

    fn open(&mut self) -> Result<(), ExecutorError> {
        self.lookahead = Lookahead::Unknown;
        self.op.open()?;
        self.state = NodeState::Open;
        trace!(schema = %self.op.schema(), "operator opened");
        Ok(())
    }

    fn close(&mut self) {
        if self.state == NodeState::Open {
            self.op.close();
            self.state = NodeState::Closed;
            self.lookahead = Lookahead::Unknown;
            trace!(schema = %self.op.schema(), "operator closed");
        }
    }

    fn rewind(&mut self) -> Result<(), ExecutorError> {
        self.ensure_open()?;
        self.lookahead = Lookahead::Unknown;
        self.op.rewind()
    }

    fn has_next(&mut self) -> Result<bool, ExecutorError> {
        self.ensure_open()?;
        self.fill()?;
        Ok(matches!(self.lookahead, Lookahead::Ready(_)))
    }

    fn next(&mut self) -> Result<Tuple, ExecutorError> {
        self.ensure_open()?;
        self.fill()?;
        match std::mem::replace(&mut self.lookahead, Lookahead::Unknown) {
            Lookahead::Ready(tuple) => Ok(tuple),
            other => {
                self.lookahead = other;
                Err(ExecutorError::NoSuchElement)
            }
        }
    }

    fn children(&self) -> Vec<&dyn OpIterator> {
        self.op.children()
    }

    fn set_children(
        &mut self,
        children: Vec<BoxedIterator>,
    ) -> Result<Vec<BoxedIterator>, ExecutorError> {
        if self.state == NodeState::Open {
            return Err(ExecutorError::ChildrenWhileOpen);
        }
        self.op.set_children(children)
    }
}

/// Drains an open iterator into a vector.
pub fn collect_all(iter: &mut dyn OpIterator) -> Result<Vec<Tuple>, ExecutorError> {
    let mut tuples = Vec::new();
    while iter.has_next()? {
        tuples.push(iter.next()?);
    }
    Ok(tuples)
}
