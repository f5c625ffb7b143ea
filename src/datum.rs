//! Database data types and field values.
//!
//! [`Type`] names the column types the engine understands, and [`Field`]
//! holds one typed value. `Field` is a closed sum type, so every comparison
//! and formatting site matches exhaustively over the variants.

use std::cmp::Ordering;
use std::fmt;

use crate::executor::PredicateOp;

/// Maximum length of a text field, in bytes.
///
/// Longer strings are truncated on a character boundary when a field is
/// constructed through [`Field::text`].
pub const STRING_LEN: usize = 128;

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// 32-bit signed integer.
    Int,
    /// Bounded-length string (at most [`STRING_LEN`] bytes).
    Text,
}

impl Type {
    /// Returns the SQL display name for this type.
    pub const fn display_name(self) -> &'static str {
        match self {
            Type::Int => "INT",
            Type::Text => "STRING",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A typed field value.
///
/// Values of different variants are never equal, and ordering is only
/// defined between values of the same variant (`partial_cmp` returns `None`
/// across variants).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// 32-bit signed integer.
    Int(i32),
    /// Bounded-length text.
    Text(String),
}

impl Field {
    /// Creates a text field, truncating to [`STRING_LEN`] bytes.
    pub fn text(s: impl Into<String>) -> Self {
        let mut s = s.into();
        if s.len() > STRING_LEN {
            let mut end = STRING_LEN;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            s.truncate(end);
        }
        Field::Text(s)
    }

    /// Returns the type of this value.
    pub fn ty(&self) -> Type {
        match self {
            Field::Int(_) => Type::Int,
            Field::Text(_) => Type::Text,
        }
    }

    /// Returns the integer value, or `None` for text fields.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Field::Int(v) => Some(*v),
            Field::Text(_) => None,
        }
    }

    /// Returns the string value, or `None` for integer fields.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Int(_) => None,
            Field::Text(s) => Some(s),
        }
    }

    /// Evaluates `self OP other`.
    ///
    /// Comparisons between different variants are always false. `LIKE` is
    /// substring containment for text and plain equality for integers.
    pub fn compare(&self, op: PredicateOp, other: &Field) -> bool {
        if let (Field::Text(a), Field::Text(b)) = (self, other)
            && op == PredicateOp::Like
        {
            return a.contains(b.as_str());
        }
        let Some(ord) = self.partial_cmp(other) else {
            return false;
        };
        match op {
            PredicateOp::Equals | PredicateOp::Like => ord == Ordering::Equal,
            PredicateOp::NotEquals => ord != Ordering::Equal,
            PredicateOp::LessThan => ord == Ordering::Less,
            PredicateOp::LessThanOrEq => ord != Ordering::Greater,
            PredicateOp::GreaterThan => ord == Ordering::Greater,
            PredicateOp::GreaterThanOrEq => ord != Ordering::Less,
        }
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Field::Int(a), Field::Int(b)) => Some(a.cmp(b)),
            (Field::Text(a), Field::Text(b)) => Some(a.cmp(b)),
            (Field::Int(_), Field::Text(_)) | (Field::Text(_), Field::Int(_)) => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{}", v),
            Field::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for Field {
    fn from(v: i32) -> Self {
        Field::Int(v)
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::text(s)
    }
}
