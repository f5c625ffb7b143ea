//! Tuple schemas.

use std::fmt;

use crate::datum::Type;

use super::error::TupleError;

/// A single column of a [`Schema`].
#[derive(Debug, Clone)]
pub struct Column {
    /// Column data type.
    pub ty: Type,
    /// Optional column name (descriptive only).
    pub name: Option<String>,
}

impl Column {
    /// Creates a named column.
    pub fn named(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: Some(name.into()),
        }
    }

    /// Creates an anonymous column.
    pub fn anonymous(ty: Type) -> Self {
        Self { ty, name: None }
    }
}

/// Ordered list of typed columns describing the shape of a tuple.
///
/// Equality compares only the type sequence: two schemas with the same types
/// in the same order are equal regardless of column names.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Creates a schema from columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Creates a schema of anonymous columns.
    pub fn from_types(types: &[Type]) -> Self {
        Self::new(types.iter().map(|&ty| Column::anonymous(ty)).collect())
    }

    /// Creates a schema pairing each type with a name.
    ///
    /// Extra names or types beyond the shorter list are ignored.
    pub fn with_names(types: &[Type], names: &[&str]) -> Self {
        Self::new(
            types
                .iter()
                .zip(names)
                .map(|(&ty, name)| Column::named(ty, *name))
                .collect(),
        )
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns all columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column types in order.
    pub fn types(&self) -> impl Iterator<Item = Type> + '_ {
        self.columns.iter().map(|c| c.ty)
    }

    /// Returns the type of the column at `index`.
    pub fn column_type(&self, index: usize) -> Result<Type, TupleError> {
        self.column(index).map(|c| c.ty)
    }

    /// Returns the name of the column at `index`, if it has one.
    pub fn column_name(&self, index: usize) -> Result<Option<&str>, TupleError> {
        self.column(index).map(|c| c.name.as_deref())
    }

    /// Returns the index of the first column named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.as_deref() == Some(name))
    }

    fn column(&self, index: usize) -> Result<&Column, TupleError> {
        self.columns.get(index).ok_or(TupleError::IndexOutOfBounds {
            index,
            len: self.columns.len(),
        })
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns.len() == other.columns.len() && self.types().eq(other.types())
    }
}

impl Eq for Schema {}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match &col.name {
                Some(name) => write!(f, "{}({})", col.ty, name)?,
                None => write!(f, "{}", col.ty)?,
            }
        }
        Ok(())
    }
}
