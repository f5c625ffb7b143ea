//! Tuples and record identifiers.

use std::fmt;
use std::sync::Arc;

use crate::catalog::TableId;
use crate::datum::Field;

use super::error::TupleError;
use super::schema::Schema;

/// Physical location of a stored tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    /// Table the tuple belongs to.
    pub table_id: TableId,
    /// Page number within the table.
    pub page: usize,
    /// Slot within the page.
    pub slot: usize,
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.table_id, self.page, self.slot)
    }
}

/// A row of field values conforming to a [`Schema`].
///
/// Tuples read from a table carry the [`RecordId`] they were stored at, so
/// that DML operators can address them. Computed tuples have no record id.
#[derive(Debug, Clone)]
pub struct Tuple {
    schema: Arc<Schema>,
    fields: Vec<Field>,
    rid: Option<RecordId>,
}

impl Tuple {
    /// Creates a tuple, checking arity and per-column types against `schema`.
    pub fn new(schema: Arc<Schema>, fields: Vec<Field>) -> Result<Self, TupleError> {
        check_conforms(&schema, &fields)?;
        Ok(Self {
            schema,
            fields,
            rid: None,
        })
    }

    /// Returns the schema this tuple conforms to.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the field at `index`.
    pub fn field(&self, index: usize) -> Result<&Field, TupleError> {
        self.fields.get(index).ok_or(TupleError::IndexOutOfBounds {
            index,
            len: self.fields.len(),
        })
    }

    /// Returns all fields in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Replaces the field at `index`, which must keep the column's type.
    pub fn set_field(&mut self, index: usize, field: Field) -> Result<(), TupleError> {
        let expected = self.schema.column_type(index)?;
        if field.ty() != expected {
            return Err(TupleError::TypeMismatch {
                index,
                expected,
                found: field.ty(),
            });
        }
        self.fields[index] = field;
        Ok(())
    }

    /// Returns the storage location, if this tuple came from a table.
    pub fn record_id(&self) -> Option<RecordId> {
        self.rid
    }

    /// Sets or clears the storage location.
    pub fn set_record_id(&mut self, rid: Option<RecordId>) {
        self.rid = rid;
    }

    /// Rebinds this tuple to an equal schema, e.g. one with different names.
    pub fn with_schema(mut self, schema: Arc<Schema>) -> Result<Self, TupleError> {
        check_conforms(&schema, &self.fields)?;
        self.schema = schema;
        Ok(self)
    }
}

fn check_conforms(schema: &Schema, fields: &[Field]) -> Result<(), TupleError> {
    if fields.len() != schema.len() {
        return Err(TupleError::ArityMismatch {
            expected: schema.len(),
            found: fields.len(),
        });
    }
    for (index, (field, expected)) in fields.iter().zip(schema.types()).enumerate() {
        if field.ty() != expected {
            return Err(TupleError::TypeMismatch {
                index,
                expected,
                found: field.ty(),
            });
        }
    }
    Ok(())
}

/// Tuples compare by their field values only.
impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "\t")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}
