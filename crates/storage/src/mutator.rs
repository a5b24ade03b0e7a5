//! Per-cell update handles.

use crate::handle::RowHandle;
use alloc::format;
use quarry_core::schema::Column;
use quarry_core::{Error, Result, Value};

/// Applies a new value to one column of a row handle.
///
/// Stores hand these out through `Store::updateable`; a cell without one is
/// read-only.
pub trait CellMutator {
    /// Column position this mutator writes.
    fn column(&self) -> usize;

    /// Validates and writes `value` into the handle's working copy.
    fn apply(&self, row: &RowHandle, value: Value) -> Result<()>;
}

/// Mutator that enforces the column's type and nullability.
#[derive(Clone, Debug)]
pub struct ColumnMutator {
    column: Column,
}

impl ColumnMutator {
    /// Creates a mutator for a schema column.
    pub fn new(column: Column) -> Self {
        Self { column }
    }
}

impl CellMutator for ColumnMutator {
    fn column(&self) -> usize {
        self.column.index()
    }

    fn apply(&self, row: &RowHandle, value: Value) -> Result<()> {
        check_value(&self.column, &value)?;
        if !row.set(self.column.index(), value) {
            return Err(Error::invalid_operation(format!(
                "row {} has no column {}",
                row.id(),
                self.column.name()
            )));
        }
        Ok(())
    }
}

/// Checks a value against a column's type and nullability.
pub fn check_value(column: &Column, value: &Value) -> Result<()> {
    match value.data_type() {
        None if column.is_nullable() => Ok(()),
        None => Err(Error::null_constraint(column.name())),
        Some(dt) if column.data_type().accepts(dt) => Ok(()),
        Some(dt) => Err(Error::type_mismatch(column.data_type(), dt)),
    }
}
