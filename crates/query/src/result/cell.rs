//! Result cells.

use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;
use quarry_core::Value;
use quarry_storage::{CellMutator, RowHandle};

/// One value of a result row.
///
/// A mutable cell reads through the row handle it was fetched from, so an
/// update is visible in every cell sharing that row.
#[derive(Clone)]
pub enum Cell {
    ReadOnly(Value),
    Mutable {
        mutator: Arc<dyn CellMutator>,
        row: RowHandle,
    },
}

impl Cell {
    pub fn value(&self) -> Cow<'_, Value> {
        match self {
            Cell::ReadOnly(value) => Cow::Borrowed(value),
            Cell::Mutable { mutator, row } => {
                Cow::Owned(row.value(mutator.column()).unwrap_or(Value::Null))
            }
        }
    }

    #[inline]
    pub fn is_mutable(&self) -> bool {
        matches!(self, Cell::Mutable { .. })
    }

    /// The row a mutable cell writes to.
    pub fn row(&self) -> Option<&RowHandle> {
        match self {
            Cell::ReadOnly(_) => None,
            Cell::Mutable { row, .. } => Some(row),
        }
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::ReadOnly(value) => f.debug_tuple("ReadOnly").field(value).finish(),
            Cell::Mutable { mutator, row } => f
                .debug_struct("Mutable")
                .field("value", &self.value())
                .field("column", &mutator.column())
                .field("row", &row.key())
                .finish(),
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Cell::ReadOnly(value)
    }
}
