//! Shared handles to rows that may be modified through a result set.

use alloc::rc::Rc;
use core::cell::{Ref, RefCell};
use quarry_core::schema::TableName;
use quarry_core::{Row, RowId, Value};

/// Identity of a stored row: its table and store-assigned id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(pub TableName, pub RowId);

/// A working copy of a stored row, shared by every cell that can modify it.
///
/// Cloning a handle shares the underlying row; the store sees the changes
/// only when the handle is passed to `Store::update`.
#[derive(Clone, Debug)]
pub struct RowHandle {
    table: TableName,
    row: Rc<RefCell<Row>>,
}

impl RowHandle {
    /// Wraps a copy of a fetched row.
    pub fn new(table: TableName, row: Row) -> Self {
        Self {
            table,
            row: Rc::new(RefCell::new(row)),
        }
    }

    /// Returns the owning table.
    #[inline]
    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Returns the store-assigned row id.
    pub fn id(&self) -> RowId {
        self.row.borrow().id()
    }

    /// Returns the identity of the row.
    pub fn key(&self) -> RowKey {
        RowKey(self.table.clone(), self.id())
    }

    /// Borrows the current row contents.
    pub fn row(&self) -> Ref<'_, Row> {
        self.row.borrow()
    }

    /// Returns a copy of the value at a column position.
    pub fn value(&self, column: usize) -> Option<Value> {
        self.row.borrow().get(column).cloned()
    }

    /// Overwrites the value at a column position.
    pub fn set(&self, column: usize, value: Value) -> bool {
        self.row.borrow_mut().set(column, value)
    }

    /// Returns a detached copy of the current contents.
    pub fn snapshot(&self) -> Row {
        self.row.borrow().clone()
    }

    /// Returns true if both handles share the same working copy.
    pub fn same_row(&self, other: &RowHandle) -> bool {
        Rc::ptr_eq(&self.row, &other.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_handle_shares_row() {
        let handle = RowHandle::new("t".into(), Row::new(4, vec![Value::Int64(1)]));
        let alias = handle.clone();
        assert!(alias.set(0, Value::Int64(9)));
        assert_eq!(handle.value(0), Some(Value::Int64(9)));
        assert!(handle.same_row(&alias));
        assert_eq!(handle.key(), RowKey("t".into(), 4));
    }

    #[test]
    fn test_key_order() {
        let a = RowKey("a".into(), 2);
        let b = RowKey("a".into(), 10);
        let c = RowKey("b".into(), 1);
        assert!(a < b && b < c);
    }
}
