//! One row slot per table, filled while the join walk descends.

use crate::ast::{RowSource, TableId};
use alloc::rc::Rc;
use alloc::sync::Arc;
use quarry_core::Row;
use quarry_index::{IndexedMap, Universe};

/// The rows currently bound to each table of a statement.
#[derive(Clone, Debug)]
pub struct RowCandidate<'a> {
    slots: IndexedMap<TableId, &'a Rc<Row>>,
}

impl<'a> RowCandidate<'a> {
    pub fn new(universe: Arc<Universe<TableId>>) -> Self {
        Self {
            slots: IndexedMap::new(universe),
        }
    }

    /// Binds `row` to `table`, replacing the previous row.
    #[inline]
    pub fn set(&mut self, table: TableId, row: &'a Rc<Row>) {
        self.slots.insert(&table, row);
    }

    #[inline]
    pub fn get(&self, table: TableId) -> Option<&'a Rc<Row>> {
        self.slots.get(&table).copied()
    }

    pub fn clear(&mut self, table: TableId) {
        self.slots.remove(&table);
    }

    /// True when every table of the statement has a row.
    pub fn is_complete(&self) -> bool {
        self.slots.len() == self.slots.universe().len()
    }

    /// Bound rows in statement order.
    pub fn rows(&self) -> impl Iterator<Item = (TableId, &'a Rc<Row>)> + '_ {
        self.slots.iter().map(|(id, row)| (*id, *row))
    }
}

impl RowSource for RowCandidate<'_> {
    fn row(&self, table: TableId) -> Option<&Row> {
        self.get(table).map(|r| r.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use quarry_core::Value;

    #[test]
    fn test_slots() {
        let universe = Arc::new(Universe::new([TableId::new(0), TableId::new(1)]));
        let a = Rc::new(Row::new(1, vec![Value::Int64(10)]));
        let b = Rc::new(Row::new(2, vec![Value::Int64(20)]));
        let mut candidate = RowCandidate::new(universe);
        candidate.set(TableId::new(1), &b);
        assert!(!candidate.is_complete());
        assert!(candidate.row(TableId::new(0)).is_none());

        candidate.set(TableId::new(0), &a);
        assert!(candidate.is_complete());
        let ids: Vec<_> = candidate.rows().map(|(t, r)| (t.index(), r.id())).collect();
        assert_eq!(ids, vec![(0, 1), (1, 2)]);

        candidate.clear(TableId::new(0));
        assert!(!candidate.is_complete());
    }
}
