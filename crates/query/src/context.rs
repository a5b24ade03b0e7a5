//! Per-execution pairing of a table with its fetched rows and join maps.

use crate::ast::{Table, TableId};
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use quarry_core::Row;
use quarry_index::{IndexedMap, IndexedSet, Universe};
use quarry_storage::JoinMap;

/// A table participating in one execution.
#[derive(Debug)]
pub struct TableContext<'a> {
    table: &'a Table,
    rows: Vec<Rc<Row>>,
    links: IndexedMap<TableId, JoinMap>,
}

impl<'a> TableContext<'a> {
    pub fn new(table: &'a Table, rows: Vec<Rc<Row>>, universe: Arc<Universe<TableId>>) -> Self {
        Self {
            table,
            rows,
            links: IndexedMap::new(universe),
        }
    }

    #[inline]
    pub fn table(&self) -> &'a Table {
        self.table
    }

    #[inline]
    pub fn id(&self) -> TableId {
        self.table.id()
    }

    #[inline]
    pub fn rows(&self) -> &[Rc<Row>] {
        &self.rows
    }

    /// Join map from this table's rows to `other`'s rows.
    pub fn link(&self, other: TableId) -> Option<&JoinMap> {
        self.links.get(&other)
    }

    /// Installs the join map towards `other`, replacing any earlier one.
    pub fn set_link(&mut self, other: TableId, map: JoinMap) {
        self.links.insert(&other, map);
    }

    pub fn has_link(&self, other: TableId) -> bool {
        self.links.contains_key(&other)
    }

    /// Tables this one has a join map towards.
    pub fn linked(&self) -> IndexedSet<TableId> {
        let mut set = IndexedSet::empty(self.links.universe().clone());
        for (id, _) in self.links.iter() {
            set.insert(id);
        }
        set
    }

    /// Selectivity towards `other`; 1.0 when no join map exists.
    pub fn ratio(&self, other: TableId) -> f64 {
        self.link(other).map_or(1.0, JoinMap::ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{SelectStatement, Bindings};
    use alloc::vec;
    use quarry_core::schema::TableBuilder;
    use quarry_core::{DataType, Value};
    use quarry_index::CandidateSet;

    #[test]
    fn test_links_and_ratio() {
        let schema = TableBuilder::new("t")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .build()
            .unwrap();
        let mut q = SelectStatement::builder();
        q.table(schema.clone());
        q.table(schema);
        let bound = q.build().unwrap().bind(&Bindings::new()).unwrap();
        let universe = bound.universe().clone();
        let rows = vec![Rc::new(Row::new(1, vec![Value::Int64(1)]))];
        let mut ctx = TableContext::new(&bound.tables()[0], rows, universe);

        let other = bound.tables()[1].id();
        assert_eq!(ctx.ratio(other), 1.0);
        assert!(ctx.linked().is_empty());

        ctx.set_link(other, JoinMap::new(vec![CandidateSet::empty()], 4));
        assert!(ctx.has_link(other));
        assert_eq!(ctx.ratio(other), 0.0);
        assert!(ctx.linked().contains(&other));
    }
}
