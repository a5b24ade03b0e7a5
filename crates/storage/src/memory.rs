//! In-memory reference store.
//!
//! `MemoryStore` keeps every table as an ordered map of shared rows. Mutations
//! apply immediately; inside a transaction they are also journaled so that
//! `rollback_transaction` can undo them.

use crate::handle::RowHandle;
use crate::journal::{Journal, JournalEntry, TableDiff};
use crate::mutator::{check_value, CellMutator, ColumnMutator};
use crate::store::{FetchRequest, InsertRequest, Store, ValueComparator, ValueRange};
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use quarry_core::schema::{Column, TableName, TableSchema};
use quarry_core::{Error, Result, Row, RowId, Value};
use quarry_index::SimpleComparator;
use tracing::debug;

struct StoredTable {
    schema: TableSchema,
    rows: BTreeMap<RowId, Rc<Row>>,
    read_only: BTreeSet<usize>,
}

impl StoredTable {
    fn check_row(&self, values: &[Value]) -> Result<()> {
        let columns = self.schema.columns();
        if values.len() != columns.len() {
            return Err(Error::invalid_operation(format!(
                "{} expects {} values, got {}",
                self.schema.name(),
                columns.len(),
                values.len()
            )));
        }
        for (column, value) in columns.iter().zip(values) {
            check_value(column, value)?;
        }
        Ok(())
    }
}

/// A transactional in-memory [`Store`].
pub struct MemoryStore {
    tables: BTreeMap<TableName, StoredTable>,
    journal: Option<Journal>,
    next_row_id: RowId,
    comparator: ValueComparator,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store ordering values ascending by `Value`'s `Ord`.
    pub fn new() -> Self {
        Self::with_comparator(Arc::new(SimpleComparator::asc()))
    }

    /// Creates an empty store with a custom value order.
    pub fn with_comparator(comparator: ValueComparator) -> Self {
        Self {
            tables: BTreeMap::new(),
            journal: None,
            next_row_id: 1,
            comparator,
        }
    }

    /// Registers a table.
    pub fn create_table(&mut self, schema: TableSchema) -> Result<()> {
        let name = schema.name().clone();
        if self.tables.contains_key(&name) {
            return Err(Error::invalid_schema(format!("Table already exists: {}", name)));
        }
        self.tables.insert(
            name,
            StoredTable {
                schema,
                rows: BTreeMap::new(),
                read_only: BTreeSet::new(),
            },
        );
        Ok(())
    }

    /// Marks a column as not updateable through result sets.
    pub fn mark_read_only(&mut self, table: &TableName, column: &str) -> Result<()> {
        let stored = self.table_mut(table)?;
        let index = stored.schema.column(column)?.index();
        stored.read_only.insert(index);
        Ok(())
    }

    /// Returns every row of a table in id order.
    pub fn rows(&self, table: &TableName) -> Result<Vec<Rc<Row>>> {
        Ok(self.table(table)?.rows.values().cloned().collect())
    }

    /// Returns one row by id.
    pub fn get(&self, table: &TableName, row_id: RowId) -> Option<Rc<Row>> {
        self.tables.get(table)?.rows.get(&row_id).cloned()
    }

    /// Returns the number of rows in a table.
    pub fn len(&self, table: &TableName) -> Result<usize> {
        Ok(self.table(table)?.rows.len())
    }

    /// Returns true while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }

    /// Net uncommitted changes to a table.
    pub fn pending(&self, table: &TableName) -> Option<&TableDiff> {
        self.journal.as_ref()?.diff(table)
    }

    fn table(&self, name: &TableName) -> Result<&StoredTable> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::table_not_found(format!("{}", name)))
    }

    fn table_mut(&mut self, name: &TableName) -> Result<&mut StoredTable> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::table_not_found(format!("{}", name)))
    }

    fn matches(row: &Row, ranges: &[(usize, ValueRange)]) -> bool {
        ranges.iter().all(|(column, range)| {
            if range.is_unbounded() {
                return true;
            }
            match row.get(*column) {
                Some(value) if !value.is_null() => range.contains(value),
                _ => false,
            }
        })
    }

    fn undo(&mut self, entry: JournalEntry) {
        let table = match self.tables.get_mut(entry.table()) {
            Some(table) => table,
            None => return,
        };
        match entry {
            JournalEntry::Insert { row_id, .. } => {
                table.rows.remove(&row_id);
            }
            JournalEntry::Update { old, .. } | JournalEntry::Delete { row: old, .. } => {
                table.rows.insert(old.id(), old);
            }
        }
    }
}

impl Store for MemoryStore {
    fn describe(&self, table: &TableName) -> Result<TableSchema> {
        Ok(self.table(table)?.schema.clone())
    }

    fn fetch(&mut self, request: &FetchRequest<'_>) -> Result<Vec<Rc<Row>>> {
        if request.for_update && self.journal.is_none() {
            return Err(Error::invalid_operation(
                "fetch for update requires an open transaction",
            ));
        }
        let stored = self.table(request.table)?;
        let width = stored.schema.columns().len();
        if let Some(&column) = request.columns.iter().find(|&&c| c >= width) {
            return Err(Error::invalid_operation(format!(
                "{} has no column at position {}",
                request.table, column
            )));
        }
        let rows: Vec<Rc<Row>> = stored
            .rows
            .values()
            .filter(|row| Self::matches(row, request.ranges))
            .cloned()
            .collect();
        debug!(
            table = %request.table,
            scanned = stored.rows.len(),
            fetched = rows.len(),
            for_update = request.for_update,
            "fetch"
        );
        Ok(rows)
    }

    fn insert(&mut self, request: &InsertRequest) -> Result<Vec<RowId>> {
        let stored = self.table(&request.table)?;
        for values in &request.rows {
            stored.check_row(values)?;
        }
        let first = self.next_row_id;
        self.next_row_id += request.rows.len() as RowId;
        let stored = self.table_mut(&request.table)?;
        let mut ids = Vec::with_capacity(request.rows.len());
        for (offset, values) in request.rows.iter().enumerate() {
            let id = first + offset as RowId;
            stored.rows.insert(id, Rc::new(Row::new(id, values.clone())));
            ids.push(id);
        }
        if let Some(journal) = self.journal.as_mut() {
            for &id in &ids {
                journal.record_insert(&request.table, id);
            }
        }
        Ok(ids)
    }

    fn update(&mut self, rows: &[RowHandle]) -> Result<()> {
        for handle in rows {
            let row = handle.snapshot();
            let stored = self.table_mut(handle.table())?;
            stored.check_row(row.values())?;
            let old = stored
                .rows
                .get(&row.id())
                .cloned()
                .ok_or_else(|| Error::not_found(format!("{}", handle.table()), row.id()))?;
            stored.rows.insert(row.id(), Rc::new(row));
            if let Some(journal) = self.journal.as_mut() {
                journal.record_update(handle.table(), old);
            }
        }
        Ok(())
    }

    fn delete(&mut self, rows: &[RowHandle]) -> Result<()> {
        for handle in rows {
            let id = handle.id();
            let removed = self
                .table_mut(handle.table())?
                .rows
                .remove(&id)
                .ok_or_else(|| Error::not_found(format!("{}", handle.table()), id))?;
            if let Some(journal) = self.journal.as_mut() {
                journal.record_delete(handle.table(), removed);
            }
        }
        Ok(())
    }

    fn begin_transaction(&mut self) -> Result<()> {
        if self.journal.is_some() {
            return Err(Error::invalid_operation("transaction already open"));
        }
        self.journal = Some(Journal::new());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let journal = self
            .journal
            .take()
            .ok_or_else(|| Error::invalid_operation("no open transaction to commit"))?;
        for (table, diff) in journal.diffs() {
            debug!(
                table = %table,
                added = diff.added().count(),
                modified = diff.modified().len(),
                deleted = diff.deleted().len(),
                "commit"
            );
        }
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        let journal = self
            .journal
            .take()
            .ok_or_else(|| Error::invalid_operation("no open transaction to roll back"))?;
        debug!(entries = journal.entries().len(), "rollback");
        for entry in journal.into_undo() {
            self.undo(entry);
        }
        Ok(())
    }

    fn comparator(&self) -> ValueComparator {
        Arc::clone(&self.comparator)
    }

    fn updateable(
        &self,
        table: &TableName,
        column: &Column,
        _value: &Value,
    ) -> Option<Arc<dyn CellMutator>> {
        let stored = self.tables.get(table)?;
        if stored.read_only.contains(&column.index()) {
            return None;
        }
        Some(Arc::new(ColumnMutator::new(column.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use quarry_core::schema::TableBuilder;
    use quarry_core::DataType;
    use quarry_index::Range;

    fn store() -> (MemoryStore, TableName) {
        let mut store = MemoryStore::new();
        let schema = TableBuilder::new("users")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_column("name", DataType::String)
            .unwrap()
            .build()
            .unwrap();
        store.create_table(schema).unwrap();
        let name: TableName = "users".into();
        store
            .insert(&InsertRequest {
                table: name.clone(),
                rows: vec![
                    vec![Value::Int64(1), Value::from("ann")],
                    vec![Value::Int64(2), Value::from("bob")],
                    vec![Value::Int64(3), Value::from("cat")],
                ],
            })
            .unwrap();
        (store, name)
    }

    fn fetch_all(store: &mut MemoryStore, table: &TableName) -> Vec<Rc<Row>> {
        store
            .fetch(&FetchRequest {
                table,
                columns: &[],
                ranges: &[],
                for_update: false,
            })
            .unwrap()
    }

    #[test]
    fn test_fetch_with_ranges() {
        let (mut store, users) = store();
        let mut range: ValueRange = Range::unbounded(store.comparator());
        range.narrow_lower(Value::Int64(2), true);
        let rows = store
            .fetch(&FetchRequest {
                table: &users,
                columns: &[0],
                ranges: &[(0, range)],
                for_update: false,
            })
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(1), Some(&Value::from("bob")));
    }

    #[test]
    fn test_insert_validates() {
        let (mut store, users) = store();
        let err = store.insert(&InsertRequest {
            table: users.clone(),
            rows: vec![vec![Value::from("x"), Value::from("y")]],
        });
        assert_eq!(err, Err(Error::type_mismatch(DataType::Int64, DataType::String)));
        let err = store.insert(&InsertRequest {
            table: users.clone(),
            rows: vec![vec![Value::Int64(1)]],
        });
        assert!(err.is_err());
        assert_eq!(store.len(&users).unwrap(), 3);
    }

    #[test]
    fn test_for_update_requires_transaction() {
        let (mut store, users) = store();
        let request = FetchRequest {
            table: &users,
            columns: &[],
            ranges: &[],
            for_update: true,
        };
        assert!(store.fetch(&request).is_err());
        store.begin_transaction().unwrap();
        assert_eq!(store.fetch(&request).unwrap().len(), 3);
        store.commit().unwrap();
    }

    #[test]
    fn test_rollback_restores_rows() {
        let (mut store, users) = store();
        let rows = fetch_all(&mut store, &users);
        store.begin_transaction().unwrap();

        let first = RowHandle::new(users.clone(), (*rows[0]).clone());
        first.set(1, Value::from("zed"));
        store.update(&[first]).unwrap();
        store
            .delete(&[RowHandle::new(users.clone(), (*rows[1]).clone())])
            .unwrap();
        store
            .insert(&InsertRequest {
                table: users.clone(),
                rows: vec![vec![Value::Int64(9), Value::from("new")]],
            })
            .unwrap();

        let diff = store.pending(&users).unwrap();
        assert_eq!(diff.added().count(), 1);
        assert_eq!(diff.modified().len(), 1);
        assert_eq!(diff.deleted().len(), 1);

        store.rollback_transaction().unwrap();
        let after = fetch_all(&mut store, &users);
        assert_eq!(after.len(), 3);
        assert_eq!(after[0].get(1), Some(&Value::from("ann")));
        assert_eq!(after[1].get(1), Some(&Value::from("bob")));
        assert!(!store.in_transaction());
    }

    #[test]
    fn test_delete_missing_row() {
        let (mut store, users) = store();
        let ghost = RowHandle::new(users.clone(), Row::new(77, vec![]));
        assert_eq!(
            store.delete(&[ghost]),
            Err(Error::not_found("users", 77))
        );
    }

    #[test]
    fn test_updateable_respects_read_only() {
        let (mut store, users) = store();
        let schema = store.describe(&users).unwrap();
        let id = schema.column("id").unwrap().clone();
        assert!(store.updateable(&users, &id, &Value::Int64(1)).is_some());
        store.mark_read_only(&users, "id").unwrap();
        assert!(store.updateable(&users, &id, &Value::Int64(1)).is_none());
    }

    #[test]
    fn test_transaction_state_errors() {
        let (mut store, _) = store();
        assert!(store.commit().is_err());
        assert!(store.rollback_transaction().is_err());
        store.begin_transaction().unwrap();
        assert!(store.begin_transaction().is_err());
    }
}
