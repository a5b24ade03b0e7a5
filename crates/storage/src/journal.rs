//! Change tracking for transactions.
//!
//! The memory store applies every mutation immediately and records it here;
//! rollback replays the entries backwards.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use quarry_core::schema::TableName;
use quarry_core::{Row, RowId};

/// A single recorded change.
#[derive(Clone, Debug)]
pub enum JournalEntry {
    /// A row was inserted.
    Insert { table: TableName, row_id: RowId },
    /// A row was updated; `old` is its previous contents.
    Update { table: TableName, old: Rc<Row> },
    /// A row was deleted.
    Delete { table: TableName, row: Rc<Row> },
}

impl JournalEntry {
    /// Returns the table this entry touches.
    pub fn table(&self) -> &TableName {
        match self {
            JournalEntry::Insert { table, .. }
            | JournalEntry::Update { table, .. }
            | JournalEntry::Delete { table, .. } => table,
        }
    }

    /// Returns the id of the row this entry touches.
    pub fn row_id(&self) -> RowId {
        match self {
            JournalEntry::Insert { row_id, .. } => *row_id,
            JournalEntry::Update { old, .. } => old.id(),
            JournalEntry::Delete { row, .. } => row.id(),
        }
    }
}

/// Net effect of a transaction on one table.
#[derive(Clone, Debug, Default)]
pub struct TableDiff {
    added: BTreeMap<RowId, ()>,
    modified: BTreeMap<RowId, Rc<Row>>,
    deleted: BTreeMap<RowId, Rc<Row>>,
}

impl TableDiff {
    /// Records an insertion.
    pub fn add(&mut self, row_id: RowId) {
        self.added.insert(row_id, ());
    }

    /// Records a modification, keeping the oldest known contents.
    pub fn modify(&mut self, old: Rc<Row>) {
        let row_id = old.id();
        if self.added.contains_key(&row_id) {
            return;
        }
        self.modified.entry(row_id).or_insert(old);
    }

    /// Records a deletion.
    pub fn delete(&mut self, row: Rc<Row>) {
        let row_id = row.id();
        if self.added.remove(&row_id).is_some() {
            return;
        }
        let original = self.modified.remove(&row_id).unwrap_or(row);
        self.deleted.insert(row_id, original);
    }

    /// Ids of rows inserted by the transaction and still present.
    pub fn added(&self) -> impl Iterator<Item = RowId> + '_ {
        self.added.keys().copied()
    }

    /// Original contents of rows the transaction modified.
    pub fn modified(&self) -> &BTreeMap<RowId, Rc<Row>> {
        &self.modified
    }

    /// Original contents of rows the transaction deleted.
    pub fn deleted(&self) -> &BTreeMap<RowId, Rc<Row>> {
        &self.deleted
    }

    /// Returns true if the transaction left the table unchanged.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }
}

/// Ordered log of the changes made inside one transaction.
#[derive(Debug, Default)]
pub struct Journal {
    diffs: BTreeMap<TableName, TableDiff>,
    entries: Vec<JournalEntry>,
}

impl Journal {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an insert.
    pub fn record_insert(&mut self, table: &TableName, row_id: RowId) {
        self.diff_mut(table).add(row_id);
        self.entries.push(JournalEntry::Insert {
            table: table.clone(),
            row_id,
        });
    }

    /// Records an update given the replaced contents.
    pub fn record_update(&mut self, table: &TableName, old: Rc<Row>) {
        self.diff_mut(table).modify(Rc::clone(&old));
        self.entries.push(JournalEntry::Update {
            table: table.clone(),
            old,
        });
    }

    /// Records a delete given the removed row.
    pub fn record_delete(&mut self, table: &TableName, row: Rc<Row>) {
        self.diff_mut(table).delete(Rc::clone(&row));
        self.entries.push(JournalEntry::Delete {
            table: table.clone(),
            row,
        });
    }

    fn diff_mut(&mut self, table: &TableName) -> &mut TableDiff {
        self.diffs.entry(table.clone()).or_default()
    }

    /// Returns the entries in recording order.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Returns the net changes to one table.
    pub fn diff(&self, table: &TableName) -> Option<&TableDiff> {
        self.diffs.get(table)
    }

    /// Returns the net changes to every touched table.
    pub fn diffs(&self) -> &BTreeMap<TableName, TableDiff> {
        &self.diffs
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the journal, yielding entries newest first for undo.
    pub fn into_undo(self) -> impl Iterator<Item = JournalEntry> {
        self.entries.into_iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use quarry_core::Value;

    fn row(id: RowId, v: i64) -> Rc<Row> {
        Rc::new(Row::new(id, vec![Value::Int64(v)]))
    }

    #[test]
    fn test_diff_add_then_delete_cancels() {
        let mut diff = TableDiff::default();
        diff.add(1);
        diff.delete(row(1, 1));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_diff_keeps_original_contents() {
        let mut diff = TableDiff::default();
        diff.modify(row(1, 1));
        diff.modify(row(1, 2));
        assert_eq!(diff.modified()[&1].get(0), Some(&Value::Int64(1)));
        diff.delete(row(1, 3));
        assert!(diff.modified().is_empty());
        assert_eq!(diff.deleted()[&1].get(0), Some(&Value::Int64(1)));
    }

    #[test]
    fn test_journal_undo_order() {
        let t: TableName = "t".into();
        let mut journal = Journal::new();
        journal.record_insert(&t, 1);
        journal.record_update(&t, row(1, 1));
        journal.record_delete(&t, row(1, 2));
        assert_eq!(journal.entries().len(), 3);
        assert!(journal.diff(&t).unwrap().is_empty());

        let ids: Vec<_> = journal
            .into_undo()
            .map(|e| matches!(e, JournalEntry::Delete { .. }))
            .collect();
        assert_eq!(ids, vec![true, false, false]);
    }
}
