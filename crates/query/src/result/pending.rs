//! Rows changed through an updateable result, waiting to be flushed.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use quarry_core::Result;
use quarry_storage::{RowHandle, RowKey, Store};

/// Pending updated and deleted rows, keyed by originating row.
///
/// A deleted row is never also pending as updated.
#[derive(Clone, Debug, Default)]
pub struct PendingChanges {
    updated: BTreeMap<RowKey, RowHandle>,
    deleted: BTreeMap<RowKey, RowHandle>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a changed row unless it is already pending deletion.
    pub fn mark_updated(&mut self, row: &RowHandle) {
        let key = row.key();
        if !self.deleted.contains_key(&key) {
            self.updated.insert(key, row.clone());
        }
    }

    /// Records a deleted row and drops any pending update of it.
    pub fn mark_deleted(&mut self, row: &RowHandle) {
        let key = row.key();
        self.updated.remove(&key);
        self.deleted.insert(key, row.clone());
    }

    pub fn updated(&self) -> impl Iterator<Item = &RowKey> {
        self.updated.keys()
    }

    pub fn deleted(&self) -> impl Iterator<Item = &RowKey> {
        self.deleted.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Sends deletes, then updates, then commits. The pending sets are
    /// cleared only after the commit succeeds.
    pub fn flush<S: Store + ?Sized>(&mut self, store: &mut S) -> Result<()> {
        if !self.deleted.is_empty() {
            let rows: Vec<RowHandle> = self.deleted.values().cloned().collect();
            store.delete(&rows)?;
        }
        if !self.updated.is_empty() {
            let rows: Vec<RowHandle> = self.updated.values().cloned().collect();
            store.update(&rows)?;
        }
        store.commit()?;
        self.updated.clear();
        self.deleted.clear();
        Ok(())
    }
}
