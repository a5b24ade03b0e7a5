//! The contract between the engine and a row store.

use crate::handle::RowHandle;
use crate::join_map::JoinMap;
use crate::mutator::CellMutator;
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use quarry_core::schema::{Column, TableName, TableSchema};
use quarry_core::{Relation, Result, Row, RowId, Value};
use quarry_index::{Comparator, Range};

/// The value order a store imposes on the engine.
pub type ValueComparator = Arc<dyn Comparator<Value> + Send + Sync>;

/// A pushdown range over values of one column.
pub type ValueRange = Range<Value, ValueComparator>;

/// A single-table fetch.
#[derive(Clone, Debug)]
pub struct FetchRequest<'a> {
    /// Table to scan.
    pub table: &'a TableName,
    /// Column positions the query references.
    pub columns: &'a [usize],
    /// Bounds the rows must satisfy, keyed by column position.
    pub ranges: &'a [(usize, ValueRange)],
    /// Fetch for a subsequent update; issued inside a transaction.
    pub for_update: bool,
}

/// One side of a join-map request.
#[derive(Clone, Copy, Debug)]
pub struct JoinSide<'a> {
    pub table: &'a TableName,
    pub rows: &'a [Rc<Row>],
    pub column: usize,
}

/// Request for the candidate index of `source.column REL target.column`.
#[derive(Clone, Copy, Debug)]
pub struct JoinRequest<'a> {
    pub source: JoinSide<'a>,
    pub target: JoinSide<'a>,
    pub relation: Relation,
}

/// Rows to insert, with values in schema column order.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertRequest {
    pub table: TableName,
    pub rows: Vec<Vec<Value>>,
}

/// A row store the engine executes against.
///
/// Mutations issued between `begin_transaction` and `commit` become visible
/// atomically; `rollback_transaction` discards them.
pub trait Store {
    /// Returns the column layout of a table.
    fn describe(&self, table: &TableName) -> Result<TableSchema>;

    /// Returns the rows of one table that satisfy the pushdown ranges.
    fn fetch(&mut self, request: &FetchRequest<'_>) -> Result<Vec<Rc<Row>>>;

    /// Returns the candidate index for a join comparison.
    ///
    /// The default builds it from the fetched rows with [`Store::comparator`].
    /// Returning `None` makes the executor scan the target in full.
    fn join_map(&self, request: &JoinRequest<'_>) -> Result<Option<JoinMap>> {
        let cmp = self.comparator();
        Ok(Some(JoinMap::build(
            request.source.rows,
            request.source.column,
            request.target.rows,
            request.target.column,
            request.relation,
            &*cmp,
        )))
    }

    /// Inserts rows and returns their assigned ids.
    fn insert(&mut self, request: &InsertRequest) -> Result<Vec<RowId>>;

    /// Writes the current contents of each handle back to its table.
    fn update(&mut self, rows: &[RowHandle]) -> Result<()>;

    /// Removes the rows behind each handle.
    fn delete(&mut self, rows: &[RowHandle]) -> Result<()>;

    /// Starts a transaction.
    fn begin_transaction(&mut self) -> Result<()>;

    /// Makes the current transaction's changes permanent.
    fn commit(&mut self) -> Result<()>;

    /// Discards the current transaction's changes.
    fn rollback_transaction(&mut self) -> Result<()>;

    /// Returns the order used for comparisons, ranges and sorting.
    fn comparator(&self) -> ValueComparator;

    /// Returns an update handle for a fetched cell, or `None` if it is read-only.
    fn updateable(
        &self,
        table: &TableName,
        column: &Column,
        value: &Value,
    ) -> Option<Arc<dyn CellMutator>>;
}
