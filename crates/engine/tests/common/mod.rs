//! Shared fixtures: a call-recording store and two small tables.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use quarry_engine::ast::{Bindings, InsertStatement, Operand};
use quarry_engine::schema::{Column, TableBuilder, TableName, TableSchema};
use quarry_engine::{DataType, Engine, MemoryStore, Result, Row, RowId, Store, Value};
use quarry_storage::{
    CellMutator, FetchRequest, InsertRequest, JoinMap, JoinRequest, RowHandle, ValueComparator,
};

/// Wraps a [`MemoryStore`] and records every call by name.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub calls: RefCell<Vec<String>>,
    /// `(table, pushdown range count)` per fetch.
    pub fetches: RefCell<Vec<(String, usize)>>,
    /// `(source rows, target rows)` per join-map request.
    pub join_requests: RefCell<Vec<(usize, usize)>>,
}

impl RecordingStore {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
        self.fetches.borrow_mut().clear();
        self.join_requests.borrow_mut().clear();
    }

    fn log(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_string());
    }
}

impl Store for RecordingStore {
    fn describe(&self, table: &TableName) -> Result<TableSchema> {
        self.log("describe");
        self.inner.describe(table)
    }

    fn fetch(&mut self, request: &FetchRequest<'_>) -> Result<Vec<Rc<Row>>> {
        self.log("fetch");
        self.fetches
            .borrow_mut()
            .push((request.table.to_string(), request.ranges.len()));
        self.inner.fetch(request)
    }

    fn join_map(&self, request: &JoinRequest<'_>) -> Result<Option<JoinMap>> {
        self.log("join_map");
        self.join_requests
            .borrow_mut()
            .push((request.source.rows.len(), request.target.rows.len()));
        self.inner.join_map(request)
    }

    fn insert(&mut self, request: &InsertRequest) -> Result<Vec<RowId>> {
        self.log("insert");
        self.inner.insert(request)
    }

    fn update(&mut self, rows: &[RowHandle]) -> Result<()> {
        self.log("update");
        self.inner.update(rows)
    }

    fn delete(&mut self, rows: &[RowHandle]) -> Result<()> {
        self.log("delete");
        self.inner.delete(rows)
    }

    fn begin_transaction(&mut self) -> Result<()> {
        self.log("begin");
        self.inner.begin_transaction()
    }

    fn commit(&mut self) -> Result<()> {
        self.log("commit");
        self.inner.commit()
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        self.log("rollback");
        self.inner.rollback_transaction()
    }

    fn comparator(&self) -> ValueComparator {
        self.inner.comparator()
    }

    fn updateable(
        &self,
        table: &TableName,
        column: &Column,
        value: &Value,
    ) -> Option<Arc<dyn CellMutator>> {
        self.inner.updateable(table, column, value)
    }
}

/// `a(id)` with ids 1, 2, 3.
pub fn table_a() -> TableSchema {
    TableBuilder::new("a")
        .unwrap()
        .add_column("id", DataType::Int64)
        .unwrap()
        .build()
        .unwrap()
}

/// `b(a_id, tag)`; `a_id` is nullable.
pub fn table_b() -> TableSchema {
    TableBuilder::new("b")
        .unwrap()
        .add_column("a_id", DataType::Int64)
        .unwrap()
        .add_column("tag", DataType::String)
        .unwrap()
        .add_nullable(&["a_id"])
        .build()
        .unwrap()
}

/// `t(k, v)` with rows (2, b), (1, a), (1, c).
pub fn table_t() -> TableSchema {
    TableBuilder::new("t")
        .unwrap()
        .add_column("k", DataType::Int64)
        .unwrap()
        .add_column("v", DataType::String)
        .unwrap()
        .build()
        .unwrap()
}

pub fn insert_rows<S: Store>(engine: &mut Engine<S>, schema: &TableSchema, rows: Vec<Vec<Value>>) {
    let mut statement = InsertStatement::new(schema.clone());
    for row in rows {
        statement = statement
            .values(row.into_iter().map(Operand::from).collect())
            .unwrap();
    }
    engine.insert(&statement, &Bindings::new()).unwrap();
}

/// An engine over a recording store holding `a`, `b` and `t`.
pub fn engine() -> Engine<RecordingStore> {
    let mut store = RecordingStore::default();
    for schema in [table_a(), table_b(), table_t()] {
        store.inner.create_table(schema).unwrap();
    }
    let mut engine = Engine::new(store);
    insert_rows(
        &mut engine,
        &table_a(),
        vec![vec![1i64.into()], vec![2i64.into()], vec![3i64.into()]],
    );
    insert_rows(
        &mut engine,
        &table_b(),
        vec![
            vec![1i64.into(), "x".into()],
            vec![2i64.into(), "y".into()],
            vec![Value::Null, "z".into()],
        ],
    );
    insert_rows(
        &mut engine,
        &table_t(),
        vec![
            vec![2i64.into(), "b".into()],
            vec![1i64.into(), "a".into()],
            vec![1i64.into(), "c".into()],
        ],
    );
    engine.store().clear();
    engine
}
