//! Updateable results: pending changes, flush order and rollback.

mod common;

use common::{engine, insert_rows, table_a, table_b, table_t};
use quarry_engine::ast::{Bindings, Condition, SelectStatement};
use quarry_engine::schema::TableBuilder;
use quarry_engine::{DataType, Error, Relation, Value};
use quarry_storage::RowKey;

fn select_t() -> SelectStatement {
    let mut q = SelectStatement::builder();
    q.table(table_t());
    q.build().unwrap()
}

fn t_values(engine: &quarry_engine::Engine<common::RecordingStore>) -> Vec<Vec<Value>> {
    engine
        .store()
        .inner
        .rows(&"t".into())
        .unwrap()
        .iter()
        .map(|r| r.values().to_vec())
        .collect()
}

#[test]
fn test_commit_flushes_deletes_then_updates() {
    let mut engine = engine();
    let mut result = engine.execute_for_update(&select_t(), &Bindings::new()).unwrap();
    assert!(result.is_updateable());
    assert_eq!(engine.store().calls(), vec!["begin", "fetch"]);

    result.set_value_at(0, 1, Value::from("bb")).unwrap();
    result.delete_row(1).unwrap();
    engine.store().clear();
    result.update_and_commit(engine.store_mut()).unwrap();

    assert_eq!(engine.store().calls(), vec!["delete", "update", "commit"]);
    assert!(result.pending_updated().is_empty());
    assert!(result.pending_deleted().is_empty());
    assert_eq!(
        t_values(&engine),
        vec![
            vec![Value::Int64(2), Value::from("bb")],
            vec![Value::Int64(1), Value::from("c")],
        ]
    );
}

#[test]
fn test_delete_dominates_update() {
    let mut engine = engine();
    let mut result = engine.execute_for_update(&select_t(), &Bindings::new()).unwrap();
    result.set_value_at(0, 1, Value::from("bb")).unwrap();
    result.delete_row(0).unwrap();
    result.set_value_at(0, 0, Value::Int64(7)).unwrap();

    assert!(result.pending_updated().is_empty());
    assert_eq!(result.pending_deleted(), vec![RowKey("t".into(), 7)]);

    engine.store().clear();
    result.update_and_commit(engine.store_mut()).unwrap();
    assert_eq!(engine.store().calls(), vec!["delete", "commit"]);
    assert_eq!(engine.store().inner.len(&"t".into()).unwrap(), 2);
}

#[test]
fn test_rollback_keeps_pending_changes() {
    let mut engine = engine();
    let mut result = engine.execute_for_update(&select_t(), &Bindings::new()).unwrap();
    result.set_value_at(2, 1, Value::from("cc")).unwrap();
    result.rollback(engine.store_mut()).unwrap();

    assert_eq!(result.pending_updated().len(), 1);
    assert!(!engine.store().inner.in_transaction());
    assert_eq!(t_values(&engine)[2], vec![Value::Int64(1), Value::from("c")]);
}

#[test]
fn test_read_only_columns_reject_writes() {
    let mut engine = engine();
    engine.store_mut().inner.mark_read_only(&"t".into(), "k").unwrap();
    let mut result = engine.execute_for_update(&select_t(), &Bindings::new()).unwrap();
    assert_eq!(
        result.set_value_at(0, 0, Value::Int64(5)),
        Err(Error::read_only_cell("k"))
    );
    assert_eq!(
        result.set_value_at(0, 1, Value::Int64(5)),
        Err(Error::type_mismatch(DataType::String, DataType::Int64))
    );
    assert!(result.pending_updated().is_empty());
}

#[test]
fn test_plain_results_are_not_updateable() {
    let mut engine = engine();
    let mut result = engine.execute(&select_t()).unwrap();
    assert!(!result.is_updateable());
    assert!(matches!(
        result.set_value_at(0, 1, Value::from("x")),
        Err(Error::InvalidOperation { .. })
    ));
}

#[test]
fn test_joined_rows_share_handles_and_delete_every_source() {
    let mut engine = engine();
    insert_rows(&mut engine, &table_b(), vec![vec![1i64.into(), "x2".into()]]);

    let mut q = SelectStatement::builder();
    let a = q.table(table_a());
    let b = q.table(table_b());
    let join = Condition::join(
        q.column(a, "id").unwrap(),
        Relation::Eq,
        q.column(b, "a_id").unwrap(),
    )
    .unwrap();
    q.select(q.column(a, "id").unwrap());
    q.select(q.column(b, "tag").unwrap());
    q.order_by(q.column(b, "tag").unwrap(), quarry_index::Order::Asc);
    q.filter(join);
    let mut result = engine
        .execute_for_update(&q.build().unwrap(), &Bindings::new())
        .unwrap();

    // x, x2 (both a.id = 1), y
    assert_eq!(result.row_count(), 3);
    result.set_value_at(0, 0, Value::Int64(10)).unwrap();
    assert_eq!(*result.value_at(1, 0).unwrap(), Value::Int64(10));
    assert_eq!(result.pending_updated().len(), 1);

    result.delete_row(2).unwrap();
    let deleted = result.pending_deleted();
    assert_eq!(deleted.len(), 2);
    assert!(deleted.iter().any(|k| k.0 == "a".into()));
    assert!(deleted.iter().any(|k| k.0 == "b".into()));
}

#[test]
fn test_failed_fetch_rolls_back_the_transaction() {
    let mut engine = engine();
    let missing = TableBuilder::new("missing")
        .unwrap()
        .add_column("id", DataType::Int64)
        .unwrap()
        .build()
        .unwrap();
    let mut q = SelectStatement::builder();
    q.table(missing);
    let err = engine
        .execute_for_update(&q.build().unwrap(), &Bindings::new())
        .unwrap_err();
    assert_eq!(err, Error::table_not_found("missing"));
    assert_eq!(engine.store().calls(), vec!["begin", "fetch", "rollback"]);
    assert!(!engine.store().inner.in_transaction());
}
