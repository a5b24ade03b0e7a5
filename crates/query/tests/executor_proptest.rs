//! The join walk agrees with a nested-loop model.

use std::rc::Rc;
use std::sync::Arc;

use proptest::prelude::*;
use quarry_core::schema::TableBuilder;
use quarry_core::{DataType, Relation, Row, Value};
use quarry_index::SimpleComparator;
use quarry_query::ast::{Bindings, Condition, SelectStatement, TableId};
use quarry_query::{CartesianJoinExecutor, NoProgress, TableContext};
use quarry_storage::{JoinMap, ValueComparator};

fn rows() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::of(0i64..6), 0..8)
}

fn to_rows(values: &[Option<i64>]) -> Vec<Rc<Row>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Rc::new(Row::new(i as u64, vec![Value::from(*v)])))
        .collect()
}

proptest! {
    /// `a.x = b.x AND b.x < c.x`, walked through join maps, matches every
    /// triple a nested loop accepts.
    #[test]
    fn test_walk_matches_nested_loop(a in rows(), b in rows(), c in rows(), use_maps in any::<bool>()) {
        let schema = |name: &str| {
            TableBuilder::new(name).unwrap()
                .add_column("x", DataType::Int64).unwrap()
                .add_nullable(&["x"])
                .build().unwrap()
        };
        let mut q = SelectStatement::builder();
        let ta = q.table(schema("a"));
        let tb = q.table(schema("b"));
        let tc = q.table(schema("c"));
        let ab = Condition::join(q.column(ta, "x").unwrap(), Relation::Eq, q.column(tb, "x").unwrap()).unwrap();
        let bc = Condition::join(q.column(tb, "x").unwrap(), Relation::Lt, q.column(tc, "x").unwrap()).unwrap();
        q.filter(ab).filter(bc);
        let stmt = q.build().unwrap().bind(&Bindings::new()).unwrap();

        let (ra, rb, rc) = (to_rows(&a), to_rows(&b), to_rows(&c));
        let cmp = SimpleComparator::asc();
        let universe = stmt.universe().clone();
        let mut ca = TableContext::new(&stmt.tables()[0], ra.clone(), universe.clone());
        let mut cb = TableContext::new(&stmt.tables()[1], rb.clone(), universe.clone());
        let cc = TableContext::new(&stmt.tables()[2], rc.clone(), universe.clone());
        if use_maps {
            ca.set_link(tb, JoinMap::build(&ra, 0, &rb, 0, Relation::Eq, &cmp));
            cb.set_link(tc, JoinMap::build(&rb, 0, &rc, 0, Relation::Lt, &cmp));
        }
        let contexts = vec![ca, cb, cc];

        let value_cmp: ValueComparator = Arc::new(cmp);
        let executor = CartesianJoinExecutor::new(&contexts, universe, value_cmp)
            .with_condition(stmt.condition());
        let mut walked = Vec::new();
        let emitted = executor
            .run(&mut NoProgress, |candidate| {
                let id = |t: TableId| candidate.get(t).map(|r| r.id());
                walked.push((id(ta), id(tb), id(tc)));
                Ok(())
            })
            .unwrap();
        prop_assert_eq!(emitted, walked.len());

        let mut expected = Vec::new();
        for (i, x) in a.iter().enumerate() {
            for (j, y) in b.iter().enumerate() {
                for (k, z) in c.iter().enumerate() {
                    if let (Some(x), Some(y), Some(z)) = (x, y, z) {
                        if x == y && y < z {
                            expected.push((Some(i as u64), Some(j as u64), Some(k as u64)));
                        }
                    }
                }
            }
        }
        walked.sort();
        prop_assert_eq!(walked, expected);
    }
}
