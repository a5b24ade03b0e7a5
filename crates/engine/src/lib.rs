//! Quarry Engine - an embeddable relational query engine.
//!
//! The engine runs already-built SELECT and INSERT statements against a
//! caller-supplied [`Store`]: it fetches each table with pushed-down ranges,
//! asks the store for join maps, picks a join order, walks the join and
//! materializes the rows into a [`FetchResult`].
//!
//! # Example
//!
//! ```rust
//! use quarry_engine::{Engine, MemoryStore, PreparedStatement};
//! use quarry_engine::ast::{Bindings, InsertStatement, Operand, SelectStatement};
//! use quarry_engine::ast::Condition;
//! use quarry_engine::schema::TableBuilder;
//! use quarry_engine::{DataType, Relation};
//!
//! let users = TableBuilder::new("users").unwrap()
//!     .add_column("id", DataType::Int64).unwrap()
//!     .add_column("name", DataType::String).unwrap()
//!     .build().unwrap();
//! let mut store = MemoryStore::new();
//! store.create_table(users.clone()).unwrap();
//! let mut engine = Engine::new(store);
//!
//! let insert = InsertStatement::new(users.clone())
//!     .values(vec![Operand::from(1i64), Operand::from("alice")]).unwrap()
//!     .values(vec![Operand::from(2i64), Operand::placeholder("name")]).unwrap();
//! let mut insert = PreparedStatement::new(insert);
//! insert.bind_value("name", "bob").unwrap();
//! insert.execute(&mut engine).unwrap();
//!
//! let mut q = SelectStatement::builder();
//! let t = q.table(users);
//! let id = q.column(t, "id").unwrap();
//! q.select(q.column(t, "name").unwrap());
//! q.filter(Condition::compare(id, Relation::Gt, 1i64).unwrap());
//! let result = engine.execute(&q.build().unwrap()).unwrap();
//! assert_eq!(result.row_count(), 1);
//! assert_eq!(result.to_string(), "name\n----\nbob\n");
//! ```

#![no_std]

extern crate alloc;

mod config;
mod engine;
mod prepared;

pub use config::EngineConfig;
pub use engine::Engine;
pub use prepared::PreparedStatement;

pub use quarry_core::{schema, DataType, Error, Relation, Result, Row, RowId, Value};
pub use quarry_query::ast;
pub use quarry_query::{CancelToken, Cell, FetchResult, NoProgress, Phase, Progress};
pub use quarry_storage::{MemoryStore, Store};
