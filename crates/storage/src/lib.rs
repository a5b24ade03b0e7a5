//! Quarry Storage - The row-store contract and a reference implementation.
//!
//! This crate provides:
//!
//! - `Store`: The operations the engine needs from a row store
//! - `FetchRequest`, `InsertRequest`, `JoinRequest`: Store call payloads
//! - `JoinMap`: Row-to-candidate indexes between two tables
//! - `RowHandle`, `RowKey`: Shared working copies of rows open for update
//! - `CellMutator`: Per-cell update handles handed out by the store
//! - `Journal`: Change tracking for transactions
//! - `MemoryStore`: Transactional in-memory store
//!
//! # Example
//!
//! ```rust
//! use quarry_core::schema::{TableBuilder, TableName};
//! use quarry_core::{DataType, Value};
//! use quarry_storage::{FetchRequest, InsertRequest, MemoryStore, Store};
//!
//! let mut store = MemoryStore::new();
//! let schema = TableBuilder::new("users")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! store.create_table(schema).unwrap();
//!
//! let users: TableName = "users".into();
//! store.begin_transaction().unwrap();
//! store
//!     .insert(&InsertRequest { table: "users".into(), rows: vec![vec![Value::Int64(1)]] })
//!     .unwrap();
//! store.commit().unwrap();
//!
//! let rows = store
//!     .fetch(&FetchRequest { table: &users, columns: &[0], ranges: &[], for_update: false })
//!     .unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

#![no_std]

extern crate alloc;

pub mod handle;
pub mod join_map;
pub mod journal;
pub mod memory;
pub mod mutator;
pub mod store;

pub use handle::{RowHandle, RowKey};
pub use join_map::JoinMap;
pub use journal::{Journal, JournalEntry, TableDiff};
pub use memory::MemoryStore;
pub use mutator::{check_value, CellMutator, ColumnMutator};
pub use store::{
    FetchRequest, InsertRequest, JoinRequest, JoinSide, Store, ValueComparator, ValueRange,
};
