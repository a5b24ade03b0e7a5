//! Quarry Core - Core types shared by every Quarry crate.
//!
//! This crate provides the foundational types for the Quarry query engine:
//!
//! - `DataType`: Supported column types
//! - `Value`: Runtime cell values with a total order and SQL NULL
//! - `Relation`: Comparison operators `=`, `<>`, `<`, `<=`, `>`, `>=`
//! - `Row`: A stored row with its store-assigned identifier
//! - `schema`: Table names and column layouts
//! - `Error`: Error types for statement, engine and store operations
//!
//! # Example
//!
//! ```rust
//! use quarry_core::{DataType, Value, Row};
//! use quarry_core::schema::TableBuilder;
//!
//! let table = TableBuilder::new("users")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("name", DataType::String)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let row = Row::new(1, vec![
//!     Value::Int64(1),
//!     Value::String("Alice".into()),
//! ]);
//!
//! assert_eq!(table.get_column_index("name"), Some(1));
//! assert_eq!(row.get(1), Some(&Value::String("Alice".into())));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod relation;
mod row;
pub mod schema;
mod types;
mod value;

pub use error::{Error, Result};
pub use relation::Relation;
pub use row::{Row, RowId};
pub use types::DataType;
pub use value::Value;
