//! Quarry Query - statements, join planning and execution for Quarry.
//!
//! This crate provides:
//!
//! - `ast`: tables, columns, conditions, select lists, sort keys and
//!   placeholders
//! - `context`: per-execution table contexts with join maps
//! - `planner`: branch-and-bound join-order selection
//! - `executor`: the cartesian join walk
//! - `result`: plain, ordered and updateable result sets
//! - `control`: cancellation and progress reporting
//!
//! # Example
//!
//! ```rust
//! use quarry_core::schema::TableBuilder;
//! use quarry_core::{DataType, Relation};
//! use quarry_query::ast::{Bindings, Condition, SelectStatement};
//!
//! let a = TableBuilder::new("a").unwrap()
//!     .add_column("id", DataType::Int64).unwrap()
//!     .build().unwrap();
//! let b = TableBuilder::new("b").unwrap()
//!     .add_column("a_id", DataType::Int64).unwrap()
//!     .build().unwrap();
//!
//! let mut q = SelectStatement::builder();
//! let ta = q.table(a);
//! let tb = q.table(b);
//! let join = Condition::join(
//!     q.column(ta, "id").unwrap(),
//!     Relation::Eq,
//!     q.column(tb, "a_id").unwrap(),
//! ).unwrap();
//! q.filter(join);
//! let bound = q.build().unwrap().bind(&Bindings::new()).unwrap();
//! assert_eq!(bound.tables().len(), 2);
//! ```

#![no_std]

extern crate alloc;

pub mod ast;
pub mod context;
pub mod control;
pub mod executor;
pub mod planner;
pub mod result;

pub use context::TableContext;
pub use control::{CancelToken, NoProgress, Phase, Progress};
pub use executor::{CartesianJoinExecutor, RowCandidate};
pub use planner::{JoinOrder, JoinOrderPlanner};
pub use result::{Cell, FetchResult, PendingChanges};
