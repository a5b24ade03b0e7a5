//! Quarry Index - Indexed collections, comparators and ranges.
//!
//! The engine works over small closed universes (the tables of one query,
//! the fetched rows of one table). This crate provides the collections that
//! exploit that:
//!
//! - `Universe`: pre-enumerated keys with stable positions
//! - `IndexedMap`: dense array-backed map over a universe
//! - `BitSet`, `IndexedSet`, `LiveView`: bitset-backed sets and a view read
//!   through a live parent set
//! - `SingleSet`, `CandidateSet`: candidate positions with a capacity-1 fast path
//! - `Comparator`, `MultiKeyComparator`: total orders and composite sort keys
//! - `Range`: monotonically narrowed value intervals for predicate pushdown
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use quarry_index::{IndexedMap, IndexedSet, Universe};
//!
//! let tables = Arc::new(Universe::new(["orders", "customers", "items"]));
//!
//! let mut rows: IndexedMap<&str, usize> = IndexedMap::new(tables.clone());
//! rows.insert(&"orders", 120);
//! assert_eq!(rows.get_at(0), Some(&120));
//!
//! let mut pending = IndexedSet::full(tables);
//! pending.remove(&"customers");
//! assert_eq!(pending.len(), 2);
//! ```

#![no_std]

extern crate alloc;

pub mod bitset;
pub mod candidates;
pub mod comparator;
pub mod map;
pub mod range;
pub mod set;
pub mod universe;

pub use bitset::{BitSet, BitSetIter};
pub use candidates::{CandidateIter, CandidateSet, SingleSet};
pub use comparator::{Comparator, MultiKeyComparator, Order, SimpleComparator};
pub use map::IndexedMap;
pub use range::{Bound, Range};
pub use set::{IndexedSet, LiveView};
pub use universe::Universe;
