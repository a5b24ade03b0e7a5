//! Query planning.

mod join_order;

pub use join_order::{JoinOrder, JoinOrderPlanner, DEFAULT_WARN_WIDTH};
