//! Schema module for Quarry.
//!
//! Table names and the column layout stores describe to the engine.

mod column;
mod table;

pub use column::Column;
pub use table::{TableBuilder, TableName, TableSchema};
