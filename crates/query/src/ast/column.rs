//! Column references.

use super::table::TableId;
use alloc::string::String;
use quarry_core::DataType;

/// A resolved reference to one column of one table in a statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Table the column belongs to.
    pub table: TableId,
    /// Column name.
    pub name: String,
    /// Column position in the table schema.
    pub index: usize,
    /// Declared column type.
    pub data_type: DataType,
}

impl ColumnRef {
    /// Creates a new column reference.
    pub fn new(table: TableId, name: impl Into<String>, index: usize, data_type: DataType) -> Self {
        Self {
            table,
            name: name.into(),
            index,
            data_type,
        }
    }
}
