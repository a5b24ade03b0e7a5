//! Data type definitions for Quarry.
//!
//! This module defines the column data types a store can expose to the engine.

/// Supported column data types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// UTF-8 string
    String,
    /// Date and time stored as Unix timestamp (milliseconds)
    DateTime,
    /// Binary data
    Bytes,
}

impl DataType {
    /// Returns the SQL-ish name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int32 => "INT",
            DataType::Int64 => "BIGINT",
            DataType::Float64 => "DOUBLE",
            DataType::String => "VARCHAR",
            DataType::DateTime => "TIMESTAMP",
            DataType::Bytes => "BLOB",
        }
    }

    /// Returns whether this type is nullable by default.
    pub fn is_nullable_by_default(&self) -> bool {
        matches!(self, DataType::Bytes)
    }

    /// Returns whether `<`, `<=`, `>` and `>=` are meaningful for this type.
    pub fn supports_ordering(&self) -> bool {
        !matches!(self, DataType::Boolean | DataType::Bytes)
    }

    /// Returns whether this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64 | DataType::Float64)
    }

    /// Returns whether a value of type `other` may be stored in a column of this type.
    pub fn accepts(&self, other: DataType) -> bool {
        match (self, other) {
            (a, b) if *a == b => true,
            (DataType::Int64, DataType::Int32) => true,
            (DataType::Float64, DataType::Int32 | DataType::Int64) => true,
            (DataType::DateTime, DataType::Int64) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_equality() {
        assert_eq!(DataType::Int32, DataType::Int32);
        assert_ne!(DataType::Int32, DataType::Int64);
    }

    #[test]
    fn test_nullable_by_default() {
        assert!(!DataType::Boolean.is_nullable_by_default());
        assert!(!DataType::Int32.is_nullable_by_default());
        assert!(!DataType::String.is_nullable_by_default());
        assert!(DataType::Bytes.is_nullable_by_default());
    }

    #[test]
    fn test_supports_ordering() {
        assert!(DataType::Int64.supports_ordering());
        assert!(DataType::String.supports_ordering());
        assert!(DataType::DateTime.supports_ordering());
        assert!(!DataType::Boolean.supports_ordering());
        assert!(!DataType::Bytes.supports_ordering());
    }

    #[test]
    fn test_accepts_widening() {
        assert!(DataType::Int64.accepts(DataType::Int32));
        assert!(DataType::Float64.accepts(DataType::Int64));
        assert!(!DataType::Int32.accepts(DataType::Int64));
        assert!(!DataType::String.accepts(DataType::Int32));
    }
}
