//! Error types for Quarry.

use crate::types::DataType;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Result type alias for Quarry operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for engine, statement and store operations.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A multi-table query carries no condition at all.
    MissingJoinCondition {
        tables: Vec<String>,
    },
    /// A select-list function name is not known.
    UnknownFunction {
        name: String,
    },
    /// A function was called with the wrong number of arguments.
    FunctionArity {
        name: String,
        expected: String,
        got: usize,
    },
    /// `bind_value` was called with a name the statement does not use.
    UnknownPlaceholder {
        name: String,
    },
    /// A placeholder was left unbound at execution time.
    UnboundPlaceholder {
        name: String,
    },
    /// A relation cannot be applied to the operand type.
    UnsupportedRelation {
        relation: &'static str,
        data_type: DataType,
    },
    /// The statement is structurally invalid.
    InvalidStatement {
        message: String,
    },
    /// Type mismatch error.
    TypeMismatch {
        expected: DataType,
        got: DataType,
    },
    /// Null constraint violation.
    NullConstraint {
        column: String,
    },
    /// Invalid schema definition.
    InvalidSchema {
        message: String,
    },
    /// Table not found.
    TableNotFound {
        name: String,
    },
    /// Column not found.
    ColumnNotFound {
        table: String,
        column: String,
    },
    /// Row not found in the store.
    NotFound {
        table: String,
        row_id: u64,
    },
    /// A store-level constraint rejected the operation.
    ConstraintViolation {
        message: String,
    },
    /// Store-level failure (I/O or similar).
    Storage {
        message: String,
    },
    /// Attempt to modify a cell that has no update handle.
    ReadOnlyCell {
        column: String,
    },
    /// Row or column position outside the result.
    OutOfBounds {
        row: usize,
        column: usize,
    },
    /// Planning or execution was cancelled by the caller.
    Cancelled,
    /// Invalid operation.
    InvalidOperation {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingJoinCondition { tables } => {
                write!(f, "Query joins {} tables without any condition: ", tables.len())?;
                for (i, t) in tables.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(t)?;
                }
                Ok(())
            }
            Error::UnknownFunction { name } => write!(f, "Unknown function: {}", name),
            Error::FunctionArity {
                name,
                expected,
                got,
            } => write!(
                f,
                "Function {} expects {} argument(s), got {}",
                name, expected, got
            ),
            Error::UnknownPlaceholder { name } => {
                write!(f, "Statement has no placeholder named :{}", name)
            }
            Error::UnboundPlaceholder { name } => {
                write!(f, "Placeholder :{} is not bound", name)
            }
            Error::UnsupportedRelation {
                relation,
                data_type,
            } => write!(
                f,
                "Relation {} is not supported for {} operands",
                relation,
                data_type.name()
            ),
            Error::InvalidStatement { message } => write!(f, "Invalid statement: {}", message),
            Error::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {:?}, got {:?}", expected, got)
            }
            Error::NullConstraint { column } => {
                write!(f, "Null constraint violation on column: {}", column)
            }
            Error::InvalidSchema { message } => write!(f, "Invalid schema: {}", message),
            Error::TableNotFound { name } => write!(f, "Table not found: {}", name),
            Error::ColumnNotFound { table, column } => {
                write!(f, "Column {} not found in table {}", column, table)
            }
            Error::NotFound { table, row_id } => {
                write!(f, "Row {} not found in table {}", row_id, table)
            }
            Error::ConstraintViolation { message } => {
                write!(f, "Constraint violation: {}", message)
            }
            Error::Storage { message } => write!(f, "Storage error: {}", message),
            Error::ReadOnlyCell { column } => write!(f, "Column {} is not updatable", column),
            Error::OutOfBounds { row, column } => {
                write!(f, "Cell ({}, {}) is out of bounds", row, column)
            }
            Error::Cancelled => f.write_str("Query cancelled"),
            Error::InvalidOperation { message } => write!(f, "Invalid operation: {}", message),
        }
    }
}

impl Error {
    /// Creates a missing join condition error.
    pub fn missing_join_condition(tables: Vec<String>) -> Self {
        Error::MissingJoinCondition { tables }
    }

    /// Creates an unknown function error.
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Error::UnknownFunction { name: name.into() }
    }

    /// Creates a function arity error.
    pub fn function_arity(name: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        Error::FunctionArity {
            name: name.into(),
            expected: expected.into(),
            got,
        }
    }

    /// Creates an unknown placeholder error.
    pub fn unknown_placeholder(name: impl Into<String>) -> Self {
        Error::UnknownPlaceholder { name: name.into() }
    }

    /// Creates an unbound placeholder error.
    pub fn unbound_placeholder(name: impl Into<String>) -> Self {
        Error::UnboundPlaceholder { name: name.into() }
    }

    /// Creates an unsupported relation error.
    pub fn unsupported_relation(relation: &'static str, data_type: DataType) -> Self {
        Error::UnsupportedRelation {
            relation,
            data_type,
        }
    }

    /// Creates an invalid statement error.
    pub fn invalid_statement(message: impl Into<String>) -> Self {
        Error::InvalidStatement {
            message: message.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: DataType, got: DataType) -> Self {
        Error::TypeMismatch { expected, got }
    }

    /// Creates a null constraint error.
    pub fn null_constraint(column: impl Into<String>) -> Self {
        Error::NullConstraint {
            column: column.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a table not found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound { name: name.into() }
    }

    /// Creates a column not found error.
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a row not found error.
    pub fn not_found(table: impl Into<String>, row_id: u64) -> Self {
        Error::NotFound {
            table: table.into(),
            row_id,
        }
    }

    /// Creates a constraint violation error.
    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Error::ConstraintViolation {
            message: message.into(),
        }
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage {
            message: message.into(),
        }
    }

    /// Creates a read-only cell error.
    pub fn read_only_cell(column: impl Into<String>) -> Self {
        Error::ReadOnlyCell {
            column: column.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true for errors raised while validating a statement,
    /// before any store call was made.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MissingJoinCondition { .. }
                | Error::UnknownFunction { .. }
                | Error::FunctionArity { .. }
                | Error::UnknownPlaceholder { .. }
                | Error::UnboundPlaceholder { .. }
                | Error::UnsupportedRelation { .. }
                | Error::InvalidStatement { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn test_error_display() {
        let err = Error::type_mismatch(DataType::Int32, DataType::String);
        assert!(err.to_string().contains("Type mismatch"));

        let err = Error::missing_join_condition(vec!["a".into(), "b".into()]);
        assert_eq!(
            err.to_string(),
            "Query joins 2 tables without any condition: a, b"
        );

        let err = Error::function_arity("UPPER", "1", 3);
        assert!(err.to_string().contains("UPPER"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(Error::unbound_placeholder("id").is_configuration());
        assert!(Error::unsupported_relation("<", DataType::Bytes).is_configuration());
        assert!(!Error::storage("disk full").is_configuration());
        assert!(!Error::Cancelled.is_configuration());
    }
}
