//! Statement AST: tables, columns, conditions, select lists and sort keys.

mod column;
mod condition;
mod expr;
mod statement;
mod table;
mod truth;

pub use column::ColumnRef;
pub use condition::{Bindings, ColumnRanges, Condition, Operand, RowSource, SingleRow};
pub use expr::{Expr, Function, SelectItem};
pub use statement::{
    BoundSelect, InsertStatement, Parameterized, Projection, SelectBuilder, SelectStatement,
    SortKey,
};
pub use table::{ColumnUsage, JoinLink, Table, TableId, TableRef};
pub use truth::Truth;
