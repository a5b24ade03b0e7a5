//! Select-list expressions.

use super::column::ColumnRef;
use super::condition::RowSource;
use alloc::borrow::ToOwned;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use quarry_core::{Error, Result, Value};

/// Scalar functions available in a select list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Upper,
    Lower,
    Length,
    Abs,
    Coalesce,
    Concat,
}

impl Function {
    /// Looks up a function by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Result<Function> {
        let f = match name.to_ascii_uppercase().as_str() {
            "UPPER" => Function::Upper,
            "LOWER" => Function::Lower,
            "LENGTH" => Function::Length,
            "ABS" => Function::Abs,
            "COALESCE" => Function::Coalesce,
            "CONCAT" => Function::Concat,
            _ => return Err(Error::unknown_function(name)),
        };
        Ok(f)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Upper => "UPPER",
            Function::Lower => "LOWER",
            Function::Length => "LENGTH",
            Function::Abs => "ABS",
            Function::Coalesce => "COALESCE",
            Function::Concat => "CONCAT",
        }
    }

    /// Minimum and optional maximum argument count.
    pub fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Function::Upper | Function::Lower | Function::Length | Function::Abs => (1, Some(1)),
            Function::Coalesce => (1, None),
            Function::Concat => (2, None),
        }
    }

    fn check_arity(&self, got: usize) -> Result<()> {
        let (min, max) = self.arity();
        let ok = got >= min && max.map_or(true, |m| got <= m);
        if ok {
            return Ok(());
        }
        let expected = match max {
            Some(m) if m == min => format!("{}", min),
            Some(m) => format!("{} to {}", min, m),
            None => format!("at least {}", min),
        };
        Err(Error::function_arity(self.name(), expected, got))
    }

    /// Applies the function to evaluated arguments.
    ///
    /// NULL in, NULL out, except for COALESCE.
    pub fn apply(&self, args: &[Value]) -> Value {
        match self {
            Function::Coalesce => args
                .iter()
                .find(|v| !v.is_null())
                .cloned()
                .unwrap_or(Value::Null),
            _ if args.iter().any(Value::is_null) => Value::Null,
            Function::Upper => args
                .first()
                .map_or(Value::Null, |v| Value::String(text(v).to_uppercase())),
            Function::Lower => args
                .first()
                .map_or(Value::Null, |v| Value::String(text(v).to_lowercase())),
            Function::Length => match args.first() {
                Some(Value::String(s)) => Value::Int64(s.chars().count() as i64),
                Some(Value::Bytes(b)) => Value::Int64(b.len() as i64),
                Some(other) => Value::Int64(other.rendered_width() as i64),
                None => Value::Null,
            },
            Function::Abs => match args.first() {
                Some(Value::Int32(v)) => Value::Int32(v.wrapping_abs()),
                Some(Value::Int64(v)) => Value::Int64(v.wrapping_abs()),
                Some(Value::Float64(v)) => Value::Float64(libm::fabs(*v)),
                _ => Value::Null,
            },
            Function::Concat => {
                let mut out = String::new();
                for arg in args {
                    out.push_str(&text(arg));
                }
                Value::String(out)
            }
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_owned(),
        other => other.to_string(),
    }
}

/// A select-list expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Column(ColumnRef),
    Literal(Value),
    Function { function: Function, args: Vec<Expr> },
}

impl Expr {
    pub fn column(column: ColumnRef) -> Self {
        Expr::Column(column)
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Builds a function call, checking the name and argument count.
    pub fn call(name: &str, args: Vec<Expr>) -> Result<Self> {
        let function = Function::from_name(name)?;
        function.check_arity(args.len())?;
        Ok(Expr::Function { function, args })
    }

    /// Checks the argument count of every function call in the tree.
    pub fn check_arity(&self) -> Result<()> {
        match self {
            Expr::Column(_) | Expr::Literal(_) => Ok(()),
            Expr::Function { function, args } => {
                function.check_arity(args.len())?;
                args.iter().try_for_each(Expr::check_arity)
            }
        }
    }

    /// Evaluates against the rows bound to each table; a missing row reads as NULL.
    pub fn evaluate<R: RowSource + ?Sized>(&self, rows: &R) -> Value {
        match self {
            Expr::Column(column) => rows
                .row(column.table)
                .and_then(|row| row.get(column.index))
                .cloned()
                .unwrap_or(Value::Null),
            Expr::Literal(value) => value.clone(),
            Expr::Function { function, args } => {
                let values: Vec<Value> = args.iter().map(|a| a.evaluate(rows)).collect();
                function.apply(&values)
            }
        }
    }

    /// Columns the expression reads.
    pub fn columns(&self) -> Vec<&ColumnRef> {
        match self {
            Expr::Column(column) => alloc::vec![column],
            Expr::Literal(_) => Vec::new(),
            Expr::Function { args, .. } => args.iter().flat_map(Expr::columns).collect(),
        }
    }

    /// The column behind a bare column expression.
    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Expr::Column(column) => Some(column),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(column) => f.write_str(&column.name),
            Expr::Literal(Value::String(s)) => write!(f, "'{}'", s),
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Function { function, args } => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// One entry of a select list.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }

    /// Column name or expression text.
    pub fn header(&self) -> String {
        self.expr.to_string()
    }

    /// The alias if present, else the header.
    pub fn display_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.header(),
        }
    }
}

impl From<Expr> for SelectItem {
    fn from(expr: Expr) -> Self {
        SelectItem::new(expr)
    }
}

impl From<ColumnRef> for SelectItem {
    fn from(column: ColumnRef) -> Self {
        SelectItem::new(Expr::Column(column))
    }
}
