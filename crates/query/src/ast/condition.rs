//! Condition trees evaluated under SQL three-valued logic.
//!
//! A condition is a tree of literal comparisons, column-to-column (join)
//! comparisons, and OR / AND combinators. Besides evaluation, a condition
//! can be associated with the tables it references, which records column
//! usage, AND-path membership and join links, and it can narrow per-column
//! value ranges for predicate pushdown.

use super::column::ColumnRef;
use super::table::{JoinLink, Table, TableId};
use super::truth::Truth;
use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use quarry_core::{Error, Relation, Result, Row, Value};
use quarry_index::{Comparator, Range};
use quarry_storage::{ValueComparator, ValueRange};

/// Supplies the row currently bound to each table.
pub trait RowSource {
    fn row(&self, table: TableId) -> Option<&Row>;
}

/// A single table's row, for evaluating table-local conditions.
#[derive(Clone, Copy, Debug)]
pub struct SingleRow<'a> {
    pub table: TableId,
    pub row: &'a Row,
}

impl RowSource for SingleRow<'_> {
    fn row(&self, table: TableId) -> Option<&Row> {
        (table == self.table).then_some(self.row)
    }
}

/// Right-hand side of a literal comparison.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Value(Value),
    /// A named placeholder, bound before execution.
    Placeholder(String),
}

impl Operand {
    pub fn placeholder(name: impl Into<String>) -> Self {
        Operand::Placeholder(name.into())
    }

    /// Substitutes a bound value for a placeholder.
    pub fn bind(&self, bindings: &Bindings) -> Result<Value> {
        match self {
            Operand::Value(v) => Ok(v.clone()),
            Operand::Placeholder(name) => bindings
                .get(name)
                .cloned()
                .ok_or_else(|| Error::unbound_placeholder(name.as_str())),
        }
    }
}

macro_rules! operand_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Operand {
            fn from(v: $t) -> Self {
                Operand::Value(Value::from(v))
            }
        })*
    };
}

operand_from!(bool, i32, i64, f64, String, &str, Vec<u8>);

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(Value::String(s)) => write!(f, "'{}'", s),
            Operand::Value(v) => write!(f, "{}", v),
            Operand::Placeholder(name) => write!(f, ":{}", name),
        }
    }
}

/// Placeholder values by name.
pub type Bindings = BTreeMap<String, Value>;

/// A predicate tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// `column REL literal`
    Compare {
        column: ColumnRef,
        relation: Relation,
        operand: Operand,
    },
    /// `left REL right`, each column from a table of the statement.
    Join {
        left: ColumnRef,
        relation: Relation,
        right: ColumnRef,
    },
    Or(Box<Condition>, Box<Condition>),
    And(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// Builds `column REL operand`, rejecting range relations on unordered types.
    pub fn compare(column: ColumnRef, relation: Relation, operand: impl Into<Operand>) -> Result<Self> {
        relation.check(column.data_type)?;
        let operand = operand.into();
        if let Operand::Value(v) = &operand {
            if let Some(dt) = v.data_type() {
                relation.check(dt)?;
            }
        }
        Ok(Condition::Compare {
            column,
            relation,
            operand,
        })
    }

    /// Builds `left REL right`.
    pub fn join(left: ColumnRef, relation: Relation, right: ColumnRef) -> Result<Self> {
        relation.check(left.data_type)?;
        relation.check(right.data_type)?;
        Ok(Condition::Join {
            left,
            relation,
            right,
        })
    }

    pub fn or(self, other: Condition) -> Condition {
        Condition::Or(Box::new(self), Box::new(other))
    }

    pub fn and(self, other: Condition) -> Condition {
        Condition::And(Box::new(self), Box::new(other))
    }

    /// Tables referenced anywhere in the tree.
    pub fn tables(&self) -> BTreeSet<TableId> {
        let mut out = BTreeSet::new();
        self.collect_tables(&mut out);
        out
    }

    fn collect_tables(&self, out: &mut BTreeSet<TableId>) {
        match self {
            Condition::Compare { column, .. } => {
                out.insert(column.table);
            }
            Condition::Join { left, right, .. } => {
                out.insert(left.table);
                out.insert(right.table);
            }
            Condition::Or(l, r) | Condition::And(l, r) => {
                l.collect_tables(out);
                r.collect_tables(out);
            }
        }
    }

    /// Columns referenced anywhere in the tree.
    pub fn columns(&self) -> Vec<&ColumnRef> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnRef>) {
        match self {
            Condition::Compare { column, .. } => out.push(column),
            Condition::Join { left, right, .. } => {
                out.push(left);
                out.push(right);
            }
            Condition::Or(l, r) | Condition::And(l, r) => {
                l.collect_columns(out);
                r.collect_columns(out);
            }
        }
    }

    /// Names of unbound placeholders.
    pub fn placeholders(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_placeholders(&mut out);
        out
    }

    fn collect_placeholders(&self, out: &mut BTreeSet<String>) {
        match self {
            Condition::Compare {
                operand: Operand::Placeholder(name),
                ..
            } => {
                out.insert(name.clone());
            }
            Condition::Compare { .. } | Condition::Join { .. } => {}
            Condition::Or(l, r) | Condition::And(l, r) => {
                l.collect_placeholders(out);
                r.collect_placeholders(out);
            }
        }
    }

    /// Returns a copy with every placeholder replaced by its bound value.
    pub fn bind(&self, bindings: &Bindings) -> Result<Condition> {
        Ok(match self {
            Condition::Compare {
                column,
                relation,
                operand,
            } => {
                let value = operand.bind(bindings)?;
                if let Some(dt) = value.data_type() {
                    relation.check(dt)?;
                }
                Condition::Compare {
                    column: column.clone(),
                    relation: *relation,
                    operand: Operand::Value(value),
                }
            }
            Condition::Join { .. } => self.clone(),
            Condition::Or(l, r) => Condition::Or(Box::new(l.bind(bindings)?), Box::new(r.bind(bindings)?)),
            Condition::And(l, r) => {
                Condition::And(Box::new(l.bind(bindings)?), Box::new(r.bind(bindings)?))
            }
        })
    }

    /// Evaluates the tree against the rows currently bound to each table.
    ///
    /// A NULL operand, a missing row or an unbound placeholder yields UNKNOWN.
    pub fn evaluate<R, C>(&self, rows: &R, cmp: &C) -> Truth
    where
        R: RowSource + ?Sized,
        C: Comparator<Value> + ?Sized,
    {
        match self {
            Condition::Compare {
                column,
                relation,
                operand,
            } => {
                let literal = match operand {
                    Operand::Value(v) => v,
                    Operand::Placeholder(_) => return Truth::Unknown,
                };
                match column_value(rows, column) {
                    Some(value) => compare(value, *relation, literal, cmp),
                    None => Truth::Unknown,
                }
            }
            Condition::Join {
                left,
                relation,
                right,
            } => match (column_value(rows, left), column_value(rows, right)) {
                (Some(l), Some(r)) => compare(l, *relation, r, cmp),
                _ => Truth::Unknown,
            },
            Condition::Or(l, r) => match l.evaluate(rows, cmp) {
                Truth::True => Truth::True,
                left => left.or(r.evaluate(rows, cmp)),
            },
            Condition::And(l, r) => match l.evaluate(rows, cmp) {
                Truth::False => Truth::False,
                left => left.and(r.evaluate(rows, cmp)),
            },
        }
    }

    /// Records this tree on the tables it references.
    ///
    /// `and_path` is true while every ancestor is an AND; an OR passes
    /// `false` to both branches. An AND-path subtree that touches a single
    /// table is also recorded as a local condition of that table.
    pub fn associate(&self, tables: &mut [Table], and_path: bool) -> Result<()> {
        match self {
            Condition::Compare { column, .. } => {
                let table = table_mut(tables, column.table)?;
                table.use_condition(column.index, and_path);
                table.add_predicate(self);
                if and_path {
                    table.add_local(self);
                }
            }
            Condition::Join {
                left,
                relation,
                right,
            } => {
                for (this, rel, other) in [(left, *relation, right), (right, relation.reversed(), left)] {
                    let table = table_mut(tables, this.table)?;
                    table.use_condition(this.index, and_path);
                    table.add_predicate(self);
                    if and_path && this.table != other.table {
                        table.add_join(JoinLink {
                            column: this.index,
                            relation: rel,
                            other: other.clone(),
                        });
                    }
                }
                if and_path && left.table == right.table {
                    table_mut(tables, left.table)?.add_local(self);
                }
            }
            Condition::Or(l, r) => {
                l.associate(tables, false)?;
                r.associate(tables, false)?;
                let touched = self.tables();
                if and_path && touched.len() == 1 {
                    if let Some(&id) = touched.iter().next() {
                        table_mut(tables, id)?.add_local(self);
                    }
                }
            }
            Condition::And(l, r) => {
                l.associate(tables, and_path)?;
                r.associate(tables, and_path)?;
            }
        }
        Ok(())
    }

    /// Narrows `ranges` with every AND-path comparison in the tree.
    ///
    /// Returns true if any range changed. Literal comparisons narrow their
    /// column; join comparisons carry bounds between both columns, so callers
    /// repeat until nothing changes.
    pub fn narrow(&self, ranges: &mut ColumnRanges) -> bool {
        match self {
            Condition::Compare {
                column,
                relation,
                operand: Operand::Value(value),
            } => {
                if value.is_null() {
                    return false;
                }
                let range = ranges.entry(column);
                match relation {
                    Relation::Eq => range.narrow_eq(value.clone()),
                    Relation::Lt => range.narrow_upper(value.clone(), false),
                    Relation::Le => range.narrow_upper(value.clone(), true),
                    Relation::Gt => range.narrow_lower(value.clone(), false),
                    Relation::Ge => range.narrow_lower(value.clone(), true),
                    Relation::Ne => false,
                }
            }
            Condition::Compare { .. } | Condition::Or(..) => false,
            Condition::Join {
                left,
                relation,
                right,
            } => {
                let forward = ranges.propagate(left, *relation, right);
                let backward = ranges.propagate(right, relation.reversed(), left);
                forward | backward
            }
            Condition::And(l, r) => {
                let left = l.narrow(ranges);
                let right = r.narrow(ranges);
                left | right
            }
        }
    }
}

fn column_value<'r, R: RowSource + ?Sized>(rows: &'r R, column: &ColumnRef) -> Option<&'r Value> {
    rows.row(column.table)?
        .get(column.index)
        .filter(|v| !v.is_null())
}

fn compare<C: Comparator<Value> + ?Sized>(left: &Value, relation: Relation, right: &Value, cmp: &C) -> Truth {
    if left.is_null() || right.is_null() {
        return Truth::Unknown;
    }
    Truth::from(relation.holds(cmp.compare(left, right)))
}

fn table_mut(tables: &mut [Table], id: TableId) -> Result<&mut Table> {
    tables
        .get_mut(id.index())
        .filter(|t| t.id() == id)
        .ok_or_else(|| Error::invalid_statement(alloc::format!("unknown table {}", id)))
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare {
                column,
                relation,
                operand,
            } => write!(f, "{}.{} {} {}", column.table, column.name, relation, operand),
            Condition::Join {
                left,
                relation,
                right,
            } => write!(
                f,
                "{}.{} {} {}.{}",
                left.table, left.name, relation, right.table, right.name
            ),
            Condition::Or(l, r) => write!(f, "({} OR {})", l, r),
            Condition::And(l, r) => write!(f, "({} AND {})", l, r),
        }
    }
}

/// Pushdown ranges for every column an AND-path comparison constrains.
pub struct ColumnRanges {
    cmp: ValueComparator,
    ranges: BTreeMap<(TableId, usize), ValueRange>,
}

impl ColumnRanges {
    pub fn new(cmp: ValueComparator) -> Self {
        Self {
            cmp,
            ranges: BTreeMap::new(),
        }
    }

    /// Narrows with `condition` until no range changes.
    pub fn narrow_to_fixpoint(&mut self, condition: &Condition) {
        while condition.narrow(self) {}
    }

    fn entry(&mut self, column: &ColumnRef) -> &mut ValueRange {
        let cmp = &self.cmp;
        self.ranges
            .entry((column.table, column.index))
            .or_insert_with(|| Range::unbounded(cmp.clone()))
    }

    /// Carries bounds implied by `from REL to` onto `to`.
    fn propagate(&mut self, from: &ColumnRef, relation: Relation, to: &ColumnRef) -> bool {
        let source = match self.ranges.get(&(from.table, from.index)) {
            Some(range) => range.clone(),
            None => return false,
        };
        let strict = matches!(relation, Relation::Lt | Relation::Gt);
        let target = self.entry(to);
        let mut changed = false;
        // from < to: to is above from's lower bound; from > to: below its upper.
        match relation {
            Relation::Eq => changed |= target.intersect(&source),
            Relation::Lt | Relation::Le => {
                if let Some(b) = source.lower() {
                    changed |= target.narrow_lower(b.value.clone(), b.inclusive && !strict);
                }
            }
            Relation::Gt | Relation::Ge => {
                if let Some(b) = source.upper() {
                    changed |= target.narrow_upper(b.value.clone(), b.inclusive && !strict);
                }
            }
            Relation::Ne => {}
        }
        changed
    }

    /// Range for one column, if any comparison constrained it.
    pub fn get(&self, table: TableId, column: usize) -> Option<&ValueRange> {
        self.ranges.get(&(table, column))
    }

    /// Bounded ranges of one table, by column position.
    pub fn for_table(&self, table: TableId) -> Vec<(usize, ValueRange)> {
        self.ranges
            .range((table, 0)..=(table, usize::MAX))
            .filter(|(_, range)| !range.is_unbounded())
            .map(|((_, column), range)| (*column, range.clone()))
            .collect()
    }

    /// Returns true if some column admits no value at all.
    pub fn is_contradictory(&self) -> bool {
        self.ranges.values().any(ValueRange::is_empty)
    }
}
