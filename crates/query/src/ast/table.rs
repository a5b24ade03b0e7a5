//! Table references and the per-execution state gathered on them.

use super::column::ColumnRef;
use super::condition::Condition;
use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use quarry_core::schema::{Column, TableName, TableSchema};
use quarry_core::{Error, Relation, Result};

/// Dense identifier of a table reference within one statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(usize);

impl TableId {
    /// Creates an id from its position in the statement's table list.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in the statement's table list.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A table as it appears in a statement: the stored table plus an optional alias.
#[derive(Clone, Debug)]
pub struct TableRef {
    id: TableId,
    schema: TableSchema,
    alias: Option<String>,
}

impl TableRef {
    pub(crate) fn new(id: TableId, schema: TableSchema, alias: Option<String>) -> Self {
        Self { id, schema, alias }
    }

    #[inline]
    pub fn id(&self) -> TableId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &TableName {
        self.schema.name()
    }

    #[inline]
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The alias if present, else the table name.
    pub fn display_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => alloc::format!("{}", self.schema.name()),
        }
    }

    /// Resolves a column by name.
    pub fn column(&self, name: &str) -> Result<ColumnRef> {
        let column = self
            .schema
            .get_column(name)
            .ok_or_else(|| Error::column_not_found(self.display_name(), name))?;
        Ok(ColumnRef::new(
            self.id,
            column.name(),
            column.index(),
            column.data_type(),
        ))
    }

    /// Schema column behind a reference.
    pub fn schema_column(&self, column: &ColumnRef) -> Option<&Column> {
        self.schema.columns().get(column.index)
    }
}

/// Column positions a statement touches, grouped by where they are used.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnUsage {
    pub select: BTreeSet<usize>,
    pub condition: BTreeSet<usize>,
    pub and_path: BTreeSet<usize>,
    pub sort: BTreeSet<usize>,
}

impl ColumnUsage {
    /// Every referenced column position, ascending.
    pub fn referenced(&self) -> Vec<usize> {
        let all: BTreeSet<usize> = self
            .select
            .iter()
            .chain(&self.condition)
            .chain(&self.sort)
            .copied()
            .collect();
        all.into_iter().collect()
    }
}

/// An AND-path join comparison seen from one of its two tables.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinLink {
    /// Column of this table.
    pub column: usize,
    /// Relation with this table's column on the left.
    pub relation: Relation,
    /// Column of the other table.
    pub other: ColumnRef,
}

/// A table reference plus everything predicate association recorded on it.
///
/// Built fresh for each execution from the bound statement.
#[derive(Clone, Debug)]
pub struct Table {
    table_ref: TableRef,
    usage: ColumnUsage,
    predicates: Vec<Condition>,
    local: Vec<Condition>,
    joins: Vec<JoinLink>,
}

impl Table {
    pub fn new(table_ref: TableRef) -> Self {
        Self {
            table_ref,
            usage: ColumnUsage::default(),
            predicates: Vec::new(),
            local: Vec::new(),
            joins: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> TableId {
        self.table_ref.id()
    }

    #[inline]
    pub fn name(&self) -> &TableName {
        self.table_ref.name()
    }

    #[inline]
    pub fn table_ref(&self) -> &TableRef {
        &self.table_ref
    }

    pub fn display_name(&self) -> String {
        self.table_ref.display_name()
    }

    #[inline]
    pub fn usage(&self) -> &ColumnUsage {
        &self.usage
    }

    /// Predicates that reference this table, in association order.
    pub fn predicates(&self) -> &[Condition] {
        &self.predicates
    }

    /// AND-path predicates that reference only this table.
    pub fn local_conditions(&self) -> &[Condition] {
        &self.local
    }

    /// AND-path join comparisons to other tables.
    pub fn joins(&self) -> &[JoinLink] {
        &self.joins
    }

    /// The join used to index candidates towards `other`, preferring equality.
    pub fn join_towards(&self, other: TableId) -> Option<&JoinLink> {
        let mut links = self.joins.iter().filter(|l| l.other.table == other);
        let first = links.clone().next()?;
        Some(
            links
                .find(|l| l.relation == Relation::Eq)
                .unwrap_or(first),
        )
    }

    pub(crate) fn use_select(&mut self, column: usize) {
        self.usage.select.insert(column);
    }

    pub(crate) fn use_sort(&mut self, column: usize) {
        self.usage.sort.insert(column);
    }

    pub(crate) fn use_condition(&mut self, column: usize, and_path: bool) {
        self.usage.condition.insert(column);
        if and_path {
            self.usage.and_path.insert(column);
        }
    }

    pub(crate) fn add_predicate(&mut self, predicate: &Condition) {
        if !self.predicates.contains(predicate) {
            self.predicates.push(predicate.clone());
        }
    }

    pub(crate) fn add_local(&mut self, predicate: &Condition) {
        self.local.push(predicate.clone());
    }

    pub(crate) fn add_join(&mut self, link: JoinLink) {
        self.joins.push(link);
    }
}
