//! Parsed statements and their per-execution binding.

use super::column::ColumnRef;
use super::condition::{Bindings, Condition, Operand};
use super::expr::{Expr, SelectItem};
use super::table::{Table, TableId, TableRef};
use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use quarry_core::schema::{TableName, TableSchema};
use quarry_core::{Error, Result};
use quarry_index::{Order, Universe};
use quarry_storage::InsertRequest;

/// Statements that may contain named placeholders.
pub trait Parameterized {
    /// Placeholder names the statement uses.
    fn placeholders(&self) -> BTreeSet<String>;
}

/// One ORDER BY key.
#[derive(Clone, Debug, PartialEq)]
pub struct SortKey {
    pub column: ColumnRef,
    pub order: Order,
}

/// A multi-table SELECT.
#[derive(Clone, Debug)]
pub struct SelectStatement {
    tables: Vec<TableRef>,
    condition: Option<Condition>,
    select: Vec<SelectItem>,
    sort: Vec<SortKey>,
}

impl SelectStatement {
    pub fn builder() -> SelectBuilder {
        SelectBuilder::new()
    }

    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn select_list(&self) -> &[SelectItem] {
        &self.select
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.sort
    }

    /// Display names of every table, in statement order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(TableRef::display_name).collect()
    }

    /// Substitutes placeholders and associates the condition with fresh tables.
    pub fn bind(&self, bindings: &Bindings) -> Result<BoundSelect> {
        let condition = self
            .condition
            .as_ref()
            .map(|c| c.bind(bindings))
            .transpose()?;
        let mut tables: Vec<Table> = self.tables.iter().cloned().map(Table::new).collect();
        if let Some(condition) = &condition {
            condition.associate(&mut tables, true)?;
        }
        for item in &self.select {
            for column in item.expr.columns() {
                tables[column.table.index()].use_select(column.index);
            }
        }
        for key in &self.sort {
            tables[key.column.table.index()].use_sort(key.column.index);
        }
        let universe = Arc::new(Universe::new(self.tables.iter().map(TableRef::id)));
        Ok(BoundSelect {
            universe,
            tables,
            condition,
            select: self.select.clone(),
            sort: self.sort.clone(),
        })
    }
}

impl Parameterized for SelectStatement {
    fn placeholders(&self) -> BTreeSet<String> {
        self.condition
            .as_ref()
            .map(Condition::placeholders)
            .unwrap_or_default()
    }
}

/// Assembles a [`SelectStatement`].
#[derive(Debug, Default)]
pub struct SelectBuilder {
    tables: Vec<TableRef>,
    condition: Option<Condition>,
    select: Vec<SelectItem>,
    sort: Vec<SortKey>,
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table reference and returns its id.
    pub fn table(&mut self, schema: TableSchema) -> TableId {
        self.push_table(schema, None)
    }

    /// Adds an aliased table reference and returns its id.
    pub fn table_as(&mut self, schema: TableSchema, alias: impl Into<String>) -> TableId {
        self.push_table(schema, Some(alias.into()))
    }

    fn push_table(&mut self, schema: TableSchema, alias: Option<String>) -> TableId {
        let id = TableId::new(self.tables.len());
        self.tables.push(TableRef::new(id, schema, alias));
        id
    }

    /// Resolves a column of a table added earlier.
    pub fn column(&self, table: TableId, name: &str) -> Result<ColumnRef> {
        self.tables
            .get(table.index())
            .ok_or_else(|| Error::invalid_statement(format!("unknown table {}", table)))?
            .column(name)
    }

    pub fn select(&mut self, item: impl Into<SelectItem>) -> &mut Self {
        self.select.push(item.into());
        self
    }

    /// ANDs a condition onto the WHERE clause.
    pub fn filter(&mut self, condition: Condition) -> &mut Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn order_by(&mut self, column: ColumnRef, order: Order) -> &mut Self {
        self.sort.push(SortKey { column, order });
        self
    }

    /// Validates references and produces the statement.
    ///
    /// An empty select list selects every column of every table.
    pub fn build(self) -> Result<SelectStatement> {
        if self.tables.is_empty() {
            return Err(Error::invalid_statement("SELECT needs at least one table"));
        }
        let mut select = self.select;
        if select.is_empty() {
            for table in &self.tables {
                for column in table.schema().columns() {
                    select.push(SelectItem::from(table.column(column.name())?));
                }
            }
        }
        let statement = SelectStatement {
            tables: self.tables,
            condition: self.condition,
            select,
            sort: self.sort,
        };
        let check = |column: &ColumnRef| -> Result<()> {
            let known = statement
                .tables
                .get(column.table.index())
                .and_then(|t| t.schema_column(column))
                .map_or(false, |c| c.name() == column.name);
            if known {
                Ok(())
            } else {
                Err(Error::invalid_statement(format!(
                    "column {} does not belong to table {}",
                    column.name, column.table
                )))
            }
        };
        for item in &statement.select {
            item.expr.check_arity()?;
            item.expr.columns().into_iter().try_for_each(check)?;
        }
        if let Some(condition) = &statement.condition {
            condition.columns().into_iter().try_for_each(check)?;
        }
        statement.sort.iter().map(|k| &k.column).try_for_each(check)?;
        Ok(statement)
    }
}

/// A statement with placeholders bound and predicates associated, ready to run.
#[derive(Clone, Debug)]
pub struct BoundSelect {
    universe: Arc<Universe<TableId>>,
    tables: Vec<Table>,
    condition: Option<Condition>,
    select: Vec<SelectItem>,
    sort: Vec<SortKey>,
}

/// Output columns of a query: the visible select list, then hidden sort columns.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub exprs: Vec<Expr>,
    pub headers: Vec<String>,
    pub display_names: Vec<String>,
    pub visible: usize,
    /// Sort keys by output column position.
    pub sort: Vec<(usize, Order)>,
}

impl BoundSelect {
    pub fn universe(&self) -> &Arc<Universe<TableId>> {
        &self.universe
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn select_list(&self) -> &[SelectItem] {
        &self.select
    }

    /// Resolves the output columns, appending sort columns missing from the select list.
    pub fn projection(&self) -> Projection {
        let mut exprs: Vec<Expr> = self.select.iter().map(|i| i.expr.clone()).collect();
        let mut headers: Vec<String> = self.select.iter().map(SelectItem::header).collect();
        let display_names = self.select.iter().map(SelectItem::display_name).collect();
        let visible = exprs.len();
        let mut sort = Vec::with_capacity(self.sort.len());
        for key in &self.sort {
            let position = match exprs.iter().position(|e| e.as_column() == Some(&key.column)) {
                Some(p) => p,
                None => {
                    exprs.push(Expr::Column(key.column.clone()));
                    headers.push(key.column.name.clone());
                    exprs.len() - 1
                }
            };
            sort.push((position, key.order));
        }
        Projection {
            exprs,
            headers,
            display_names,
            visible,
            sort,
        }
    }
}

/// An INSERT of literal or placeholder rows into one table.
#[derive(Clone, Debug)]
pub struct InsertStatement {
    schema: TableSchema,
    columns: Vec<usize>,
    rows: Vec<Vec<Operand>>,
}

impl InsertStatement {
    /// Inserts into every column of `schema`, in schema order.
    pub fn new(schema: TableSchema) -> Self {
        let columns = (0..schema.columns().len()).collect();
        Self {
            schema,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn table(&self) -> &TableName {
        self.schema.name()
    }

    /// Restricts the statement to the named columns; the rest take defaults.
    pub fn columns(mut self, names: &[&str]) -> Result<Self> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let index = self.schema.column(name)?.index();
            if columns.contains(&index) {
                return Err(Error::invalid_statement(format!("column {} listed twice", name)));
            }
            columns.push(index);
        }
        self.columns = columns;
        Ok(self)
    }

    /// Appends a row of values for the chosen columns.
    pub fn values(mut self, row: Vec<Operand>) -> Result<Self> {
        if row.len() != self.columns.len() {
            return Err(Error::invalid_statement(format!(
                "expected {} values, got {}",
                self.columns.len(),
                row.len()
            )));
        }
        self.rows.push(row);
        Ok(self)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Produces full rows with bound placeholders and defaults for omitted columns.
    pub fn to_request(&self, bindings: &Bindings) -> Result<InsertRequest> {
        if self.rows.is_empty() {
            return Err(Error::invalid_statement("INSERT has no rows"));
        }
        let defaults: Vec<_> = self.schema.columns().iter().map(|c| c.default_value()).collect();
        let mut rows = Vec::with_capacity(self.rows.len());
        for operands in &self.rows {
            let mut values = defaults.clone();
            for (&column, operand) in self.columns.iter().zip(operands) {
                values[column] = operand.bind(bindings)?;
            }
            rows.push(values);
        }
        Ok(InsertRequest {
            table: self.schema.name().clone(),
            rows,
        })
    }
}

impl Parameterized for InsertStatement {
    fn placeholders(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .flatten()
            .filter_map(|op| match op {
                Operand::Placeholder(name) => Some(name.clone()),
                Operand::Value(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use quarry_core::schema::TableBuilder;
    use quarry_core::{DataType, Relation, Value};

    fn schema(name: &str) -> TableSchema {
        TableBuilder::new(name)
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_column("label", DataType::String)
            .unwrap()
            .add_nullable(&["label"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_table() {
        assert!(SelectBuilder::new().build().is_err());
    }

    #[test]
    fn test_empty_select_list_selects_all() {
        let mut q = SelectStatement::builder();
        q.table(schema("a"));
        q.table(schema("b"));
        let stmt = q.build().unwrap();
        assert_eq!(stmt.select_list().len(), 4);
        assert_eq!(stmt.table_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_bind_associates_condition() {
        let mut q = SelectStatement::builder();
        let a = q.table(schema("a"));
        let b = q.table(schema("b"));
        let a_id = q.column(a, "id").unwrap();
        let b_id = q.column(b, "id").unwrap();
        let label = q.column(a, "label").unwrap();
        q.select(label.clone())
            .filter(Condition::join(a_id.clone(), Relation::Eq, b_id).unwrap())
            .filter(Condition::compare(a_id, Relation::Gt, Operand::placeholder("min")).unwrap());
        let stmt = q.build().unwrap();
        assert_eq!(stmt.placeholders().len(), 1);

        let mut bindings = Bindings::new();
        bindings.insert("min".into(), Value::Int64(1));
        let bound = stmt.bind(&bindings).unwrap();
        let ta = &bound.tables()[0];
        assert_eq!(ta.joins().len(), 1);
        assert_eq!(ta.local_conditions().len(), 1);
        assert_eq!(ta.usage().referenced(), vec![0, 1]);
        assert_eq!(bound.tables()[1].joins()[0].relation, Relation::Eq);
    }

    #[test]
    fn test_or_is_not_and_path() {
        let mut q = SelectStatement::builder();
        let a = q.table(schema("a"));
        let b = q.table(schema("b"));
        let a_id = q.column(a, "id").unwrap();
        let b_id = q.column(b, "id").unwrap();
        q.filter(
            Condition::join(a_id.clone(), Relation::Eq, b_id)
                .unwrap()
                .or(Condition::compare(a_id, Relation::Eq, 1i64).unwrap()),
        );
        let bound = q.build().unwrap().bind(&Bindings::new()).unwrap();
        let ta = &bound.tables()[0];
        assert!(ta.joins().is_empty());
        assert!(ta.usage().and_path.is_empty());
        assert_eq!(ta.predicates().len(), 2);
    }

    #[test]
    fn test_projection_hidden_sort_column() {
        let mut q = SelectStatement::builder();
        let a = q.table(schema("a"));
        let id = q.column(a, "id").unwrap();
        let label = q.column(a, "label").unwrap();
        q.select(SelectItem::aliased(Expr::column(label.clone()), "l"))
            .order_by(id, Order::Desc)
            .order_by(label, Order::Asc);
        let projection = q.build().unwrap().bind(&Bindings::new()).unwrap().projection();
        assert_eq!(projection.visible, 1);
        assert_eq!(projection.headers, vec!["label", "id"]);
        assert_eq!(projection.display_names, vec!["l"]);
        assert_eq!(projection.sort, vec![(1, Order::Desc), (0, Order::Asc)]);
    }

    #[test]
    fn test_foreign_column_rejected() {
        let stray = ColumnRef::new(TableId::new(3), "id", 0, DataType::Int64);
        let mut q = SelectStatement::builder();
        q.table(schema("a"));
        q.select(stray);
        assert!(q.build().is_err());
    }

    #[test]
    fn test_function_arity_checked_at_build() {
        use crate::ast::Function;
        let mut q = SelectStatement::builder();
        let a = q.table(schema("a"));
        let label = q.column(a, "label").unwrap();
        q.select(Expr::Function { function: Function::Upper, args: vec![] });
        assert!(matches!(q.build(), Err(Error::FunctionArity { .. })));

        let mut q = SelectStatement::builder();
        q.table(schema("a"));
        let nested = Expr::Function {
            function: Function::Concat,
            args: vec![
                Expr::column(label),
                Expr::Function { function: Function::Lower, args: vec![] },
            ],
        };
        q.select(nested);
        assert!(matches!(q.build(), Err(Error::FunctionArity { .. })));
    }

    #[test]
    fn test_insert_defaults_and_placeholders() {
        let stmt = InsertStatement::new(schema("a"))
            .columns(&["id"])
            .unwrap()
            .values(vec![Operand::placeholder("id")])
            .unwrap();
        assert_eq!(stmt.placeholders().into_iter().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(
            stmt.to_request(&Bindings::new()),
            Err(Error::unbound_placeholder("id"))
        );
        let mut bindings = Bindings::new();
        bindings.insert("id".into(), Value::Int64(5));
        let request = stmt.to_request(&bindings).unwrap();
        assert_eq!(request.rows, vec![vec![Value::Int64(5), Value::Null]]);
        assert!(InsertStatement::new(schema("a")).values(vec![1i64.into()]).is_err());
    }
}
