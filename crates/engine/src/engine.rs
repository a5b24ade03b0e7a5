//! Statement execution against a store.

use crate::config::EngineConfig;
use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;
use quarry_core::schema::{TableName, TableSchema};
use quarry_core::{Error, Result, Row, RowId};
use quarry_query::ast::{
    Bindings, BoundSelect, ColumnRanges, InsertStatement, Projection, SelectStatement, SingleRow,
    Table,
};
use quarry_query::{
    CancelToken, CartesianJoinExecutor, Cell, FetchResult, JoinOrderPlanner, NoProgress, Phase,
    Progress, RowCandidate, TableContext,
};
use quarry_storage::{
    FetchRequest, JoinMap, JoinRequest, JoinSide, RowHandle, RowKey, Store, ValueComparator,
};
use tracing::{debug, info, warn};

/// Executes statements against a [`Store`].
///
/// Each call is synchronous and runs to completion on the caller's thread.
pub struct Engine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: Store> Engine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Looks up a table's schema in the store.
    pub fn describe(&self, table: &TableName) -> Result<TableSchema> {
        self.store.describe(table)
    }

    /// Runs a statement without placeholders.
    pub fn execute(&mut self, statement: &SelectStatement) -> Result<FetchResult> {
        self.execute_with(statement, &Bindings::new(), &mut NoProgress, None)
    }

    /// Runs a statement with placeholder values, progress callbacks and an
    /// optional cancellation token.
    pub fn execute_with(
        &mut self,
        statement: &SelectStatement,
        bindings: &Bindings,
        progress: &mut dyn Progress,
        cancel: Option<&CancelToken>,
    ) -> Result<FetchResult> {
        let bound = self.bind(statement, bindings)?;
        self.select(&bound, false, progress, cancel)
    }

    /// Runs a statement inside a new transaction and returns an updateable
    /// result. The transaction stays open until the result commits or rolls
    /// back; it is rolled back here if execution fails.
    pub fn execute_for_update(
        &mut self,
        statement: &SelectStatement,
        bindings: &Bindings,
    ) -> Result<FetchResult> {
        let bound = self.bind(statement, bindings)?;
        self.store.begin_transaction()?;
        match self.select(&bound, true, &mut NoProgress, None) {
            Ok(result) => Ok(result),
            Err(err) => {
                self.abandon(&err);
                Err(err)
            }
        }
    }

    /// Inserts the statement's rows in one transaction.
    ///
    /// On failure the transaction is rolled back and the store's error is
    /// returned unchanged.
    pub fn insert(&mut self, statement: &InsertStatement, bindings: &Bindings) -> Result<Vec<RowId>> {
        let request = statement.to_request(bindings)?;
        self.store.begin_transaction()?;
        let outcome = self
            .store
            .insert(&request)
            .and_then(|ids| self.store.commit().map(|()| ids));
        match outcome {
            Ok(ids) => {
                info!(table = %request.table, rows = ids.len(), "insert committed");
                Ok(ids)
            }
            Err(err) => {
                self.abandon(&err);
                Err(err)
            }
        }
    }

    /// Checks the statement shape and binds placeholders. Never touches the store.
    fn bind(&self, statement: &SelectStatement, bindings: &Bindings) -> Result<BoundSelect> {
        if statement.table_count() > 1
            && statement.condition().is_none()
            && !self.config.allow_cross_product
        {
            return Err(Error::missing_join_condition(statement.table_names()));
        }
        statement.bind(bindings)
    }

    fn select(
        &mut self,
        bound: &BoundSelect,
        for_update: bool,
        progress: &mut dyn Progress,
        cancel: Option<&CancelToken>,
    ) -> Result<FetchResult> {
        let cmp = self.store.comparator();
        let tables = bound.tables();
        let universe = bound.universe().clone();
        let projection = bound.projection();
        let mut result = empty_result(&projection, &cmp, for_update);

        let mut ranges = ColumnRanges::new(cmp.clone());
        if let Some(condition) = bound.condition() {
            ranges.narrow_to_fixpoint(condition);
        }
        if ranges.is_contradictory() {
            debug!("condition ranges are empty, skipping fetch");
            return Ok(result);
        }

        let fetched = self.fetch(tables, &ranges, &cmp, for_update, progress, cancel)?;
        let maps = self.join_maps(tables, &fetched)?;
        let mut contexts: Vec<TableContext<'_>> = tables
            .iter()
            .zip(fetched)
            .map(|(table, rows)| TableContext::new(table, rows, universe.clone()))
            .collect();
        for (source, target, map) in maps {
            contexts[target].set_link(tables[source].id(), map.reversed());
            contexts[source].set_link(tables[target].id(), map);
        }

        let order = JoinOrderPlanner::from_contexts(universe.clone(), &contexts)
            .with_cancel(cancel)
            .with_warn_width(self.config.planner_warn_width)
            .order()?;
        let ordered = order.arrange(contexts);

        let store = &self.store;
        let mut handles: HashMap<RowKey, RowHandle> = HashMap::new();
        let executor = CartesianJoinExecutor::new(&ordered, universe, cmp.clone())
            .with_condition(bound.condition())
            .with_cancel(cancel);
        let emitted = executor.run(progress, |candidate| {
            let (cells, sources) = if for_update {
                updateable_row(store, tables, &projection, candidate, &mut handles)
            } else {
                let cells = projection
                    .exprs
                    .iter()
                    .map(|e| Cell::ReadOnly(e.evaluate(candidate)))
                    .collect();
                (cells, Vec::new())
            };
            result.push_row(cells, sources);
            Ok(())
        })?;

        info!(
            tables = tables.len(),
            rows = emitted,
            for_update,
            "select executed"
        );
        Ok(result)
    }

    fn fetch(
        &mut self,
        tables: &[Table],
        ranges: &ColumnRanges,
        cmp: &ValueComparator,
        for_update: bool,
        progress: &mut dyn Progress,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Vec<Rc<Row>>>> {
        progress.start(Phase::Fetch, tables.len());
        let mut fetched = Vec::with_capacity(tables.len());
        for (done, table) in tables.iter().enumerate() {
            if let Some(token) = cancel {
                token.check()?;
            }
            let columns = table.usage().referenced();
            let pushdown = ranges.for_table(table.id());
            debug!(table = %table.name(), ranges = ?pushdown, "fetching table");
            let mut rows = self.store.fetch(&FetchRequest {
                table: table.name(),
                columns: &columns,
                ranges: &pushdown,
                for_update,
            })?;
            let local = table.local_conditions();
            if self.config.prefilter_local_conditions && !local.is_empty() {
                rows.retain(|row| {
                    let source = SingleRow {
                        table: table.id(),
                        row,
                    };
                    local.iter().all(|c| c.evaluate(&source, cmp).is_true())
                });
            }
            fetched.push(rows);
            progress.update(done + 1);
        }
        progress.stop();
        Ok(fetched)
    }

    /// Asks the store for one join map per linked table pair, as
    /// `(source position, target position, map)`.
    fn join_maps(
        &self,
        tables: &[Table],
        fetched: &[Vec<Rc<Row>>],
    ) -> Result<Vec<(usize, usize, JoinMap)>> {
        let mut maps = Vec::new();
        for (i, source) in tables.iter().enumerate() {
            for (j, target) in tables.iter().enumerate().skip(i + 1) {
                let Some(link) = source.join_towards(target.id()) else {
                    continue;
                };
                let request = JoinRequest {
                    source: JoinSide {
                        table: source.name(),
                        rows: &fetched[i],
                        column: link.column,
                    },
                    target: JoinSide {
                        table: target.name(),
                        rows: &fetched[j],
                        column: link.other.index,
                    },
                    relation: link.relation,
                };
                if let Some(map) = self.store.join_map(&request)? {
                    debug!(
                        source = %source.name(),
                        target = %target.name(),
                        ratio = map.ratio(),
                        "join map built"
                    );
                    maps.push((i, j, map));
                }
            }
        }
        Ok(maps)
    }

    fn abandon(&mut self, err: &Error) {
        warn!(error = %err, "statement failed inside a transaction, rolling back");
        if let Err(rollback) = self.store.rollback_transaction() {
            warn!(error = %rollback, "rollback failed");
        }
    }
}

fn empty_result(projection: &Projection, cmp: &ValueComparator, for_update: bool) -> FetchResult {
    let result = FetchResult::ordered(
        projection.headers.clone(),
        projection.display_names.clone(),
        projection.sort.clone(),
        cmp.clone(),
    );
    if for_update {
        result.updateable()
    } else {
        result
    }
}

/// Builds the cells of one updateable result row and the handles of every
/// store row behind it. Handles are shared per store row across the result.
fn updateable_row<S: Store + ?Sized>(
    store: &S,
    tables: &[Table],
    projection: &Projection,
    candidate: &RowCandidate<'_>,
    handles: &mut HashMap<RowKey, RowHandle>,
) -> (Vec<Cell>, Vec<RowHandle>) {
    let sources: Vec<(usize, RowHandle)> = candidate
        .rows()
        .map(|(id, row)| {
            let name = tables[id.index()].name();
            let handle = handles
                .entry(RowKey(name.clone(), row.id()))
                .or_insert_with(|| RowHandle::new(name.clone(), Row::clone(row)))
                .clone();
            (id.index(), handle)
        })
        .collect();

    let cells = projection
        .exprs
        .iter()
        .map(|expr| {
            let value = expr.evaluate(candidate);
            let Some(column) = expr.as_column() else {
                return Cell::ReadOnly(value);
            };
            let table = &tables[column.table.index()];
            let owner = sources.iter().find(|(i, _)| *i == column.table.index());
            let mutator = table
                .table_ref()
                .schema_column(column)
                .and_then(|c| store.updateable(table.name(), c, &value));
            match (mutator, owner) {
                (Some(mutator), Some((_, row))) => Cell::Mutable {
                    mutator,
                    row: row.clone(),
                },
                _ => Cell::ReadOnly(value),
            }
        })
        .collect();

    (cells, sources.into_iter().map(|(_, h)| h).collect())
}
