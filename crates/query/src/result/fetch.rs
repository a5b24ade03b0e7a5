//! Materialized query results.

use super::cell::Cell;
use super::order::RowOrder;
use super::pending::PendingChanges;
use alloc::borrow::Cow;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use quarry_core::{Error, Result, Value};
use quarry_index::Order;
use quarry_storage::{RowHandle, RowKey, Store, ValueComparator};

/// Rows produced by a statement.
///
/// One struct covers the plain, ordered and updateable variants: the row
/// order is chosen at construction ([`FetchResult::ordered`]) and updates
/// are enabled with [`FetchResult::updateable`]. An ordered result sorts
/// once, on the first read.
///
/// Rows may carry hidden trailing cells used only as sort keys; positional
/// access covers the visible columns.
pub struct FetchResult {
    headers: Vec<String>,
    display_names: Vec<String>,
    widths: Vec<usize>,
    rows: Vec<Vec<Cell>>,
    sources: Vec<Vec<RowHandle>>,
    order: RowOrder,
    pending: Option<PendingChanges>,
}

impl FetchResult {
    /// A result in insertion order.
    ///
    /// `display_names` names the visible columns; `headers` may be longer,
    /// naming hidden columns after them.
    pub fn plain(headers: Vec<String>, display_names: Vec<String>) -> Self {
        let widths = display_names.iter().map(|n| n.chars().count()).collect();
        Self {
            headers,
            display_names,
            widths,
            rows: Vec::new(),
            sources: Vec::new(),
            order: RowOrder::Insertion,
            pending: None,
        }
    }

    /// A result sorted by `(cell position, order)` keys on first read.
    pub fn ordered(
        headers: Vec<String>,
        display_names: Vec<String>,
        keys: Vec<(usize, Order)>,
        cmp: ValueComparator,
    ) -> Self {
        let mut result = Self::plain(headers, display_names);
        if !keys.is_empty() {
            result.order = RowOrder::sorted(keys, cmp);
        }
        result
    }

    /// Enables cell updates and row deletion.
    pub fn updateable(mut self) -> Self {
        self.pending = Some(PendingChanges::new());
        self
    }

    pub fn is_updateable(&self) -> bool {
        self.pending.is_some()
    }

    /// Appends a row and the store rows it was built from.
    pub fn push_row(&mut self, cells: Vec<Cell>, sources: Vec<RowHandle>) {
        for (width, cell) in self.widths.iter_mut().zip(&cells) {
            *width = (*width).max(cell.value().rendered_width());
        }
        self.rows.push(cells);
        self.sources.push(sources);
        self.order.appended(&self.rows, self.rows.len() - 1);
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.display_names.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers[..self.column_count().min(self.headers.len())]
    }

    pub fn display_names(&self) -> &[String] {
        &self.display_names
    }

    /// Widest rendering per visible column, header included.
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Position of a visible column by display name, then by header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.display_names
            .iter()
            .position(|n| n == name)
            .or_else(|| self.headers().iter().position(|h| h == name))
    }

    /// Number of sorts performed so far; at most one.
    pub fn sort_passes(&self) -> usize {
        self.order.sort_passes()
    }

    pub fn value_at(&self, row: usize, column: usize) -> Result<Cow<'_, Value>> {
        let index = self.physical(row, column)?;
        Ok(self.rows[index][column].value())
    }

    pub fn value_by_name(&self, row: usize, name: &str) -> Result<Cow<'_, Value>> {
        let column = self
            .column_index(name)
            .ok_or_else(|| Error::column_not_found("result", name))?;
        self.value_at(row, column)
    }

    /// The visible values of the `row`-th row.
    pub fn row(&self, row: usize) -> Option<Vec<Value>> {
        let index = self.order.physical(&self.rows, row)?;
        Some(
            self.rows[index][..self.column_count()]
                .iter()
                .map(|c| c.value().into_owned())
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.row_count()).filter_map(move |i| self.row(i))
    }

    /// Writes a cell through its update handle and marks the row as updated.
    pub fn set_value_at(&mut self, row: usize, column: usize, value: Value) -> Result<()> {
        let index = self.physical(row, column)?;
        let Some(pending) = self.pending.as_mut() else {
            return Err(Error::invalid_operation("result is not updateable"));
        };
        match &self.rows[index][column] {
            Cell::ReadOnly(_) => Err(Error::read_only_cell(self.display_names[column].clone())),
            Cell::Mutable { mutator, row } => {
                let width = value.rendered_width();
                mutator.apply(row, value)?;
                pending.mark_updated(row);
                self.widths[column] = self.widths[column].max(width);
                Ok(())
            }
        }
    }

    /// Marks every store row behind the `row`-th result row for deletion.
    ///
    /// The row stays in this result until it is fetched again.
    pub fn delete_row(&mut self, row: usize) -> Result<()> {
        let index = self
            .order
            .physical(&self.rows, row)
            .ok_or(Error::OutOfBounds { row, column: 0 })?;
        let pending = self
            .pending
            .as_mut()
            .ok_or_else(|| Error::invalid_operation("result is not updateable"))?;
        for source in &self.sources[index] {
            pending.mark_deleted(source);
        }
        Ok(())
    }

    /// Flushes pending deletes, then updates, then commits.
    pub fn update_and_commit<S: Store + ?Sized>(&mut self, store: &mut S) -> Result<()> {
        match self.pending.as_mut() {
            Some(pending) => pending.flush(store),
            None => Err(Error::invalid_operation("result is not updateable")),
        }
    }

    /// Rolls back the store transaction; pending changes are kept.
    pub fn rollback<S: Store + ?Sized>(&self, store: &mut S) -> Result<()> {
        store.rollback_transaction()
    }

    pub fn pending_updated(&self) -> Vec<RowKey> {
        self.pending
            .iter()
            .flat_map(|p| p.updated().cloned())
            .collect()
    }

    pub fn pending_deleted(&self) -> Vec<RowKey> {
        self.pending
            .iter()
            .flat_map(|p| p.deleted().cloned())
            .collect()
    }

    /// Writes the visible columns as a fixed-width table.
    pub fn print<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        let header: Vec<&str> = self.display_names.iter().map(String::as_str).collect();
        self.print_line(out, &header)?;
        let rule: Vec<String> = self.widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(out, "{}", rule.join("-+-"))?;
        for values in self.iter() {
            let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
            let cells: Vec<&str> = rendered.iter().map(String::as_str).collect();
            self.print_line(out, &cells)?;
        }
        Ok(())
    }

    fn print_line<W: fmt::Write>(&self, out: &mut W, cells: &[&str]) -> fmt::Result {
        let padded: Vec<String> = cells
            .iter()
            .zip(&self.widths)
            .map(|(text, width)| format!("{:<width$}", text, width = *width))
            .collect();
        writeln!(out, "{}", padded.join(" | ").trim_end())
    }

    fn physical(&self, row: usize, column: usize) -> Result<usize> {
        if column >= self.column_count() {
            return Err(Error::OutOfBounds { row, column });
        }
        self.order
            .physical(&self.rows, row)
            .ok_or(Error::OutOfBounds { row, column })
    }
}

impl fmt::Display for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.print(f)
    }
}

impl fmt::Debug for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchResult")
            .field("headers", &self.headers)
            .field("rows", &self.rows)
            .field("updateable", &self.is_updateable())
            .finish()
    }
}
