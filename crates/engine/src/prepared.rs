//! Statements with placeholder values bound ahead of execution.

use crate::engine::Engine;
use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use quarry_core::{Error, Result, RowId, Value};
use quarry_query::ast::{Bindings, InsertStatement, Parameterized, SelectStatement};
use quarry_query::{CancelToken, FetchResult, Progress};
use quarry_storage::Store;

/// A statement plus the values bound to its placeholders so far.
///
/// Binding an unknown name fails immediately; a placeholder left unbound
/// fails at execution, before the store is called.
#[derive(Clone, Debug)]
pub struct PreparedStatement<T> {
    statement: T,
    placeholders: BTreeSet<String>,
    bindings: Bindings,
}

impl<T: Parameterized> PreparedStatement<T> {
    pub fn new(statement: T) -> Self {
        let placeholders = statement.placeholders();
        Self {
            statement,
            placeholders,
            bindings: Bindings::new(),
        }
    }

    pub fn statement(&self) -> &T {
        &self.statement
    }

    /// Names the statement expects.
    pub fn placeholders(&self) -> &BTreeSet<String> {
        &self.placeholders
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Binds a value, replacing any earlier one.
    pub fn bind_value(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        if !self.placeholders.contains(name) {
            return Err(Error::unknown_placeholder(name));
        }
        self.bindings.insert(String::from(name), value.into());
        Ok(self)
    }

    pub fn clear_bindings(&mut self) {
        self.bindings.clear();
    }
}

impl PreparedStatement<SelectStatement> {
    pub fn execute<S: Store>(&self, engine: &mut Engine<S>) -> Result<FetchResult> {
        engine.execute_with(
            &self.statement,
            &self.bindings,
            &mut quarry_query::NoProgress,
            None,
        )
    }

    pub fn execute_with<S: Store>(
        &self,
        engine: &mut Engine<S>,
        progress: &mut dyn Progress,
        cancel: Option<&CancelToken>,
    ) -> Result<FetchResult> {
        engine.execute_with(&self.statement, &self.bindings, progress, cancel)
    }

    pub fn execute_for_update<S: Store>(&self, engine: &mut Engine<S>) -> Result<FetchResult> {
        engine.execute_for_update(&self.statement, &self.bindings)
    }
}

impl PreparedStatement<InsertStatement> {
    pub fn execute<S: Store>(&self, engine: &mut Engine<S>) -> Result<Vec<RowId>> {
        engine.insert(&self.statement, &self.bindings)
    }
}

impl<T: Parameterized> From<T> for PreparedStatement<T> {
    fn from(statement: T) -> Self {
        Self::new(statement)
    }
}
