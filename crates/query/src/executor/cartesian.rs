//! Backtracking join walk over ordered table contexts.
//!
//! The walk keeps one iterator per depth on an explicit stack instead of
//! recursing. Depth 0 scans the driving table. Depth `d` iterates the join
//! map from table `d - 1` to table `d`, keyed by the row bound at `d - 1`,
//! or the full row set of table `d` when the pair has no join map. Once every
//! depth holds a row the condition decides whether the tuple is emitted.

use super::candidate::RowCandidate;
use crate::ast::{Condition, TableId};
use crate::context::TableContext;
use crate::control::{self, CancelToken, Phase, Progress};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::ops::Range;
use quarry_core::Result;
use quarry_index::{CandidateIter, Universe};
use quarry_storage::ValueComparator;
use tracing::debug;

/// Row positions still to visit at one depth.
enum LevelIter<'a> {
    Full(Range<usize>),
    Candidates(CandidateIter<'a>),
}

impl Iterator for LevelIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match self {
            LevelIter::Full(range) => range.next(),
            LevelIter::Candidates(iter) => iter.next(),
        }
    }
}

/// Enumerates the tuples of a join restricted by join maps.
pub struct CartesianJoinExecutor<'e, 'a> {
    contexts: &'e [TableContext<'a>],
    universe: Arc<Universe<TableId>>,
    cmp: ValueComparator,
    condition: Option<&'e Condition>,
    cancel: Option<&'e CancelToken>,
}

impl<'e, 'a> CartesianJoinExecutor<'e, 'a> {
    /// Creates an executor over contexts already in processing order.
    pub fn new(
        contexts: &'e [TableContext<'a>],
        universe: Arc<Universe<TableId>>,
        cmp: ValueComparator,
    ) -> Self {
        Self {
            contexts,
            universe,
            cmp,
            condition: None,
            cancel: None,
        }
    }

    pub fn with_condition(mut self, condition: Option<&'e Condition>) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_cancel(mut self, cancel: Option<&'e CancelToken>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Walks every tuple and hands the accepted ones to `emit`.
    ///
    /// The candidate passed to `emit` is reused for the next tuple; copy
    /// whatever must outlive the call. Returns the number of emitted tuples.
    pub fn run<F>(&self, progress: &mut dyn Progress, mut emit: F) -> Result<usize>
    where
        F: FnMut(&RowCandidate<'e>) -> Result<()>,
    {
        let contexts: &'e [TableContext<'a>] = self.contexts;
        let depth_count = contexts.len();
        let Some(driver) = contexts.first() else {
            return Ok(0);
        };

        let mut candidate = RowCandidate::new(self.universe.clone());
        let mut stack: Vec<LevelIter<'e>> = Vec::with_capacity(depth_count);
        stack.push(LevelIter::Full(0..driver.rows().len()));
        progress.start(Phase::Join, driver.rows().len());

        let mut driven = 0;
        let mut visited = 0usize;
        let mut emitted = 0;
        while !stack.is_empty() {
            control::check(self.cancel)?;
            let depth = stack.len() - 1;
            let Some(position) = stack[depth].next() else {
                stack.pop();
                continue;
            };
            if depth == 0 {
                driven += 1;
                progress.update(driven);
            }
            let ctx = &contexts[depth];
            let Some(row) = ctx.rows().get(position) else {
                continue;
            };
            candidate.set(ctx.id(), row);

            if depth + 1 < depth_count {
                stack.push(self.level(depth + 1, position));
                continue;
            }
            visited += 1;
            if self.accepts(&candidate) {
                emit(&candidate)?;
                emitted += 1;
            }
        }
        progress.stop();
        debug!(tables = depth_count, visited, emitted, "join walk finished");
        Ok(emitted)
    }

    fn level(&self, depth: usize, previous: usize) -> LevelIter<'e> {
        let contexts: &'e [TableContext<'a>] = self.contexts;
        let target = &contexts[depth];
        match contexts[depth - 1].link(target.id()) {
            Some(map) => LevelIter::Candidates(map.candidates(previous)),
            None => LevelIter::Full(0..target.rows().len()),
        }
    }

    fn accepts(&self, candidate: &RowCandidate<'_>) -> bool {
        self.condition
            .map_or(true, |c| c.evaluate(candidate, &self.cmp).is_true())
    }
}
