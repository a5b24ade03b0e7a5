//! Join-order selection.
//!
//! Picks the table processing order that minimizes the summed selectivity
//! of consecutive pairs, using branch and bound over permutations:
//!
//! ```text
//! cost(t0, t1, ..., tn) = ratio(t0, t1) + ratio(t1, t2) + ... + ratio(tn-1, tn)
//! ```
//!
//! `ratio(a, b)` is the join map ratio from `a` to `b`, or 1.0 when the pair
//! has no join map. Every table is tried as the driving table. A partial
//! order is pruned as soon as its cost reaches the best complete order, so
//! ties keep the first order found.
//!
//! Exploration is deterministic: after the first table, candidates linked
//! to the last placed table come first, then the others, each group in
//! statement order.
//!
//! The search is exponential in the worst case; it is meant for the handful
//! of tables a single statement joins.

use crate::ast::TableId;
use crate::context::TableContext;
use crate::control::{self, CancelToken};
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;
use quarry_core::Result;
use quarry_index::{IndexedSet, LiveView, Universe};
use quarry_storage::JoinMap;
use tracing::{debug, warn};

/// Default table count above which the search logs a warning.
pub const DEFAULT_WARN_WIDTH: usize = 8;

/// A chosen processing order, by statement position.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinOrder {
    pub positions: Vec<usize>,
    pub cost: f64,
}

impl JoinOrder {
    /// Reorders contexts given in statement order.
    pub fn arrange<'a>(&self, contexts: Vec<TableContext<'a>>) -> Vec<TableContext<'a>> {
        let mut slots: Vec<Option<TableContext<'a>>> = contexts.into_iter().map(Some).collect();
        self.positions
            .iter()
            .filter_map(|&p| slots.get_mut(p).and_then(Option::take))
            .collect()
    }
}

/// Branch-and-bound join-order planner.
pub struct JoinOrderPlanner<'c> {
    universe: Arc<Universe<TableId>>,
    ratios: Vec<Vec<f64>>,
    linked: Vec<LiveView<TableId>>,
    remaining: Rc<RefCell<IndexedSet<TableId>>>,
    cancel: Option<&'c CancelToken>,
    warn_width: usize,
}

impl<'c> JoinOrderPlanner<'c> {
    /// Creates a planner from a ratio matrix; `None` means no join map.
    ///
    /// `links[i][j]` is the ratio from table `i` to table `j`, both given by
    /// universe position.
    pub fn new(universe: Arc<Universe<TableId>>, links: Vec<Vec<Option<f64>>>) -> Self {
        let remaining = Rc::new(RefCell::new(IndexedSet::full(universe.clone())));
        let mut ratios = Vec::with_capacity(links.len());
        let mut linked = Vec::with_capacity(links.len());
        for row in &links {
            let mut own = IndexedSet::empty(universe.clone());
            for (j, ratio) in row.iter().enumerate() {
                if ratio.is_some() {
                    own.insert_index(j);
                }
            }
            linked.push(LiveView::new(&own, Rc::clone(&remaining)));
            ratios.push(row.iter().map(|r| r.unwrap_or(1.0)).collect());
        }
        Self {
            universe,
            ratios,
            linked,
            remaining,
            cancel: None,
            warn_width: DEFAULT_WARN_WIDTH,
        }
    }

    /// Creates a planner from contexts given in statement order.
    pub fn from_contexts(universe: Arc<Universe<TableId>>, contexts: &[TableContext<'_>]) -> Self {
        let links = contexts
            .iter()
            .map(|from| {
                universe
                    .keys()
                    .iter()
                    .map(|&to| from.link(to).map(JoinMap::ratio))
                    .collect()
            })
            .collect();
        Self::new(universe, links)
    }

    pub fn with_cancel(mut self, cancel: Option<&'c CancelToken>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_warn_width(mut self, width: usize) -> Self {
        self.warn_width = width;
        self
    }

    /// Cost of a given complete order.
    pub fn cost_of(&self, positions: &[usize]) -> f64 {
        positions
            .windows(2)
            .map(|w| self.ratios[w[0]][w[1]])
            .sum()
    }

    /// Finds the cheapest order.
    pub fn order(&self) -> Result<JoinOrder> {
        let n = self.universe.len();
        if n <= 1 {
            return Ok(JoinOrder {
                positions: (0..n).collect(),
                cost: 0.0,
            });
        }
        if n > self.warn_width {
            warn!(
                tables = n,
                warn_width = self.warn_width,
                "exhaustive join-order search over a wide join"
            );
        }
        *self.remaining.borrow_mut() = IndexedSet::full(self.universe.clone());

        let mut best = None;
        let mut order = Vec::with_capacity(n);
        self.search(&mut order, 0.0, &mut best)?;
        let best = best.unwrap_or(JoinOrder {
            positions: (0..n).collect(),
            cost: self.cost_of(&(0..n).collect::<Vec<_>>()),
        });
        debug!(order = ?best.positions, cost = best.cost, "join order chosen");
        Ok(best)
    }

    fn search(&self, order: &mut Vec<usize>, cost: f64, best: &mut Option<JoinOrder>) -> Result<()> {
        control::check(self.cancel)?;
        if order.len() == self.universe.len() {
            if best.as_ref().map_or(true, |b| cost < b.cost) {
                *best = Some(JoinOrder {
                    positions: order.clone(),
                    cost,
                });
            }
            return Ok(());
        }
        let last = order.last().copied();
        for candidate in self.exploration_order(last) {
            let next = cost + last.map_or(0.0, |l| self.ratios[l][candidate]);
            if best.as_ref().map_or(false, |b| next >= b.cost) {
                continue;
            }
            self.remaining.borrow_mut().remove_index(candidate);
            order.push(candidate);
            let result = self.search(order, next, best);
            order.pop();
            self.remaining.borrow_mut().insert_index(candidate);
            result?;
        }
        Ok(())
    }

    fn exploration_order(&self, last: Option<usize>) -> Vec<usize> {
        let remaining = self.remaining.borrow();
        match last {
            None => remaining.iter_indices().collect(),
            Some(l) => {
                let view = &self.linked[l];
                let mut candidates = view.indices();
                candidates.extend(remaining.iter_indices().filter(|&i| !view.contains_index(i)));
                candidates
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn universe(n: usize) -> Arc<Universe<TableId>> {
        Arc::new(Universe::new((0..n).map(TableId::new)))
    }

    #[test]
    fn test_single_table_short_circuits() {
        let planner = JoinOrderPlanner::new(universe(1), vec![vec![None]]);
        assert_eq!(
            planner.order().unwrap(),
            JoinOrder {
                positions: vec![0],
                cost: 0.0
            }
        );
    }

    #[test]
    fn test_prefers_selective_chain() {
        // 0 -- 1 is nearly a cross product, 1 -- 2 and 2 -- 0 are selective.
        let links = vec![
            vec![None, Some(0.9), Some(0.1)],
            vec![Some(0.9), None, Some(0.2)],
            vec![Some(0.1), Some(0.2), None],
        ];
        let planner = JoinOrderPlanner::new(universe(3), links);
        let order = planner.order().unwrap();
        assert_eq!(order.positions, vec![0, 2, 1]);
        assert!((order.cost - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_ties_prefer_linked_then_statement_order() {
        let links = vec![
            vec![None, None, Some(1.0)],
            vec![None, None, None],
            vec![Some(1.0), None, None],
        ];
        let planner = JoinOrderPlanner::new(universe(3), links);
        assert_eq!(planner.order().unwrap().positions, vec![0, 2, 1]);

        let unlinked = JoinOrderPlanner::new(universe(3), vec![vec![None; 3]; 3]);
        assert_eq!(unlinked.order().unwrap().positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_cancelled_search() {
        let token = CancelToken::new();
        token.cancel();
        let planner = JoinOrderPlanner::new(universe(3), vec![vec![None; 3]; 3]).with_cancel(Some(&token));
        assert_eq!(planner.order(), Err(quarry_core::Error::Cancelled));
    }

    #[test]
    fn test_repeatable() {
        let links = vec![
            vec![None, Some(0.5), Some(0.5)],
            vec![Some(0.5), None, Some(0.5)],
            vec![Some(0.5), Some(0.5), None],
        ];
        let planner = JoinOrderPlanner::new(universe(3), links);
        let first = planner.order().unwrap();
        assert_eq!(planner.order().unwrap(), first);
    }
}
