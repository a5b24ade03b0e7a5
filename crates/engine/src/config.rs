//! Engine configuration.

use quarry_query::planner::DEFAULT_WARN_WIDTH;

/// Runtime configuration for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Run multi-table statements without any condition as a full cross
    /// product instead of rejecting them.
    pub allow_cross_product: bool,
    /// Table count above which the join-order search logs a warning.
    pub planner_warn_width: usize,
    /// Drop fetched rows that fail a table-local AND-path predicate before
    /// join maps are built.
    pub prefilter_local_conditions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allow_cross_product: false,
            planner_warn_width: DEFAULT_WARN_WIDTH,
            prefilter_local_conditions: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_cross_product(mut self, allow: bool) -> Self {
        self.allow_cross_product = allow;
        self
    }

    pub fn planner_warn_width(mut self, width: usize) -> Self {
        self.planner_warn_width = width;
        self
    }

    pub fn prefilter_local_conditions(mut self, enabled: bool) -> Self {
        self.prefilter_local_conditions = enabled;
        self
    }
}
