//! Join execution.

mod candidate;
mod cartesian;

pub use candidate::RowCandidate;
pub use cartesian::CartesianJoinExecutor;
