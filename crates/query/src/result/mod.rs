//! Result sets: plain, ordered and updateable.

mod cell;
mod fetch;
mod order;
mod pending;

pub use cell::Cell;
pub use fetch::FetchResult;
pub use pending::PendingChanges;
