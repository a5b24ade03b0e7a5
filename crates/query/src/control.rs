//! Cancellation and progress reporting for long-running statements.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};
use quarry_core::{Error, Result};

/// A shared flag the caller trips to stop planning or execution.
///
/// Clones share the flag, so one clone can be handed to another thread
/// while the statement runs.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Fails with `Error::Cancelled` once cancellation was requested.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Checks an optional token.
#[inline]
pub(crate) fn check(cancel: Option<&CancelToken>) -> Result<()> {
    cancel.map_or(Ok(()), CancelToken::check)
}

/// Statement phases reported to [`Progress`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Fetching one table; `total` is the number of tables.
    Fetch,
    /// Walking the join; `total` is the number of driving rows.
    Join,
}

/// Receives progress callbacks. Every method defaults to doing nothing.
pub trait Progress {
    fn start(&mut self, _phase: Phase, _total: usize) {}
    fn update(&mut self, _done: usize) {}
    fn stop(&mut self) {}
}

/// A [`Progress`] that ignores every callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(token.check().is_ok());
        other.cancel();
        assert_eq!(token.check(), Err(Error::Cancelled));
        assert_eq!(check(Some(&token)), Err(Error::Cancelled));
        assert!(check(None).is_ok());
    }
}
