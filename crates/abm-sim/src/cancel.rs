//! Cooperative cancellation of an in-flight tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag checked by the scheduler before each region is dispatched and
/// again before the merge.
///
/// A cancelled tick publishes nothing; the flag is cleared when the run
/// reports `SimError::Cancelled`, so the run can be advanced again.  A
/// cancel requested while no tick is in flight applies to the next one.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}
