//! Run observer trait for progress reporting and data collection.

use abm_core::Tick;

use crate::{SimError, Snapshot};

/// Callbacks invoked by [`Run::advance_with`][crate::Run::advance_with] at key
/// points of each tick.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl RunObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, units: usize) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: updated {units} units");
///         }
///     }
/// }
/// ```
pub trait RunObserver {
    /// Called before tick `tick`'s successor is computed.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per published snapshot, before `on_tick_end`.
    fn on_snapshot(&mut self, _snapshot: &Snapshot) {}

    /// Called after `tick` has been published.  `units` is the number of
    /// agent and cell updates that ran.
    fn on_tick_end(&mut self, _tick: Tick, _units: usize) {}

    /// Called when a tick starting from `tick` is aborted.  Nothing was
    /// published.
    fn on_tick_failed(&mut self, _tick: Tick, _error: &SimError) {}

    /// Called once, with the tick at which the model reported termination.
    fn on_run_end(&mut self, _final_tick: Tick) {}
}

/// A [`RunObserver`] that does nothing.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}
