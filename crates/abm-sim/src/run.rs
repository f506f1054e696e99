//! The `Run` struct and its tick loop.

use std::sync::Arc;

use tracing::{debug, info, warn};

use abm_core::Tick;
use abm_model::{MergePolicy, Model, StepContext};

use crate::region::{Pool, partition, update_regions};
use crate::{
    CancelToken, History, NoopObserver, RunConfig, RunObserver, SimError, SimResult, Snapshot,
    merge,
};

/// Lifecycle state of a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// More ticks can be produced.
    Active,
    /// `Model::is_terminal` returned true after publishing `at`.
    Complete { at: Tick },
}

/// One simulation run: a model, its current snapshot, and its history.
///
/// `advance` takes `&mut self`, so at most one tick is in flight per run.
/// The current snapshot is always the last successfully published one; a
/// failed or cancelled tick leaves it untouched.
///
/// Create via [`RunBuilder`][crate::RunBuilder].
pub struct Run {
    pub(crate) model:   Box<dyn Model>,
    pub(crate) policy:  MergePolicy,
    pub(crate) config:  RunConfig,
    pub(crate) current: Arc<Snapshot>,
    pub(crate) history: History,
    pub(crate) status:  RunStatus,
    pub(crate) cancel:  CancelToken,

    /// Dedicated pool when `config.num_threads` is set.
    pub(crate) pool:    Option<Pool>,
}

impl Run {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The last published snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    #[inline]
    pub fn tick(&self) -> Tick {
        self.current.tick()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Retained snapshot for `tick`, or `TickNotRetained`.
    pub fn snapshot_at(&self, tick: Tick) -> SimResult<Arc<Snapshot>> {
        self.history.at(tick)
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, RunStatus::Complete { .. })
    }

    /// Token that cancels this run's in-flight tick from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Advance by `ticks` ticks without callbacks.
    pub fn advance(&mut self, ticks: u64) -> SimResult<Vec<Arc<Snapshot>>> {
        self.advance_with(ticks, &mut NoopObserver)
    }

    /// Advance by `ticks` ticks, returning the snapshots published.
    ///
    /// - `ticks == 0` fails with `InvalidTickCount`.
    /// - A run that is already complete fails with `RunComplete`.
    /// - If the model reports termination partway through, the snapshots up
    ///   to and including the terminal one are returned and the run is
    ///   complete.
    /// - If a tick fails, the error is returned; snapshots published earlier
    ///   in the same call remain current and in history.
    pub fn advance_with<O: RunObserver>(
        &mut self,
        ticks:    u64,
        observer: &mut O,
    ) -> SimResult<Vec<Arc<Snapshot>>> {
        if ticks == 0 {
            return Err(SimError::InvalidTickCount);
        }
        if let RunStatus::Complete { at } = self.status {
            return Err(SimError::RunComplete { tick: at });
        }

        let mut published = Vec::with_capacity(ticks.min(1_024) as usize);
        for _ in 0..ticks {
            let now = self.tick();
            observer.on_tick_start(now);

            let (snapshot, units) = match self.compute_tick() {
                Ok(next) => next,
                Err(e) => {
                    warn!(model = self.model.name(), tick = now.0, error = %e, "tick aborted");
                    observer.on_tick_failed(now, &e);
                    return Err(e);
                }
            };

            let previous = std::mem::replace(&mut self.current, Arc::new(snapshot));
            self.history.append(Arc::clone(&self.current));
            published.push(Arc::clone(&self.current));

            let tick = self.tick();
            debug!(tick = tick.0, units, agents = self.current.world().agents().len(), "published");
            observer.on_snapshot(&self.current);
            observer.on_tick_end(tick, units);

            if self.model.is_terminal(previous.world(), self.current.world()) {
                self.status = RunStatus::Complete { at: tick };
                info!(model = self.model.name(), tick = tick.0, "run complete");
                observer.on_run_end(tick);
                break;
            }
        }
        Ok(published)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    /// Compute the successor of the current snapshot without publishing it.
    fn compute_tick(&self) -> SimResult<(Snapshot, usize)> {
        let start = self.current.world();
        let ctx = StepContext::new(self.tick(), start);

        // ── Phase 1: partition ────────────────────────────────────────────
        let cells = self.model.cell_units(start);
        let regions = partition(start, &cells, self.config.region_rows);
        let units = regions.iter().map(|r| r.units.len()).sum();

        // ── Phase 2: unit updates (parallel with the `parallel` feature) ──
        let staged = update_regions(
            self.model.as_ref(),
            &ctx,
            &regions,
            self.config.seed,
            &self.cancel,
            self.pool.as_ref(),
        )
        .inspect_err(|e| {
            if *e == SimError::Cancelled {
                self.cancel.reset();
            }
        })?;

        // Staged writes are discarded if a cancel arrived during the phase.
        if self.cancel.is_cancelled() {
            self.cancel.reset();
            return Err(SimError::Cancelled);
        }

        // ── Phase 3: merge ────────────────────────────────────────────────
        let next = merge::merge(start, staged, &self.policy)?;
        let stats = self.model.statistics(&next);
        Ok((Snapshot::new(self.tick().next(), next, stats), units))
    }
}
