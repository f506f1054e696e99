//! `Engine`: the multi-run facade front ends talk to.
//!
//! The engine owns the model registry (read-only after startup) and a table
//! of active runs.  Each run sits behind its own `Mutex`, so two runs advance
//! independently while a single run never has two ticks in flight.  The
//! run table itself is behind an `RwLock` that is only held long enough to
//! look up or insert an entry, never while a tick is computed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::info;

use abm_core::Tick;
use abm_model::{ModelDescriptor, ModelRegistry, ParamSet};

use crate::{
    CancelToken, Run, RunBuilder, RunConfig, RunObserver, SimError, SimResult, Snapshot,
};

/// Opaque identifier of a run started by an [`Engine`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunHandle(u64);

impl fmt::Display for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

struct RunEntry {
    run:    Mutex<Run>,
    cancel: CancelToken,
}

impl RunEntry {
    fn lock(&self) -> MutexGuard<'_, Run> {
        // Unit panics are caught inside the tick, so a poisoned lock can only
        // come from an observer; the run itself is still consistent.
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct Engine {
    registry: Arc<ModelRegistry>,
    runs:     RwLock<BTreeMap<RunHandle, Arc<RunEntry>>>,
    next_id:  AtomicU64,
}

impl Engine {
    pub fn new(registry: ModelRegistry) -> Self {
        Self::with_registry(Arc::new(registry))
    }

    /// Share a registry between several engines.
    pub fn with_registry(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            runs:    RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Registered models ordered by name, with their parameter schemas.
    pub fn list_models(&self) -> Vec<ModelDescriptor> {
        self.registry.list()
    }

    /// Create and initialize a run.
    ///
    /// Fails with `UnknownModel` or `InvalidParameter` (wrapped in
    /// `SimError::Model`) before any world is built.
    pub fn start_run(
        &self,
        model:  &str,
        params: &ParamSet,
        config: RunConfig,
    ) -> SimResult<RunHandle> {
        let instance = self.registry.create(model, params)?;
        let cancel = CancelToken::new();
        let run = RunBuilder::new(instance)
            .config(config)
            .cancel_token(cancel.clone())
            .build()?;

        let handle = RunHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Arc::new(RunEntry { run: Mutex::new(run), cancel });
        self.runs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, entry);
        info!(%handle, model, "run started");
        Ok(handle)
    }

    /// Advance `handle` by `ticks` ticks.  See [`Run::advance_with`].
    pub fn advance(&self, handle: RunHandle, ticks: u64) -> SimResult<Vec<Arc<Snapshot>>> {
        self.entry(handle)?.lock().advance(ticks)
    }

    pub fn advance_with<O: RunObserver>(
        &self,
        handle:   RunHandle,
        ticks:    u64,
        observer: &mut O,
    ) -> SimResult<Vec<Arc<Snapshot>>> {
        self.entry(handle)?.lock().advance_with(ticks, observer)
    }

    /// Last published snapshot.  Blocks while a tick of this run is in
    /// flight.
    pub fn current_snapshot(&self, handle: RunHandle) -> SimResult<Arc<Snapshot>> {
        Ok(self.entry(handle)?.lock().current())
    }

    pub fn snapshot_at(&self, handle: RunHandle, tick: Tick) -> SimResult<Arc<Snapshot>> {
        self.entry(handle)?.lock().snapshot_at(tick)
    }

    pub fn is_complete(&self, handle: RunHandle) -> SimResult<bool> {
        Ok(self.entry(handle)?.lock().is_complete())
    }

    /// Request cancellation of the run's in-flight tick (or its next one).
    /// Does not wait for the tick to stop.
    pub fn cancel(&self, handle: RunHandle) -> SimResult<()> {
        self.entry(handle)?.cancel.cancel();
        Ok(())
    }

    /// Release the run.  Returns `true` if it was active; stopping an unknown
    /// or already-stopped handle is a no-op.
    ///
    /// An in-flight tick is cancelled and its run is dropped once that tick
    /// returns.
    pub fn stop(&self, handle: RunHandle) -> bool {
        let removed = self
            .runs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle);
        match removed {
            Some(entry) => {
                entry.cancel.cancel();
                info!(%handle, "run stopped");
                true
            }
            None => false,
        }
    }

    /// Handles of every active run, ascending.
    pub fn runs(&self) -> Vec<RunHandle> {
        self.runs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    fn entry(&self, handle: RunHandle) -> SimResult<Arc<RunEntry>> {
        self.runs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle)
            .cloned()
            .ok_or(SimError::UnknownRun(handle))
    }
}
