//! Fluent builder for constructing a [`Run`].

use std::sync::Arc;

use tracing::info;

use abm_core::{SimRng, Tick};
use abm_model::{Model, ModelError};

use crate::region::Pool;
use crate::{CancelToken, History, Run, RunConfig, RunStatus, SimError, SimResult, Snapshot};

/// Fluent builder for [`Run`].
///
/// # Example
///
/// ```rust,ignore
/// let model = registry.create("fire", &params)?;
/// let mut run = RunBuilder::new(model)
///     .config(RunConfig { seed: 7, retention: Retention::LastN(16), ..RunConfig::default() })
///     .build()?;
/// run.advance(100)?;
/// ```
pub struct RunBuilder {
    model:  Box<dyn Model>,
    config: RunConfig,
    cancel: Option<CancelToken>,
}

impl RunBuilder {
    pub fn new(model: Box<dyn Model>) -> Self {
        Self { model, config: RunConfig::default(), cancel: None }
    }

    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Share an existing cancellation token with the run.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validate the configuration, initialize the model, and publish the
    /// tick-0 snapshot.
    pub fn build(self) -> SimResult<Run> {
        if self.config.region_rows == 0 {
            return Err(SimError::Config("region_rows must be at least 1".into()));
        }
        if self.config.num_threads == Some(0) {
            return Err(SimError::Config("num_threads must be at least 1".into()));
        }

        let pool = build_pool(self.config.num_threads)?;

        // ── Initialize ────────────────────────────────────────────────────
        let mut rng = SimRng::new(self.config.seed);
        let world = self.model.initialize(&mut rng)?;
        world
            .check_consistency()
            .map_err(|e| ModelError::Init(format!("initial world: {e}")))?;

        let stats = self.model.statistics(&world);
        let current = Arc::new(Snapshot::new(Tick::ZERO, world, stats));
        let mut history = History::new(self.config.retention);
        history.append(Arc::clone(&current));

        info!(
            model = self.model.name(),
            seed = self.config.seed,
            agents = current.world().agents().len(),
            "run initialized"
        );

        Ok(Run {
            policy: self.model.merge_policy(),
            model: self.model,
            config: self.config,
            current,
            history,
            status: RunStatus::Active,
            cancel: self.cancel.unwrap_or_default(),
            pool,
        })
    }
}

#[cfg(feature = "parallel")]
fn build_pool(num_threads: Option<usize>) -> SimResult<Option<Pool>> {
    num_threads
        .map(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .thread_name(|i| format!("abm-worker-{i}"))
                .build()
                .map_err(|e| SimError::Config(format!("thread pool: {e}")))
        })
        .transpose()
}

#[cfg(not(feature = "parallel"))]
fn build_pool(_num_threads: Option<usize>) -> SimResult<Option<Pool>> {
    Ok(None)
}
