//! Per-run configuration.

/// How many published snapshots a run keeps for [`History::at`](crate::History::at).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Retention {
    /// Keep every snapshot from tick 0 on.
    #[default]
    Unbounded,
    /// Keep the `n` most recent snapshots.
    LastN(usize),
    /// Keep nothing; only the current snapshot is reachable.
    None,
}

/// Top-level run configuration.
///
/// Typically deserialized by the application from a JSON/TOML file and passed
/// to [`Engine::start_run`](crate::Engine::start_run) or
/// [`RunBuilder::config`](crate::RunBuilder::config).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunConfig {
    /// Master RNG seed.  The same seed, model, and parameters always produce
    /// identical snapshots, whatever the thread count or region size.
    pub seed: u64,

    /// Worker thread count for a dedicated Rayon pool.  `None` uses Rayon's
    /// global pool (all logical cores).
    pub num_threads: Option<usize>,

    pub retention: Retention,

    /// Height of each update region in grid rows.  Must be at least 1.
    pub region_rows: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed:        0,
            num_threads: None,
            retention:   Retention::Unbounded,
            region_rows: 8,
        }
    }
}

impl RunConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }
}
