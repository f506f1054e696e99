//! `abm-sim`: tick scheduler, snapshot history, and engine facade.
//!
//! # Tick pipeline
//!
//! ```text
//! Run::advance(n):
//!   for each tick:
//!   ① Partition  split agents (and the model's cell units) into horizontal
//!                bands of `region_rows` rows.
//!   ② Update     call Model::update / update_cell for every unit, reading
//!                only the tick's starting snapshot and writing only to the
//!                region's private staging buffer (parallel with the
//!                `parallel` feature).  Errors and panics become
//!                AgentUpdateFailed / CellUpdateFailed and abort the tick.
//!   ③ Merge      apply staged effects in ascending source order to a copy
//!                of the starting world: removals, kinds, moves, spawns,
//!                then writes resolved by the model's ConflictPolicy.
//!   ④ Publish    wrap the result in an immutable Snapshot at tick + 1 and
//!                append it to History.
//!   ⑤ Terminate  Model::is_terminal(previous, current); once true every
//!                further advance fails with RunComplete.
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`config`]   | `RunConfig`, `Retention`                                   |
//! | [`snapshot`] | `Snapshot` (tick, world, statistics)                      |
//! | [`history`]  | `History` ring buffer                                      |
//! | [`cancel`]   | `CancelToken`                                              |
//! | [`region`]   | unit partitioning and the update phase                     |
//! | [`merge`]    | policy-driven merge of staged effects                      |
//! | [`observer`] | `RunObserver`, `NoopObserver`                              |
//! | [`run`]      | `Run`, `RunStatus`                                         |
//! | [`builder`]  | `RunBuilder`                                               |
//! | [`engine`]   | `Engine`, `RunHandle` (multi-run facade for front ends)    |
//! | [`error`]    | `SimError`, `SimResult<T>`                                 |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the update phase on Rayon (default).              |
//! | `serde`    | Derives `Serialize`/`Deserialize` on `RunConfig`.      |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use abm_model::{ModelRegistry, ParamSet};
//! use abm_sim::{Engine, RunConfig};
//!
//! let mut registry = ModelRegistry::new();
//! abm_models::register_builtin_models(&mut registry)?;
//!
//! let engine = Engine::new(registry);
//! let run = engine.start_run("schelling", &ParamSet::new(), RunConfig::default())?;
//! let snapshots = engine.advance(run, 10)?;
//! engine.stop(run);
//! ```

pub mod builder;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod merge;
pub mod observer;
pub mod region;
pub mod run;
pub mod snapshot;


pub use builder::RunBuilder;
pub use cancel::CancelToken;
pub use config::{Retention, RunConfig};
pub use engine::{Engine, RunHandle};
pub use error::{SimError, SimResult};
pub use history::History;
pub use observer::{NoopObserver, RunObserver};
pub use region::{Region, Source, Unit};
pub use run::{Run, RunStatus};
pub use snapshot::Snapshot;
