//! `abm-model`: the model strategy trait and everything a model declares.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`effect`]   | `Effect`, a staged change proposed by one unit update             |
//! | [`context`]  | `StepContext<'a>`, the read-only tick view shared by all units    |
//! | [`policy`]   | `MergePolicy`, `MovePolicy`, `ConflictPolicy`                     |
//! | [`param`]    | `ParamKind`, `ParamSpec`, `ParamSchema`, `ParamSet`, `ValidatedParams` |
//! | [`model`]    | `Model` trait, `Statistic`                                        |
//! | [`registry`] | `ModelFactory` trait, `ModelRegistry`, `ModelDescriptor`          |
//! | [`idle`]     | `IdleModel`, which replays a fixed world and never changes it     |
//! | [`error`]    | `ModelError`, `ModelResult<T>`                                    |
//!
//! # Design notes
//!
//! A tick in abm-sim has two phases:
//!
//! 1. **Update phase** (parallel): for every unit (agent, and cell for models
//!    that declare cell units) call `Model::update` / `Model::update_cell`.
//!    All reads go through `&StepContext`; the result is a `Vec<Effect>`.
//!
//! 2. **Merge phase** (sequential): the scheduler applies the collected
//!    effects to a copy of the starting world under the model's
//!    `MergePolicy`.
//!
//! Models therefore only need to be `Send + Sync`; they never hold mutable
//! state between calls.

pub mod context;
pub mod effect;
pub mod error;
pub mod idle;
pub mod model;
pub mod param;
pub mod policy;
pub mod registry;

#[cfg(test)]
mod tests;

pub use context::StepContext;
pub use effect::Effect;
pub use error::{ModelError, ModelResult};
pub use idle::IdleModel;
pub use model::{Model, Statistic};
pub use param::{ParamKind, ParamSchema, ParamSet, ParamSpec, ValidatedParams};
pub use policy::{ConflictPolicy, MergePolicy, MovePolicy};
pub use registry::{ModelDescriptor, ModelFactory, ModelRegistry};
