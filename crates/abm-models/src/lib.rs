//! `abm-models`: reference models for the rust_abm engine.
//!
//! # Crate layout
//!
//! | Module             | Model name        | Units          | Terminates when                    |
//! |--------------------|-------------------|----------------|------------------------------------|
//! | [`flock`]          | `flock`           | agents         | never                              |
//! | [`schelling`]      | `schelling`       | agents         | no agent moved                     |
//! | [`epidemic`]       | `epidemic`        | agents         | no infected agent remains          |
//! | [`fire`]           | `fire`            | agents         | no fire remains                    |
//! | [`predator_prey`]  | `predator_prey`   | agents         | a species is extinct, or no change |
//! | [`diffusion`]      | `diffusion`       | agents + cells | never                              |
//! | [`sugarscape`]     | `sugarscape`      | agents + cells | every forager starved              |
//!
//! Each module exposes a `XxxFactory` (the [`ModelFactory`] registered under
//! the model name) and the model type it builds.  Merge policies are
//! documented on each model type.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let mut registry = ModelRegistry::new();
//! abm_models::register_builtin_models(&mut registry)?;
//! let model = registry.create("fire", &ParamSet::new().with("size", 50i64))?;
//! ```

pub mod diffusion;
pub mod epidemic;
pub mod fire;
pub mod flock;
pub mod predator_prey;
pub mod schelling;
pub mod sugarscape;

mod common;

#[cfg(test)]
mod tests;

pub use diffusion::{Diffusion, DiffusionFactory};
pub use epidemic::{Epidemic, EpidemicFactory};
pub use fire::{Fire, FireFactory};
pub use flock::{Flock, FlockFactory};
pub use predator_prey::{PredatorPrey, PredatorPreyFactory};
pub use schelling::{Schelling, SchellingFactory};
pub use sugarscape::{Sugarscape, SugarscapeFactory};

use abm_model::{ModelRegistry, ModelResult};

/// Register every reference model under its conventional name.
///
/// Fails with `DuplicateModelName` if one of the names is already taken.
pub fn register_builtin_models(registry: &mut ModelRegistry) -> ModelResult<()> {
    registry.register(flock::NAME, FlockFactory)?;
    registry.register(schelling::NAME, SchellingFactory)?;
    registry.register(epidemic::NAME, EpidemicFactory)?;
    registry.register(fire::NAME, FireFactory)?;
    registry.register(predator_prey::NAME, PredatorPreyFactory)?;
    registry.register(diffusion::NAME, DiffusionFactory)?;
    registry.register(sugarscape::NAME, SugarscapeFactory)?;
    Ok(())
}
