//! `abm-space`: the spatial environment and the `World` container.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`grid`]      | `Bounds`, `Topology`, `Neighborhood`                         |
//! | [`capacity`]  | `CapacityPolicy` (exclusive / shared cells)                  |
//! | [`field`]     | `FieldStore` (named per-cell fields + global values)         |
//! | [`env`]       | `Environment` (bounds, occupancy index, fields)              |
//! | [`world`]     | `World` (environment + population, invariant-preserving ops) |
//! | [`error`]     | `SpaceError`, `SpaceResult<T>`                               |
//!
//! # Invariant
//!
//! For every `World` handed out by the engine, each live agent is indexed
//! under exactly one occupancy key and that key equals its `position`.
//! [`World::check_consistency`] verifies both directions.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod capacity;
pub mod env;
pub mod error;
pub mod field;
pub mod grid;
pub mod world;


pub use capacity::CapacityPolicy;
pub use env::Environment;
pub use error::{SpaceError, SpaceResult};
pub use field::FieldStore;
pub use grid::{Bounds, Neighborhood, Topology};
pub use world::World;
