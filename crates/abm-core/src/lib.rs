//! `abm-core`: foundational types for the `rust_abm` simulation engine.
//!
//! This crate is a dependency of every other `abm-*` crate.  It intentionally
//! has no `abm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`                                             |
//! | [`pos`]         | `Position` (grid cell), `Heading` (2-D direction)     |
//! | [`time`]        | `Tick`                                                |
//! | [`value`]       | `Value`, typed attribute / parameter value             |
//! | [`rng`]         | `AgentRng` (per-unit), `SimRng` (run-level)           |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public data types.   |

pub mod error;
pub mod ids;
pub mod pos;
pub mod rng;
pub mod time;
pub mod value;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::AgentId;
pub use pos::{Heading, Position};
pub use rng::{AgentRng, SimRng};
pub use time::Tick;
pub use value::Value;
