//! `abm-agent`: agent records and population storage for the `rust_abm` engine.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`state`]       | `AgentState` (name → `Value` attribute bag)               |
//! | [`agent`]       | `Agent` (id, kind, position, state)                       |
//! | [`population`]  | `Population` (id-indexed arena, ids never reused)         |
//! | [`builder`]     | `AgentBuilder` (fluent construction)                      |
//!
//! Agents carry no behavior.  The active model reads them through a shared
//! reference and proposes changes as effects; only the scheduler's merge step
//! mutates a `Population`.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `serde`    | Derives `Serialize`/`Deserialize` on all public types.     |

pub mod agent;
pub mod builder;
pub mod population;
pub mod state;


pub use agent::Agent;
pub use builder::AgentBuilder;
pub use population::Population;
pub use state::AgentState;
