//! Fluent builder for new agents.
//!
//! # Usage
//!
//! ```rust
//! use abm_agent::{AgentBuilder, Population};
//! use abm_core::Position;
//!
//! let mut pop = Population::new();
//! let id = pop.spawn(
//!     AgentBuilder::new("susceptible")
//!         .at(Position::new(3, 4))
//!         .with("age", 31i64),
//! );
//!
//! assert_eq!(pop.get(id).map(|a| a.position), Some(Position::new(3, 4)));
//! ```

use abm_core::{AgentId, Position, Value};

use crate::{Agent, AgentState};

/// Collects the pieces of an agent before an id is assigned.
///
/// The id is handed out by [`Population::spawn`](crate::Population::spawn),
/// never chosen by the caller.
#[derive(Clone, Debug)]
pub struct AgentBuilder {
    kind:     String,
    position: Position,
    state:    AgentState,
}

impl AgentBuilder {
    /// Start an agent of `kind` at the origin with an empty state bag.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind:     kind.into(),
            position: Position::default(),
            state:    AgentState::new(),
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set one attribute.  A later call with the same key overwrites.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.set(key, value);
        self
    }

    /// Replace the whole state bag.
    pub fn with_state(mut self, state: AgentState) -> Self {
        self.state = state;
        self
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Move the pending agent, e.g. after wrapping on a torus.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn build(self, id: AgentId) -> Agent {
        Agent {
            id,
            kind:     self.kind,
            position: self.position,
            state:    self.state,
        }
    }
}
