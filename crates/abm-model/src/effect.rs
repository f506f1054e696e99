//! Effects: the changes a unit update proposes for the next tick.

use abm_agent::AgentState;
use abm_core::{AgentId, Position, Value};

/// One staged change.
///
/// Effects are collected per unit and applied by the scheduler's merge step
/// in a fixed phase order: removals, kind changes, moves, spawns, then writes
/// (`SetAttr`, `WriteField`, `WriteGlobal`).  Within a phase, effects are
/// taken in ascending source order.  An effect may target an agent other
/// than its source (a predator removing its prey).
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Remove { agent: AgentId },

    SetKind { agent: AgentId, kind: String },

    /// Relocate `agent`.  The destination is normalized against the grid
    /// topology during the merge.
    Move { agent: AgentId, to: Position },

    Spawn { kind: String, position: Position, state: AgentState },

    /// Write attribute `key` of `agent`, resolved by the conflict policy for
    /// `key`.  Under `ConflictPolicy::Sum` the value is an increment.
    SetAttr { agent: AgentId, key: String, value: Value },

    /// Write cell `position` of field `field`, resolved by the conflict
    /// policy for `field`.
    WriteField { field: String, position: Position, value: Value },

    WriteGlobal { name: String, value: Value },
}

impl Effect {
    pub fn remove(agent: AgentId) -> Self {
        Effect::Remove { agent }
    }

    pub fn set_kind(agent: AgentId, kind: impl Into<String>) -> Self {
        Effect::SetKind { agent, kind: kind.into() }
    }

    pub fn move_to(agent: AgentId, to: Position) -> Self {
        Effect::Move { agent, to }
    }

    pub fn spawn(kind: impl Into<String>, position: Position, state: AgentState) -> Self {
        Effect::Spawn { kind: kind.into(), position, state }
    }

    pub fn set_attr(agent: AgentId, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Effect::SetAttr { agent, key: key.into(), value: value.into() }
    }

    pub fn write_field(field: impl Into<String>, position: Position, value: impl Into<Value>) -> Self {
        Effect::WriteField { field: field.into(), position, value: value.into() }
    }

    pub fn write_global(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Effect::WriteGlobal { name: name.into(), value: value.into() }
    }
}
