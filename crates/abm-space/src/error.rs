//! Spatial-subsystem error type.

use thiserror::Error;

use abm_core::{AgentId, Position};

/// Errors produced by `abm-space`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpaceError {
    #[error("position {position} is outside the grid")]
    OutOfBounds { position: Position },

    #[error("cell {position} cannot accept another agent")]
    OccupancyConflict { position: Position },

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("world is inconsistent: {0}")]
    Inconsistent(String),
}

pub type SpaceResult<T> = Result<T, SpaceError>;
