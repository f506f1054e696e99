use thiserror::Error;

use abm_core::{AgentId, Position, Tick};
use abm_model::ModelError;
use abm_space::SpaceError;

use crate::RunHandle;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// An agent's update returned an error or panicked.  The tick was
    /// aborted and nothing was published.
    #[error("update of {agent} failed: {cause}")]
    AgentUpdateFailed { agent: AgentId, cause: String },

    #[error("update of cell {position} failed: {cause}")]
    CellUpdateFailed { position: Position, cause: String },

    #[error("run reached a terminal state at {tick}")]
    RunComplete { tick: Tick },

    #[error("snapshot {tick} is not retained")]
    TickNotRetained { tick: Tick },

    #[error("{writers} sources wrote {slot} in one tick")]
    ConflictingWrites { slot: String, writers: usize },

    #[error("tick cancelled")]
    Cancelled,

    #[error("no active run {0}")]
    UnknownRun(RunHandle),

    #[error("tick count must be at least 1")]
    InvalidTickCount,

    #[error("run configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Space(#[from] SpaceError),
}

pub type SimResult<T> = Result<T, SimError>;
