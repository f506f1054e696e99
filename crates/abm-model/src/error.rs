use thiserror::Error;

use abm_core::CoreError;
use abm_space::SpaceError;

/// Errors raised while registering, configuring, or running a model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("no model registered under {0:?}")]
    UnknownModel(String),

    #[error("a model named {0:?} is already registered")]
    DuplicateModelName(String),

    #[error("invalid parameter {key:?}: {reason}")]
    InvalidParameter { key: String, reason: String },

    #[error("model initialization failed: {0}")]
    Init(String),

    #[error("model update failed: {0}")]
    Update(String),

    #[error(transparent)]
    Space(#[from] SpaceError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ModelError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ModelError::InvalidParameter { key: key.to_owned(), reason: reason.into() }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
