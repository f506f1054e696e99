//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]` where value conversions can fail.

use thiserror::Error;

/// Errors raised by `abm-core` value handling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("expected a {expected} value, got {got}")]
    TypeMismatch {
        expected: &'static str,
        got:      &'static str,
    },

    #[error("cannot parse {input:?} as {expected}")]
    Parse {
        input:    String,
        expected: &'static str,
    },
}

/// Shorthand result type for `abm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
