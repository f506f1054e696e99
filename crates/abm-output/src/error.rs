//! Error types for abm-output.

use thiserror::Error;

/// Errors raised while exporting snapshots.
///
/// Backend variants only exist when their feature is enabled.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Creating or writing an output file failed.
    #[error("output I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite export failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Building a record batch failed (schema/column mismatch).
    #[cfg(feature = "parquet")]
    #[error("Arrow batch error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "parquet")]
    #[error("Parquet export failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
