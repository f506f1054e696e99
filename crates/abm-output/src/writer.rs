//! The `OutputWriter` trait implemented by all backend writers.

use crate::{AgentSnapshotRow, OutputResult, StatisticRow, TickSummaryRow};

/// Trait implemented by the CSV, SQLite, and Parquet writers.
///
/// Errors surface through [`SnapshotExporter::take_error`][crate::SnapshotExporter::take_error]
/// when the writer is driven by the observer.
pub trait OutputWriter {
    /// Write a batch of agent rows.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write a batch of statistic rows.
    fn write_statistics(&mut self, rows: &[StatisticRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
