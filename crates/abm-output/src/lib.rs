//! `abm-output`: snapshot exporters for the rust_abm framework.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                                         |
//! |-----------|---------|-----------------------------------------------------------------------|
//! | *(none)*  | CSV     | `agent_snapshots.csv`, `tick_summaries.csv`, `statistics.csv`         |
//! | `sqlite`  | SQLite  | `output.db`                                                           |
//! | `parquet` | Parquet | `agent_snapshots.parquet`, `tick_summaries.parquet`, `statistics.parquet` |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`SnapshotExporter`], which implements `abm_sim::RunObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use abm_output::{CsvWriter, SnapshotExporter};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut exporter = SnapshotExporter::new(writer).every(10);
//! exporter.record(&run.current());
//! run.advance_with(500, &mut exporter)?;
//! exporter.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SnapshotExporter;
pub use row::{AgentSnapshotRow, StatisticRow, TickSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
