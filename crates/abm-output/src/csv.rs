//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`
//! - `statistics.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, StatisticRow, TickSummaryRow};

/// Writes snapshots to three CSV files.
pub struct CsvWriter {
    snapshots:  Writer<File>,
    summaries:  Writer<File>,
    statistics: Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Create (or truncate) the three CSV files in `dir` and write the header
    /// rows.  `dir` must exist.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record(["tick", "agent_id", "kind", "x", "y", "state"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["tick", "agents", "units"])?;

        let mut statistics = Writer::from_path(dir.join("statistics.csv"))?;
        statistics.write_record(["tick", "name", "value"])?;

        Ok(Self {
            snapshots,
            summaries,
            statistics,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.kind.clone(),
                row.x.to_string(),
                row.y.to_string(),
                row.state.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.agents.to_string(),
            row.units.to_string(),
        ])?;
        Ok(())
    }

    fn write_statistics(&mut self, rows: &[StatisticRow]) -> OutputResult<()> {
        for row in rows {
            self.statistics.write_record(&[
                row.tick.to_string(),
                row.name.clone(),
                row.value.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        self.statistics.flush()?;
        Ok(())
    }
}
