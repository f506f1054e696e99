//! Parquet output backend (feature `parquet`).
//!
//! Creates three files in the configured output directory:
//! - `agent_snapshots.parquet`
//! - `tick_summaries.parquet`
//! - `statistics.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, Int32Builder, StringBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, StatisticRow, TickSummaryRow};

fn snapshot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",     DataType::UInt64, false),
        Field::new("agent_id", DataType::UInt32, false),
        Field::new("kind",     DataType::Utf8,   false),
        Field::new("x",        DataType::Int32,  false),
        Field::new("y",        DataType::Int32,  false),
        Field::new("state",    DataType::Utf8,   false),
    ]))
}

fn summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",   DataType::UInt64, false),
        Field::new("agents", DataType::UInt64, false),
        Field::new("units",  DataType::UInt64, false),
    ]))
}

fn statistic_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick",  DataType::UInt64,  false),
        Field::new("name",  DataType::Utf8,    false),
        Field::new("value", DataType::Float64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

fn open(dir: &Path, name: &str, schema: &Arc<Schema>) -> OutputResult<ArrowWriter<File>> {
    let file = File::create(dir.join(name))?;
    Ok(ArrowWriter::try_new(file, Arc::clone(schema), Some(snappy_props()))?)
}

/// Writes snapshots to three Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footers; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    snapshots:   Option<ArrowWriter<File>>,
    summaries:   Option<ArrowWriter<File>>,
    statistics:  Option<ArrowWriter<File>>,
    snap_schema: Arc<Schema>,
    summ_schema: Arc<Schema>,
    stat_schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create the three Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let snap_schema = snapshot_schema();
        let summ_schema = summary_schema();
        let stat_schema = statistic_schema();

        Ok(Self {
            snapshots:  Some(open(dir, "agent_snapshots.parquet", &snap_schema)?),
            summaries:  Some(open(dir, "tick_summaries.parquet", &summ_schema)?),
            statistics: Some(open(dir, "statistics.parquet", &stat_schema)?),
            snap_schema,
            summ_schema,
            stat_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.snapshots.as_mut() else {
            return Ok(());
        };

        let mut ticks  = UInt64Builder::new();
        let mut ids    = UInt32Builder::new();
        let mut kinds  = StringBuilder::new();
        let mut xs     = Int32Builder::new();
        let mut ys     = Int32Builder::new();
        let mut states = StringBuilder::new();

        for row in rows {
            ticks.append_value(row.tick);
            ids.append_value(row.agent_id);
            kinds.append_value(&row.kind);
            xs.append_value(row.x);
            ys.append_value(row.y);
            states.append_value(&row.state);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.snap_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(ids.finish()),
                Arc::new(kinds.finish()),
                Arc::new(xs.finish()),
                Arc::new(ys.finish()),
                Arc::new(states.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let Some(writer) = self.summaries.as_mut() else {
            return Ok(());
        };

        let mut ticks  = UInt64Builder::new();
        let mut agents = UInt64Builder::new();
        let mut units  = UInt64Builder::new();

        ticks.append_value(row.tick);
        agents.append_value(row.agents);
        units.append_value(row.units);

        let batch = RecordBatch::try_new(
            Arc::clone(&self.summ_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(agents.finish()),
                Arc::new(units.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_statistics(&mut self, rows: &[StatisticRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.statistics.as_mut() else {
            return Ok(());
        };

        let mut ticks  = UInt64Builder::new();
        let mut names  = StringBuilder::new();
        let mut values = Float64Builder::new();

        for row in rows {
            ticks.append_value(row.tick);
            names.append_value(&row.name);
            values.append_value(row.value);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.stat_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(names.finish()),
                Arc::new(values.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        for w in [self.snapshots.take(), self.summaries.take(), self.statistics.take()]
            .into_iter()
            .flatten()
        {
            w.close()?;
        }
        Ok(())
    }
}
