//! Tests for abm-output.

use abm_agent::{AgentBuilder, AgentState};
use abm_core::{Position, Tick};
use abm_model::ParamSet;
use abm_sim::{Run, RunBuilder};
use abm_space::{Bounds, CapacityPolicy, World};

use crate::row::{AgentSnapshotRow, StatisticRow, TickSummaryRow};

fn snap_row(agent_id: u32, tick: u64) -> AgentSnapshotRow {
    AgentSnapshotRow {
        tick,
        agent_id,
        kind:  "walker".into(),
        x:     agent_id as i32,
        y:     0,
        state: String::new(),
    }
}

fn stat_row(tick: u64, name: &str, value: f64) -> StatisticRow {
    StatisticRow { tick, name: name.into(), value }
}

/// A 4x4 forest that cannot spread: one fire burns for four ticks.
fn smouldering_forest() -> Run {
    let mut registry = abm_model::ModelRegistry::new();
    abm_models::register_builtin_models(&mut registry).unwrap();
    let params = ParamSet::new()
        .with("size", 4i64)
        .with("density", 1.0)
        .with("flammability", 0.0)
        .with("consumption", 0.25);
    let model = registry.create("fire", &params).unwrap();
    RunBuilder::new(model).seed(1).build().unwrap()
}

// ── Rows ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rows {
    use super::*;

    #[test]
    fn agent_row_flattens_state_in_key_order() {
        let mut state = AgentState::new();
        state.set("wealth", 3i64);
        state.set("alive", true);
        let mut world = World::new(Bounds::new(4, 4), CapacityPolicy::Exclusive);
        let id = world
            .spawn(AgentBuilder::new("trader").at(Position::new(2, 1)).with_state(state))
            .unwrap();

        let row = AgentSnapshotRow::from_agent(Tick(7), world.agent(id).unwrap());
        assert_eq!(row.tick, 7);
        assert_eq!(row.agent_id, 0);
        assert_eq!(row.kind, "trader");
        assert_eq!((row.x, row.y), (2, 1));
        assert_eq!(row.state, "alive=true;wealth=3");
    }

    #[test]
    fn empty_state_gives_empty_column() {
        let mut world = World::new(Bounds::new(2, 2), CapacityPolicy::Exclusive);
        let id = world.spawn(AgentBuilder::new("x")).unwrap();
        assert_eq!(AgentSnapshotRow::from_agent(Tick(0), world.agent(id).unwrap()).state, "");
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::csv::CsvWriter;
    use crate::observer::SnapshotExporter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn records(dir: &TempDir, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("agent_snapshots.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
        assert!(dir.path().join("statistics.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let headers = |file: &str| -> Vec<String> {
            let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
            rdr.headers().unwrap().iter().map(str::to_owned).collect()
        };
        assert_eq!(headers("agent_snapshots.csv"), ["tick", "agent_id", "kind", "x", "y", "state"]);
        assert_eq!(headers("tick_summaries.csv"), ["tick", "agents", "units"]);
        assert_eq!(headers("statistics.csv"), ["tick", "name", "value"]);
    }

    #[test]
    fn csv_snapshot_rows_written_in_order() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 5), snap_row(1, 5), snap_row(2, 5)]).unwrap();
        w.finish().unwrap();

        let rows = records(&dir, "agent_snapshots.csv");
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "5"); // tick
        assert_eq!(&rows[0][1], "0"); // agent_id
        assert_eq!(&rows[1][1], "1");
        assert_eq!(&rows[2][2], "walker");
        assert_eq!(&rows[2][3], "2");
    }

    #[test]
    fn csv_state_with_separators_is_quoted() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let mut row = snap_row(0, 1);
        row.state = "note=a,b;n=1".into();
        w.write_snapshots(&[row]).unwrap();
        w.finish().unwrap();

        assert_eq!(&records(&dir, "agent_snapshots.csv")[0][5], "note=a,b;n=1");
    }

    #[test]
    fn csv_summary_and_statistics() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow { tick: 3, agents: 12, units: 14 }).unwrap();
        w.write_statistics(&[stat_row(3, "infected", 4.0), stat_row(3, "ratio", 0.25)]).unwrap();
        w.finish().unwrap();

        let summaries = records(&dir, "tick_summaries.csv");
        assert_eq!(summaries.len(), 1);
        assert_eq!(&summaries[0][1], "12");
        assert_eq!(&summaries[0][2], "14");

        let stats = records(&dir, "statistics.csv");
        assert_eq!(stats.len(), 2);
        assert_eq!(&stats[1][1], "ratio");
        assert_eq!(stats[1][2].parse::<f64>().unwrap(), 0.25);
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_missing_directory_is_an_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn exporter_follows_a_run() {
        let mut run = smouldering_forest();
        let dir = tmp();
        let mut exporter = SnapshotExporter::new(CsvWriter::new(dir.path()).unwrap()).every(2);
        exporter.record(&run.current());
        let snaps = run.advance_with(10, &mut exporter).unwrap();
        assert_eq!(snaps.len(), 4);
        assert!(run.is_complete());
        assert!(exporter.take_error().is_none(), "no write errors expected");

        // Agent rows at ticks 0, 2 and 4; the fire is gone by tick 4.
        let agents = records(&dir, "agent_snapshots.csv");
        assert_eq!(agents.len(), 16 + 16 + 15);
        let ticks: std::collections::BTreeSet<&str> = agents.iter().map(|r| r.get(0).unwrap()).collect();
        assert_eq!(ticks.into_iter().collect::<Vec<_>>(), ["0", "2", "4"]);

        let summaries = records(&dir, "tick_summaries.csv");
        assert_eq!(summaries.len(), 4);
        assert_eq!(&summaries[0][0], "1");
        assert_eq!(&summaries[3][1], "15");
        assert_eq!(&summaries[3][2], "16"); // every agent updated on the last tick

        // Four statistics for each of ticks 0..=4.
        assert_eq!(records(&dir, "statistics.csv").len(), 4 * 5);
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod exporter {
    use super::*;
    use crate::observer::SnapshotExporter;
    use crate::writer::OutputWriter;
    use crate::{OutputError, OutputResult};

    /// Records row counts; fails every snapshot write after the first.
    #[derive(Default)]
    struct Flaky {
        snapshot_batches: usize,
        summaries:        usize,
        statistics:       usize,
        finished:         usize,
    }

    impl OutputWriter for Flaky {
        fn write_snapshots(&mut self, _rows: &[AgentSnapshotRow]) -> OutputResult<()> {
            self.snapshot_batches += 1;
            if self.snapshot_batches > 1 {
                return Err(OutputError::Io(std::io::Error::other(format!(
                    "disk full at batch {}",
                    self.snapshot_batches
                ))));
            }
            Ok(())
        }

        fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
            self.summaries += 1;
            Ok(())
        }

        fn write_statistics(&mut self, rows: &[StatisticRow]) -> OutputResult<()> {
            self.statistics += rows.len();
            Ok(())
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finished += 1;
            Ok(())
        }
    }

    #[test]
    fn first_error_is_kept_and_run_continues() {
        let mut run = smouldering_forest();
        let mut exporter = SnapshotExporter::new(Flaky::default());
        run.advance_with(10, &mut exporter).unwrap();

        match exporter.take_error() {
            Some(OutputError::Io(e)) => assert_eq!(e.to_string(), "disk full at batch 2"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(exporter.take_error().is_none());

        let writer = exporter.into_writer();
        assert_eq!(writer.snapshot_batches, 4);
        assert_eq!(writer.summaries, 4);
        assert_eq!(writer.statistics, 16);
        assert_eq!(writer.finished, 1);
    }

    #[test]
    fn zero_interval_means_every_tick() {
        let mut run = smouldering_forest();
        let mut exporter = SnapshotExporter::new(Flaky::default()).every(0);
        run.advance_with(2, &mut exporter).unwrap();
        assert!(!run.is_complete());
        let writer = exporter.into_writer();
        assert_eq!(writer.snapshot_batches, 2);
        assert_eq!(writer.finished, 0);
    }
}

// ── SQLite ────────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::*;
    use crate::OutputError;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn count(dir: &TempDir, table: &str) -> i64 {
        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0)).unwrap()
    }

    #[test]
    fn sqlite_tables_created() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        for table in ["agent_snapshots", "tick_summaries", "statistics"] {
            assert_eq!(count(&dir, table), 0);
        }
    }

    #[test]
    fn sqlite_rows_inserted() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 1), snap_row(1, 1)]).unwrap();
        w.write_tick_summary(&TickSummaryRow { tick: 1, agents: 2, units: 2 }).unwrap();
        w.write_statistics(&[stat_row(1, "agents", 2.0)]).unwrap();
        w.finish().unwrap();

        assert_eq!(count(&dir, "agent_snapshots"), 2);
        assert_eq!(count(&dir, "tick_summaries"), 1);

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let kind: String = conn
            .query_row("SELECT kind FROM agent_snapshots WHERE agent_id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(kind, "walker");
        let value: f64 = conn
            .query_row("SELECT value FROM statistics WHERE name = 'agents'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(value, 2.0);
    }

    #[test]
    fn sqlite_duplicate_tick_rejected() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        let row = TickSummaryRow { tick: 1, agents: 0, units: 0 };
        w.write_tick_summary(&row).unwrap();
        assert!(matches!(w.write_tick_summary(&row), Err(OutputError::Sqlite(_))));
    }

    #[test]
    fn sqlite_finish_idempotent() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

// ── Parquet ───────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parquet"))]
mod parquet_tests {
    use arrow::datatypes::DataType;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::TempDir;

    use super::*;
    use crate::parquet::ParquetWriter;
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn parquet_files_created() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(dir.path().join("agent_snapshots.parquet").exists());
        assert!(dir.path().join("tick_summaries.parquet").exists());
        assert!(dir.path().join("statistics.parquet").exists());
    }

    #[test]
    fn parquet_snapshot_schema_and_rows() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 2), snap_row(1, 2)]).unwrap();
        w.write_snapshots(&[snap_row(0, 3)]).unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("agent_snapshots.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let schema = builder.schema().clone();
        let total: usize = builder.build().unwrap().map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(total, 3);

        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, ["tick", "agent_id", "kind", "x", "y", "state"]);
        assert_eq!(*schema.field_with_name("kind").unwrap().data_type(), DataType::Utf8);
    }

    #[test]
    fn parquet_statistics_are_floats() {
        let dir = tmp();
        let mut w = ParquetWriter::new(dir.path()).unwrap();
        w.write_statistics(&[stat_row(0, "heat", 1.5)]).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();

        let file = std::fs::File::open(dir.path().join("statistics.parquet")).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let value = builder.schema().field_with_name("value").unwrap().data_type().clone();
        assert_eq!(value, DataType::Float64);
    }

    #[test]
    fn parquet_finish_required() {
        let dir = tmp();
        {
            let mut w = ParquetWriter::new(dir.path()).unwrap();
            w.write_snapshots(&[snap_row(0, 0)]).unwrap();
            // Dropped without finish(): no footer is written.
        }

        let file = std::fs::File::open(dir.path().join("agent_snapshots.parquet")).unwrap();
        assert!(ParquetRecordBatchReaderBuilder::try_new(file).is_err());
    }
}
