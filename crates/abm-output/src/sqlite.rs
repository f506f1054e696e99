//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `agent_snapshots`, `tick_summaries`, and `statistics`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, StatisticRow, TickSummaryRow};

/// Writes snapshots to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_snapshots (
                 tick     INTEGER NOT NULL,
                 agent_id INTEGER NOT NULL,
                 kind     TEXT    NOT NULL,
                 x        INTEGER NOT NULL,
                 y        INTEGER NOT NULL,
                 state    TEXT    NOT NULL,
                 PRIMARY KEY (tick, agent_id)
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick   INTEGER PRIMARY KEY,
                 agents INTEGER NOT NULL,
                 units  INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS statistics (
                 tick  INTEGER NOT NULL,
                 name  TEXT    NOT NULL,
                 value REAL    NOT NULL,
                 PRIMARY KEY (tick, name)
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_snapshots (tick, agent_id, kind, x, y, state) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick as i64,
                    row.agent_id,
                    row.kind,
                    row.x,
                    row.y,
                    row.state,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries (tick, agents, units) VALUES (?1, ?2, ?3)",
            rusqlite::params![row.tick as i64, row.agents as i64, row.units as i64],
        )?;
        Ok(())
    }

    fn write_statistics(&mut self, rows: &[StatisticRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO statistics (tick, name, value) VALUES (?1, ?2, ?3)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![row.tick as i64, row.name, row.value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
