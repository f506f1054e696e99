//! `SnapshotExporter<W>` bridges `RunObserver` to an `OutputWriter`.

use abm_core::Tick;
use abm_sim::{RunObserver, Snapshot};
use tracing::warn;

use crate::row::{AgentSnapshotRow, StatisticRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`RunObserver`] that writes published snapshots to any [`OutputWriter`]
/// backend (CSV, SQLite, Parquet, …).
///
/// Statistics and tick summaries are written for every published tick; agent
/// rows only every [`every`][Self::every] ticks.
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After the run returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SnapshotExporter<W: OutputWriter> {
    writer:     W,
    every:      u64,
    agents:     u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SnapshotExporter<W> {
    /// Export every tick through `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            every:      1,
            agents:     0,
            last_error: None,
        }
    }

    /// Write agent rows only for ticks that are a multiple of `interval`.
    /// Zero is treated as one.
    pub fn every(mut self, interval: u64) -> Self {
        self.every = interval.max(1);
        self
    }

    /// Export `snapshot` directly.  Use this for the tick-0 snapshot, which
    /// is published by the builder rather than through an observer.
    pub fn record(&mut self, snapshot: &Snapshot) {
        let tick = snapshot.tick();
        let agents = snapshot.world().agents();
        self.agents = agents.len() as u64;

        if tick.0 % self.every == 0 && !agents.is_empty() {
            let rows: Vec<AgentSnapshotRow> = agents
                .iter()
                .map(|a| AgentSnapshotRow::from_agent(tick, a))
                .collect();
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }

        let stats: Vec<StatisticRow> = snapshot
            .statistics()
            .iter()
            .map(|s| StatisticRow { tick: tick.0, name: s.name.clone(), value: s.value })
            .collect();
        if !stats.is_empty() {
            let result = self.writer.write_statistics(&stats);
            self.store_err(result);
        }
    }

    /// Flush the writer.  Also called by `on_run_end`; calling it again is
    /// harmless.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    /// Take the stored write error (if any) after the run returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "snapshot export failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> RunObserver for SnapshotExporter<W> {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.record(snapshot);
    }

    fn on_tick_end(&mut self, tick: Tick, units: usize) {
        let row = TickSummaryRow {
            tick:   tick.0,
            agents: self.agents,
            units:  units as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
