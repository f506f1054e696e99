//! Snapshot history with a caller-selected retention policy.

use std::collections::VecDeque;
use std::sync::Arc;

use abm_core::Tick;

use crate::{Retention, SimError, SimResult, Snapshot};

/// Ordered, gap-free sequence of retained snapshots.
///
/// Snapshots are appended in tick order, so the buffer always holds a
/// contiguous tick range and lookup is index arithmetic.
#[derive(Debug)]
pub struct History {
    retention: Retention,
    buf:       VecDeque<Arc<Snapshot>>,
}

impl History {
    pub fn new(retention: Retention) -> Self {
        let buf = match retention {
            Retention::LastN(n) => VecDeque::with_capacity(n),
            _ => VecDeque::new(),
        };
        Self { retention, buf }
    }

    #[inline]
    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// Record `snapshot`, evicting the oldest entries beyond the retention
    /// limit.  Amortized O(1).
    pub fn append(&mut self, snapshot: Arc<Snapshot>) {
        if let Some(last) = self.buf.back() {
            debug_assert_eq!(snapshot.tick(), last.tick().next(), "history must stay contiguous");
        }
        match self.retention {
            Retention::None | Retention::LastN(0) => {}
            Retention::Unbounded => self.buf.push_back(snapshot),
            Retention::LastN(n) => {
                self.buf.push_back(snapshot);
                while self.buf.len() > n {
                    self.buf.pop_front();
                }
            }
        }
    }

    /// The retained snapshot for `tick`, or `TickNotRetained`.
    pub fn at(&self, tick: Tick) -> SimResult<Arc<Snapshot>> {
        let oldest = self.oldest_tick().ok_or(SimError::TickNotRetained { tick })?;
        if tick < oldest {
            return Err(SimError::TickNotRetained { tick });
        }
        usize::try_from(tick.since(oldest))
            .ok()
            .and_then(|i| self.buf.get(i))
            .cloned()
            .ok_or(SimError::TickNotRetained { tick })
    }

    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.buf.back().cloned()
    }

    pub fn oldest_tick(&self) -> Option<Tick> {
        self.buf.front().map(|s| s.tick())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Retained snapshots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Snapshot>> {
        self.buf.iter()
    }
}
