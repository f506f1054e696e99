//! Merge policies: how the scheduler resolves competing effects.
//!
//! Every model must return one from `Model::merge_policy`; there is no
//! engine-wide default.

use std::collections::BTreeMap;

/// Resolution for moves (and spawns) that target a cell the capacity policy
/// cannot fit them all into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovePolicy {
    /// Moves are attempted in ascending source order, repeating passes while
    /// any pending move succeeds.  A move that still cannot be placed is
    /// dropped and the agent stays put.
    LowestIdWins,
    /// A move that cannot be placed aborts the tick with `OccupancyConflict`.
    Reject,
}

/// Resolution for several writes to the same attribute, field cell, or
/// global in one tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConflictPolicy {
    /// Every write is an increment; the new value is the starting value
    /// (zero when unset) plus the sum of all writes.
    Sum,
    /// The write from the highest source wins.
    LastWriter,
    /// More than one writer aborts the tick with `ConflictingWrites`.
    Reject,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergePolicy {
    pub moves:  MovePolicy,
    pub writes: ConflictPolicy,
    per_key:    BTreeMap<String, ConflictPolicy>,
}

impl MergePolicy {
    pub fn new(moves: MovePolicy, writes: ConflictPolicy) -> Self {
        Self { moves, writes, per_key: BTreeMap::new() }
    }

    /// Override the write policy for one attribute / field / global name.
    pub fn with_key(mut self, key: impl Into<String>, policy: ConflictPolicy) -> Self {
        self.per_key.insert(key.into(), policy);
        self
    }

    /// Write policy that applies to `key`.
    #[inline]
    pub fn for_key(&self, key: &str) -> ConflictPolicy {
        self.per_key.get(key).copied().unwrap_or(self.writes)
    }
}
