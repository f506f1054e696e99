//! Agent identifiers.
//!
//! `AgentId` is `Copy + Ord + Hash` so it can key maps and be sorted; the
//! ascending id order is the canonical order agents are updated and merged
//! in.  The inner integer is `pub` for direct arena indexing, but prefer
//! [`AgentId::index`].

use std::fmt;

/// Index of an agent in the population arena.  Unique within one run and
/// never reused, even after the agent is removed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub u32);

impl AgentId {
    /// Cast to `usize` for use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentId({})", self.0)
    }
}

impl From<AgentId> for u64 {
    #[inline]
    fn from(id: AgentId) -> u64 {
        u64::from(id.0)
    }
}

impl TryFrom<usize> for AgentId {
    type Error = std::num::TryFromIntError;

    fn try_from(n: usize) -> Result<AgentId, Self::Error> {
        u32::try_from(n).map(AgentId)
    }
}
