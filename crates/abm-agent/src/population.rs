//! Id-indexed agent arena.
//!
//! Agents live in a `Vec<Option<Agent>>` where the slot index is the
//! `AgentId`.  Removal leaves a `None` hole; ids are never handed out twice
//! within one run, so an id recorded in a snapshot always refers to the same
//! entity.  Iteration walks the slots in order, which makes ascending
//! `AgentId` the natural deterministic order for every per-agent pass.

use abm_core::AgentId;

use crate::{Agent, AgentBuilder};

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Population {
    slots: Vec<Option<Agent>>,
    live:  usize,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: Vec::with_capacity(capacity), live: 0 }
    }

    /// The id the next `spawn` will assign.
    #[inline]
    pub fn next_id(&self) -> AgentId {
        AgentId(self.slots.len() as u32)
    }

    /// Assign the next id to `builder`'s agent and store it.
    pub fn spawn(&mut self, builder: AgentBuilder) -> AgentId {
        let id = self.next_id();
        self.slots.push(Some(builder.build(id)));
        self.live += 1;
        id
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    #[inline]
    pub fn contains(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    /// Take the agent out of its slot.  The id stays retired.
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let taken = self.slots.get_mut(id.index()).and_then(Option::take);
        if taken.is_some() {
            self.live -= 1;
        }
        taken
    }

    /// Live agents in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Number of live agents.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live agents whose kind equals `kind`.
    pub fn count_kind(&self, kind: &str) -> usize {
        self.iter().filter(|a| a.is(kind)).count()
    }
}
