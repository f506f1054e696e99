//! `World`: an environment plus its population, with every mutation routed
//! through methods that keep occupancy and agent positions in sync.

use std::collections::BTreeMap;

use abm_agent::{Agent, AgentBuilder, AgentState, Population};
use abm_core::{AgentId, Position};

use crate::{Bounds, CapacityPolicy, Environment, Neighborhood, SpaceError, SpaceResult};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct World {
    env:    Environment,
    agents: Population,
}

impl World {
    pub fn new(bounds: Bounds, capacity: CapacityPolicy) -> Self {
        Self {
            env:    Environment::new(bounds, capacity),
            agents: Population::new(),
        }
    }

    #[inline]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Field and global writes.  Occupancy is not reachable from here.
    #[inline]
    pub fn fields_mut(&mut self) -> &mut crate::FieldStore {
        self.env.fields_mut()
    }

    #[inline]
    pub fn agents(&self) -> &Population {
        &self.agents
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        self.env.bounds()
    }

    #[inline]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Lowest-id agent on `pos`, or `None` if the cell is free.
    #[inline]
    pub fn agent_at(&self, pos: Position) -> Option<&Agent> {
        self.env.occupants(pos).first().and_then(|&id| self.agents.get(id))
    }

    /// All agents on `pos`, ascending id.
    pub fn agents_at(&self, pos: Position) -> impl Iterator<Item = &Agent> {
        self.env.occupants(pos).iter().filter_map(|&id| self.agents.get(id))
    }

    /// Agents on `center` and on every cell of its neighborhood, in
    /// neighborhood order (center first).
    pub fn agents_within(&self, center: Position, radius: u32, shape: Neighborhood) -> Vec<&Agent> {
        std::iter::once(center)
            .chain(self.bounds().neighbors(center, radius, shape))
            .flat_map(|p| self.agents_at(p))
            .collect()
    }

    #[inline]
    pub fn is_free(&self, pos: Position) -> bool {
        self.env.is_free(pos)
    }

    /// Unoccupied cells, row-major.
    pub fn free_cells(&self) -> Vec<Position> {
        self.bounds().cells().filter(|&p| self.env.is_free(p)).collect()
    }

    /// Live agent count per kind.
    pub fn census(&self) -> BTreeMap<&str, usize> {
        let mut out = BTreeMap::new();
        for a in self.agents.iter() {
            *out.entry(a.kind.as_str()).or_insert(0) += 1;
        }
        out
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    fn resolve(&self, pos: Position) -> SpaceResult<Position> {
        self.bounds()
            .normalize(pos)
            .ok_or(SpaceError::OutOfBounds { position: pos })
    }

    /// Place a new agent.  The position is wrapped on a torus.
    pub fn spawn(&mut self, mut builder: AgentBuilder) -> SpaceResult<AgentId> {
        let pos = self.resolve(builder.position())?;
        if !self.env.can_accept(pos) {
            return Err(SpaceError::OccupancyConflict { position: pos });
        }
        builder.set_position(pos);
        let id = self.agents.spawn(builder);
        self.env.index(pos, id);
        Ok(id)
    }

    pub fn remove(&mut self, id: AgentId) -> SpaceResult<Agent> {
        let agent = self.agents.remove(id).ok_or(SpaceError::AgentNotFound(id))?;
        self.env.unindex(agent.position, id);
        Ok(agent)
    }

    /// Move `id` to `to` and return the canonical destination.
    ///
    /// Moving onto the agent's own cell is a no-op.  Fails with
    /// `OccupancyConflict` when the capacity policy rejects the destination.
    pub fn move_agent(&mut self, id: AgentId, to: Position) -> SpaceResult<Position> {
        let to = self.resolve(to)?;
        let from = self.agents.get(id).ok_or(SpaceError::AgentNotFound(id))?.position;
        if from == to {
            return Ok(to);
        }
        if !self.env.can_accept(to) {
            return Err(SpaceError::OccupancyConflict { position: to });
        }
        self.env.unindex(from, id);
        self.env.index(to, id);
        if let Some(a) = self.agents.get_mut(id) {
            a.position = to;
        }
        Ok(to)
    }

    pub fn set_kind(&mut self, id: AgentId, kind: impl Into<String>) -> SpaceResult<()> {
        let a = self.agents.get_mut(id).ok_or(SpaceError::AgentNotFound(id))?;
        a.kind = kind.into();
        Ok(())
    }

    /// Mutable state bag of `id`.  Position and kind stay behind the
    /// dedicated methods.
    pub fn state_mut(&mut self, id: AgentId) -> SpaceResult<&mut AgentState> {
        self.agents
            .get_mut(id)
            .map(|a| &mut a.state)
            .ok_or(SpaceError::AgentNotFound(id))
    }

    // ── Invariants ────────────────────────────────────────────────────────

    /// Verify that occupancy and agent positions agree in both directions and
    /// that no cell exceeds the capacity policy.
    pub fn check_consistency(&self) -> SpaceResult<()> {
        let mut indexed = 0usize;
        for (pos, ids) in self.env.occupancy() {
            if ids.is_empty() {
                return Err(SpaceError::Inconsistent(format!("empty occupancy entry at {pos}")));
            }
            if !self.env.capacity().limit().is_none_or(|max| ids.len() <= max) {
                return Err(SpaceError::Inconsistent(format!(
                    "{} agents on {pos} exceed capacity",
                    ids.len()
                )));
            }
            for &id in ids {
                let agent = self
                    .agents
                    .get(id)
                    .ok_or_else(|| SpaceError::Inconsistent(format!("{id} indexed at {pos} but not alive")))?;
                if agent.position != *pos {
                    return Err(SpaceError::Inconsistent(format!(
                        "{id} indexed at {pos} but positioned at {}",
                        agent.position
                    )));
                }
                indexed += 1;
            }
        }
        if indexed != self.agents.len() {
            return Err(SpaceError::Inconsistent(format!(
                "{indexed} occupancy entries for {} live agents",
                self.agents.len()
            )));
        }
        for a in self.agents.iter() {
            if !self.bounds().contains(a.position) {
                return Err(SpaceError::OutOfBounds { position: a.position });
            }
        }
        Ok(())
    }
}
