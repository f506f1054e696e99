//! The `Environment`: bounds, occupancy index, and shared fields.

use rustc_hash::FxHashMap;

use abm_core::{AgentId, Position, Value};

use crate::{Bounds, CapacityPolicy, FieldStore};

/// Spatial container for one world.
///
/// `occupancy` maps a cell to the ids standing on it, kept in ascending id
/// order.  Empty cells have no entry at all, so two environments with the
/// same contents compare equal however they got there.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Environment {
    bounds:    Bounds,
    capacity:  CapacityPolicy,
    occupancy: FxHashMap<Position, Vec<AgentId>>,
    fields:    FieldStore,
}

impl Environment {
    pub fn new(bounds: Bounds, capacity: CapacityPolicy) -> Self {
        Self {
            bounds,
            capacity,
            occupancy: FxHashMap::default(),
            fields: FieldStore::new(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[inline]
    pub fn capacity(&self) -> CapacityPolicy {
        self.capacity
    }

    /// Ids on `pos`, ascending.  Empty slice for a free cell.
    #[inline]
    pub fn occupants(&self, pos: Position) -> &[AgentId] {
        self.occupancy.get(&pos).map_or(&[], Vec::as_slice)
    }

    #[inline]
    pub fn is_free(&self, pos: Position) -> bool {
        !self.occupancy.contains_key(&pos)
    }

    /// Whether the capacity policy lets one more agent onto `pos`.
    #[inline]
    pub fn can_accept(&self, pos: Position) -> bool {
        self.capacity.admits(self.occupants(pos).len())
    }

    pub(crate) fn occupancy(&self) -> impl Iterator<Item = (&Position, &Vec<AgentId>)> {
        self.occupancy.iter()
    }

    pub(crate) fn index(&mut self, pos: Position, id: AgentId) {
        let ids = self.occupancy.entry(pos).or_default();
        if let Err(at) = ids.binary_search(&id) {
            ids.insert(at, id);
        }
    }

    pub(crate) fn unindex(&mut self, pos: Position, id: AgentId) {
        if let Some(ids) = self.occupancy.get_mut(&pos) {
            ids.retain(|&a| a != id);
            if ids.is_empty() {
                self.occupancy.remove(&pos);
            }
        }
    }

    // ── Fields ────────────────────────────────────────────────────────────

    /// Value of per-cell field `name` at `pos`.
    #[inline]
    pub fn field(&self, name: &str, pos: Position) -> Option<&Value> {
        self.fields.get(name, pos)
    }

    /// Global value `name`.
    #[inline]
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.fields.global(name)
    }

    #[inline]
    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    #[inline]
    pub fn fields_mut(&mut self) -> &mut FieldStore {
        &mut self.fields
    }
}
