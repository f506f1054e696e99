//! Merge: turn the staged effects of one tick into the next world.
//!
//! The merge runs single-threaded on a clone of the tick's starting world.
//! Effects are first sorted into source order (agents by id, then cells
//! row-major; a unit's own effects keep their emitted order) and then applied
//! phase by phase:
//!
//! ```text
//!   ① Remove      targets leave the world; later effects from a removed
//!                 source, or aimed at a removed agent, are dropped
//!   ② SetKind
//!   ③ Move        MovePolicy decides what happens to blocked moves
//!   ④ Spawn       blocked spawns follow the same MovePolicy
//!   ⑤ Writes      SetAttr / WriteField / WriteGlobal, grouped per slot and
//!                 resolved by the ConflictPolicy for the slot's key
//! ```
//!
//! Any error aborts the merge; the starting world is untouched because the
//! merge only ever mutates its own copy.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rustc_hash::FxHashSet;
use tracing::trace;

use abm_agent::AgentBuilder;
use abm_core::{AgentId, Position, Value};
use abm_model::{ConflictPolicy, Effect, MergePolicy, ModelError, MovePolicy};
use abm_space::{SpaceError, World};

use crate::region::{Source, Staged};
use crate::{SimError, SimResult};

// ── Write slots ───────────────────────────────────────────────────────────────

/// A single writable location.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Attr { agent: AgentId, key: String },
    Field { field: String, position: Position },
    Global { name: String },
}

impl Slot {
    /// Name the conflict policy is looked up by.
    fn key(&self) -> &str {
        match self {
            Slot::Attr { key, .. } => key,
            Slot::Field { field, .. } => field,
            Slot::Global { name } => name,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Attr { agent, key } => write!(f, "attribute {key:?} of {agent}"),
            Slot::Field { field, position } => write!(f, "field {field:?} at {position}"),
            Slot::Global { name } => write!(f, "global {name:?}"),
        }
    }
}

// ── Merge ─────────────────────────────────────────────────────────────────────

/// Build the next world from `start` and the tick's staged effects.
pub(crate) fn merge(start: &World, staged: Vec<Staged>, policy: &MergePolicy) -> SimResult<World> {
    let mut effects: Vec<(Source, Effect)> = staged
        .into_iter()
        .flat_map(|s| s.effects.into_iter().map(move |e| (s.source, e)))
        .collect();
    effects.sort_by_key(|(source, _)| *source);

    let mut world = start.clone();
    let mut removed: BTreeSet<AgentId> = BTreeSet::new();
    let live = |removed: &BTreeSet<AgentId>, source: Source| {
        source.agent().is_none_or(|id| !removed.contains(&id))
    };

    // ① Removals
    for (source, effect) in &effects {
        if let Effect::Remove { agent } = effect {
            if !live(&removed, *source) || removed.contains(agent) {
                continue;
            }
            world.remove(*agent)?;
            removed.insert(*agent);
        }
    }

    // ② Kind changes
    for (source, effect) in &effects {
        if let Effect::SetKind { agent, kind } = effect {
            if live(&removed, *source) && !removed.contains(agent) {
                world.set_kind(*agent, kind.clone())?;
            }
        }
    }

    // ③ Moves
    let moves: Vec<(AgentId, Position)> = effects
        .iter()
        .filter(|(source, _)| live(&removed, *source))
        .filter_map(|(_, e)| match e {
            Effect::Move { agent, to } if !removed.contains(agent) => Some((*agent, *to)),
            _ => None,
        })
        .collect();
    apply_moves(&mut world, moves, policy.moves)?;

    // ④ Spawns
    for (source, effect) in &effects {
        if let Effect::Spawn { kind, position, state } = effect {
            if !live(&removed, *source) {
                continue;
            }
            let builder = AgentBuilder::new(kind.clone())
                .at(*position)
                .with_state(state.clone());
            match world.spawn(builder) {
                Ok(_) => {}
                Err(SpaceError::OccupancyConflict { position })
                    if policy.moves == MovePolicy::LowestIdWins =>
                {
                    trace!(%position, "spawn dropped: cell full");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    // ⑤ Writes
    let mut slots: BTreeMap<Slot, Vec<(Source, Value)>> = BTreeMap::new();
    for (source, effect) in effects {
        if !live(&removed, source) {
            continue;
        }
        let (slot, value) = match effect {
            Effect::SetAttr { agent, key, value } => {
                if removed.contains(&agent) {
                    continue;
                }
                if world.agent(agent).is_none() {
                    return Err(SpaceError::AgentNotFound(agent).into());
                }
                (Slot::Attr { agent, key }, value)
            }
            Effect::WriteField { field, position, value } => {
                let position = world
                    .bounds()
                    .normalize(position)
                    .ok_or(SpaceError::OutOfBounds { position })?;
                (Slot::Field { field, position }, value)
            }
            Effect::WriteGlobal { name, value } => (Slot::Global { name }, value),
            _ => continue,
        };
        slots.entry(slot).or_default().push((source, value));
    }

    for (slot, writes) in slots {
        let value = resolve(&world, &slot, writes, policy.for_key(slot.key()))?;
        store(&mut world, slot, value)?;
    }

    if cfg!(debug_assertions) {
        world.check_consistency()?;
    }
    Ok(world)
}

/// Apply moves in source order under `policy`.
///
/// Each pass walks the pending moves in order.  A move whose destination is
/// full is deferred, and the destination is reserved for it for the rest of
/// the pass so a later source cannot slip in if the cell frees up.  Passes
/// repeat while any move succeeds, which lets chains (A into B's cell while
/// B moves on) resolve regardless of id order.
fn apply_moves(world: &mut World, moves: Vec<(AgentId, Position)>, policy: MovePolicy) -> SimResult<()> {
    let mut pending: Vec<(AgentId, Position)> = Vec::with_capacity(moves.len());
    for (agent, to) in moves {
        let to = world
            .bounds()
            .normalize(to)
            .ok_or(SpaceError::OutOfBounds { position: to })?;
        if world.agent(agent).is_none() {
            return Err(SpaceError::AgentNotFound(agent).into());
        }
        pending.push((agent, to));
    }

    loop {
        let before = pending.len();
        let mut reserved: FxHashSet<Position> = FxHashSet::default();
        let mut deferred = Vec::new();
        for (agent, to) in pending {
            if reserved.contains(&to) {
                deferred.push((agent, to));
                continue;
            }
            match world.move_agent(agent, to) {
                Ok(_) => {}
                Err(SpaceError::OccupancyConflict { .. }) => {
                    reserved.insert(to);
                    deferred.push((agent, to));
                }
                Err(e) => return Err(e.into()),
            }
        }
        pending = deferred;
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }

    match (policy, pending.first()) {
        (_, None) => Ok(()),
        (MovePolicy::LowestIdWins, Some(_)) => {
            trace!(blocked = pending.len(), "moves dropped: destination full");
            Ok(())
        }
        (MovePolicy::Reject, Some(&(_, position))) => {
            Err(SpaceError::OccupancyConflict { position }.into())
        }
    }
}

/// Collapse the writes to one slot into its new value.
fn resolve(
    world:  &World,
    slot:   &Slot,
    writes: Vec<(Source, Value)>,
    policy: ConflictPolicy,
) -> SimResult<Value> {
    match policy {
        ConflictPolicy::Sum => {
            let mut total = current(world, slot).cloned();
            for (_, delta) in writes {
                total = Some(match total {
                    Some(acc) => acc.checked_add(&delta).map_err(ModelError::from)?,
                    None => {
                        // Validate that the first increment is numeric too.
                        delta.as_f64().map_err(ModelError::from)?;
                        delta
                    }
                });
            }
            total.ok_or_else(|| SimError::Config(format!("no writes for {slot}")))
        }
        ConflictPolicy::LastWriter => writes
            .into_iter()
            .last()
            .map(|(_, v)| v)
            .ok_or_else(|| SimError::Config(format!("no writes for {slot}"))),
        ConflictPolicy::Reject => {
            let writers = writes
                .iter()
                .map(|(s, _)| *s)
                .collect::<BTreeSet<Source>>()
                .len();
            if writers > 1 {
                return Err(SimError::ConflictingWrites { slot: slot.to_string(), writers });
            }
            writes
                .into_iter()
                .last()
                .map(|(_, v)| v)
                .ok_or_else(|| SimError::Config(format!("no writes for {slot}")))
        }
    }
}

fn current<'w>(world: &'w World, slot: &Slot) -> Option<&'w Value> {
    match slot {
        Slot::Attr { agent, key } => world.agent(*agent).and_then(|a| a.state.get(key)),
        Slot::Field { field, position } => world.env().field(field, *position),
        Slot::Global { name } => world.env().global(name),
    }
}

fn store(world: &mut World, slot: Slot, value: Value) -> SimResult<()> {
    match slot {
        Slot::Attr { agent, key } => {
            world.state_mut(agent)?.set(key, value);
        }
        Slot::Field { field, position } => {
            world.fields_mut().set(&field, position, value);
        }
        Slot::Global { name } => {
            world.fields_mut().set_global(&name, value);
        }
    }
    Ok(())
}
