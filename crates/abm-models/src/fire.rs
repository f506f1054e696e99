//! Forest fire.
//!
//! Trees cover a bounded grid with probability `density`; `ignitions` of
//! them start burning.  A fire burns `consumption` fuel per tick and goes out
//! (leaving an empty cell) once its fuel is spent.  A tree with a fire within
//! `spread` cells catches with probability `flammability` per tick, keeping
//! the fuel it had as a tree.

use abm_agent::{Agent, AgentBuilder, AgentState};
use abm_core::{AgentRng, SimRng, Value};
use abm_model::{
    ConflictPolicy, Effect, MergePolicy, Model, ModelError, ModelFactory, ModelResult, MovePolicy,
    ParamSchema, ParamSpec, Statistic, StepContext, ValidatedParams,
};
use abm_space::{Bounds, CapacityPolicy, Neighborhood, World};

use crate::common::size_param;

pub const NAME: &str = "fire";
pub const TREE: &str = "tree";
pub const FIRE: &str = "fire";

pub const FUEL: &str = "fuel";

/// Global recording how many trees the forest started with.
pub const INITIAL_TREES: &str = "initial_trees";

// ── Factory ───────────────────────────────────────────────────────────────────

pub struct FireFactory;

impl ModelFactory for FireFactory {
    fn description(&self) -> &str {
        "Forest fire: burning trees ignite their neighbors until the fuel runs out"
    }

    fn schema(&self) -> ParamSchema {
        ParamSchema::new()
            .param(size_param(30))
            .param(ParamSpec::float("density", "share of cells holding a tree").default(0.6).range(0.0, 1.0))
            .param(ParamSpec::int("ignitions", "trees burning at tick 0").default(1i64).range(0.0, 1_000_000.0))
            .param(ParamSpec::int("spread", "ignition radius in cells").default(1i64).range(1.0, 10.0))
            .param(ParamSpec::float("fuel", "initial fuel of a tree").default(1.0).range(0.0, 1_000.0))
            .param(ParamSpec::float("consumption", "fuel burnt per tick").default(0.25).range(0.001, 1_000.0))
            .param(ParamSpec::float("flammability", "chance per tick that a tree near a fire catches").default(0.8).range(0.0, 1.0))
    }

    fn build(&self, params: &ValidatedParams) -> ModelResult<Box<dyn Model>> {
        Ok(Box::new(Fire {
            size:         params.u32("size")?,
            density:      params.f64("density")?,
            ignitions:    params.u32("ignitions")?,
            spread:       params.u32("spread")?,
            fuel:         params.f64("fuel")?,
            consumption:  params.f64("consumption")?,
            flammability: params.f64("flammability")?,
        }))
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// Forest-fire model.
///
/// Nothing moves and every agent writes only its own fuel, so the merge
/// policy is [`MovePolicy::Reject`] / [`ConflictPolicy::Reject`]: any
/// collision indicates a bug in the model.
#[derive(Clone, Debug)]
pub struct Fire {
    size:         u32,
    density:      f64,
    ignitions:    u32,
    spread:       u32,
    fuel:         f64,
    consumption:  f64,
    flammability: f64,
}

impl Fire {
    fn burn(&self, fire: &Agent) -> Vec<Effect> {
        let left = fire.state.f64_or(FUEL, 0.0) - self.consumption;
        if left <= 0.0 {
            vec![Effect::remove(fire.id())]
        } else {
            vec![Effect::set_attr(fire.id(), FUEL, left)]
        }
    }

    fn exposed(&self, tree: &Agent, world: &World) -> bool {
        world
            .agents_within(tree.position, self.spread, Neighborhood::Moore)
            .into_iter()
            .any(|a| a.is(FIRE))
    }
}

impl Model for Fire {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize(&self, rng: &mut SimRng) -> ModelResult<World> {
        let bounds = Bounds::new(self.size, self.size);
        let mut world = World::new(bounds, CapacityPolicy::Exclusive);
        let cells: Vec<_> = bounds.cells().filter(|_| rng.gen_bool(self.density)).collect();
        if (self.ignitions as usize) > cells.len() {
            return Err(ModelError::Init(format!(
                "{} ignitions requested but only {} trees were planted",
                self.ignitions,
                cells.len()
            )));
        }

        let mut ids = Vec::with_capacity(cells.len());
        for pos in cells {
            let mut state = AgentState::new();
            state.set(FUEL, self.fuel);
            ids.push(world.spawn(AgentBuilder::new(TREE).at(pos).with_state(state))?);
        }
        rng.shuffle(&mut ids);
        for &id in ids.iter().take(self.ignitions as usize) {
            world.set_kind(id, FIRE)?;
        }
        world
            .fields_mut()
            .set_global(INITIAL_TREES, Value::Int(ids.len() as i64));
        Ok(world)
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::new(MovePolicy::Reject, ConflictPolicy::Reject)
    }

    fn update(
        &self,
        agent: &Agent,
        ctx:   &StepContext<'_>,
        rng:   &mut AgentRng,
    ) -> ModelResult<Vec<Effect>> {
        if agent.is(FIRE) {
            return Ok(self.burn(agent));
        }
        if agent.is(TREE) && self.exposed(agent, ctx.world) && rng.gen_bool(self.flammability) {
            return Ok(vec![Effect::set_kind(agent.id(), FIRE)]);
        }
        Ok(Vec::new())
    }

    fn is_terminal(&self, _previous: &World, current: &World) -> bool {
        current.agents().count_kind(FIRE) == 0
    }

    fn statistics(&self, world: &World) -> Vec<Statistic> {
        let trees = world.agents().count_kind(TREE);
        let fires = world.agents().count_kind(FIRE);
        let initial = world
            .env()
            .global(INITIAL_TREES)
            .and_then(|v| v.as_i64().ok())
            .unwrap_or(0)
            .max(0) as usize;
        let burnt = initial.saturating_sub(trees + fires);
        let burnt_share = if initial == 0 { 0.0 } else { burnt as f64 / initial as f64 };
        vec![
            Statistic::new("trees", trees as f64),
            Statistic::new("fires", fires as f64),
            Statistic::new("burnt", burnt as f64),
            Statistic::new("burnt_share", burnt_share),
        ]
    }
}
