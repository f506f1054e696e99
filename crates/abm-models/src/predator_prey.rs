//! Predators and prey on a bounded grid.
//!
//! A predator looks for the nearest prey within `predator_vision` cells
//! (ties go to the lowest id).  Adjacent prey is eaten and the predator takes
//! its cell; prey further away is approached one cell per tick.  With nothing
//! in sight a predator wanders.  Prey that sees predators within
//! `prey_vision` cells steps directly away from their mean position;
//! otherwise it stays put.

use abm_agent::{Agent, AgentState};
use abm_core::{AgentRng, SimRng};
use abm_model::{
    ConflictPolicy, Effect, MergePolicy, Model, ModelFactory, ModelResult, MovePolicy, ParamSchema,
    ParamSpec, Statistic, StepContext, ValidatedParams,
};
use abm_space::{Bounds, CapacityPolicy, Neighborhood, World};

use crate::common::{check_fits, clamp, random_step, scatter, size_param, step_towards};

pub const NAME: &str = "predator_prey";
pub const PREDATOR: &str = "predator";
pub const PREY: &str = "prey";

// ── Factory ───────────────────────────────────────────────────────────────────

pub struct PredatorPreyFactory;

impl ModelFactory for PredatorPreyFactory {
    fn description(&self) -> &str {
        "Predator/prey: hunters chase and eat prey that flees"
    }

    fn schema(&self) -> ParamSchema {
        ParamSchema::new()
            .param(size_param(20))
            .param(ParamSpec::int("prey", "initial prey").default(60i64).range(0.0, 1_000_000.0))
            .param(ParamSpec::int("predators", "initial predators").default(10i64).range(0.0, 1_000_000.0))
            .param(ParamSpec::int("prey_vision", "prey sight radius").default(2i64).range(1.0, 20.0))
            .param(ParamSpec::int("predator_vision", "predator sight radius").default(3i64).range(1.0, 20.0))
    }

    fn build(&self, params: &ValidatedParams) -> ModelResult<Box<dyn Model>> {
        let size = params.u32("size")?;
        let prey = params.u32("prey")?;
        let predators = params.u32("predators")?;
        check_fits(size, u64::from(prey) + u64::from(predators), "predators")?;
        Ok(Box::new(PredatorPrey {
            size,
            prey,
            predators,
            prey_vision:     params.u32("prey_vision")?,
            predator_vision: params.u32("predator_vision")?,
        }))
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// Predator/prey model.
///
/// Merge policy: exclusive cells and [`MovePolicy::LowestIdWins`].  Removals
/// are applied before moves, so a predator always enters the cell of the
/// prey it ate; when two predators eat the same prey the lower id gets the
/// cell.  Writes use [`ConflictPolicy::LastWriter`].
#[derive(Clone, Debug)]
pub struct PredatorPrey {
    size:            u32,
    prey:            u32,
    predators:       u32,
    prey_vision:     u32,
    predator_vision: u32,
}

impl PredatorPrey {
    fn hunt(&self, predator: &Agent, world: &World, rng: &mut AgentRng) -> Vec<Effect> {
        let target = world
            .agents_within(predator.position, self.predator_vision, Neighborhood::Moore)
            .into_iter()
            .filter(|a| a.is(PREY))
            .min_by_key(|a| (predator.position.chebyshev(a.position), a.id()));

        match target {
            Some(prey) if predator.position.chebyshev(prey.position) <= 1 => vec![
                Effect::remove(prey.id()),
                Effect::move_to(predator.id(), prey.position),
            ],
            Some(prey) => {
                let delta = world.bounds().delta(predator.position, prey.position);
                vec![Effect::move_to(predator.id(), step_towards(predator.position, delta))]
            }
            None => {
                let to = clamp(world.bounds(), random_step(rng, predator.position, 1));
                if to == predator.position {
                    Vec::new()
                } else {
                    vec![Effect::move_to(predator.id(), to)]
                }
            }
        }
    }

    fn flee(&self, prey: &Agent, world: &World) -> Vec<Effect> {
        let threats: Vec<(i32, i32)> = world
            .agents_within(prey.position, self.prey_vision, Neighborhood::Moore)
            .into_iter()
            .filter(|a| a.is(PREDATOR))
            .map(|a| world.bounds().delta(prey.position, a.position))
            .collect();
        if threats.is_empty() {
            return Vec::new();
        }
        let (sx, sy) = threats.iter().fold((0, 0), |(x, y), (dx, dy)| (x + dx, y + dy));
        let to = clamp(world.bounds(), step_towards(prey.position, (-sx, -sy)));
        if to == prey.position {
            Vec::new()
        } else {
            vec![Effect::move_to(prey.id(), to)]
        }
    }
}

impl Model for PredatorPrey {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize(&self, rng: &mut SimRng) -> ModelResult<World> {
        let mut world = World::new(Bounds::new(self.size, self.size), CapacityPolicy::Exclusive);
        let groups = [(PREY, self.prey as usize), (PREDATOR, self.predators as usize)];
        scatter(&mut world, rng, &groups, |_, _| AgentState::new())?;
        Ok(world)
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::new(MovePolicy::LowestIdWins, ConflictPolicy::LastWriter)
    }

    fn update(
        &self,
        agent: &Agent,
        ctx:   &StepContext<'_>,
        rng:   &mut AgentRng,
    ) -> ModelResult<Vec<Effect>> {
        Ok(if agent.is(PREDATOR) {
            self.hunt(agent, ctx.world, rng)
        } else {
            self.flee(agent, ctx.world)
        })
    }

    fn is_terminal(&self, previous: &World, current: &World) -> bool {
        let agents = current.agents();
        agents.count_kind(PREDATOR) == 0 || agents.count_kind(PREY) == 0 || previous == current
    }

    fn statistics(&self, world: &World) -> Vec<Statistic> {
        let census = world.census();
        let count = |kind: &str| census.get(kind).copied().unwrap_or(0) as f64;
        vec![Statistic::new("predators", count(PREDATOR)), Statistic::new("prey", count(PREY))]
    }
}
