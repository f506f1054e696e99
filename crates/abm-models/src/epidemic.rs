//! SIR epidemic spreading between random walkers.
//!
//! Agents are susceptible (`S`), infected (`I`) or recovered (`R`).  Every
//! tick each agent takes a random step of up to `step` cells.  A susceptible
//! agent catches the infection from each infected agent in its Moore
//! neighborhood with probability `infection_rate`; an infected agent
//! recovers with probability `recovery_rate` and, without `immunity`, becomes
//! susceptible again.

use abm_agent::{Agent, AgentState};
use abm_core::{AgentRng, SimRng};
use abm_model::{
    ConflictPolicy, Effect, MergePolicy, Model, ModelFactory, ModelResult, MovePolicy, ParamSchema,
    ParamSpec, Statistic, StepContext, ValidatedParams,
};
use abm_space::{Bounds, CapacityPolicy, Neighborhood, World};

use crate::common::{check_fits, clamp, random_step, scatter, size_param};

pub const NAME: &str = "epidemic";
pub const SUSCEPTIBLE: &str = "S";
pub const INFECTED: &str = "I";
pub const RECOVERED: &str = "R";

// ── Factory ───────────────────────────────────────────────────────────────────

pub struct EpidemicFactory;

impl ModelFactory for EpidemicFactory {
    fn description(&self) -> &str {
        "SIR epidemic: infection on contact between random walkers"
    }

    fn schema(&self) -> ParamSchema {
        ParamSchema::new()
            .param(size_param(30))
            .param(ParamSpec::int("susceptible", "initially healthy agents").default(100i64).range(0.0, 1_000_000.0))
            .param(ParamSpec::int("infected", "initially infected agents").default(5i64).range(1.0, 1_000_000.0))
            .param(ParamSpec::float("infection_rate", "chance per infected contact per tick").default(0.7).range(0.0, 1.0))
            .param(ParamSpec::float("recovery_rate", "chance to recover per tick").default(0.05).range(0.0, 1.0))
            .param(ParamSpec::int("step", "maximum step per axis").default(1i64).range(1.0, 10.0))
            .param(ParamSpec::bool("immunity", "recovered agents cannot be reinfected").default(true))
    }

    fn build(&self, params: &ValidatedParams) -> ModelResult<Box<dyn Model>> {
        let size = params.u32("size")?;
        let susceptible = params.u32("susceptible")?;
        let infected = params.u32("infected")?;
        check_fits(size, u64::from(susceptible) + u64::from(infected), "susceptible")?;
        Ok(Box::new(Epidemic {
            size,
            susceptible,
            infected,
            infection_rate: params.f64("infection_rate")?,
            recovery_rate:  params.f64("recovery_rate")?,
            step:           params.u32("step")? as i32,
            immunity:       params.bool("immunity")?,
        }))
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// Epidemic model.
///
/// Merge policy: exclusive cells, [`MovePolicy::LowestIdWins`] (a blocked
/// walker stays put) and [`ConflictPolicy::Reject`]; agents only change
/// their own kind, so a write conflict would be a bug.
#[derive(Clone, Debug)]
pub struct Epidemic {
    size:           u32,
    susceptible:    u32,
    infected:       u32,
    infection_rate: f64,
    recovery_rate:  f64,
    step:           i32,
    immunity:       bool,
}

impl Epidemic {
    fn next_kind(&self, agent: &Agent, world: &World, rng: &mut AgentRng) -> Option<&'static str> {
        if agent.is(SUSCEPTIBLE) {
            let contacts = world
                .agents_within(agent.position, 1, Neighborhood::Moore)
                .into_iter()
                .filter(|a| a.is(INFECTED))
                .count();
            // One draw per contact keeps the stream layout independent of
            // the outcome.
            let caught = (0..contacts).fold(false, |hit, _| rng.gen_bool(self.infection_rate) || hit);
            return caught.then_some(INFECTED);
        }
        if agent.is(INFECTED) && rng.gen_bool(self.recovery_rate) {
            return Some(if self.immunity { RECOVERED } else { SUSCEPTIBLE });
        }
        None
    }
}

impl Model for Epidemic {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize(&self, rng: &mut SimRng) -> ModelResult<World> {
        let mut world = World::new(Bounds::new(self.size, self.size), CapacityPolicy::Exclusive);
        let groups = [
            (SUSCEPTIBLE, self.susceptible as usize),
            (INFECTED, self.infected as usize),
        ];
        scatter(&mut world, rng, &groups, |_, _| AgentState::new())?;
        Ok(world)
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::new(MovePolicy::LowestIdWins, ConflictPolicy::Reject)
    }

    fn update(
        &self,
        agent: &Agent,
        ctx:   &StepContext<'_>,
        rng:   &mut AgentRng,
    ) -> ModelResult<Vec<Effect>> {
        let mut effects = Vec::with_capacity(2);
        if let Some(kind) = self.next_kind(agent, ctx.world, rng) {
            effects.push(Effect::set_kind(agent.id(), kind));
        }
        let target = clamp(ctx.world.bounds(), random_step(rng, agent.position, self.step));
        if target != agent.position {
            effects.push(Effect::move_to(agent.id(), target));
        }
        Ok(effects)
    }

    fn is_terminal(&self, _previous: &World, current: &World) -> bool {
        current.agents().count_kind(INFECTED) == 0
    }

    fn statistics(&self, world: &World) -> Vec<Statistic> {
        let census = world.census();
        [("susceptible", SUSCEPTIBLE), ("infected", INFECTED), ("recovered", RECOVERED)]
            .into_iter()
            .map(|(name, kind)| Statistic::new(name, census.get(kind).copied().unwrap_or(0) as f64))
            .collect()
    }
}
