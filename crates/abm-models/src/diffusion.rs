//! Heat diffusion driven by wandering emitters.
//!
//! Emitters random-walk on a torus and deposit `emission` units into the
//! `heat` field of the cell they start the tick on.  Every cell holding heat
//! is a cell unit: it keeps `1 - diffusion` of its heat, shares the rest
//! equally between its eight Moore neighbors, and loses `decay` of what it
//! keeps.  All of these are increments, merged with [`ConflictPolicy::Sum`].

use abm_agent::{Agent, AgentState};
use abm_core::{AgentRng, Position, SimRng};
use abm_model::{
    ConflictPolicy, Effect, MergePolicy, Model, ModelFactory, ModelResult, MovePolicy, ParamSchema,
    ParamSpec, Statistic, StepContext, ValidatedParams,
};
use abm_space::{Bounds, CapacityPolicy, Neighborhood, World};

use crate::common::{check_fits, random_step, scatter, size_param};

pub const NAME: &str = "diffusion";
pub const EMITTER: &str = "emitter";
pub const HEAT: &str = "heat";

/// Heat below which a cell is cleared instead of diffused.
const MIN_HEAT: f64 = 1e-9;

// ── Factory ───────────────────────────────────────────────────────────────────

pub struct DiffusionFactory;

impl ModelFactory for DiffusionFactory {
    fn description(&self) -> &str {
        "Heat diffusion: wandering emitters heat a field that spreads and decays"
    }

    fn schema(&self) -> ParamSchema {
        ParamSchema::new()
            .param(size_param(32))
            .param(ParamSpec::int("emitters", "number of heat sources").default(8i64).range(0.0, 1_000_000.0))
            .param(ParamSpec::float("emission", "heat deposited per emitter per tick").default(1.0).range(0.0, 1_000.0))
            .param(ParamSpec::float("diffusion", "share of a cell's heat passed to its neighbors").default(0.2).range(0.0, 1.0))
            .param(ParamSpec::float("decay", "share of the retained heat lost per tick").default(0.05).range(0.0, 1.0))
            .param(ParamSpec::float("initial_heat", "heat placed on the center cell at tick 0").default(0.0).range(0.0, 1e9))
    }

    fn build(&self, params: &ValidatedParams) -> ModelResult<Box<dyn Model>> {
        let size = params.u32("size")?;
        let emitters = params.u32("emitters")?;
        check_fits(size, u64::from(emitters), "emitters")?;
        Ok(Box::new(Diffusion {
            size,
            emitters,
            emission:     params.f64("emission")?,
            diffusion:    params.f64("diffusion")?,
            decay:        params.f64("decay")?,
            initial_heat: params.f64("initial_heat")?,
        }))
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// Diffusion model.
///
/// Merge policy: exclusive cells, [`MovePolicy::LowestIdWins`] for the
/// emitters, and [`ConflictPolicy::Sum`] for the `heat` field so that
/// deposits, outflow, and inflow to the same cell add up.  Any other key
/// rejects conflicting writes.
#[derive(Clone, Debug)]
pub struct Diffusion {
    size:         u32,
    emitters:     u32,
    emission:     f64,
    diffusion:    f64,
    decay:        f64,
    initial_heat: f64,
}

impl Model for Diffusion {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize(&self, rng: &mut SimRng) -> ModelResult<World> {
        let mut world = World::new(Bounds::torus(self.size, self.size), CapacityPolicy::Exclusive);
        scatter(&mut world, rng, &[(EMITTER, self.emitters as usize)], |_, _| AgentState::new())?;
        if self.initial_heat > 0.0 {
            let center = Position::new((self.size / 2) as i32, (self.size / 2) as i32);
            world.fields_mut().set(HEAT, center, self.initial_heat.into());
        }
        Ok(world)
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::new(MovePolicy::LowestIdWins, ConflictPolicy::Reject)
            .with_key(HEAT, ConflictPolicy::Sum)
    }

    fn update(
        &self,
        agent: &Agent,
        _ctx:  &StepContext<'_>,
        rng:   &mut AgentRng,
    ) -> ModelResult<Vec<Effect>> {
        let mut effects = Vec::with_capacity(2);
        if self.emission > 0.0 {
            effects.push(Effect::write_field(HEAT, agent.position, self.emission));
        }
        let to = random_step(rng, agent.position, 1);
        if to != agent.position {
            effects.push(Effect::move_to(agent.id(), to));
        }
        Ok(effects)
    }

    fn cell_units(&self, world: &World) -> Vec<Position> {
        world
            .env()
            .fields()
            .entries(HEAT)
            .into_iter()
            .filter(|(_, v)| v.as_f64().is_ok_and(|h| h != 0.0))
            .map(|(p, _)| p)
            .collect()
    }

    fn update_cell(
        &self,
        cell: Position,
        ctx:  &StepContext<'_>,
        _rng: &mut AgentRng,
    ) -> ModelResult<Vec<Effect>> {
        let heat = ctx.world.env().fields().get_f64(HEAT, cell);
        if heat.abs() < MIN_HEAT {
            return Ok(vec![Effect::write_field(HEAT, cell, -heat)]);
        }

        let neighbors = ctx.world.bounds().neighbors(cell, 1, Neighborhood::Moore);
        let outflow = if neighbors.is_empty() { 0.0 } else { heat * self.diffusion };
        let kept = heat - outflow;
        let mut effects = Vec::with_capacity(neighbors.len() + 1);
        effects.push(Effect::write_field(HEAT, cell, -outflow - kept * self.decay));
        if outflow > 0.0 {
            let share = outflow / neighbors.len() as f64;
            effects.extend(neighbors.into_iter().map(|n| Effect::write_field(HEAT, n, share)));
        }
        Ok(effects)
    }

    fn statistics(&self, world: &World) -> Vec<Statistic> {
        let fields = world.env().fields();
        // Cells that cooled to exactly zero keep an entry; they are not hot.
        let heat: Vec<f64> = fields
            .entries(HEAT)
            .into_iter()
            .filter_map(|(_, v)| v.as_f64().ok())
            .filter(|h| *h != 0.0)
            .collect();
        vec![
            Statistic::new("total_heat", fields.total(HEAT)),
            Statistic::new("max_heat", heat.iter().copied().fold(0.0, f64::max)),
            Statistic::new("hot_cells", heat.len() as f64),
        ]
    }
}
