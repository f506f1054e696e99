//! Sugarscape: foragers harvesting a regrowing sugar landscape.
//!
//! Every cell has a sugar capacity drawn once at initialization and starts
//! full.  Each tick an agent harvests all the sugar on the cell it starts on,
//! pays its metabolism out of its wealth, and moves to the richest free cell
//! within its vision (ties go to the nearest cell).  An agent whose wealth
//! reaches zero starves and is removed.  Cells below capacity regrow
//! `regrowth` sugar per tick, never past their capacity.

use abm_agent::{Agent, AgentState};
use abm_core::{AgentRng, Position, SimRng};
use abm_model::{
    ConflictPolicy, Effect, MergePolicy, Model, ModelFactory, ModelResult, MovePolicy, ParamSchema,
    ParamSpec, Statistic, StepContext, ValidatedParams,
};
use abm_space::{Bounds, CapacityPolicy, Neighborhood, World};

use crate::common::{check_fits, mean, scatter, size_param};

pub const NAME: &str = "sugarscape";
pub const FORAGER: &str = "forager";
pub const SUGAR: &str = "sugar";
pub const CAPACITY: &str = "capacity";
pub const WEALTH: &str = "wealth";
pub const VISION: &str = "vision";
pub const METABOLISM: &str = "metabolism";

// ── Factory ───────────────────────────────────────────────────────────────────

pub struct SugarscapeFactory;

impl ModelFactory for SugarscapeFactory {
    fn description(&self) -> &str {
        "Sugarscape: foragers harvest regrowing sugar and starve without it"
    }

    fn schema(&self) -> ParamSchema {
        ParamSchema::new()
            .param(size_param(30))
            .param(ParamSpec::int("agents", "initial foragers").default(100i64).range(0.0, 1_000_000.0))
            .param(ParamSpec::int("max_sugar", "largest sugar capacity of a cell").default(4i64).range(0.0, 1_000.0))
            .param(ParamSpec::float("regrowth", "sugar regrown per cell per tick").default(1.0).range(0.0, 1_000.0))
            .param(ParamSpec::int("max_vision", "largest forager sight radius").default(4i64).range(1.0, 20.0))
            .param(ParamSpec::int("max_metabolism", "largest sugar burned per tick").default(3i64).range(1.0, 100.0))
            .param(ParamSpec::float("initial_wealth", "sugar each forager starts with").default(5.0).range(0.0, 1e6))
    }

    fn build(&self, params: &ValidatedParams) -> ModelResult<Box<dyn Model>> {
        let size = params.u32("size")?;
        let agents = params.u32("agents")?;
        check_fits(size, u64::from(agents), "agents")?;
        Ok(Box::new(Sugarscape {
            size,
            agents,
            max_sugar:      params.u32("max_sugar")?,
            regrowth:       params.f64("regrowth")?,
            max_vision:     params.u32("max_vision")?,
            max_metabolism: params.u32("max_metabolism")?,
            initial_wealth: params.f64("initial_wealth")?,
        }))
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// Sugarscape model.
///
/// Merge policy: exclusive cells on a torus with [`MovePolicy::LowestIdWins`],
/// so two foragers eyeing the same cell leave it to the lower id.  `sugar`
/// and `wealth` are merged with [`ConflictPolicy::Sum`]: a harvest is a
/// negative increment to the cell and regrowth a positive one.  A forager
/// only harvests the cell it occupies, so the two never exceed what the cell
/// held.  A starving forager's harvest is dropped along with it.
#[derive(Clone, Debug)]
pub struct Sugarscape {
    size:           u32,
    agents:         u32,
    max_sugar:      u32,
    regrowth:       f64,
    max_vision:     u32,
    max_metabolism: u32,
    initial_wealth: f64,
}

impl Sugarscape {
    /// Richest free cell within `vision`, nearest first on ties.
    fn best_cell(&self, world: &World, from: Position, vision: u32) -> Option<Position> {
        let fields = world.env().fields();
        world
            .bounds()
            .neighbors(from, vision, Neighborhood::VonNeumann)
            .into_iter()
            .filter(|&p| world.is_free(p))
            .map(|p| {
                let (dx, dy) = world.bounds().delta(from, p);
                (p, fields.get_f64(SUGAR, p), dx.abs() + dy.abs())
            })
            .filter(|&(_, sugar, _)| sugar > 0.0)
            .min_by(|a, b| b.1.total_cmp(&a.1).then(a.2.cmp(&b.2)))
            .map(|(p, _, _)| p)
    }
}

impl Model for Sugarscape {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize(&self, rng: &mut SimRng) -> ModelResult<World> {
        let mut world = World::new(Bounds::torus(self.size, self.size), CapacityPolicy::Exclusive);
        let cells: Vec<Position> = world.bounds().cells().collect();
        for cell in cells {
            let capacity = f64::from(rng.gen_range(0..=self.max_sugar));
            if capacity > 0.0 {
                world.fields_mut().set(CAPACITY, cell, capacity.into());
                world.fields_mut().set(SUGAR, cell, capacity.into());
            }
        }
        scatter(&mut world, rng, &[(FORAGER, self.agents as usize)], |_, rng| {
            let mut state = AgentState::new();
            state.set(WEALTH, self.initial_wealth);
            state.set(VISION, i64::from(rng.gen_range(1..=self.max_vision)));
            state.set(METABOLISM, i64::from(rng.gen_range(1..=self.max_metabolism)));
            state
        })?;
        Ok(world)
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::new(MovePolicy::LowestIdWins, ConflictPolicy::Reject)
            .with_key(SUGAR, ConflictPolicy::Sum)
            .with_key(WEALTH, ConflictPolicy::Sum)
    }

    fn update(
        &self,
        agent: &Agent,
        ctx:   &StepContext<'_>,
        _rng:  &mut AgentRng,
    ) -> ModelResult<Vec<Effect>> {
        let world = ctx.world;
        let harvest = world.env().fields().get_f64(SUGAR, agent.position);
        let metabolism = agent.state.get_i64(METABOLISM).unwrap_or(1) as f64;
        let wealth = agent.state.f64_or(WEALTH, 0.0);

        if wealth + harvest - metabolism <= 0.0 {
            return Ok(vec![Effect::remove(agent.id())]);
        }

        let mut effects = Vec::with_capacity(3);
        if harvest > 0.0 {
            effects.push(Effect::write_field(SUGAR, agent.position, -harvest));
        }
        effects.push(Effect::set_attr(agent.id(), WEALTH, harvest - metabolism));
        let vision = agent.state.get_i64(VISION).unwrap_or(1).max(0) as u32;
        if let Some(to) = self.best_cell(world, agent.position, vision) {
            effects.push(Effect::move_to(agent.id(), to));
        }
        Ok(effects)
    }

    fn cell_units(&self, world: &World) -> Vec<Position> {
        if self.regrowth <= 0.0 {
            return Vec::new();
        }
        let fields = world.env().fields();
        fields
            .cells_of(CAPACITY)
            .into_iter()
            .filter(|&p| fields.get_f64(SUGAR, p) < fields.get_f64(CAPACITY, p))
            .collect()
    }

    fn update_cell(
        &self,
        cell: Position,
        ctx:  &StepContext<'_>,
        _rng: &mut AgentRng,
    ) -> ModelResult<Vec<Effect>> {
        let fields = ctx.world.env().fields();
        let room = fields.get_f64(CAPACITY, cell) - fields.get_f64(SUGAR, cell);
        Ok(vec![Effect::write_field(SUGAR, cell, self.regrowth.min(room))])
    }

    fn is_terminal(&self, _previous: &World, current: &World) -> bool {
        current.agents().is_empty()
    }

    fn statistics(&self, world: &World) -> Vec<Statistic> {
        let agents = world.agents();
        vec![
            Statistic::new("foragers", agents.len() as f64),
            Statistic::new("total_sugar", world.env().fields().total(SUGAR)),
            Statistic::new(
                "mean_wealth",
                mean(agents.iter().map(|a| a.state.f64_or(WEALTH, 0.0))),
            ),
        ]
    }
}
