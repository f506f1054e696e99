//! Schelling segregation.
//!
//! Two groups share a bounded grid.  An agent is satisfied when at least
//! `threshold` of the agents within `vision` cells belong to its own group
//! (an agent with no neighbors is satisfied).  Unsatisfied agents relocate to
//! a random free cell of the tick's starting world.

use abm_agent::{Agent, AgentState};
use abm_core::{AgentRng, Position, SimRng};
use abm_model::{
    ConflictPolicy, Effect, MergePolicy, Model, ModelFactory, ModelResult, MovePolicy, ParamSchema,
    ParamSpec, Statistic, StepContext, ValidatedParams,
};
use abm_space::{Bounds, CapacityPolicy, Neighborhood, World};

use crate::common::{check_fits, mean, scatter, size_param, unmoved};

pub const NAME: &str = "schelling";
pub const GROUP_A: &str = "A";
pub const GROUP_B: &str = "B";

/// Attribute holding the share of same-group neighbors seen last tick.
pub const RATIO: &str = "ratio";

/// Random draws for a free cell before an unsatisfied agent gives up for
/// this tick.
const RELOCATE_ATTEMPTS: usize = 64;

// ── Factory ───────────────────────────────────────────────────────────────────

pub struct SchellingFactory;

impl ModelFactory for SchellingFactory {
    fn description(&self) -> &str {
        "Schelling segregation: two groups relocate until enough neighbors are alike"
    }

    fn schema(&self) -> ParamSchema {
        ParamSchema::new()
            .param(size_param(20))
            .param(ParamSpec::int("group_a", "agents in group A").default(150i64).range(0.0, 1_000_000.0))
            .param(ParamSpec::int("group_b", "agents in group B").default(150i64).range(0.0, 1_000_000.0))
            .param(ParamSpec::float("threshold", "minimum share of alike neighbors").default(0.5).range(0.0, 1.0))
            .param(ParamSpec::int("vision", "neighborhood radius in cells").default(1i64).range(1.0, 50.0))
    }

    fn build(&self, params: &ValidatedParams) -> ModelResult<Box<dyn Model>> {
        let size = params.u32("size")?;
        let group_a = params.u32("group_a")?;
        let group_b = params.u32("group_b")?;
        check_fits(size, u64::from(group_a) + u64::from(group_b), "group_b")?;
        Ok(Box::new(Schelling::new(
            size,
            group_a,
            group_b,
            params.f64("threshold")?,
            params.u32("vision")?,
        )))
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// Segregation model.
///
/// Merge policy: exclusive cells, [`MovePolicy::LowestIdWins`] (when two
/// agents pick the same free cell the lower id gets it and the other stays
/// for a tick) and [`ConflictPolicy::LastWriter`] (agents only write their
/// own ratio).
#[derive(Clone, Debug)]
pub struct Schelling {
    size:      u32,
    group_a:   u32,
    group_b:   u32,
    threshold: f64,
    vision:    u32,
}

impl Schelling {
    pub fn new(size: u32, group_a: u32, group_b: u32, threshold: f64, vision: u32) -> Self {
        Self { size, group_a, group_b, threshold, vision }
    }

    /// Share of alike neighbors and whether that satisfies the agent.
    pub fn assess(&self, agent: &Agent, world: &World) -> (f64, bool) {
        let neighbors: Vec<&Agent> = world
            .agents_within(agent.position, self.vision, Neighborhood::Moore)
            .into_iter()
            .filter(|a| a.id() != agent.id())
            .collect();
        if neighbors.is_empty() {
            return (0.0, true);
        }
        let alike = neighbors.iter().filter(|a| a.kind == agent.kind).count();
        let ratio = alike as f64 / neighbors.len() as f64;
        (ratio, ratio >= self.threshold)
    }

    fn random_free_cell(world: &World, rng: &mut AgentRng) -> Option<Position> {
        let bounds = world.bounds();
        (0..RELOCATE_ATTEMPTS)
            .map(|_| {
                Position::new(
                    rng.gen_range(0..bounds.width as i32),
                    rng.gen_range(0..bounds.height as i32),
                )
            })
            .find(|&p| world.is_free(p))
    }
}

impl Model for Schelling {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize(&self, rng: &mut SimRng) -> ModelResult<World> {
        let mut world = World::new(Bounds::new(self.size, self.size), CapacityPolicy::Exclusive);
        let groups = [(GROUP_A, self.group_a as usize), (GROUP_B, self.group_b as usize)];
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
        let (ratio, satisfied) = self.assess(agent, ctx.world);
        let mut effects = vec![Effect::set_attr(agent.id(), RATIO, ratio)];
        if !satisfied {
            if let Some(to) = Self::random_free_cell(ctx.world, rng) {
                effects.push(Effect::move_to(agent.id(), to));
            }
        }
        Ok(effects)
    }

    fn is_terminal(&self, previous: &World, current: &World) -> bool {
        unmoved(previous, current)
    }

    fn statistics(&self, world: &World) -> Vec<Statistic> {
        let ratio_of = |kind: Option<&str>| {
            mean(
                world
                    .agents()
                    .iter()
                    .filter(|a| kind.is_none_or(|k| a.is(k)))
                    .filter_map(|a| a.state.get_f64(RATIO)),
            )
        };
        let satisfied = world
            .agents()
            .iter()
            .filter(|a| self.assess(a, world).1)
            .count();
        let share = if world.agents().is_empty() {
            1.0
        } else {
            satisfied as f64 / world.agents().len() as f64
        };
        vec![
            Statistic::new("ratio", ratio_of(None)),
            Statistic::new("ratio_a", ratio_of(Some(GROUP_A))),
            Statistic::new("ratio_b", ratio_of(Some(GROUP_B))),
            Statistic::new("satisfied", share),
        ]
    }
}
