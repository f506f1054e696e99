//! Boids flocking on a torus.
//!
//! Every bird carries a heading in its `dx`/`dy` attributes.  Each tick it
//! steers by three weighted rules computed from the birds within `vision`
//! cells:
//!
//! - **cohesion**: towards the neighbors' mean position
//! - **alignment**: towards the neighbors' mean heading
//! - **separation**: away from neighbors closer than `min_distance`
//!
//! and then moves `speed` cells along the new heading, snapped to the grid.

use std::f64::consts::TAU;

use abm_agent::{Agent, AgentState};
use abm_agent::state::{HEADING_DX, HEADING_DY};
use abm_core::{AgentRng, Heading, SimRng};
use abm_model::{
    ConflictPolicy, Effect, MergePolicy, Model, ModelFactory, ModelResult, MovePolicy, ParamSchema,
    ParamSpec, Statistic, StepContext, ValidatedParams,
};
use abm_space::{Bounds, CapacityPolicy, Neighborhood, World};

use crate::common::{check_fits, scatter, size_param};

pub const NAME: &str = "flock";
pub const BIRD: &str = "bird";

// ── Factory ───────────────────────────────────────────────────────────────────

pub struct FlockFactory;

impl ModelFactory for FlockFactory {
    fn description(&self) -> &str {
        "Boids flocking: cohesion, alignment and separation on a toroidal grid"
    }

    fn schema(&self) -> ParamSchema {
        ParamSchema::new()
            .param(size_param(40))
            .param(ParamSpec::int("birds", "number of birds").default(60i64).range(1.0, 100_000.0))
            .param(ParamSpec::int("vision", "neighbor radius in cells").default(5i64).range(1.0, 50.0))
            .param(ParamSpec::float("cohesion", "weight of the pull towards the local center").default(1.0).range(0.0, 10.0))
            .param(ParamSpec::float("alignment", "weight of heading matching").default(1.0).range(0.0, 10.0))
            .param(ParamSpec::float("separation", "weight of crowding avoidance").default(1.5).range(0.0, 10.0))
            .param(ParamSpec::float("min_distance", "separation distance in cells").default(2.0).range(0.0, 50.0))
            .param(ParamSpec::float("speed", "cells travelled per tick").default(1.0).range(0.0, 10.0))
    }

    fn build(&self, params: &ValidatedParams) -> ModelResult<Box<dyn Model>> {
        let size = params.u32("size")?;
        let birds = params.u32("birds")?;
        check_fits(size, u64::from(birds), "birds")?;
        Ok(Box::new(Flock {
            size,
            birds,
            vision:       params.u32("vision")?,
            cohesion:     params.f64("cohesion")?,
            alignment:    params.f64("alignment")?,
            separation:   params.f64("separation")?,
            min_distance: params.f64("min_distance")?,
            speed:        params.f64("speed")?,
        }))
    }
}

// ── Model ─────────────────────────────────────────────────────────────────────

/// Flocking model.
///
/// Merge policy: exclusive cells, [`MovePolicy::LowestIdWins`] (a bird whose
/// target cell is taken stays put but still turns) and
/// [`ConflictPolicy::LastWriter`] (each bird only writes its own heading).
#[derive(Clone, Debug)]
pub struct Flock {
    size:         u32,
    birds:        u32,
    vision:       u32,
    cohesion:     f64,
    alignment:    f64,
    separation:   f64,
    min_distance: f64,
    speed:        f64,
}

impl Flock {
    /// Heading after applying the three steering rules to `bird`.
    pub fn steer(&self, bird: &Agent, world: &World) -> Heading {
        let bounds = world.bounds();
        let current = bird.state.heading();
        let neighbors: Vec<&Agent> = world
            .agents_within(bird.position, self.vision, Neighborhood::Moore)
            .into_iter()
            .filter(|a| a.id() != bird.id())
            .collect();
        if neighbors.is_empty() {
            return current;
        }

        let n = neighbors.len() as f64;
        let offsets: Vec<Heading> = neighbors
            .iter()
            .map(|a| {
                let (dx, dy) = bounds.delta(bird.position, a.position);
                Heading::new(dx as f64, dy as f64)
            })
            .collect();

        let center: Heading = offsets.iter().copied().sum::<Heading>().scale(1.0 / n);
        let mean_heading: Heading = neighbors.iter().map(|a| a.state.heading()).sum::<Heading>().scale(1.0 / n);
        let away: Heading = offsets
            .iter()
            .filter(|o| o.length() < self.min_distance)
            .map(|o| o.reversed().normalized())
            .sum();

        let steer = center.normalized().scale(self.cohesion)
            + mean_heading.normalized().scale(self.alignment)
            + away.normalized().scale(self.separation);
        let next = (current + steer).normalized();
        if next.is_zero() { current } else { next }
    }
}

impl Model for Flock {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize(&self, rng: &mut SimRng) -> ModelResult<World> {
        let mut world = World::new(Bounds::torus(self.size, self.size), CapacityPolicy::Exclusive);
        scatter(&mut world, rng, &[(BIRD, self.birds as usize)], |_, rng| {
            let mut state = AgentState::new();
            state.set_heading(Heading::from_angle(rng.gen_range(0.0..TAU)));
            state
        })?;
        Ok(world)
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::new(MovePolicy::LowestIdWins, ConflictPolicy::LastWriter)
    }

    fn update(
        &self,
        agent: &Agent,
        ctx:   &StepContext<'_>,
        _rng:  &mut AgentRng,
    ) -> ModelResult<Vec<Effect>> {
        let heading = self.steer(agent, ctx.world);
        let mut effects = vec![
            Effect::set_attr(agent.id(), HEADING_DX, heading.dx),
            Effect::set_attr(agent.id(), HEADING_DY, heading.dy),
        ];
        let target = agent.position.advance(heading, self.speed);
        if target != agent.position {
            effects.push(Effect::move_to(agent.id(), target));
        }
        Ok(effects)
    }

    fn statistics(&self, world: &World) -> Vec<Statistic> {
        let n = world.agents().len();
        // Polarization: 1 when every bird flies the same way, near 0 when
        // headings cancel out.
        let polarization = if n == 0 {
            0.0
        } else {
            world
                .agents()
                .iter()
                .map(|a| a.state.heading().normalized())
                .sum::<Heading>()
                .length()
                / n as f64
        };
        vec![
            Statistic::new("birds", n as f64),
            Statistic::new("polarization", polarization),
        ]
    }
}
