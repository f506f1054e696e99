//! A model that never changes its world.

use abm_agent::Agent;
use abm_core::{AgentRng, SimRng};
use abm_space::World;

use crate::{ConflictPolicy, Effect, MergePolicy, Model, ModelResult, MovePolicy, StepContext};

/// A [`Model`] whose initial world is a fixed value and whose update never
/// proposes effects.
///
/// Useful as a placeholder in tests and for replaying a hand-built world
/// through the scheduler and exporters.
pub struct IdleModel {
    world: World,
}

impl IdleModel {
    pub fn new(world: World) -> Self {
        Self { world }
    }
}

impl Model for IdleModel {
    fn name(&self) -> &str {
        "idle"
    }

    fn initialize(&self, _rng: &mut SimRng) -> ModelResult<World> {
        Ok(self.world.clone())
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::new(MovePolicy::Reject, ConflictPolicy::Reject)
    }

    fn update(
        &self,
        _agent: &Agent,
        _ctx:   &StepContext<'_>,
        _rng:   &mut AgentRng,
    ) -> ModelResult<Vec<Effect>> {
        Ok(Vec::new())
    }
}
