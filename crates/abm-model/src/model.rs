//! The `Model` trait, the main extension point for simulation rule sets.

use abm_agent::Agent;
use abm_core::{AgentRng, Position, SimRng};
use abm_space::World;

use crate::{Effect, MergePolicy, ModelResult, StepContext};

/// A named aggregate measurement of one world, e.g. the share of satisfied
/// agents in a segregation model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistic {
    pub name:  String,
    pub value: f64,
}

impl Statistic {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value }
    }
}

/// Pluggable simulation rules.
///
/// Implementations are built by a [`ModelFactory`](crate::ModelFactory) from
/// validated parameters and are immutable afterwards.  All per-agent data
/// lives in the `World`; all randomness comes from the RNG argument, which
/// the scheduler seeds from `(run seed, unit, tick)`.
///
/// # Required methods
///
/// [`initialize`][Self::initialize], [`update`][Self::update], and
/// [`merge_policy`][Self::merge_policy].  Cell units, termination, and
/// statistics have defaults for models that do not use them.
///
/// # Thread safety
///
/// `update` and `update_cell` run for many units in parallel via Rayon, so
/// implementations must be `Send + Sync`.
pub trait Model: Send + Sync + 'static {
    /// Registry name of the model.
    fn name(&self) -> &str;

    /// Build the tick-0 world.  Called once per run.
    fn initialize(&self, rng: &mut SimRng) -> ModelResult<World>;

    /// How competing effects are merged.  There is no engine default.
    fn merge_policy(&self) -> MergePolicy;

    /// Per-agent update.  Return the effects this agent proposes for the next
    /// tick; an empty `Vec` leaves it unchanged.
    fn update(
        &self,
        agent: &Agent,
        ctx:   &StepContext<'_>,
        rng:   &mut AgentRng,
    ) -> ModelResult<Vec<Effect>>;

    /// Cells that receive a [`update_cell`][Self::update_cell] call this
    /// tick, row-major.  Default: none.
    fn cell_units(&self, _world: &World) -> Vec<Position> {
        Vec::new()
    }

    /// Per-cell update for field-driven models.
    fn update_cell(
        &self,
        _cell: Position,
        _ctx:  &StepContext<'_>,
        _rng:  &mut AgentRng,
    ) -> ModelResult<Vec<Effect>> {
        Ok(Vec::new())
    }

    /// Whether the run should stop after publishing `current`.
    ///
    /// `previous` is the snapshot the tick started from.  Default: never.
    fn is_terminal(&self, _previous: &World, _current: &World) -> bool {
        false
    }

    /// Aggregate measurements of `world`.  Default: none.
    fn statistics(&self, _world: &World) -> Vec<Statistic> {
        Vec::new()
    }
}
