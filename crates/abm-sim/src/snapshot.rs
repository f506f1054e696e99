//! Immutable per-tick state.

use abm_core::Tick;
use abm_model::Statistic;
use abm_space::World;

/// The world as published at one tick, plus the model's statistics for it.
///
/// Never mutated after publication; shared as `Arc<Snapshot>` between the
/// run, its history, and any consumer.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    tick:  Tick,
    world: World,
    stats: Vec<Statistic>,
}

impl Snapshot {
    pub fn new(tick: Tick, world: World, stats: Vec<Statistic>) -> Self {
        Self { tick, world, stats }
    }

    #[inline]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn statistics(&self) -> &[Statistic] {
        &self.stats
    }

    /// Value of statistic `name`, if the model reported one.
    pub fn statistic(&self, name: &str) -> Option<f64> {
        self.stats.iter().find(|s| s.name == name).map(|s| s.value)
    }
}
