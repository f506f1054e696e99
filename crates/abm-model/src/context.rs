//! Read-only tick state passed to every unit update.

use abm_core::Tick;
use abm_space::World;

/// The world as it stood at the start of the tick being computed.
///
/// Built once per tick by abm-sim and shared immutably across all region
/// workers.  Nothing a unit update does is visible through it until the next
/// tick.
#[derive(Copy, Clone)]
pub struct StepContext<'a> {
    /// Tick of the snapshot being read (the new snapshot will be `tick + 1`).
    pub tick: Tick,

    pub world: &'a World,
}

impl<'a> StepContext<'a> {
    #[inline]
    pub fn new(tick: Tick, world: &'a World) -> Self {
        Self { tick, world }
    }
}
