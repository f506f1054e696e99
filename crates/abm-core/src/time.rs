//! Simulation time model.
//!
//! Time is a monotonically increasing `Tick` counter.  Tick 0 is the state
//! produced by model initialization; every completed step publishes exactly
//! one snapshot at the next tick index.

use std::fmt;

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// The tick immediately after `self`.
    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
