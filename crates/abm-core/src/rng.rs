//! Deterministic RNG wrappers.
//!
//! # Determinism strategy
//!
//! Every update unit (an agent, or a cell for cell-driven models) draws from
//! its own `SmallRng`, re-seeded each tick from three inputs:
//!
//!   seed = mix(global_seed, unit, tick)
//!
//! using the 64-bit fractional golden ratio as the multiplier.  No RNG state
//! is carried between ticks or shared between units, so the values a unit
//! sees depend only on `(seed, unit, tick)`, never on which worker thread ran
//! it or how the grid was partitioned into regions.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::Tick;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Second odd multiplier so `unit` and `tick` do not alias each other.
const TICK_CONSTANT: u64 = 0xbf58_476d_1ce4_e5b9;

/// Offset added to cell unit keys so a cell never shares a stream with an
/// agent of the same numeric index.
pub const CELL_UNIT_BASE: u64 = 1 << 40;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// RNG handed to a single update unit for a single tick.
///
/// The type is `!Sync`; each Rayon worker creates its own instance per unit.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed for `unit` at `tick`.  Agents use their id as the unit key;
    /// cells use [`AgentRng::cell_unit`].
    pub fn for_unit(global_seed: u64, unit: u64, tick: Tick) -> Self {
        let seed = global_seed
            ^ unit.wrapping_add(1).wrapping_mul(MIXING_CONSTANT)
            ^ tick.0.wrapping_add(1).wrapping_mul(TICK_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Unit key for the grid cell with row-major index `index`.
    #[inline]
    pub fn cell_unit(index: u64) -> u64 {
        CELL_UNIT_BASE + index
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// Random element of `slice`, or `None` if it is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Run-level RNG used by model initialization and other single-threaded work.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}
