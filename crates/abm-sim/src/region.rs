//! Unit partitioning and the update phase.
//!
//! A *unit* is one agent or one cell the model updates.  Units are grouped
//! into horizontal bands of `region_rows` grid rows; each band becomes a
//! [`Region`] processed by one task.  Every unit reads the tick's starting
//! world through `&StepContext` and writes only to the region's own staging
//! `Vec`, so regions never observe each other's output and the merged result
//! does not depend on which regions ran concurrently.

use std::panic::{AssertUnwindSafe, catch_unwind};

use abm_core::{AgentId, AgentRng, Position};
use abm_model::{Effect, Model, ModelResult, StepContext};
use abm_space::World;

use crate::{CancelToken, SimError, SimResult};

// ── Units and sources ─────────────────────────────────────────────────────────

/// One update call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unit {
    Agent(AgentId),
    Cell(Position),
}

/// Where a staged effect came from.  Orders every agent before every cell,
/// agents by id and cells row-major; this is the "source order" used by the
/// merge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    Agent(AgentId),
    /// Row-major cell index (`y * width + x`).
    Cell(u64),
}

impl Source {
    /// The agent id, when the source is an agent.
    #[inline]
    pub fn agent(self) -> Option<AgentId> {
        match self {
            Source::Agent(id) => Some(id),
            Source::Cell(_) => None,
        }
    }

    /// Key for the unit's RNG stream.
    #[inline]
    fn rng_unit(self) -> u64 {
        match self {
            Source::Agent(id) => u64::from(id),
            Source::Cell(index) => AgentRng::cell_unit(index),
        }
    }
}

/// Effects produced by one unit.
#[derive(Debug)]
pub(crate) struct Staged {
    pub source:  Source,
    pub effects: Vec<Effect>,
}

/// First failing unit of a region.
struct UnitFailure {
    source: Source,
    error:  SimError,
}

/// Worker pool the update phase runs on.
#[cfg(feature = "parallel")]
pub(crate) type Pool = rayon::ThreadPool;

/// Without the `parallel` feature regions run on the calling thread.
#[cfg(not(feature = "parallel"))]
pub(crate) struct Pool;

/// `Err(None)` marks a region skipped because of cancellation.
type RegionOutcome = Result<Vec<Staged>, Option<UnitFailure>>;

// ── Region ────────────────────────────────────────────────────────────────────

/// A band of grid rows and the units whose position lies in it.
///
/// Units are stored in source order: agents by ascending id, then cells
/// row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub index: usize,
    pub rows:  std::ops::Range<u32>,
    pub units: Vec<(Source, Unit)>,
}

/// Split the world's agents and the given cells into bands of `region_rows`
/// rows.  Empty bands are omitted.
pub fn partition(world: &World, cells: &[Position], region_rows: u32) -> Vec<Region> {
    let rows = region_rows.max(1);
    let height = world.bounds().height;
    let band_count = height.div_ceil(rows).max(1) as usize;
    let band_of = |pos: Position| ((pos.y.max(0) as u32) / rows) as usize;

    let mut regions: Vec<Region> = (0..band_count)
        .map(|i| {
            let start = i as u32 * rows;
            Region {
                index: i,
                rows:  start..(start + rows).min(height),
                units: Vec::new(),
            }
        })
        .collect();

    for agent in world.agents().iter() {
        let band = band_of(agent.position).min(band_count - 1);
        regions[band].units.push((Source::Agent(agent.id()), Unit::Agent(agent.id())));
    }
    for &cell in cells {
        let Some(index) = world.bounds().index_of(cell) else {
            continue;
        };
        let band = band_of(cell).min(band_count - 1);
        regions[band].units.push((Source::Cell(index as u64), Unit::Cell(cell)));
    }

    regions.retain(|r| !r.units.is_empty());
    regions
}

// ── Update phase ──────────────────────────────────────────────────────────────

/// Run every unit of every region and return the staged effects.
///
/// Fails with the error of the lowest failing unit, or with `Cancelled` if
/// the token was set before any region could be dispatched.  Partial
/// output is discarded in both cases.
pub(crate) fn update_regions(
    model:   &dyn Model,
    ctx:     &StepContext<'_>,
    regions: &[Region],
    seed:    u64,
    cancel:  &CancelToken,
    pool:    Option<&Pool>,
) -> SimResult<Vec<Staged>> {
    let run_one = |region: &Region| -> RegionOutcome {
        if cancel.is_cancelled() {
            return Err(None);
        }
        update_region(model, ctx, region, seed).map_err(Some)
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<RegionOutcome> = {
        let _ = pool;
        regions.iter().map(run_one).collect()
    };

    #[cfg(feature = "parallel")]
    let results: Vec<RegionOutcome> = {
        use rayon::prelude::*;

        let par = || -> Vec<RegionOutcome> { regions.par_iter().map(run_one).collect() };
        match pool {
            Some(p) => p.install(par),
            None => par(),
        }
    };

    let mut staged = Vec::new();
    let mut first_failure: Option<UnitFailure> = None;
    let mut cancelled = false;
    for result in results {
        match result {
            Ok(s) => staged.extend(s),
            Err(None) => cancelled = true,
            Err(Some(f)) => {
                if first_failure.as_ref().is_none_or(|best| f.source < best.source) {
                    first_failure = Some(f);
                }
            }
        }
    }

    if let Some(f) = first_failure {
        return Err(f.error);
    }
    if cancelled || cancel.is_cancelled() {
        return Err(SimError::Cancelled);
    }
    Ok(staged)
}

/// Update one region's units in order, stopping at the first failure.
fn update_region(
    model:  &dyn Model,
    ctx:    &StepContext<'_>,
    region: &Region,
    seed:   u64,
) -> Result<Vec<Staged>, UnitFailure> {
    let mut out = Vec::with_capacity(region.units.len());
    for &(source, unit) in &region.units {
        let mut rng = AgentRng::for_unit(seed, source.rng_unit(), ctx.tick);
        let outcome = catch_unwind(AssertUnwindSafe(|| call_unit(model, ctx, unit, &mut rng)));
        let cause = match outcome {
            Ok(Ok(effects)) => {
                if !effects.is_empty() {
                    out.push(Staged { source, effects });
                }
                continue;
            }
            Ok(Err(e)) => e.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };
        let error = match unit {
            Unit::Agent(agent) => SimError::AgentUpdateFailed { agent, cause },
            Unit::Cell(position) => SimError::CellUpdateFailed { position, cause },
        };
        return Err(UnitFailure { source, error });
    }
    Ok(out)
}

fn call_unit(
    model: &dyn Model,
    ctx:   &StepContext<'_>,
    unit:  Unit,
    rng:   &mut AgentRng,
) -> ModelResult<Vec<Effect>> {
    match unit {
        Unit::Agent(id) => match ctx.world.agent(id) {
            Some(agent) => model.update(agent, ctx, rng),
            None => Ok(Vec::new()),
        },
        Unit::Cell(pos) => model.update_cell(pos, ctx, rng),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_owned()
    }
}
