//! Helpers shared by the reference models.

use abm_agent::{AgentBuilder, AgentState};
use abm_core::{AgentRng, Position, SimRng};
use abm_model::{ModelError, ModelResult, ParamSpec};
use abm_space::{Bounds, World};

/// Standard `size` parameter: side length of the square grid.
pub(crate) fn size_param(default: i64) -> ParamSpec {
    ParamSpec::int("size", "side length of the square grid")
        .default(default)
        .range(1.0, 1_000.0)
}

/// Place `count` agents of each kind on distinct random cells.
///
/// Groups are placed in order, so agent ids follow the order of `groups`.
/// `state` builds each agent's initial attributes.
pub(crate) fn scatter<F>(
    world:     &mut World,
    rng:       &mut SimRng,
    groups:    &[(&str, usize)],
    mut state: F,
) -> ModelResult<()>
where
    F: FnMut(&str, &mut SimRng) -> AgentState,
{
    let wanted: usize = groups.iter().map(|(_, n)| n).sum();
    let mut cells = world.free_cells();
    if wanted > cells.len() {
        return Err(ModelError::Init(format!(
            "{wanted} agents do not fit on {} free cells",
            cells.len()
        )));
    }
    rng.shuffle(&mut cells);

    let mut cells = cells.into_iter();
    for &(kind, count) in groups {
        for pos in cells.by_ref().take(count) {
            let attrs = state(kind, rng);
            world.spawn(AgentBuilder::new(kind).at(pos).with_state(attrs))?;
        }
    }
    Ok(())
}

/// Reject parameter combinations where the population exceeds the grid.
pub(crate) fn check_fits(size: u32, population: u64, key: &str) -> ModelResult<()> {
    let cells = u64::from(size) * u64::from(size);
    if population > cells {
        return Err(ModelError::InvalidParameter {
            key:    key.to_owned(),
            reason: format!("{population} agents do not fit on a {size}x{size} grid"),
        });
    }
    Ok(())
}

/// True when every agent of `previous` still exists in `current` on the same
/// cell.
pub(crate) fn unmoved(previous: &World, current: &World) -> bool {
    previous.agents().len() == current.agents().len()
        && previous
            .agents()
            .iter()
            .all(|a| current.agent(a.id()).is_some_and(|b| b.position == a.position))
}

/// Uniform step of up to `max` cells per axis.
pub(crate) fn random_step(rng: &mut AgentRng, from: Position, max: i32) -> Position {
    let dx = rng.gen_range(-max..=max);
    let dy = rng.gen_range(-max..=max);
    from.offset(dx, dy)
}

/// Bring `pos` back onto the grid: wrapped on a torus, clamped to the edge
/// otherwise.
pub(crate) fn clamp(bounds: &Bounds, pos: Position) -> Position {
    bounds.normalize(pos).unwrap_or_else(|| {
        Position::new(
            pos.x.clamp(0, bounds.width as i32 - 1),
            pos.y.clamp(0, bounds.height as i32 - 1),
        )
    })
}

/// One cell towards `(dx, dy)`, per axis.
#[inline]
pub(crate) fn step_towards(from: Position, (dx, dy): (i32, i32)) -> Position {
    from.offset(dx.signum(), dy.signum())
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}
