//! Grid shape, edge topology, and neighborhood enumeration.
//!
//! # Cell order
//!
//! Every whole-grid walk in the engine is row-major: `y` ascending, then `x`
//! ascending.  [`Bounds::index_of`] gives the matching dense index
//! `y * width + x`, which the scheduler uses both for region assignment and
//! for seeding per-cell RNG streams.

use abm_core::Position;
use rustc_hash::FxHashSet;

/// How the grid treats coordinates past its edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topology {
    /// Coordinates outside `[0, width) × [0, height)` are invalid.
    #[default]
    Bounded,
    /// Both axes wrap around.
    Torus,
}

/// Which offsets count as adjacent at a given radius.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Neighborhood {
    /// Square: Chebyshev distance `<= radius`.
    #[default]
    Moore,
    /// Diamond: Manhattan distance `<= radius`.
    VonNeumann,
}

/// Rectangular grid dimensions plus edge behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub width:    u32,
    pub height:   u32,
    pub topology: Topology,
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, topology: Topology::Bounded }
    }

    pub fn torus(width: u32, height: u32) -> Self {
        Self { width, height, topology: Topology::Torus }
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// `true` when `pos` is a valid cell without any wrapping.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Canonical in-grid position for `pos`: wrapped on a torus, `None` when
    /// a bounded grid does not contain it.
    pub fn normalize(&self, pos: Position) -> Option<Position> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        match self.topology {
            Topology::Bounded => self.contains(pos).then_some(pos),
            Topology::Torus => Some(Position::new(
                pos.x.rem_euclid(self.width as i32),
                pos.y.rem_euclid(self.height as i32),
            )),
        }
    }

    /// Dense row-major index of an in-grid cell.
    #[inline]
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| Position::new(x, y)))
    }

    /// In-grid cells within `radius` of `center`, excluding `center` itself.
    ///
    /// Offsets are visited row by row (`dy` then `dx`, both ascending) and
    /// normalized; on a torus smaller than the neighborhood each cell is
    /// listed once, at its first occurrence.
    pub fn neighbors(&self, center: Position, radius: u32, shape: Neighborhood) -> Vec<Position> {
        let r = radius as i32;
        let span = 2 * radius as u64 + 1;
        // Only a torus narrower than the neighborhood can yield a cell twice.
        let mut seen = (self.topology == Topology::Torus
            && (u64::from(self.width) < span || u64::from(self.height) < span))
            .then(FxHashSet::default);

        let mut out = Vec::with_capacity((span * span).min(self.cell_count() as u64) as usize);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if shape == Neighborhood::VonNeumann && dx.abs() + dy.abs() > r {
                    continue;
                }
                let Some(p) = self.normalize(center.offset(dx, dy)) else {
                    continue;
                };
                if p == center {
                    continue;
                }
                if let Some(seen) = seen.as_mut() {
                    if !seen.insert(p) {
                        continue;
                    }
                }
                out.push(p);
            }
        }
        out
    }

    /// Shortest per-axis displacement from `from` to `to`, taking wrap-around
    /// into account on a torus.
    pub fn delta(&self, from: Position, to: Position) -> (i32, i32) {
        let mut dx = to.x - from.x;
        let mut dy = to.y - from.y;
        if self.topology == Topology::Torus {
            let (w, h) = (self.width as i32, self.height as i32);
            if dx.abs() * 2 > w {
                dx -= dx.signum() * w;
            }
            if dy.abs() * 2 > h {
                dy -= dy.signum() * h;
            }
        }
        (dx, dy)
    }
}
