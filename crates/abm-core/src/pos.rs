//! Grid coordinates and direction vectors.
//!
//! Occupancy is always keyed by an integer grid cell (`Position`), which keeps
//! positions `Eq + Hash` for O(1) lookup.  Models with continuous motion
//! (flocking) carry a floating-point [`Heading`] in the agent's state bag and
//! snap it to the grid when they move.

use std::fmt;

// ── Position ──────────────────────────────────────────────────────────────────

/// A discrete grid cell.  `(0, 0)` is the top-left corner; `y` grows downward.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell `(dx, dy)` away from `self`.  May lie outside the grid; use
    /// `Bounds::normalize` before placing anything there.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// L1 (taxicab) distance.
    #[inline]
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// L∞ distance: the radius of the smallest Moore neighborhood that
    /// contains both cells.
    #[inline]
    pub fn chebyshev(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Cell reached by travelling `steps` cells along `heading`, rounded to
    /// the nearest grid cell.  A zero heading returns `self`.
    pub fn advance(self, heading: Heading, steps: f64) -> Position {
        let unit = heading.normalized();
        Position::new(
            self.x + (unit.dx * steps).round() as i32,
            self.y + (unit.dy * steps).round() as i32,
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Heading ───────────────────────────────────────────────────────────────────

/// A 2-D direction vector with `f64` components.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heading {
    pub dx: f64,
    pub dy: f64,
}

impl Heading {
    pub const ZERO: Heading = Heading { dx: 0.0, dy: 0.0 };

    #[inline]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Unit vector at `radians` from the positive x axis.
    #[inline]
    pub fn from_angle(radians: f64) -> Self {
        Self::new(radians.cos(), radians.sin())
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// Unit-length copy, or `ZERO` for a zero vector.
    pub fn normalized(self) -> Heading {
        let len = self.length();
        if len == 0.0 {
            Heading::ZERO
        } else {
            Heading::new(self.dx / len, self.dy / len)
        }
    }

    #[inline]
    pub fn scale(self, k: f64) -> Heading {
        Heading::new(self.dx * k, self.dy * k)
    }

    #[inline]
    pub fn reversed(self) -> Heading {
        Heading::new(-self.dx, -self.dy)
    }
}

impl std::ops::Add for Heading {
    type Output = Heading;
    #[inline]
    fn add(self, rhs: Heading) -> Heading {
        Heading::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl std::iter::Sum for Heading {
    fn sum<I: Iterator<Item = Heading>>(iter: I) -> Heading {
        iter.fold(Heading::ZERO, |acc, h| acc + h)
    }
}
