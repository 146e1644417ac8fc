//! Arena boundaries
//!
//! Both arenas share every other part of the environment; they differ only
//! in how a particle is pushed back inside:
//! - [`BoxArena`]: clamp to the edges, reflect and damp the velocity across
//!   the first violated edge (priority right, left, bottom, top)
//! - [`CircleArena`]: project the particle back onto the arena circle along
//!   the centre-to-particle line, position only

use crate::error::{Error, Result};
use crate::simulation::states::Particle;
use crate::simulation::vector::{Vector2, VectorExt};

/// Geometry of an arena, for renderers and spawn checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArenaShape {
    Rectangle { width: f64, height: f64 },
    Circle { centre: Vector2, radius: f64 },
}

pub trait Boundary: Send + Sync {
    /// Push `particle` back inside; returns true if it had to be corrected
    fn constrain(&self, particle: &mut Particle, damping: f64) -> bool;

    /// Whether a circle at `centre` with `radius` lies fully inside
    fn contains(&self, centre: Vector2, radius: f64) -> bool;

    fn shape(&self) -> ArenaShape;
}

/// Box wall that took the velocity reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Right,
    Left,
    Bottom,
    Top,
}

/// Axis-aligned box `[0, width] x [0, height]`, y pointing down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxArena {
    width: f64,
    height: f64,
}

impl BoxArena {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(Error::config(format!(
                "box arena must have positive finite size, got {width} x {height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// First edge the circle extends past, in priority order
    pub fn violated_edge(&self, position: Vector2, radius: f64) -> Option<Edge> {
        if position.x + radius > self.width {
            Some(Edge::Right)
        } else if position.x - radius < 0.0 {
            Some(Edge::Left)
        } else if position.y + radius > self.height {
            Some(Edge::Bottom)
        } else if position.y - radius < 0.0 {
            Some(Edge::Top)
        } else {
            None
        }
    }
}

// A particle wider than the box sits on the centre line
fn clamp_axis(value: f64, lo: f64, hi: f64) -> f64 {
    if lo > hi {
        0.5 * (lo + hi)
    } else {
        value.clamp(lo, hi)
    }
}

impl Boundary for BoxArena {
    fn constrain(&self, particle: &mut Particle, damping: f64) -> bool {
        let r = particle.radius();
        let pos = particle.position();
        let Some(edge) = self.violated_edge(pos, r) else {
            return false;
        };

        // Clamp on both axes so a corner particle ends up inside, then
        // reflect across the priority edge only
        let clamped = Vector2::new(
            clamp_axis(pos.x, r, self.width - r),
            clamp_axis(pos.y, r, self.height - r),
        );
        particle.move_by(clamped - pos);

        let mut vel = particle.velocity();
        match edge {
            Edge::Right | Edge::Left => vel.x *= -damping,
            Edge::Bottom | Edge::Top => vel.y *= -damping,
        }
        particle.set_velocity(vel);
        true
    }

    fn contains(&self, centre: Vector2, radius: f64) -> bool {
        centre.x - radius >= 0.0
            && centre.x + radius <= self.width
            && centre.y - radius >= 0.0
            && centre.y + radius <= self.height
    }

    fn shape(&self) -> ArenaShape {
        ArenaShape::Rectangle {
            width: self.width,
            height: self.height,
        }
    }
}

/// Circular arena centred in a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleArena {
    centre: Vector2,
    radius: f64,
}

impl CircleArena {
    /// Arena of `radius` centred in a `window` of (width, height)
    ///
    /// Errors: `Error::Configuration` if the arena does not fit the window,
    /// i.e. `radius` exceeds half the smaller window dimension, or is not positive.
    pub fn new(window: (f64, f64), radius: f64) -> Result<Self> {
        let (width, height) = window;
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(Error::config(format!(
                "window must have positive finite size, got {width} x {height}"
            )));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::config(format!("arena radius must be > 0, got {radius}")));
        }
        let limit = 0.5 * width.min(height);
        if radius > limit {
            return Err(Error::config(format!(
                "arena radius {radius} does not fit a {width} x {height} window (max {limit})"
            )));
        }
        Ok(Self {
            centre: Vector2::new(0.5 * width, 0.5 * height),
            radius,
        })
    }

    pub fn centre(&self) -> Vector2 {
        self.centre
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Boundary for CircleArena {
    fn constrain(&self, particle: &mut Particle, _damping: f64) -> bool {
        let r = particle.radius();
        let offset = particle.position() - self.centre;
        let distance = offset.norm();
        if distance + r <= self.radius {
            return false;
        }

        // A particle at the exact centre that is still too big has no
        // direction to move in; normalise gives zero and it stays put
        let reach = (self.radius - r).max(0.0);
        let target = self.centre + offset.normalise() * reach;
        particle.move_by(target - particle.position());
        true
    }

    fn contains(&self, centre: Vector2, radius: f64) -> bool {
        (centre - self.centre).norm() + radius <= self.radius
    }

    fn shape(&self) -> ArenaShape {
        ArenaShape::Circle {
            centre: self.centre,
            radius: self.radius,
        }
    }
}
