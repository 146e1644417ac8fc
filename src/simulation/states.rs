//! Particle state for the kernel
//!
//! A `Particle` ("atom") carries fixed mass and radius plus position-Verlet
//! motion state:
//! - `position` / `previous_position`: velocity is their difference, i.e. the
//!   displacement covered during the last integration step
//! - `acceleration`: accumulated for the next step, cleared afterwards
//!
//! Callers only ever see velocity through [`Particle::velocity`] and
//! [`Particle::set_velocity`]; setting a velocity rewrites
//! `previous_position = position - velocity`.

use std::fmt;

use crate::error::{Error, Result};
use crate::simulation::vector::{Vector2, VectorExt};

/// Stable handle of a particle inside one `Environment`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 8-bit RGB colour tag used by renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const WHITE: Colour = Colour { r: 255, g: 255, b: 255 };

    /// Build a colour from wide integer channels, rejecting anything outside [0, 255]
    pub fn try_new(r: i32, g: i32, b: i32) -> Result<Self> {
        Ok(Self {
            r: channel("red", r)?,
            g: channel("green", g)?,
            b: channel("blue", b)?,
        })
    }

    /// Convert HSV (each in [0, 1], hue wrapping) to RGB
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let h6 = h.rem_euclid(1.0) * 6.0;
        let sector = h6.floor();
        let f = h6 - sector;

        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match sector as u8 % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        let to_u8 = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        Self { r: to_u8(r), g: to_u8(g), b: to_u8(b) }
    }
}

impl Default for Colour {
    fn default() -> Self {
        Colour::WHITE
    }
}

fn channel(name: &'static str, value: i32) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::OutOfRange { channel: name, value })
}

#[derive(Debug, Clone)]
pub struct Particle {
    id: ParticleId,              // assigned by the owning environment
    mass: f64,                   // > 0, fixed
    radius: f64,                 // > 0, fixed
    position: Vector2,           // current position
    previous_position: Vector2,  // position one step ago
    acceleration: Vector2,       // accumulated for the next step
    colour: Colour,
    collided: bool,              // set once resolved in the current substep
}

impl Particle {
    /// Create a particle at rest
    ///
    /// Errors:
    /// - `Error::Configuration` if `mass` or `radius` is non-positive or not finite,
    ///   or if `position` is not finite
    pub fn new(mass: f64, radius: f64, position: Vector2) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::config(format!("mass must be finite and > 0, got {mass}")));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::config(format!("radius must be finite and > 0, got {radius}")));
        }
        if !position.all_finite() {
            return Err(Error::config("position must be finite"));
        }
        Ok(Self {
            id: ParticleId::default(),
            mass,
            radius,
            position,
            previous_position: position,
            acceleration: Vector2::zeros(),
            colour: Colour::WHITE,
            collided: false,
        })
    }

    /// Builder form of [`Particle::set_velocity`]
    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.set_velocity(velocity);
        self
    }

    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = colour;
        self
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ParticleId) {
        self.id = id;
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn previous_position(&self) -> Vector2 {
        self.previous_position
    }

    /// Displacement covered over the last integration step
    pub fn velocity(&self) -> Vector2 {
        self.position - self.previous_position
    }

    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.previous_position = self.position - velocity;
    }

    /// Teleport, keeping the current velocity
    pub fn set_position(&mut self, position: Vector2) {
        let velocity = self.velocity();
        self.position = position;
        self.previous_position = position - velocity;
    }

    /// Shift position only; the shift is absorbed into the implicit velocity
    pub fn move_by(&mut self, delta: Vector2) {
        self.position += delta;
    }

    /// Shift position and previous position together (velocity unchanged)
    pub fn translate(&mut self, delta: Vector2) {
        self.position += delta;
        self.previous_position += delta;
    }

    pub fn acceleration(&self) -> Vector2 {
        self.acceleration
    }

    /// Accumulate a force; converted to acceleration through the mass
    pub fn apply_force(&mut self, force: Vector2) {
        self.acceleration += force / self.mass;
    }

    /// Accumulate a mass-independent acceleration
    pub fn accelerate(&mut self, acceleration: Vector2) {
        self.acceleration += acceleration;
    }

    pub fn clear_forces(&mut self) {
        self.acceleration = Vector2::zeros();
    }

    /// Position-Verlet step: x' = x + (x - x_prev) + a dt^2
    pub fn step(&mut self, dt: f64) {
        let displacement = self.position - self.previous_position;
        let next = self.position + displacement + self.acceleration * (dt * dt);
        self.previous_position = self.position;
        self.position = next;
        self.clear_forces();
    }

    pub fn distance_to(&self, other: &Particle) -> f64 {
        (other.position - self.position).norm()
    }

    pub fn momentum(&self) -> Vector2 {
        self.velocity() * self.mass
    }

    /// 0.5 m |v|^2
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity().norm_squared()
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    /// Set the colour from wide integer channels
    ///
    /// Errors: `Error::OutOfRange` if any channel is outside [0, 255]; the
    /// current colour is left untouched on failure.
    pub fn paint(&mut self, rgb: (i32, i32, i32)) -> Result<()> {
        self.colour = Colour::try_new(rgb.0, rgb.1, rgb.2)?;
        Ok(())
    }

    pub fn set_colour(&mut self, colour: Colour) {
        self.colour = colour;
    }

    pub fn has_collided(&self) -> bool {
        self.collided
    }

    pub(crate) fn mark_collided(&mut self) {
        self.collided = true;
    }

    pub(crate) fn reset_collided(&mut self) {
        self.collided = false;
    }
}
