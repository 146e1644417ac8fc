//! Physical and numerical parameters of an environment
//!
//! `Parameters` holds runtime settings:
//! - constant gravity (units / s^2, +y down),
//! - wall damping / restitution in [0, 1],
//! - collision policy and constraint iteration count

use crate::error::{Error, Result};
use crate::simulation::collision::CollisionPolicy;
use crate::simulation::vector::{Vector2, VectorExt};

pub const DEFAULT_GRAVITY: f64 = 500.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub gravity: Vector2,             // constant acceleration on every particle
    pub damping: f64,                 // fraction of velocity kept after a wall bounce
    pub collision: CollisionPolicy,   // positional or impulse
    pub constraint_iterations: usize, // link projections per substep
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            gravity: Vector2::new(0.0, DEFAULT_GRAVITY),
            damping: 1.0,
            collision: CollisionPolicy::Positional,
            constraint_iterations: 1,
        }
    }
}

impl Parameters {
    pub fn validate(&self) -> Result<()> {
        if !self.gravity.all_finite() {
            return Err(Error::config("gravity must be finite"));
        }
        validate_damping(self.damping)?;
        validate_constraint_iterations(self.constraint_iterations)?;
        Ok(())
    }
}

pub(crate) fn validate_damping(damping: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&damping) {
        return Err(Error::config(format!("damping must lie in [0, 1], got {damping}")));
    }
    Ok(())
}

pub(crate) fn validate_constraint_iterations(iterations: usize) -> Result<()> {
    if iterations == 0 {
        return Err(Error::config("constraint iterations must be >= 1"));
    }
    Ok(())
}
