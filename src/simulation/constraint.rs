//! Rigid distance links between two particles
//!
//! A link refers to its endpoints by `ParticleId`, never by ownership. It is
//! enforced by projecting both positions along the separation axis, half the
//! correction each, so the implicit Verlet velocity picks up the change.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::simulation::collision::pair_mut;
use crate::simulation::states::{Particle, ParticleId};
use crate::simulation::vector::{VectorExt, EPSILON};

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceConstraint {
    a: ParticleId,
    b: ParticleId,
    target_distance: f64, // >= 0, fixed
}

impl DistanceConstraint {
    /// Errors: `Error::Configuration` for a negative or non-finite target, or if
    /// both ends are the same particle
    pub fn new(a: ParticleId, b: ParticleId, target_distance: f64) -> Result<Self> {
        if !target_distance.is_finite() || target_distance < 0.0 {
            return Err(Error::config(format!(
                "link distance must be finite and >= 0, got {target_distance}"
            )));
        }
        if a == b {
            return Err(Error::config(format!("cannot link particle {a} to itself")));
        }
        Ok(Self { a, b, target_distance })
    }

    pub fn endpoints(&self) -> (ParticleId, ParticleId) {
        (self.a, self.b)
    }

    pub fn target_distance(&self) -> f64 {
        self.target_distance
    }

    pub fn involves(&self, id: ParticleId) -> bool {
        self.a == id || self.b == id
    }

    /// Project both endpoints toward the target distance
    ///
    /// `index` maps ids to slots in `particles`. Returns `Ok(true)` when a
    /// correction was applied and `Ok(false)` when the link was already
    /// satisfied. Coincident endpoints give `Error::DegenerateGeometry` and
    /// nothing moves.
    pub fn apply(&self, particles: &mut [Particle], index: &HashMap<ParticleId, usize>) -> Result<bool> {
        let i = *index.get(&self.a).ok_or(Error::UnknownParticle(self.a))?;
        let j = *index.get(&self.b).ok_or(Error::UnknownParticle(self.b))?;
        let (pa, pb) = pair_mut(particles, i, j);

        let delta = pb.position() - pa.position();
        let distance = delta.norm();
        let error = distance - self.target_distance;
        if error.abs() < EPSILON {
            return Ok(false);
        }

        let axis = delta.direction()?;
        let correction = axis * (0.5 * error);
        pa.move_by(correction);
        pb.move_by(-correction);
        Ok(true)
    }
}
