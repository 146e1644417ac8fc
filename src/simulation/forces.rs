//! Acceleration contributors for the environment
//!
//! Gravity is the only built-in term; further terms can be registered on an
//! `Environment` and are summed with it every substep.

use crate::simulation::states::Particle;
use crate::simulation::vector::Vector2;

/// Trait for acceleration sources
/// Implementations add their contribution into `out[i]` for each particle
pub trait Acceleration {
    fn acceleration(&self, t: f64, particles: &[Particle], out: &mut [Vector2]);
}

/// Collection of acceleration terms
/// Contributions of all terms are summed into one acceleration per particle
#[derive(Default)]
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.push(term);
        self
    }

    pub fn push<T>(&mut self, term: T)
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total accelerations at time `t`
    /// - `out[i]` is overwritten with the sum of all terms for particle `i`
    pub fn accumulate_accels(&self, t: f64, particles: &[Particle], out: &mut [Vector2]) {
        // Zero buffer
        for a in out.iter_mut() {
            *a = Vector2::zeros();
        }
        for term in &self.terms {
            term.acceleration(t, particles, out);
        }
    }
}

/// Constant acceleration applied to every particle regardless of mass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformGravity {
    pub g: Vector2, // +y points down the screen
}

impl Acceleration for UniformGravity {
    fn acceleration(&self, _t: f64, particles: &[Particle], out: &mut [Vector2]) {
        for a in out.iter_mut().take(particles.len()) {
            *a += self.g;
        }
    }
}
