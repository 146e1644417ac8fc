//! The environment: particle ownership and the per-frame physics step
//!
//! Each call to [`Environment::update`] splits the frame into equal substeps
//! and runs, in order:
//! 1. clear collision flags and accumulated forces, apply gravity and extra terms
//! 2. position-Verlet integration
//! 3. distance-constraint projection (`constraint_iterations` passes)
//! 4. pairwise collision resolution
//! 5. boundary constraint
//!
//! Particle order is insertion order and never changes during an update, so
//! collision resolution is deterministic for a given sequence of adds.

use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::simulation::boundary::{ArenaShape, Boundary, BoxArena, CircleArena};
use crate::simulation::collision::{resolve_collisions, CollisionPolicy};
use crate::simulation::constraint::DistanceConstraint;
use crate::simulation::forces::{AccelSet, Acceleration, UniformGravity};
use crate::simulation::integrator::{substep_dt, verlet_integrator};
use crate::simulation::params::{validate_constraint_iterations, validate_damping, Parameters};
use crate::simulation::states::{Particle, ParticleId};
use crate::simulation::vector::{Vector2, VectorExt};

pub struct Environment {
    boundary: Box<dyn Boundary>,
    parameters: Parameters,
    particles: Vec<Particle>,
    index: HashMap<ParticleId, usize>, // id -> slot in `particles`
    constraints: Vec<DistanceConstraint>,
    forces: AccelSet,                  // terms on top of gravity
    accel_buf: Vec<Vector2>,
    next_id: u64,
    time: f64,
}

impl Environment {
    pub fn new(boundary: impl Boundary + 'static, parameters: Parameters) -> Result<Self> {
        parameters.validate()?;
        debug!("environment created: {:?}, {:?}", boundary.shape(), parameters);
        Ok(Self {
            boundary: Box::new(boundary),
            parameters,
            particles: Vec::new(),
            index: HashMap::new(),
            constraints: Vec::new(),
            forces: AccelSet::new(),
            accel_buf: Vec::new(),
            next_id: 0,
            time: 0.0,
        })
    }

    /// Box arena of `width` x `height` with default parameters
    pub fn boxed(width: f64, height: f64) -> Result<Self> {
        Self::new(BoxArena::new(width, height)?, Parameters::default())
    }

    /// Circle arena of `radius` centred in `window`, default parameters
    pub fn circular(window: (f64, f64), radius: f64) -> Result<Self> {
        Self::new(CircleArena::new(window, radius)?, Parameters::default())
    }

    /// Register an additional acceleration term
    pub fn with_acceleration<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.forces.push(term);
        self
    }

    // =====================================================================
    // particle set
    // =====================================================================

    /// Take ownership of `particle` and return its handle
    pub fn add(&mut self, mut particle: Particle) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        particle.set_id(id);
        self.index.insert(id, self.particles.len());
        self.particles.push(particle);
        id
    }

    /// Remove a particle and every link that references it
    ///
    /// Returns true iff the particle was present.
    pub fn remove(&mut self, id: ParticleId) -> bool {
        let Some(slot) = self.index.remove(&id) else {
            return false;
        };
        // keep insertion order
        self.particles.remove(slot);
        self.reindex();
        self.constraints.retain(|c| !c.involves(id));
        true
    }

    pub fn clear(&mut self) {
        debug!("clearing {} particles", self.particles.len());
        self.particles.clear();
        self.index.clear();
        self.constraints.clear();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (slot, p) in self.particles.iter().enumerate() {
            self.index.insert(p.id(), slot);
        }
    }

    /// Read-only view for renderers; positions change on every update
    pub fn get_objects(&self) -> &[Particle] {
        &self.particles
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.index.get(&id).map(|&slot| &self.particles[slot])
    }

    /// Move a particle to `position`, keeping its velocity
    ///
    /// Errors: `Error::UnknownParticle` if `id` is not present,
    /// `Error::Configuration` for a non-finite position.
    pub fn set_particle_position(&mut self, id: ParticleId, position: Vector2) -> Result<()> {
        if !position.all_finite() {
            return Err(Error::config("position must be finite"));
        }
        let slot = *self.index.get(&id).ok_or(Error::UnknownParticle(id))?;
        self.particles[slot].set_position(position);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    // =====================================================================
    // links
    // =====================================================================

    /// Tie two particles at their current separation
    pub fn link(&mut self, a: ParticleId, b: ParticleId) -> Result<()> {
        let pa = self.get(a).ok_or(Error::UnknownParticle(a))?;
        let pb = self.get(b).ok_or(Error::UnknownParticle(b))?;
        let distance = pa.distance_to(pb);
        self.add_constraint(DistanceConstraint::new(a, b, distance)?)
    }

    pub fn add_constraint(&mut self, constraint: DistanceConstraint) -> Result<()> {
        let (a, b) = constraint.endpoints();
        for id in [a, b] {
            if !self.index.contains_key(&id) {
                return Err(Error::UnknownParticle(id));
            }
        }
        self.constraints.push(constraint);
        Ok(())
    }

    pub fn constraints(&self) -> &[DistanceConstraint] {
        &self.constraints
    }

    // =====================================================================
    // stepping
    // =====================================================================

    /// Advance the simulation by `dt`, split into `substeps` equal intervals
    ///
    /// A zero or negative `dt` leaves every particle untouched.
    pub fn update(&mut self, dt: f64, substeps: u32) {
        if !dt.is_finite() {
            warn!("ignoring update with non-finite dt {dt}");
            return;
        }
        if dt <= 0.0 || self.particles.is_empty() {
            return;
        }

        let (sub_dt, n) = substep_dt(dt, substeps);
        for _ in 0..n {
            self.substep(sub_dt);
        }
    }

    fn substep(&mut self, dt: f64) {
        for p in self.particles.iter_mut() {
            p.reset_collided();
        }

        self.apply_forces();
        verlet_integrator(&mut self.particles, dt);
        self.apply_links();
        self.resolve_collisions();
        self.apply_boundary();

        self.time += dt;
    }

    /// Clear accumulated forces and accumulate gravity plus registered terms
    fn apply_forces(&mut self) {
        let n = self.particles.len();
        self.accel_buf.resize(n, Vector2::zeros());
        self.forces.accumulate_accels(self.time, &self.particles, &mut self.accel_buf);
        UniformGravity { g: self.parameters.gravity }.acceleration(
            self.time,
            &self.particles,
            &mut self.accel_buf,
        );

        for (p, a) in self.particles.iter_mut().zip(self.accel_buf.iter()) {
            p.clear_forces();
            p.accelerate(*a);
        }
    }

    fn apply_links(&mut self) {
        for _ in 0..self.parameters.constraint_iterations {
            for c in &self.constraints {
                if let Err(e) = c.apply(&mut self.particles, &self.index) {
                    trace!("skipping link {:?}: {}", c.endpoints(), e);
                }
            }
        }
    }

    /// One collision pass under the configured policy; returns resolved pair count
    pub fn resolve_collisions(&mut self) -> usize {
        resolve_collisions(&mut self.particles, self.parameters.collision)
    }

    /// Push every particle back inside the arena; returns the corrected count
    pub fn apply_boundary(&mut self) -> usize {
        let damping = self.parameters.damping;
        let boundary = &self.boundary;
        self.particles
            .iter_mut()
            .map(|p| boundary.constrain(p, damping))
            .filter(|&corrected| corrected)
            .count()
    }

    // =====================================================================
    // configuration
    // =====================================================================

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn gravity(&self) -> Vector2 {
        self.parameters.gravity
    }

    /// Errors: `Error::Configuration` for a non-finite vector
    pub fn set_gravity(&mut self, gravity: Vector2) -> Result<()> {
        if !gravity.all_finite() {
            return Err(Error::config("gravity must be finite"));
        }
        debug!("gravity set to ({}, {})", gravity.x, gravity.y);
        self.parameters.gravity = gravity;
        Ok(())
    }

    pub fn damping(&self) -> f64 {
        self.parameters.damping
    }

    /// Errors: `Error::Configuration` outside [0, 1]
    pub fn set_damping(&mut self, damping: f64) -> Result<()> {
        validate_damping(damping)?;
        debug!("damping set to {damping}");
        self.parameters.damping = damping;
        Ok(())
    }

    /// Alias of [`Environment::set_damping`]
    pub fn set_restitution(&mut self, restitution: f64) -> Result<()> {
        self.set_damping(restitution)
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.parameters.collision
    }

    pub fn set_collision_policy(&mut self, policy: CollisionPolicy) {
        self.parameters.collision = policy;
    }

    /// Errors: `Error::Configuration` for zero iterations
    pub fn set_constraint_iterations(&mut self, iterations: usize) -> Result<()> {
        validate_constraint_iterations(iterations)?;
        self.parameters.constraint_iterations = iterations;
        Ok(())
    }

    pub fn boundary(&self) -> &dyn Boundary {
        self.boundary.as_ref()
    }

    pub fn shape(&self) -> ArenaShape {
        self.boundary.shape()
    }

    /// Whether a circle at `point` with `radius` fits inside the arena
    pub fn contains(&self, point: Vector2, radius: f64) -> bool {
        self.boundary.contains(point, radius)
    }

    // =====================================================================
    // diagnostics
    // =====================================================================

    /// Simulated time advanced so far
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn total_momentum(&self) -> Vector2 {
        self.particles.iter().map(Particle::momentum).sum()
    }

    pub fn total_kinetic_energy(&self) -> f64 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }
}
