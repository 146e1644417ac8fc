//! Engine façade between the input/render shell and the kernel
//!
//! Owns the environment, the spawn policy and the frame settings (fps,
//! substeps, object limit, auto-spawn). The shell turns clicks into
//! [`Engine::spawn_at`] and calls [`Engine::tick`] once per rendered frame.

use log::debug;

use crate::error::{Error, Result};
use crate::simulation::boundary::ArenaShape;
use crate::simulation::environment::Environment;
use crate::simulation::spawn::SpawnPolicy;
use crate::simulation::states::ParticleId;
use crate::simulation::vector::Vector2;

/// Frames between two automatic spawns
pub const AUTO_SPAWN_INTERVAL: u64 = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub width: f64,
    pub height: f64,
    pub fps: u32,                    // frame budget, frame dt = 1 / fps
    pub substeps: u32,               // >= 1
    pub object_limit: Option<usize>,
    pub auto_spawn: bool,            // spawn at the centre, manual spawning off
    pub auto_spawn_interval: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
            fps: 120,
            substeps: 2,
            object_limit: None,
            auto_spawn: false,
            auto_spawn_interval: AUTO_SPAWN_INTERVAL,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(Error::config("fps must be > 0"));
        }
        if self.substeps == 0 {
            return Err(Error::config("substeps must be >= 1"));
        }
        if self.auto_spawn_interval == 0 {
            return Err(Error::config("auto spawn interval must be >= 1"));
        }
        Ok(())
    }
}

pub struct Engine {
    environment: Environment,
    spawner: SpawnPolicy,
    settings: EngineSettings,
    frames: u64,
    paused: bool,
}

impl Engine {
    pub fn new(environment: Environment, spawner: SpawnPolicy, settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            environment,
            spawner,
            settings,
            frames: 0,
            paused: false,
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    pub fn spawner(&self) -> &SpawnPolicy {
        &self.spawner
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Duration of one rendered frame
    pub fn frame_dt(&self) -> f64 {
        1.0 / f64::from(self.settings.fps)
    }

    /// Duration of one integration substep; per-second velocities are scaled by it
    pub fn step_dt(&self) -> f64 {
        self.frame_dt() / f64::from(self.settings.substeps)
    }

    pub fn centre(&self) -> Vector2 {
        match self.environment.shape() {
            ArenaShape::Circle { centre, .. } => centre,
            ArenaShape::Rectangle { .. } => {
                Vector2::new(0.5 * self.settings.width, 0.5 * self.settings.height)
            }
        }
    }

    pub fn object_count(&self) -> usize {
        self.environment.len()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        debug!("paused: {}", self.paused);
        self.paused
    }

    fn below_limit(&self) -> bool {
        self.settings
            .object_limit
            .map_or(true, |limit| self.object_count() < limit)
    }

    // =====================================================================
    // spawning
    // =====================================================================

    /// Manual spawn request at `point`, as from a mouse click
    ///
    /// Returns `Ok(None)` when the request is refused: paused, auto-spawn on,
    /// object limit reached, or the new circle would not fit a circle arena.
    pub fn spawn_at(&mut self, point: Vector2) -> Result<Option<ParticleId>> {
        if self.paused || self.settings.auto_spawn || !self.below_limit() {
            return Ok(None);
        }
        let radius = self.spawner.next_radius();
        // box spawns are clamped by the boundary pass instead
        let circular = matches!(self.environment.shape(), ArenaShape::Circle { .. });
        if circular && !self.environment.contains(point, radius) {
            debug!("spawn at ({}, {}) refused: outside arena", point.x, point.y);
            return Ok(None);
        }
        self.spawn_object(point, radius, None, None).map(Some)
    }

    /// Spawn unconditionally; `velocity` is in units / s, `None` uses the spawn policy
    pub fn spawn_object(
        &mut self,
        point: Vector2,
        radius: f64,
        velocity: Option<Vector2>,
        mass: Option<f64>,
    ) -> Result<ParticleId> {
        let step_dt = self.step_dt();
        let particle = self.spawner.build(point, radius, velocity, mass, step_dt)?;
        let id = self.environment.add(particle);
        debug!("spawned particle {id} at ({}, {}) r={radius}", point.x, point.y);
        Ok(id)
    }

    /// One rendered frame: optional auto-spawn, then one physics update
    ///
    /// The frame counter advances even while paused. Returns true if physics
    /// advanced (i.e. not paused).
    pub fn tick(&mut self) -> Result<bool> {
        if self.paused {
            self.frames += 1;
            return Ok(false);
        }
        if self.settings.auto_spawn
            && self.below_limit()
            && self.frames % self.settings.auto_spawn_interval == 0
        {
            let radius = self.spawner.next_radius();
            let centre = self.centre();
            self.spawn_object(centre, radius, None, None)?;
        }

        self.environment.update(self.frame_dt(), self.settings.substeps);
        self.frames += 1;
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.environment.clear();
    }

    // =====================================================================
    // setters
    // =====================================================================

    pub fn set_gravity(&mut self, gravity: Vector2) -> Result<()> {
        self.environment.set_gravity(gravity)
    }

    pub fn set_damping(&mut self, damping: f64) -> Result<()> {
        self.environment.set_damping(damping)
    }

    pub fn set_vmax(&mut self, vmax: f64) -> Result<()> {
        self.spawner.set_vmax(vmax)
    }

    pub fn set_default_radius(&mut self, radius: f64) -> Result<()> {
        self.spawner.set_default_radius(radius)
    }

    pub fn constrain_velocity(&mut self, velocity: Vector2) -> Result<()> {
        self.spawner.constrain_velocity(velocity)
    }

    pub fn release_velocity(&mut self) {
        self.spawner.release_velocity();
    }

    pub fn random_radius(&mut self, random: bool) {
        self.spawner.set_random_radius(random);
    }

    pub fn cycle_colours(&mut self, cycle: bool) {
        self.spawner.set_cycle_colours(cycle);
    }

    pub fn set_object_limit(&mut self, limit: Option<usize>) {
        self.settings.object_limit = limit;
    }

    pub fn auto_spawn(&mut self, auto: bool) {
        self.settings.auto_spawn = auto;
    }
}
