//! Build a ready-to-run engine from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario`
//! holding an [`Engine`] with:
//! - the arena (box or circle) and physical parameters
//! - the spawn policy
//! - initial particles (velocities scaled from per second to per step)
//! - distance links between initial particles
//!
//! With the `viewer` feature the scenario is a Bevy `Resource`.

use log::debug;

use crate::configuration::config::{ArenaConfig, ScenarioConfig};
use crate::error::{Error, Result};
use crate::simulation::boundary::{BoxArena, CircleArena};
use crate::simulation::constraint::DistanceConstraint;
use crate::simulation::engine::{Engine, EngineSettings, AUTO_SPAWN_INTERVAL};
use crate::simulation::environment::Environment;
use crate::simulation::params::Parameters;
use crate::simulation::spawn::{SpawnConfig, SpawnPolicy, HUE_STEP};
use crate::simulation::states::{Colour, Particle, ParticleId};
use crate::simulation::vector::Vector2;

/// Default circle arena radius as a fraction of the window width
pub const CIRCLE_RADIUS_DIVISOR: f64 = 2.5;

#[cfg_attr(feature = "viewer", derive(bevy::prelude::Resource))]
pub struct Scenario {
    pub engine: Engine,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        let e_cfg = cfg.engine;
        let p_cfg = cfg.parameters;

        // Parameters (runtime) from ParametersConfig
        let parameters = Parameters {
            gravity: Vector2::from(p_cfg.gravity),
            damping: p_cfg.damping,
            collision: e_cfg.collision.into(),
            constraint_iterations: e_cfg.constraint_iterations,
        };

        // Arena + environment
        let window = (e_cfg.width, e_cfg.height);
        let mut environment = match e_cfg.arena {
            ArenaConfig::Box => Environment::new(BoxArena::new(e_cfg.width, e_cfg.height)?, parameters)?,
            ArenaConfig::Circle => {
                let radius = e_cfg.arena_radius.unwrap_or(e_cfg.width / CIRCLE_RADIUS_DIVISOR);
                Environment::new(CircleArena::new(window, radius)?, parameters)?
            }
        };

        let settings = EngineSettings {
            width: e_cfg.width,
            height: e_cfg.height,
            fps: e_cfg.fps,
            substeps: e_cfg.substeps,
            object_limit: e_cfg.object_limit,
            auto_spawn: e_cfg.auto_spawn,
            auto_spawn_interval: AUTO_SPAWN_INTERVAL,
        };
        settings.validate()?;
        let step_dt = 1.0 / (f64::from(settings.fps) * f64::from(settings.substeps));

        // Initial particles, keeping config order for the links below
        let mut ids: Vec<ParticleId> = Vec::with_capacity(cfg.particles.len());
        for pc in &cfg.particles {
            let velocity = Vector2::from(pc.v) * step_dt;
            let mut particle = Particle::new(pc.m, pc.radius, Vector2::from(pc.x))?.with_velocity(velocity);
            if let Some([r, g, b]) = pc.colour {
                particle.set_colour(Colour::try_new(r, g, b)?);
            }
            ids.push(environment.add(particle));
        }

        for link in &cfg.links {
            let lookup = |i: usize| {
                ids.get(i)
                    .copied()
                    .ok_or_else(|| Error::config(format!("link refers to missing particle index {i}")))
            };
            let (a, b) = (lookup(link.a)?, lookup(link.b)?);
            match link.distance {
                Some(d) => environment.add_constraint(DistanceConstraint::new(a, b, d)?)?,
                None => environment.link(a, b)?,
            }
        }

        let spawn = SpawnConfig {
            vmax: p_cfg.vmax,
            default_radius: p_cfg.default_radius,
            mass: p_cfg.mass,
            fixed_velocity: p_cfg.spawn_velocity.map(Vector2::from),
            random_radius: p_cfg.random_radius,
            cycle_colours: p_cfg.cycle_colours,
            hue_step: HUE_STEP,
        };
        let spawner = SpawnPolicy::new(spawn, p_cfg.seed)?;

        debug!(
            "scenario built: {} particles, {} links",
            environment.len(),
            environment.constraints().len()
        );

        Ok(Self {
            engine: Engine::new(environment, spawner, settings)?,
        })
    }
}
