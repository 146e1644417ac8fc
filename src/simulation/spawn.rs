//! Spawn rules: how a "spawn at point P" request becomes a particle
//!
//! - velocity: fixed configured velocity, or uniform in [-vmax, vmax] per axis
//! - radius: the default, or uniform within +-10% of it
//! - colour: white, or the next hue on the wheel (step 0.05, wrapping at 1)
//!
//! Velocities here are per second; the caller passes the step duration used
//! to turn them into the per-step displacement particles store.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::simulation::states::{Colour, Particle};
use crate::simulation::vector::{Vector2, VectorExt};

pub const DEFAULT_VMAX: f64 = 500.0;
pub const DEFAULT_RADIUS: f64 = 15.0;
pub const HUE_STEP: f64 = 0.05;
pub const RADIUS_SPREAD: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnConfig {
    pub vmax: f64,                        // per-axis random speed cap, units / s
    pub default_radius: f64,
    pub mass: f64,
    pub fixed_velocity: Option<Vector2>,  // units / s; overrides the random velocity
    pub random_radius: bool,
    pub cycle_colours: bool,
    pub hue_step: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            vmax: DEFAULT_VMAX,
            default_radius: DEFAULT_RADIUS,
            mass: 1.0,
            fixed_velocity: None,
            random_radius: false,
            cycle_colours: false,
            hue_step: HUE_STEP,
        }
    }
}

impl SpawnConfig {
    pub fn validate(&self) -> Result<()> {
        validate_vmax(self.vmax)?;
        validate_radius(self.default_radius)?;
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(Error::config(format!("spawn mass must be > 0, got {}", self.mass)));
        }
        if let Some(v) = self.fixed_velocity {
            if !v.all_finite() {
                return Err(Error::config("spawn velocity must be finite"));
            }
        }
        Ok(())
    }
}

fn validate_vmax(vmax: f64) -> Result<()> {
    if !vmax.is_finite() || vmax < 0.0 {
        return Err(Error::config(format!("vmax must be finite and >= 0, got {vmax}")));
    }
    Ok(())
}

fn validate_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::config(format!("default radius must be > 0, got {radius}")));
    }
    Ok(())
}

pub struct SpawnPolicy {
    config: SpawnConfig,
    hue: f64,
    rng: StdRng,
}

impl SpawnPolicy {
    /// `seed` makes the random velocities and radii reproducible
    pub fn new(config: SpawnConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self { config, hue: 0.0, rng })
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Radius for the next spawn
    pub fn next_radius(&mut self) -> f64 {
        let r = self.config.default_radius;
        if self.config.random_radius {
            self.rng.gen_range(r * (1.0 - RADIUS_SPREAD)..=r * (1.0 + RADIUS_SPREAD))
        } else {
            r
        }
    }

    /// Spawn velocity in units / s
    pub fn next_velocity(&mut self) -> Vector2 {
        if let Some(v) = self.config.fixed_velocity {
            return v;
        }
        let vmax = self.config.vmax;
        if vmax == 0.0 {
            return Vector2::zeros();
        }
        Vector2::new(
            self.rng.gen_range(-vmax..=vmax),
            self.rng.gen_range(-vmax..=vmax),
        )
    }

    /// Advance the hue counter and return its colour
    pub fn next_colour(&mut self) -> Colour {
        self.hue = (self.hue + self.config.hue_step).rem_euclid(1.0);
        Colour::from_hsv(self.hue, 1.0, 1.0)
    }

    /// Build a fully configured particle at `at`
    ///
    /// `velocity` (units / s) overrides the policy velocity and `mass` the
    /// configured mass. `step_dt` is the integration step the velocity is
    /// scaled by.
    pub fn build(
        &mut self,
        at: Vector2,
        radius: f64,
        velocity: Option<Vector2>,
        mass: Option<f64>,
        step_dt: f64,
    ) -> Result<Particle> {
        let velocity = velocity.unwrap_or_else(|| self.next_velocity());
        let mass = mass.unwrap_or(self.config.mass);
        let mut particle = Particle::new(mass, radius, at)?.with_velocity(velocity * step_dt);
        if self.config.cycle_colours {
            particle.set_colour(self.next_colour());
        }
        Ok(particle)
    }

    // =====================================================================
    // setters
    // =====================================================================

    pub fn set_vmax(&mut self, vmax: f64) -> Result<()> {
        validate_vmax(vmax)?;
        debug!("vmax set to {vmax}");
        self.config.vmax = vmax;
        Ok(())
    }

    pub fn set_default_radius(&mut self, radius: f64) -> Result<()> {
        validate_radius(radius)?;
        debug!("default radius set to {radius}");
        self.config.default_radius = radius;
        Ok(())
    }

    /// Spawn every particle with this fixed velocity (units / s)
    pub fn constrain_velocity(&mut self, velocity: Vector2) -> Result<()> {
        if !velocity.all_finite() {
            return Err(Error::config("spawn velocity must be finite"));
        }
        self.config.fixed_velocity = Some(velocity);
        Ok(())
    }

    /// Go back to random spawn velocities
    pub fn release_velocity(&mut self) {
        self.config.fixed_velocity = None;
    }

    pub fn set_random_radius(&mut self, random: bool) {
        self.config.random_radius = random;
    }

    pub fn set_cycle_colours(&mut self, cycle: bool) {
        self.config.cycle_colours = cycle;
    }
}
