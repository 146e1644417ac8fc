//! Configuration types for loading scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`EngineConfig`]     – window/arena, frame budget, collision policy, spawning mode
//! - [`ParametersConfig`] – gravity, damping and the spawn rules
//! - [`ParticleConfig`]   – optional initial particles
//! - [`LinkConfig`]       – optional distance links between initial particles
//! - [`ScenarioConfig`]   – top-level wrapper
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   width: 800.0
//!   height: 800.0
//!   fps: 120
//!   substeps: 2
//!   arena: "box"            # or "circle"
//!   arena_radius: 320.0     # circle only, default width / 2.5
//!   collision: "positional" # or "impulse"
//!
//! parameters:
//!   gravity: [0.0, 500.0]
//!   damping: 0.9
//!   vmax: 500.0
//!   default_radius: 15.0
//!   cycle_colours: true
//!   seed: 42
//!
//! particles:
//!   - x: [400.0, 100.0]
//!     v: [0.0, 0.0]
//!     m: 1.0
//!     radius: 15.0
//!
//! links:
//!   - a: 0
//!     b: 1
//! ```
//!
//! Every field has a default. Velocities are per second; the scenario
//! builder scales them to the integration step.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::collision::CollisionPolicy;

/// Arena shape: `arena: "box"` or `arena: "circle"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArenaConfig {
    #[serde(rename = "box")]
    #[default]
    Box,

    #[serde(rename = "circle")]
    Circle,
}

/// Collision policy: `collision: "positional"` or `collision: "impulse"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionConfig {
    #[serde(rename = "positional")] // half-overlap position push, cheap and stable
    #[default]
    Positional,

    #[serde(rename = "impulse")] // elastic exchange along the contact normal
    Impulse,
}

impl From<CollisionConfig> for CollisionPolicy {
    fn from(c: CollisionConfig) -> Self {
        match c {
            CollisionConfig::Positional => CollisionPolicy::Positional,
            CollisionConfig::Impulse => CollisionPolicy::Impulse,
        }
    }
}

/// Window/arena and frame settings
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub width: f64,                   // window width, also the box width
    pub height: f64,                  // window height, also the box height
    pub fps: u32,                     // frames per second, frame dt = 1 / fps
    pub substeps: u32,                // integration substeps per frame
    pub arena: ArenaConfig,
    pub arena_radius: Option<f64>,    // circle arena radius, default width / 2.5
    pub collision: CollisionConfig,
    pub constraint_iterations: usize, // link projections per substep
    pub object_limit: Option<usize>,  // cap on spawned objects
    pub auto_spawn: bool,             // spawn at the centre every 24 frames
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
            fps: 120,
            substeps: 2,
            arena: ArenaConfig::Box,
            arena_radius: None,
            collision: CollisionConfig::Positional,
            constraint_iterations: 1,
            object_limit: None,
            auto_spawn: false,
        }
    }
}

/// Physical parameters and spawn rules
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub gravity: [f64; 2],                // units / s^2, +y is down
    pub damping: f64,                     // wall restitution in [0, 1]
    pub vmax: f64,                        // random spawn speed cap per axis
    pub default_radius: f64,
    pub mass: f64,
    pub spawn_velocity: Option<[f64; 2]>, // fixed spawn velocity, units / s
    pub random_radius: bool,              // default radius +-10%
    pub cycle_colours: bool,
    pub seed: Option<u64>,                // reproducible spawning
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, 500.0],
            damping: 1.0,
            vmax: 500.0,
            default_radius: 15.0,
            mass: 1.0,
            spawn_velocity: None,
            random_radius: false,
            cycle_colours: false,
            seed: None,
        }
    }
}

/// Initial state of one particle
#[derive(Deserialize, Debug, Clone)]
pub struct ParticleConfig {
    pub x: [f64; 2],                 // position
    #[serde(default)]
    pub v: [f64; 2],                 // velocity, units / s
    #[serde(default = "default_mass")]
    pub m: f64,                      // mass
    pub radius: f64,
    #[serde(default)]
    pub colour: Option<[i32; 3]>,    // validated against [0, 255]
}

fn default_mass() -> f64 {
    1.0
}

/// Distance link between two entries of `particles`, by index
#[derive(Deserialize, Debug, Clone)]
pub struct LinkConfig {
    pub a: usize,
    pub b: usize,
    #[serde(default)]
    pub distance: Option<f64>, // default: separation at load time
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub particles: Vec<ParticleConfig>,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}
