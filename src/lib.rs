pub mod error;
pub mod simulation;
pub mod configuration;
#[cfg(feature = "viewer")]
pub mod visualization;
pub mod benchmark;

pub use error::{Error, Result};

pub use simulation::vector::{Vector2, VectorExt};
pub use simulation::states::{Colour, Particle, ParticleId};
pub use simulation::constraint::DistanceConstraint;
pub use simulation::forces::{Acceleration, AccelSet, UniformGravity};
pub use simulation::collision::{resolve_collisions, CollisionPolicy};
pub use simulation::boundary::{ArenaShape, Boundary, BoxArena, CircleArena, Edge};
pub use simulation::params::Parameters;
pub use simulation::environment::Environment;
pub use simulation::spawn::{SpawnConfig, SpawnPolicy};
pub use simulation::engine::{Engine, EngineSettings};
pub use simulation::scenario::Scenario;

pub use configuration::config::{ScenarioConfig, EngineConfig, ParametersConfig, ParticleConfig, LinkConfig};

#[cfg(feature = "viewer")]
pub use visualization::viewer::run_viewer;

pub use benchmark::benchmark::{bench_collisions, bench_update};
