pub mod vector;
pub mod states;
pub mod constraint;
pub mod forces;
pub mod integrator;
pub mod collision;
pub mod boundary;
pub mod params;
pub mod environment;
pub mod spawn;
pub mod engine;
pub mod scenario;
