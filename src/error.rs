//! Error type shared by the simulation kernel and the scenario loader
//!
//! Construction-time problems surface as [`Error::Configuration`] or
//! [`Error::OutOfRange`]. [`Error::DegenerateGeometry`] is only produced
//! inside a frame and is always recovered by skipping the pair or
//! constraint for the current substep.

use thiserror::Error;

use crate::simulation::states::ParticleId;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid construction-time parameter (mass, radius, arena size, ...)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Colour channel outside [0, 255]
    #[error("colour channel {channel} out of range [0, 255]: {value}")]
    OutOfRange { channel: &'static str, value: i32 },

    /// Zero-length separation or normal; recovered locally
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    /// Particle handle not present in the environment
    #[error("unknown particle {0}")]
    UnknownParticle(ParticleId),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_names_the_channel() {
        let e = Error::OutOfRange { channel: "green", value: 300 };
        let msg = e.to_string();
        assert!(msg.contains("green"));
        assert!(msg.contains("300"));
    }
}
