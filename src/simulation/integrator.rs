//! Fixed-step time integration
//!
//! Position Verlet only. A semi-implicit Euler step (`v += a dt; x += v dt`)
//! written against the implicit velocity `x - x_prev` collapses to the same
//! recurrence for a fixed substep, so there is a single scheme.

use crate::simulation::states::Particle;

/// Advance every particle by `dt` using position Verlet:
/// x_n+1 = x_n + (x_n - x_n-1) + a_n dt^2
/// Accumulated accelerations are consumed and cleared.
pub fn verlet_integrator(particles: &mut [Particle], dt: f64) {
    for p in particles.iter_mut() {
        p.step(dt);
    }
}

/// Split a frame `dt` into `substeps` equal intervals; zero substeps count as one
pub fn substep_dt(dt: f64, substeps: u32) -> (f64, u32) {
    let n = substeps.max(1);
    (dt / f64::from(n), n)
}
