use std::time::Instant;

use log::info;

use crate::error::Result;
use crate::simulation::collision::{resolve_collisions, CollisionPolicy};
use crate::simulation::environment::Environment;
use crate::simulation::states::Particle;
use crate::simulation::vector::Vector2;

const ARENA: f64 = 2000.0;

/// Helper to build `n` particles on a deterministic scatter inside the arena
fn make_particles(n: usize, radius: f64) -> Result<Vec<Particle>> {
    let mut particles = Vec::with_capacity(n);
    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let x = 0.5 * ARENA + (i_f * 0.37).sin() * 0.45 * ARENA;
        let y = 0.5 * ARENA + (i_f * 0.13).cos() * 0.45 * ARENA;
        let v = Vector2::new((i_f * 0.07).sin(), (i_f * 0.11).cos());
        particles.push(Particle::new(1.0, radius, Vector2::new(x, y))?.with_velocity(v));
    }
    Ok(particles)
}

/// Time one all-pairs collision pass under both policies
pub fn bench_collisions() -> Result<()> {
    let ns = [200, 400, 800, 1600, 3200];

    for n in ns {
        let template = make_particles(n, 8.0)?;

        let mut positional = template.clone();
        let t0 = Instant::now();
        let resolved_p = resolve_collisions(&mut positional, CollisionPolicy::Positional);
        let dt_positional = t0.elapsed().as_secs_f64();

        let mut impulse = template;
        let t1 = Instant::now();
        let resolved_i = resolve_collisions(&mut impulse, CollisionPolicy::Impulse);
        let dt_impulse = t1.elapsed().as_secs_f64();

        info!(
            "N = {n:5}, positional = {dt_positional:8.6} s ({resolved_p} pairs), impulse = {dt_impulse:8.6} s ({resolved_i} pairs)"
        );
    }
    Ok(())
}

/// Time full `Environment::update` frames for a range of n
pub fn bench_update() -> Result<()> {
    let ns = [200, 400, 800, 1600];
    let frames = 10; // frames per n
    let dt = 1.0 / 120.0;

    for n in ns {
        let mut env = Environment::boxed(ARENA, ARENA)?;
        for p in make_particles(n, 8.0)? {
            env.add(p);
        }

        // Warm up
        env.update(dt, 2);

        let t0 = Instant::now();
        for _ in 0..frames {
            env.update(dt, 2);
        }
        let per_frame = t0.elapsed().as_secs_f64() / frames as f64;

        info!("N = {n:5}, update (2 substeps) = {per_frame:8.6} s / frame");
    }
    Ok(())
}
