//! Pairwise overlap resolution
//!
//! All-pairs O(n^2) scan over unordered pairs `(i, j)` with `i < j`, so a pair
//! is never visited twice in one pass. Two interchangeable policies:
//! - `Positional`: push both circles apart by half the overlap each, no
//!   direct velocity change (Verlet absorbs the correction next step)
//! - `Impulse`: 1D elastic exchange of the normal velocity components using
//!   both masses; a particle resolved once is skipped for the rest of the
//!   substep, so the first collision wins

use log::trace;

use crate::error::{Error, Result};
use crate::simulation::states::Particle;
use crate::simulation::vector::{Vector2, EPSILON};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    #[default]
    Positional,
    Impulse,
}

/// Mutable access to two distinct slots of one slice
///
/// Panics if `i == j`; callers only pass distinct pair indices.
pub(crate) fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    assert_ne!(i, j, "pair_mut needs two distinct indices");
    if i < j {
        let (left, right) = particles.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = particles.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Contact between two overlapping circles
struct Contact {
    normal: Vector2, // unit, from a toward b
    overlap: f64,    // > 0
}

/// `Ok(None)` when the circles do not overlap; coincident centres are degenerate
fn contact(a: &Particle, b: &Particle) -> Result<Option<Contact>> {
    let delta = b.position() - a.position();
    let distance = delta.norm();
    let overlap = (a.radius() + b.radius()) - distance;
    if overlap <= 0.0 {
        return Ok(None);
    }
    if distance < EPSILON {
        return Err(Error::DegenerateGeometry("coincident particle centres"));
    }
    Ok(Some(Contact {
        normal: delta / distance,
        overlap,
    }))
}

fn separate(a: &mut Particle, b: &mut Particle) -> Result<bool> {
    let Some(c) = contact(a, b)? else {
        return Ok(false);
    };
    let correction = c.normal * (0.5 * c.overlap);
    a.move_by(-correction);
    b.move_by(correction);
    Ok(true)
}

fn exchange(a: &mut Particle, b: &mut Particle) -> Result<bool> {
    if a.has_collided() || b.has_collided() {
        return Ok(false);
    }
    let Some(c) = contact(a, b)? else {
        return Ok(false);
    };
    let n = c.normal;

    let (m1, m2) = (a.mass(), b.mass());
    let (v1, v2) = (a.velocity(), b.velocity());
    let v1n = v1.dot(&n);
    let v2n = v2.dot(&n);

    // Only exchange while approaching along the normal
    if v2n - v1n < 0.0 {
        let total = m1 + m2;
        let v1n_new = (v1n * (m1 - m2) + 2.0 * m2 * v2n) / total;
        let v2n_new = (v2n * (m2 - m1) + 2.0 * m1 * v1n) / total;

        // tangential components are kept
        a.set_velocity(v1 + n * (v1n_new - v1n));
        b.set_velocity(v2 + n * (v2n_new - v2n));
    }

    let correction = n * (0.5 * c.overlap);
    a.translate(-correction);
    b.translate(correction);

    a.mark_collided();
    b.mark_collided();
    Ok(true)
}

/// Resolve every overlapping pair once under `policy`
///
/// Returns the number of pairs that were resolved. Degenerate pairs are
/// skipped and left for the next substep.
pub fn resolve_collisions(particles: &mut [Particle], policy: CollisionPolicy) -> usize {
    let n = particles.len();
    let mut resolved = 0;

    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = pair_mut(particles, i, j);
            let outcome = match policy {
                CollisionPolicy::Positional => separate(a, b),
                CollisionPolicy::Impulse => exchange(a, b),
            };
            match outcome {
                Ok(true) => resolved += 1,
                Ok(false) => {}
                Err(e) => trace!("skipping pair ({}, {}): {}", a.id(), b.id(), e),
            }
        }
    }

    resolved
}
