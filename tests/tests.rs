use atomsim::configuration::config::ScenarioConfig;
use atomsim::{
    Acceleration, ArenaShape, BoxArena, CircleArena, CollisionPolicy, Colour, DistanceConstraint, Edge,
    Engine, EngineSettings, Environment, Error, Particle, ParticleId, Result, Scenario, SpawnConfig,
    SpawnPolicy, Vector2, VectorExt,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOL: f64 = 1e-9;

/// Unit-mass particle at (x, y)
pub fn particle(x: f64, y: f64, radius: f64) -> Particle {
    Particle::new(1.0, radius, Vector2::new(x, y)).unwrap()
}

/// Box environment with gravity switched off
pub fn still_box(width: f64, height: f64) -> Environment {
    let mut env = Environment::boxed(width, height).unwrap();
    env.set_gravity(Vector2::zeros()).unwrap();
    env
}

/// 800 x 800 box engine with a seeded spawn policy
pub fn test_engine(settings: EngineSettings, spawn: SpawnConfig) -> Engine {
    let env = Environment::boxed(settings.width, settings.height).unwrap();
    let spawner = SpawnPolicy::new(spawn, Some(11)).unwrap();
    Engine::new(env, spawner, settings).unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < TOL
}

// ==================================================================================
// Vector tests
// ==================================================================================

#[test]
fn normalise_zero_vector_is_zero() {
    let n = Vector2::new(0.0, 0.0).normalise();
    assert_eq!(n, Vector2::zeros());
    assert!(!n.x.is_nan() && !n.y.is_nan());
}

#[test]
fn in_place_ops_mutate() {
    let mut a = Vector2::new(1.0, 2.0);
    a += Vector2::new(0.5, -1.0);
    a *= 2.0;
    assert_eq!(a, Vector2::new(3.0, 2.0));
    assert!(approx(a.dot(&Vector2::new(1.0, 1.0)), 5.0));
    assert!(approx(Vector2::new(3.0, 4.0).magnitude(), 5.0));
}

// ==================================================================================
// Particle tests
// ==================================================================================

#[test]
fn particle_rejects_non_positive_mass_and_radius() {
    let origin = Vector2::zeros();
    assert!(matches!(Particle::new(0.0, 1.0, origin), Err(Error::Configuration(_))));
    assert!(matches!(Particle::new(1.0, -2.0, origin), Err(Error::Configuration(_))));
    assert!(matches!(Particle::new(f64::NAN, 1.0, origin), Err(Error::Configuration(_))));
    assert!(Particle::new(1.0, 1.0, origin).is_ok());
}

#[test]
fn paint_rejects_out_of_range_channels() {
    let mut p = particle(0.0, 0.0, 1.0);
    assert_eq!(p.colour(), Colour::WHITE);

    let err = p.paint((256, 0, 0)).unwrap_err();
    assert!(matches!(err, Error::OutOfRange { channel: "red", value: 256 }));
    assert!(p.paint((0, -1, 0)).is_err());
    assert_eq!(p.colour(), Colour::WHITE, "failed paint must not change the colour");

    p.paint((10, 20, 30)).unwrap();
    assert_eq!(p.colour(), Colour { r: 10, g: 20, b: 30 });
}

#[test]
fn velocity_is_derived_from_previous_position() {
    let mut p = particle(10.0, 10.0, 1.0).with_velocity(Vector2::new(2.0, -1.0));
    assert_eq!(p.velocity(), Vector2::new(2.0, -1.0));
    assert_eq!(p.previous_position(), Vector2::new(8.0, 11.0));

    p.set_velocity(Vector2::new(0.0, 3.0));
    assert_eq!(p.position(), Vector2::new(10.0, 10.0));
    assert_eq!(p.velocity(), Vector2::new(0.0, 3.0));

    p.set_position(Vector2::new(50.0, 50.0));
    assert_eq!(p.velocity(), Vector2::new(0.0, 3.0));
}

#[test]
fn verlet_step_applies_acceleration_and_clears_it() {
    let mut p = particle(0.0, 0.0, 1.0).with_velocity(Vector2::new(1.0, 0.0));
    p.accelerate(Vector2::new(0.0, 10.0));
    p.step(0.1);

    assert!(approx(p.position().x, 1.0));
    assert!(approx(p.position().y, 0.1));
    assert!(approx(p.velocity().y, 0.1));
    assert_eq!(p.acceleration(), Vector2::zeros());
}

#[test]
fn apply_force_divides_by_mass() {
    let mut p = Particle::new(2.0, 1.0, Vector2::zeros()).unwrap();
    p.apply_force(Vector2::new(4.0, 0.0));
    assert_eq!(p.acceleration(), Vector2::new(2.0, 0.0));
    p.clear_forces();
    assert_eq!(p.acceleration(), Vector2::zeros());
}

#[test]
fn kinetic_energy_uses_squared_speed() {
    let p = Particle::new(2.0, 1.0, Vector2::zeros())
        .unwrap()
        .with_velocity(Vector2::new(3.0, 4.0));
    assert!(approx(p.kinetic_energy(), 25.0));
    assert_eq!(p.momentum(), Vector2::new(6.0, 8.0));
}

#[test]
fn distance_between_particles() {
    let a = particle(0.0, 0.0, 1.0);
    let b = particle(3.0, 4.0, 1.0);
    assert!(approx(a.distance_to(&b), 5.0));
}

// ==================================================================================
// Constraint tests
// ==================================================================================

#[test]
fn link_restores_target_distance() -> Result<()> {
    let mut env = still_box(800.0, 800.0);
    let a = env.add(particle(100.0, 100.0, 5.0));
    let b = env.add(particle(130.0, 100.0, 5.0));
    env.add_constraint(DistanceConstraint::new(a, b, 20.0)?)?;

    env.update(1.0 / 120.0, 1);

    let pa = env.get(a).unwrap();
    let pb = env.get(b).unwrap();
    assert!(approx(pa.distance_to(pb), 20.0));
    // 50/50 split
    assert!(approx(pa.position().x, 105.0));
    assert!(approx(pb.position().x, 125.0));
    Ok(())
}

#[test]
fn link_keeps_current_separation() -> Result<()> {
    let mut env = Environment::boxed(800.0, 800.0)?;
    let a = env.add(particle(300.0, 100.0, 4.0));
    let b = env.add(particle(330.0, 100.0, 4.0).with_velocity(Vector2::new(0.0, 2.0)));
    env.link(a, b)?;
    env.set_constraint_iterations(8)?;

    for _ in 0..30 {
        env.update(1.0 / 120.0, 4);
    }
    let d = env.get(a).unwrap().distance_to(env.get(b).unwrap());
    assert!((d - 30.0).abs() < 1e-6, "link drifted to {d}");
    Ok(())
}

#[test]
fn link_with_coincident_endpoints_is_skipped() -> Result<()> {
    let mut env = still_box(800.0, 800.0);
    let a = env.add(particle(100.0, 100.0, 5.0));
    let b = env.add(particle(100.0, 100.0, 5.0));
    env.add_constraint(DistanceConstraint::new(a, b, 10.0)?)?;

    env.update(1.0 / 60.0, 2);

    for p in env.get_objects() {
        assert!(p.position().all_finite());
        assert_eq!(p.position(), Vector2::new(100.0, 100.0));
    }
    Ok(())
}

#[test]
fn invalid_links_are_rejected() {
    let (a, b) = (ParticleId(0), ParticleId(1));
    assert!(DistanceConstraint::new(a, b, -1.0).is_err());
    assert!(DistanceConstraint::new(a, a, 1.0).is_err());
    assert!(DistanceConstraint::new(a, b, 0.0).is_ok());

    let mut env = still_box(100.0, 100.0);
    let a = env.add(particle(10.0, 10.0, 1.0));
    assert!(matches!(env.link(a, ParticleId(99)), Err(Error::UnknownParticle(ParticleId(99)))));
}

#[test]
fn removing_a_particle_drops_its_links() -> Result<()> {
    let mut env = still_box(800.0, 800.0);
    let a = env.add(particle(100.0, 100.0, 5.0));
    let b = env.add(particle(130.0, 100.0, 5.0));
    let c = env.add(particle(160.0, 100.0, 5.0));
    env.link(a, b)?;
    env.link(b, c)?;
    assert_eq!(env.constraints().len(), 2);

    assert!(env.remove(a));
    assert_eq!(env.constraints().len(), 1);
    assert_eq!(env.constraints()[0].endpoints(), (b, c));
    Ok(())
}

// ==================================================================================
// Collision tests
// ==================================================================================

#[test]
fn positional_overlap_is_split_evenly() {
    let mut env = still_box(800.0, 800.0);
    let a = env.add(particle(100.0, 100.0, 10.0));
    let b = env.add(particle(115.0, 100.0, 10.0));

    assert_eq!(env.resolve_collisions(), 1);

    let pa = env.get(a).unwrap();
    let pb = env.get(b).unwrap();
    assert!(approx(pa.distance_to(pb), 20.0));
    assert!(approx(pa.position().x, 97.5));
    assert!(approx(pb.position().x, 117.5));
}

#[test]
fn separated_particles_are_untouched() {
    let mut env = still_box(800.0, 800.0);
    env.add(particle(100.0, 100.0, 10.0));
    env.add(particle(121.0, 100.0, 10.0));
    assert_eq!(env.resolve_collisions(), 0);
    assert_eq!(env.get_objects()[0].position(), Vector2::new(100.0, 100.0));
}

#[test]
fn coincident_centres_are_skipped() {
    for policy in [CollisionPolicy::Positional, CollisionPolicy::Impulse] {
        let mut env = still_box(800.0, 800.0);
        env.set_collision_policy(policy);
        env.add(particle(200.0, 200.0, 10.0));
        env.add(particle(200.0, 200.0, 10.0));

        assert_eq!(env.resolve_collisions(), 0);
        for p in env.get_objects() {
            assert!(p.position().all_finite());
            assert!(p.velocity().all_finite());
        }
    }
}

#[test]
fn impulse_swaps_equal_mass_head_on_velocities() {
    let mut env = still_box(800.0, 800.0);
    env.set_collision_policy(CollisionPolicy::Impulse);
    let a = env.add(particle(100.0, 100.0, 10.0).with_velocity(Vector2::new(1.0, 0.0)));
    let b = env.add(particle(118.0, 100.0, 10.0).with_velocity(Vector2::new(-1.0, 0.0)));
    let before = env.total_momentum();

    assert_eq!(env.resolve_collisions(), 1);

    let va = env.get(a).unwrap().velocity();
    let vb = env.get(b).unwrap().velocity();
    assert!(approx(va.x, -1.0) && approx(va.y, 0.0));
    assert!(approx(vb.x, 1.0) && approx(vb.y, 0.0));
    assert!((env.total_momentum() - before).norm() < TOL);

    // overlap removed
    let d = env.get(a).unwrap().distance_to(env.get(b).unwrap());
    assert!(approx(d, 20.0));
}

#[test]
fn impulse_conserves_momentum_and_energy_for_unequal_masses() {
    let mut env = still_box(800.0, 800.0);
    env.set_collision_policy(CollisionPolicy::Impulse);
    let light = Particle::new(1.0, 10.0, Vector2::new(100.0, 100.0))
        .unwrap()
        .with_velocity(Vector2::new(3.0, 1.0));
    let heavy = Particle::new(3.0, 10.0, Vector2::new(112.0, 109.0))
        .unwrap()
        .with_velocity(Vector2::new(-1.0, 0.5));
    let a = env.add(light);
    let b = env.add(heavy);

    let momentum = env.total_momentum();
    let energy = env.total_kinetic_energy();
    let tangent = Vector2::new(-0.6, 0.8);
    let va_t = env.get(a).unwrap().velocity().dot(&tangent);

    assert_eq!(env.resolve_collisions(), 1);

    assert!((env.total_momentum() - momentum).norm() < TOL);
    assert!((env.total_kinetic_energy() - energy).abs() < TOL);
    // tangential component untouched
    assert!(approx(env.get(a).unwrap().velocity().dot(&tangent), va_t));
    assert!(env.get(b).unwrap().has_collided());
}

#[test]
fn impulse_resolves_each_particle_once_per_pass() {
    let mut env = still_box(800.0, 800.0);
    env.set_collision_policy(CollisionPolicy::Impulse);
    let left = env.add(particle(100.0, 100.0, 10.0).with_velocity(Vector2::new(1.0, 0.0)));
    let middle = env.add(particle(118.0, 100.0, 10.0));
    let right = env.add(particle(136.0, 100.0, 10.0).with_velocity(Vector2::new(-1.0, 0.0)));

    // middle touches both neighbours, only the first pair is resolved
    assert_eq!(env.resolve_collisions(), 1);

    assert!(env.get(left).unwrap().has_collided());
    assert!(env.get(middle).unwrap().has_collided());
    assert!(!env.get(right).unwrap().has_collided());
    assert!(approx(env.get(left).unwrap().velocity().x, 0.0));
    assert!(approx(env.get(middle).unwrap().velocity().x, 1.0));
    assert!(approx(env.get(right).unwrap().velocity().x, -1.0));
}

#[test]
fn collided_flags_reset_every_substep() -> Result<()> {
    let mut env = still_box(800.0, 800.0);
    env.set_collision_policy(CollisionPolicy::Impulse);
    env.add(particle(100.0, 100.0, 10.0).with_velocity(Vector2::new(0.1, 0.0)));
    env.add(particle(118.0, 100.0, 10.0).with_velocity(Vector2::new(-0.1, 0.0)));
    assert_eq!(env.resolve_collisions(), 1);

    // far apart now; the next substep clears the flags before resolving again
    env.set_particle_position(ParticleId(1), Vector2::new(400.0, 400.0))?;
    env.update(1.0 / 120.0, 1);
    assert!(env.get_objects().iter().all(|p| !p.has_collided()));

    assert!(matches!(
        env.set_particle_position(ParticleId(7), Vector2::zeros()),
        Err(Error::UnknownParticle(ParticleId(7)))
    ));
    Ok(())
}

// ==================================================================================
// Boundary tests
// ==================================================================================

#[test]
fn box_containment_holds_for_random_particles() {
    let (w, h) = (400.0, 300.0);
    let mut env = Environment::boxed(w, h).unwrap();
    env.set_damping(0.9).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..40 {
        let r = rng.gen_range(5.0..15.0);
        let x = rng.gen_range(r..w - r);
        let y = rng.gen_range(r..h - r);
        let v = Vector2::new(rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0));
        env.add(Particle::new(1.0, r, Vector2::new(x, y)).unwrap().with_velocity(v));
    }

    for _ in 0..300 {
        env.update(1.0 / 60.0, 2);
        for p in env.get_objects() {
            let (pos, r) = (p.position(), p.radius());
            assert!(pos.x >= r - TOL && pos.x <= w - r + TOL, "x escaped: {pos:?}");
            assert!(pos.y >= r - TOL && pos.y <= h - r + TOL, "y escaped: {pos:?}");
        }
    }
}

#[test]
fn box_bounce_reflects_and_damps_velocity() {
    let mut env = still_box(100.0, 100.0);
    env.set_damping(0.5).unwrap();
    let id = env.add(particle(85.0, 50.0, 10.0).with_velocity(Vector2::new(10.0, 0.0)));

    env.update(1.0 / 60.0, 1);

    let p = env.get(id).unwrap();
    assert!(approx(p.position().x, 90.0));
    assert!(approx(p.velocity().x, -2.5));
    assert!(approx(p.velocity().y, 0.0));
}

#[test]
fn box_corner_uses_edge_priority_and_stays_inside() {
    let arena = BoxArena::new(100.0, 100.0).unwrap();
    assert_eq!(arena.violated_edge(Vector2::new(95.0, 95.0), 10.0), Some(Edge::Right));
    assert_eq!(arena.violated_edge(Vector2::new(50.0, 95.0), 10.0), Some(Edge::Bottom));
    assert_eq!(arena.violated_edge(Vector2::new(50.0, 50.0), 10.0), None);

    let mut env = still_box(100.0, 100.0);
    let id = env.add(particle(85.0, 85.0, 10.0).with_velocity(Vector2::new(10.0, 10.0)));
    env.update(1.0 / 60.0, 1);

    let p = env.get(id).unwrap();
    assert!(approx(p.position().x, 90.0) && approx(p.position().y, 90.0));
    // reflected across the right edge only
    assert!(approx(p.velocity().x, -5.0));
    assert!(approx(p.velocity().y, 5.0));
}

#[test]
fn circle_arena_must_fit_the_window() {
    assert!(matches!(CircleArena::new((800.0, 600.0), 301.0), Err(Error::Configuration(_))));
    assert!(CircleArena::new((800.0, 600.0), 300.0).is_ok());
    assert!(CircleArena::new((800.0, 600.0), 0.0).is_err());
    assert!(Environment::circular((800.0, 600.0), 350.0).is_err());
}

#[test]
fn circle_contains_checks_whole_circle() {
    let env = Environment::circular((800.0, 800.0), 300.0).unwrap();
    assert!(env.contains(Vector2::new(400.0, 400.0), 10.0));
    assert!(env.contains(Vector2::new(400.0, 110.0), 10.0));
    assert!(!env.contains(Vector2::new(400.0, 105.0), 10.0));
    assert_eq!(
        env.shape(),
        ArenaShape::Circle { centre: Vector2::new(400.0, 400.0), radius: 300.0 }
    );
}

#[test]
fn circle_projects_particle_back_onto_arena() {
    let mut env = Environment::circular((800.0, 800.0), 300.0).unwrap();
    let id = env.add(particle(400.0, 695.0, 10.0));
    env.update(1.0 / 60.0, 1);

    let p = env.get(id).unwrap();
    let reach = (p.position() - Vector2::new(400.0, 400.0)).norm() + p.radius();
    assert!((reach - 300.0).abs() < 1e-9);
    assert!(approx(p.position().x, 400.0));
}

#[test]
fn circle_containment_holds_for_random_particles() {
    let centre = Vector2::new(400.0, 400.0);
    let radius = 300.0;
    let mut env = Environment::circular((800.0, 800.0), radius).unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..30 {
        let r = rng.gen_range(5.0..12.0);
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let dist = rng.gen_range(0.0..(radius - r));
        let pos = centre + Vector2::new(angle.cos(), angle.sin()) * dist;
        let v = Vector2::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
        env.add(Particle::new(1.0, r, pos).unwrap().with_velocity(v));
    }

    for _ in 0..300 {
        env.update(1.0 / 120.0, 2);
        for p in env.get_objects() {
            let reach = (p.position() - centre).norm() + p.radius();
            assert!(reach <= radius + 1e-6, "particle escaped: {reach}");
        }
    }
}

// ==================================================================================
// Environment tests
// ==================================================================================

#[test]
fn zero_dt_update_changes_nothing() {
    let mut env = Environment::boxed(800.0, 800.0).unwrap();
    env.add(particle(100.0, 100.0, 10.0).with_velocity(Vector2::new(2.0, 1.0)));
    env.add(particle(110.0, 100.0, 10.0).with_velocity(Vector2::new(-1.0, 0.0)));
    env.add(particle(5.0, 400.0, 10.0));

    let snapshot: Vec<(Vector2, Vector2)> =
        env.get_objects().iter().map(|p| (p.position(), p.velocity())).collect();

    for n in [0, 1, 4] {
        env.update(0.0, n);
    }

    let after: Vec<(Vector2, Vector2)> =
        env.get_objects().iter().map(|p| (p.position(), p.velocity())).collect();
    assert_eq!(snapshot, after);
    assert_eq!(env.time(), 0.0);
}

#[test]
fn falling_particle_settles_on_the_floor() {
    let (w, h) = (800.0, 800.0);
    let mut env = Environment::boxed(w, h).unwrap();
    env.set_gravity(Vector2::new(0.0, 500.0)).unwrap();
    env.set_damping(0.5).unwrap();
    let id = env.add(particle(400.0, 100.0, 15.0));

    let mut late_max_vy: f64 = 0.0;
    for frame in 0..1200 {
        env.update(1.0 / 120.0, 2);
        if frame >= 1100 {
            late_max_vy = late_max_vy.max(env.get(id).unwrap().velocity().y.abs());
        }
    }

    let p = env.get(id).unwrap();
    assert!((p.position().y - (h - 15.0)).abs() < 0.5, "y = {}", p.position().y);
    assert!(late_max_vy < 0.05, "still bouncing: {late_max_vy}");
    assert!(approx(p.position().x, 400.0));
}

#[test]
fn remove_and_clear() {
    let mut env = still_box(800.0, 800.0);
    let a = env.add(particle(100.0, 100.0, 5.0));
    let b = env.add(particle(200.0, 100.0, 5.0));
    let c = env.add(particle(300.0, 100.0, 5.0));

    assert!(env.remove(a));
    assert!(!env.remove(a));
    assert!(env.get(a).is_none());
    assert_eq!(env.len(), 2);

    // insertion order preserved
    let ids: Vec<ParticleId> = env.get_objects().iter().map(|p| p.id()).collect();
    assert_eq!(ids, vec![b, c]);
    assert_eq!(env.get(c).unwrap().position().x, 300.0);

    env.clear();
    assert!(env.is_empty());
    assert!(!env.remove(b));
}

struct Wind(Vector2);

impl Acceleration for Wind {
    fn acceleration(&self, _t: f64, particles: &[Particle], out: &mut [Vector2]) {
        for a in out.iter_mut().take(particles.len()) {
            *a += self.0;
        }
    }
}

#[test]
fn extra_acceleration_terms_are_summed_with_gravity() {
    let mut env = Environment::boxed(800.0, 800.0)
        .unwrap()
        .with_acceleration(Wind(Vector2::new(100.0, 0.0)));
    env.set_gravity(Vector2::new(0.0, 50.0)).unwrap();
    let id = env.add(particle(400.0, 400.0, 5.0));

    let dt: f64 = 1.0 / 60.0;
    env.update(dt, 1);

    let p = env.get(id).unwrap();
    assert!(approx(p.position().x, 400.0 + 100.0 * dt * dt));
    assert!(approx(p.position().y, 400.0 + 50.0 * dt * dt));
}

#[test]
fn configuration_setters_validate() {
    let mut env = Environment::boxed(800.0, 800.0).unwrap();
    assert!(env.set_gravity(Vector2::new(f64::NAN, 0.0)).is_err());
    assert!(env.set_damping(1.5).is_err());
    assert!(env.set_restitution(-0.1).is_err());
    env.set_damping(0.3).unwrap();
    assert_eq!(env.damping(), 0.3);
    env.set_gravity(Vector2::new(0.0, 9.81)).unwrap();
    assert_eq!(env.gravity(), Vector2::new(0.0, 9.81));

    assert!(matches!(env.set_constraint_iterations(0), Err(Error::Configuration(_))));
    assert_eq!(env.parameters().constraint_iterations, 1);
    env.set_constraint_iterations(3).unwrap();
    assert_eq!(env.parameters().constraint_iterations, 3);
}

// ==================================================================================
// Spawn / engine tests
// ==================================================================================

#[test]
fn random_velocity_respects_vmax() {
    let config = SpawnConfig { vmax: 100.0, ..SpawnConfig::default() };
    let mut policy = SpawnPolicy::new(config, Some(3)).unwrap();
    for _ in 0..200 {
        let v = policy.next_velocity();
        assert!(v.x.abs() <= 100.0 && v.y.abs() <= 100.0);
    }
}

#[test]
fn random_radius_stays_within_ten_percent() {
    let config = SpawnConfig {
        default_radius: 20.0,
        random_radius: true,
        ..SpawnConfig::default()
    };
    let mut policy = SpawnPolicy::new(config, Some(5)).unwrap();
    let radii: Vec<f64> = (0..200).map(|_| policy.next_radius()).collect();
    assert!(radii.iter().all(|&r| r >= 18.0 - TOL && r <= 22.0 + TOL));
    assert!(radii.iter().any(|&r| r != 20.0));
}

#[test]
fn fixed_spawn_velocity_is_scaled_to_the_step() -> Result<()> {
    let mut engine = test_engine(EngineSettings::default(), SpawnConfig::default());
    engine.constrain_velocity(Vector2::new(0.0, 120.0))?;
    let id = engine.spawn_object(Vector2::new(400.0, 400.0), 15.0, None, None)?;

    // 120 fps x 2 substeps
    let v = engine.environment().get(id).unwrap().velocity();
    assert!(approx(v.x, 0.0));
    assert!(approx(v.y, 0.5));

    engine.release_velocity();
    assert!(engine.spawner().config().fixed_velocity.is_none());
    Ok(())
}

#[test]
fn hue_cycles_and_wraps() {
    let config = SpawnConfig { cycle_colours: true, ..SpawnConfig::default() };
    let mut policy = SpawnPolicy::new(config, Some(1)).unwrap();

    let first = policy.next_colour();
    assert_eq!(first.r, 255);
    assert_eq!(first.b, 0);
    assert!((76..=77).contains(&first.g));

    let mut colours = vec![first];
    for _ in 0..45 {
        colours.push(policy.next_colour());
        assert!((0.0..1.0).contains(&policy.hue()));
    }
    assert!(colours.iter().any(|c| *c != first));
}

#[test]
fn spawned_particles_are_coloured_when_cycling() -> Result<()> {
    let spawn = SpawnConfig { cycle_colours: true, ..SpawnConfig::default() };
    let mut engine = test_engine(EngineSettings::default(), spawn);
    let a = engine.spawn_object(Vector2::new(100.0, 100.0), 10.0, None, None)?;
    let b = engine.spawn_object(Vector2::new(300.0, 100.0), 10.0, None, None)?;
    let env = engine.environment();
    assert_ne!(env.get(a).unwrap().colour(), Colour::WHITE);
    assert_ne!(env.get(a).unwrap().colour(), env.get(b).unwrap().colour());
    Ok(())
}

#[test]
fn manual_spawn_honours_limit_and_pause() -> Result<()> {
    let settings = EngineSettings { object_limit: Some(2), ..EngineSettings::default() };
    let mut engine = test_engine(settings, SpawnConfig::default());

    assert!(engine.spawn_at(Vector2::new(100.0, 100.0))?.is_some());
    assert!(engine.spawn_at(Vector2::new(200.0, 100.0))?.is_some());
    assert!(engine.spawn_at(Vector2::new(300.0, 100.0))?.is_none());
    assert_eq!(engine.object_count(), 2);

    engine.clear();
    assert!(engine.toggle_pause());
    assert!(engine.spawn_at(Vector2::new(100.0, 100.0))?.is_none());
    assert!(!engine.tick()?);
    assert_eq!(engine.frames(), 1, "paused frames still count");

    engine.toggle_pause();
    assert!(engine.spawn_at(Vector2::new(100.0, 100.0))?.is_some());
    assert!(engine.tick()?);
    Ok(())
}

#[test]
fn auto_spawn_every_interval_until_the_limit() -> Result<()> {
    let settings = EngineSettings {
        auto_spawn: true,
        object_limit: Some(3),
        ..EngineSettings::default()
    };
    let mut engine = test_engine(settings, SpawnConfig::default());

    engine.tick()?;
    assert_eq!(engine.object_count(), 1);
    for _ in 1..24 {
        engine.tick()?;
    }
    assert_eq!(engine.object_count(), 1);
    engine.tick()?;
    assert_eq!(engine.object_count(), 2);

    for _ in 0..100 {
        engine.tick()?;
    }
    assert_eq!(engine.object_count(), 3);

    // manual spawning is off in auto mode
    engine.set_object_limit(None);
    assert!(engine.spawn_at(Vector2::new(100.0, 100.0))?.is_none());
    Ok(())
}

#[test]
fn auto_spawn_cadence_counts_paused_frames() -> Result<()> {
    let settings = EngineSettings { auto_spawn: true, ..EngineSettings::default() };
    let mut engine = test_engine(settings, SpawnConfig::default());

    engine.tick()?;
    assert_eq!(engine.object_count(), 1);

    engine.toggle_pause();
    for _ in 0..10 {
        engine.tick()?;
    }
    engine.toggle_pause();

    // frames 11..23 spawn nothing, frame 24 spawns
    for _ in 11..24 {
        engine.tick()?;
    }
    assert_eq!(engine.object_count(), 1);
    engine.tick()?;
    assert_eq!(engine.object_count(), 2);
    assert_eq!(engine.frames(), 25);
    Ok(())
}

#[test]
fn box_engine_accepts_spawns_near_the_wall() -> Result<()> {
    let spawn = SpawnConfig { vmax: 0.0, ..SpawnConfig::default() };
    let mut engine = test_engine(EngineSettings::default(), spawn);

    let id = engine.spawn_at(Vector2::new(5.0, 400.0))?;
    assert!(id.is_some(), "box spawns are never refused for position");
    engine.tick()?;

    let p = engine.environment().get(id.unwrap()).unwrap();
    assert!(approx(p.position().x, p.radius()));
    Ok(())
}

#[test]
fn circle_engine_refuses_spawns_outside_the_arena() -> Result<()> {
    let env = Environment::circular((800.0, 800.0), 300.0)?;
    let spawner = SpawnPolicy::new(SpawnConfig::default(), Some(2))?;
    let mut engine = Engine::new(env, spawner, EngineSettings::default())?;

    assert!(engine.spawn_at(Vector2::new(10.0, 10.0))?.is_none());
    assert!(engine.spawn_at(engine.centre())?.is_some());
    Ok(())
}

#[test]
fn engine_setters_validate() {
    let mut engine = test_engine(EngineSettings::default(), SpawnConfig::default());
    assert!(engine.set_vmax(-1.0).is_err());
    assert!(engine.set_default_radius(0.0).is_err());
    assert!(engine.set_damping(2.0).is_err());
    engine.set_vmax(0.0).unwrap();
    engine.set_default_radius(7.0).unwrap();
    engine.set_gravity(Vector2::zeros()).unwrap();
    assert_eq!(engine.spawner().config().default_radius, 7.0);

    let invalid = EngineSettings { fps: 0, ..EngineSettings::default() };
    let env = Environment::boxed(800.0, 800.0).unwrap();
    let spawner = SpawnPolicy::new(SpawnConfig::default(), None).unwrap();
    assert!(Engine::new(env, spawner, invalid).is_err());
}

// ==================================================================================
// Configuration tests
// ==================================================================================

const BILLIARDS: &str = r#"
engine:
  width: 800.0
  height: 600.0
  fps: 120
  substeps: 2
  collision: "impulse"
parameters:
  gravity: [0.0, 0.0]
  seed: 9
particles:
  - x: [100.0, 100.0]
    v: [240.0, 0.0]
    radius: 10.0
    colour: [255, 0, 0]
  - x: [200.0, 100.0]
    m: 2.0
    radius: 10.0
links:
  - a: 0
    b: 1
"#;

#[test]
fn scenario_builds_from_yaml() -> Result<()> {
    let cfg = ScenarioConfig::from_yaml_str(BILLIARDS)?;
    let scenario = Scenario::build_scenario(cfg)?;
    let env = scenario.engine.environment();

    assert_eq!(env.len(), 2);
    assert_eq!(env.constraints().len(), 1);
    assert!(approx(env.constraints()[0].target_distance(), 100.0));
    assert_eq!(env.collision_policy(), CollisionPolicy::Impulse);
    assert_eq!(env.shape(), ArenaShape::Rectangle { width: 800.0, height: 600.0 });

    let first = &env.get_objects()[0];
    assert!(approx(first.velocity().x, 1.0)); // 240 / (120 * 2)
    assert_eq!(first.colour(), Colour { r: 255, g: 0, b: 0 });
    assert_eq!(env.get_objects()[1].mass(), 2.0);
    Ok(())
}

#[test]
fn empty_scenario_uses_defaults() -> Result<()> {
    let cfg = ScenarioConfig::from_yaml_str("{}")?;
    assert_eq!(cfg.engine.width, 800.0);
    assert_eq!(cfg.engine.substeps, 2);
    assert_eq!(cfg.parameters.gravity, [0.0, 500.0]);

    let scenario = Scenario::build_scenario(cfg)?;
    assert!(scenario.engine.environment().is_empty());
    assert_eq!(scenario.engine.settings().fps, 120);
    Ok(())
}

#[test]
fn circle_scenario_defaults_radius_from_width() -> Result<()> {
    let cfg = ScenarioConfig::from_yaml_str("engine:\n  arena: \"circle\"\n")?;
    let scenario = Scenario::build_scenario(cfg)?;
    assert_eq!(
        scenario.engine.environment().shape(),
        ArenaShape::Circle { centre: Vector2::new(400.0, 400.0), radius: 320.0 }
    );
    Ok(())
}

#[test]
fn invalid_scenarios_are_rejected() {
    let too_big = "engine:\n  arena: \"circle\"\n  arena_radius: 500.0\n";
    let cfg = ScenarioConfig::from_yaml_str(too_big).unwrap();
    assert!(matches!(Scenario::build_scenario(cfg), Err(Error::Configuration(_))));

    let bad_link = "particles:\n  - { x: [10.0, 10.0], radius: 1.0 }\nlinks:\n  - { a: 0, b: 3 }\n";
    let cfg = ScenarioConfig::from_yaml_str(bad_link).unwrap();
    assert!(Scenario::build_scenario(cfg).is_err());

    let no_link_passes = "engine:\n  constraint_iterations: 0\n";
    let cfg = ScenarioConfig::from_yaml_str(no_link_passes).unwrap();
    assert!(matches!(Scenario::build_scenario(cfg), Err(Error::Configuration(_))));

    let bad_colour = "particles:\n  - { x: [10.0, 10.0], radius: 1.0, colour: [0, 300, 0] }\n";
    let cfg = ScenarioConfig::from_yaml_str(bad_colour).unwrap();
    assert!(matches!(Scenario::build_scenario(cfg), Err(Error::OutOfRange { .. })));

    assert!(ScenarioConfig::from_yaml_str("engine: 5").is_err());
}

#[test]
fn bundled_scenarios_load() -> Result<()> {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    for name in ["default.yaml", "circle.yaml", "billiards.yaml", "chain.yaml"] {
        let cfg = ScenarioConfig::load(dir.join(name))?;
        let mut scenario = Scenario::build_scenario(cfg)?;
        for _ in 0..30 {
            scenario.engine.tick()?;
        }
        for p in scenario.engine.environment().get_objects() {
            assert!(p.position().all_finite(), "{name}: non-finite position");
        }
    }
    Ok(())
}
