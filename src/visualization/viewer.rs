//! Bevy 2D viewer for a scenario
//!
//! Thin shell around the engine façade: left click spawns at the cursor,
//! `C` clears, `P` pauses. One mesh entity is kept per live particle.
//!
//! Simulation coordinates have the origin at the top-left corner with y
//! pointing down, which matches Bevy's cursor coordinates, so only drawing
//! needs a conversion.

use std::collections::{HashMap, HashSet};

use bevy::log::LogPlugin;
use bevy::math::primitives::Circle;
use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};
use bevy::window::{PrimaryWindow, WindowResolution};

use crate::simulation::boundary::ArenaShape;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::ParticleId;
use crate::simulation::vector::Vector2;

#[derive(Component)]
struct ParticleSprite(pub ParticleId);

/// Live particle id -> its mesh entity
#[derive(Resource, Default)]
struct Sprites(HashMap<ParticleId, Entity>);

pub fn run_viewer(scenario: Scenario) {
    let settings = scenario.engine.settings().clone();
    log::info!(
        "run_viewer: starting Bevy viewer, {} x {} at {} fps",
        settings.width,
        settings.height,
        settings.fps
    );

    // flexi_logger already owns the global logger
    let plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(Window {
                title: "atomsim".into(),
                resolution: WindowResolution::new(settings.width as f32, settings.height as f32),
                resizable: false,
                ..Default::default()
            }),
            ..Default::default()
        })
        .disable::<LogPlugin>();

    App::new()
        .insert_resource(scenario)
        .init_resource::<Sprites>()
        .add_plugins(plugins)
        .add_systems(Startup, setup_system)
        .add_systems(Update, (input_system, physics_step_system, sync_sprites_system).chain())
        .run();
}

/// Simulation point -> Bevy world point (origin at the window centre, y up)
fn to_world(p: Vector2, width: f64, height: f64) -> Vec2 {
    Vec2::new((p.x - 0.5 * width) as f32, (0.5 * height - p.y) as f32)
}

fn setup_system(
    mut commands: Commands,
    scenario: Res<Scenario>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn(Camera2dBundle::default());

    let settings = scenario.engine.settings();
    match scenario.engine.environment().shape() {
        ArenaShape::Circle { centre, radius } => {
            // grey surround, black disc for the arena
            commands.insert_resource(ClearColor(Color::srgb(0.5, 0.5, 0.5)));
            let c = to_world(centre, settings.width, settings.height);
            commands.spawn(MaterialMesh2dBundle {
                mesh: Mesh2dHandle(meshes.add(Circle::new(radius as f32))),
                material: materials.add(ColorMaterial::from(Color::BLACK)),
                transform: Transform::from_xyz(c.x, c.y, -1.0),
                ..Default::default()
            });
        }
        ArenaShape::Rectangle { .. } => {
            commands.insert_resource(ClearColor(Color::BLACK));
        }
    }
}

fn input_system(
    mut scenario: ResMut<Scenario>,
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if keys.just_pressed(KeyCode::KeyC) {
        scenario.engine.clear();
    }
    if keys.just_pressed(KeyCode::KeyP) {
        scenario.engine.toggle_pause();
    }
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    if let Some(cursor) = window.cursor_position() {
        let point = Vector2::new(f64::from(cursor.x), f64::from(cursor.y));
        if let Err(e) = scenario.engine.spawn_at(point) {
            log::warn!("spawn failed: {e}");
        }
    }
}

fn physics_step_system(mut scenario: ResMut<Scenario>) {
    if let Err(e) = scenario.engine.tick() {
        log::warn!("frame skipped: {e}");
    }
}

fn sync_sprites_system(
    mut commands: Commands,
    scenario: Res<Scenario>,
    mut sprites: ResMut<Sprites>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut transforms: Query<&mut Transform, With<ParticleSprite>>,
) {
    let settings = scenario.engine.settings();
    let particles = scenario.engine.environment().get_objects();
    let mut live = HashSet::with_capacity(particles.len());

    for p in particles {
        live.insert(p.id());
        let pos = to_world(p.position(), settings.width, settings.height);

        if let Some(&entity) = sprites.0.get(&p.id()) {
            if let Ok(mut transform) = transforms.get_mut(entity) {
                transform.translation.x = pos.x;
                transform.translation.y = pos.y;
            }
            continue;
        }

        let c = p.colour();
        let entity = commands
            .spawn((
                MaterialMesh2dBundle {
                    mesh: Mesh2dHandle(meshes.add(Circle::new(p.radius() as f32))),
                    material: materials.add(ColorMaterial::from(Color::srgb_u8(c.r, c.g, c.b))),
                    transform: Transform::from_xyz(pos.x, pos.y, 0.0),
                    ..Default::default()
                },
                ParticleSprite(p.id()),
            ))
            .id();
        sprites.0.insert(p.id(), entity);
    }

    // despawn meshes of removed / cleared particles
    sprites.0.retain(|id, entity| {
        let keep = live.contains(id);
        if !keep {
            commands.entity(*entity).despawn();
        }
        keep
    });
}
