//! Walk demo
//!
//! Builds a small outdoor scene (terrain, a house, a staircase, a crate and a
//! spinning cube overhead), then walks a character through it with scripted
//! input for a fixed number of frames. Everything is headless; progress goes
//! to the log.
//!
//! Usage: `walk_demo [config.toml|config.ron]`

use std::sync::Arc;

use collider_engine::core::config::{ApplicationConfig, Config};
use collider_engine::foundation::logging;
use collider_engine::foundation::math::{constants::HALF_PI, Transform, Vec3};
use collider_engine::physics::{CharacterController, MovementState, WalkInput};
use collider_engine::scene::{Mesh, ModelKey};
use collider_engine::World;

const FRAME_TIME: f32 = 1.0 / 60.0;

/// One leg of the scripted walk
struct Leg {
    name: &'static str,
    frames: u32,
    input: WalkInput,
}

impl Leg {
    const fn new(name: &'static str, frames: u32, forward: f32, turn: f32) -> Self {
        Self {
            name,
            frames,
            input: WalkInput { forward, turn },
        }
    }
}

/// Cross to the stairs, climb them, drop off the top, then walk into the house
const ROUTE: [Leg; 9] = [
    Leg::new("turn west", 79, 0.0, 1.0),
    Leg::new("walk west to the stairs", 150, 1.0, 0.0),
    Leg::new("turn north", 79, 0.0, -1.0),
    Leg::new("climb the stairs and drop off the top", 90, 1.0, 0.0),
    Leg::new("wait to land", 60, 0.0, 0.0),
    Leg::new("turn east", 79, 0.0, -1.0),
    Leg::new("walk east", 150, 1.0, 0.0),
    Leg::new("turn north", 79, 0.0, 1.0),
    Leg::new("walk into the house", 60, 1.0, 0.0),
];

struct DemoScene {
    world: World,
    spinning_cube: ModelKey,
}

fn build_scene(config: &ApplicationConfig) -> Result<DemoScene, Box<dyn std::error::Error>> {
    let mut world = World::new(config.collider.clone());

    let unit_cube = Arc::new(Mesh::unit_cube());

    world.add_static_model(Arc::new(Mesh::plane(100.0)), Transform::identity());

    let mut house = Transform::from_position(Vec3::new(0.0, 4.0, 50.0));
    house.scale = Vec3::new(20.0, 8.0, 10.0);
    world.add_static_model(Arc::clone(&unit_cube), house);

    world.add_static_model(
        Arc::new(Mesh::stairs(8, 6.0, 0.5, 1.0)),
        Transform::from_position(Vec3::new(-50.0, 0.0, 20.0)),
    );
    world.add_static_model(
        Arc::clone(&unit_cube),
        Transform::from_position(Vec3::new(10.0, 0.0, -10.0)),
    );

    let spinning_cube = world.add_dynamic_model(
        unit_cube,
        Transform::from_position(Vec3::new(0.0, 50.0, 0.0)).with_uniform_scale(5.0),
    )?;

    let counts = world.collider().surface_counts();
    log::info!(
        "Scene ready: {} models, {} floors, {} walls, {} ceilings",
        world.models().len(),
        counts.floors,
        counts.walls,
        counts.ceilings
    );

    Ok(DemoScene { world, spinning_cube })
}

fn run(config: &ApplicationConfig) -> Result<(), Box<dyn std::error::Error>> {
    let DemoScene {
        mut world,
        spinning_cube,
    } = build_scene(config)?;

    let mut character = CharacterController::new(Vec3::zeros(), HALF_PI, config.character.clone());
    let mut frame = 0u32;
    let mut wall_frames = 0u32;
    let mut falling_frames = 0u32;

    for leg in &ROUTE {
        log::info!("Leg: {}", leg.name);

        for _ in 0..leg.frames {
            let time = frame as f32 * FRAME_TIME;
            if let Some(cube) = world.model_mut(spinning_cube) {
                cube.rotate(time * 0.5, 0.0, 0.0);
            }
            world.refresh_collision();

            let step = character.advance(leg.input, FRAME_TIME, world.collider());
            if step.hit_wall {
                wall_frames += 1;
            }
            if step.state == MovementState::Falling {
                falling_frames += 1;
            }
            if step.floor_height.is_none() {
                log::warn!("No floor under the character at {:?}", step.position);
            }

            frame += 1;
        }

        let position = character.position();
        log::info!(
            "  at ({:.2}, {:.2}, {:.2}) heading {:.2} rad, {:?}",
            position.x,
            position.y,
            position.z,
            character.heading(),
            character.state()
        );
    }

    log::info!(
        "Walked {frame} frames: {wall_frames} against walls, {falling_frames} falling, {} surface rebuilds",
        world.collider().rebuild_count()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => ApplicationConfig::load_from_file(&path)?,
        None => ApplicationConfig::default(),
    };
    config.validate()?;

    logging::init_with_level(&config.engine.log_level);
    log::info!("Starting walk demo");

    let result = run(&config);
    match &result {
        Ok(()) => log::info!("Walk demo completed successfully"),
        Err(e) => log::error!("Walk demo failed: {e}"),
    }
    result
}
