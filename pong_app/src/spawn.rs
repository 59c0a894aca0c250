//! Entity factories

use ecs_core::prelude::*;
use nalgebra::Vector2;

use crate::components::{Ball, Camera, Paddle, Side, Transform, Velocity};
use crate::config::{ArenaConfig, BallConfig, PaddleConfig};

/// Register a ball at the centre of the arena
pub fn spawn_ball(
    world: &mut World,
    config: &BallConfig,
    velocity: Vector2<f32>,
) -> Result<Entity, EcsError> {
    let diameter = config.radius * 2.0;
    world.register_entity(vec![
        Component::new(Transform::new(
            Vector2::zeros(),
            Vector2::new(diameter, diameter),
        )),
        Component::new(Velocity(velocity)),
        Component::new(Ball {
            radius: config.radius,
        }),
    ])
}

/// Register the paddle defending `side`
pub fn spawn_paddle(
    world: &mut World,
    arena: &ArenaConfig,
    config: &PaddleConfig,
    side: Side,
) -> Result<Entity, EcsError> {
    let x = side.sign() * (arena.half_width() - config.inset);
    world.register_entity(vec![
        Component::new(Transform::new(
            Vector2::new(x, 0.0),
            Vector2::new(config.width, config.height),
        )),
        Component::new(Paddle {
            side,
            speed: config.speed,
        }),
    ])
}

/// Register a camera framing the whole arena
pub fn spawn_camera(world: &mut World, arena: &ArenaConfig) -> Result<Entity, EcsError> {
    world.register_entity(vec![
        Component::new(Transform::new(Vector2::zeros(), Vector2::new(1.0, 1.0))),
        Component::new(Camera {
            view_height: arena.height,
        }),
    ])
}
