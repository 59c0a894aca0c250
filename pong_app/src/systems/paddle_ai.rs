//! Computer-controlled paddles

use ecs_core::prelude::*;
use nalgebra::Vector2;

use super::collect;
use crate::components::{Ball, Paddle, Transform};

/// Moves each paddle towards the ball at no more than its top speed
#[derive(Debug)]
pub struct PaddleAiSystem {
    /// How far a paddle centre may travel from the midline
    travel: f32,
}

impl PaddleAiSystem {
    /// AI for an arena of `arena_height` with paddles of `paddle_height`
    pub fn new(arena_height: f32, paddle_height: f32) -> Self {
        Self {
            travel: ((arena_height - paddle_height) * 0.5).max(0.0),
        }
    }
}

impl System for PaddleAiSystem {
    fn name(&self) -> &str {
        "paddle-ai"
    }

    fn capabilities(&self) -> SystemCapabilities {
        SystemCapabilities::UPDATE
    }

    fn update(&mut self, delta: f32, world: &mut World) -> SystemResult {
        let target = collect::<Ball>(world)
            .first()
            .and_then(|(id, _)| world.component::<Transform>(*id))
            .map_or(0.0, |transform| transform.position().y);

        for (id, paddle) in collect::<Paddle>(world) {
            let Some(transform) = world.component_mut::<Transform>(id) else {
                continue;
            };
            let current = transform.position();
            let step = (target - current.y).clamp(-paddle.speed * delta, paddle.speed * delta);
            if step.abs() > f32::EPSILON {
                let y = (current.y + step).clamp(-self.travel, self.travel);
                transform.set_position(Vector2::new(current.x, y));
            }
        }
        Ok(())
    }
}
