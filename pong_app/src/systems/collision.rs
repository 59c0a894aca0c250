//! Ball collisions against walls and paddles
//!
//! Bounces are resolved in place. A ball that crosses the left or right edge
//! is reported on the `ball-scored` topic; whoever handles that event decides
//! what happens to the ball.

use ecs_core::prelude::*;
use nalgebra::Vector2;

use super::collect;
use crate::components::{Ball, BallScored, Paddle, Side, Transform, Velocity, BALL_SCORED};
use crate::config::ArenaConfig;

/// Resolves ball bounces and detects points
#[derive(Debug)]
pub struct CollisionSystem {
    arena: ArenaConfig,
    speedup: f32,
}

impl CollisionSystem {
    /// Collisions for `arena`; every paddle hit multiplies ball speed by `speedup`
    pub const fn new(arena: ArenaConfig, speedup: f32) -> Self {
        Self { arena, speedup }
    }

    fn bounce_off_walls(&self, ball: Ball, position: &mut Vector2<f32>, velocity: &mut Vector2<f32>) {
        let limit = (self.arena.half_height() - ball.radius).max(0.0);
        if (position.y > limit && velocity.y > 0.0) || (position.y < -limit && velocity.y < 0.0) {
            velocity.y = -velocity.y;
            position.y = position.y.clamp(-limit, limit);
        }
    }

    fn bounce_off_paddles(
        &self,
        ball: Ball,
        paddles: &[(Paddle, Vector2<f32>, Vector2<f32>)],
        position: &Vector2<f32>,
        velocity: &mut Vector2<f32>,
    ) {
        for (paddle, centre, size) in paddles {
            let half = size * 0.5;
            let approaching = velocity.x * paddle.side.sign() > 0.0;
            let offset = position - centre;
            if approaching
                && offset.x.abs() <= half.x + ball.radius
                && offset.y.abs() <= half.y + ball.radius
            {
                let english = offset.y / half.y.max(f32::EPSILON) * velocity.x.abs() * 0.5;
                velocity.x = -velocity.x * self.speedup;
                velocity.y = velocity.y * self.speedup + english;
                log::trace!("Ball returned by {:?} paddle", paddle.side);
                return;
            }
        }
    }

    fn scorer(&self, ball: Ball, position: &Vector2<f32>) -> Option<Side> {
        let edge = self.arena.half_width() + ball.radius;
        if position.x < -edge {
            Some(Side::Right)
        } else if position.x > edge {
            Some(Side::Left)
        } else {
            None
        }
    }
}

impl System for CollisionSystem {
    fn name(&self) -> &str {
        "collision"
    }

    fn capabilities(&self) -> SystemCapabilities {
        SystemCapabilities::UPDATE
    }

    fn update(&mut self, _delta: f32, world: &mut World) -> SystemResult {
        let paddles: Vec<_> = collect::<Paddle>(world)
            .into_iter()
            .filter_map(|(id, paddle)| {
                let transform = world.component::<Transform>(id)?;
                Some((paddle, transform.position(), transform.scale()))
            })
            .collect();

        for (id, ball) in collect::<Ball>(world) {
            let (Some(transform), Some(&Velocity(mut velocity))) =
                (world.component::<Transform>(id), world.component::<Velocity>(id))
            else {
                continue;
            };
            let mut position = transform.position();
            let before = (position, velocity);

            self.bounce_off_walls(ball, &mut position, &mut velocity);
            self.bounce_off_paddles(ball, &paddles, &position, &mut velocity);

            if (position, velocity) != before {
                if let Some(transform) = world.component_mut::<Transform>(id) {
                    transform.set_position(position);
                }
                if let Some(current) = world.component_mut::<Velocity>(id) {
                    current.0 = velocity;
                }
            }

            if let Some(scorer) = self.scorer(ball, &position) {
                world.publish(Event::custom(BALL_SCORED, BallScored { scorer, ball: id }))?;
            }
        }
        Ok(())
    }
}
