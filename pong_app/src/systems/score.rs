//! Scoring and serving

use std::f32::consts::FRAC_PI_4;

use ecs_core::prelude::*;
use log::info;
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::{BallScored, Side, BALL_SCORED};
use crate::config::BallConfig;
use crate::spawn::spawn_ball;

/// Keeps the score and replaces the ball after every point
pub struct ScoreSystem {
    ball: BallConfig,
    points_to_win: u32,
    rng: StdRng,
    left: u32,
    right: u32,
    winner: Option<Side>,
    current_ball: Option<Entity>,
}

impl ScoreSystem {
    /// Seeded scorer; the match ends when a side reaches `points_to_win`
    pub fn new(ball: BallConfig, points_to_win: u32, seed: u64) -> Self {
        Self {
            ball,
            points_to_win,
            rng: StdRng::seed_from_u64(seed),
            left: 0,
            right: 0,
            winner: None,
            current_ball: None,
        }
    }

    /// Register the event subscription and serve the first ball
    pub fn install(ctx: &mut SystemContext<'_>, mut score: Self) -> Result<Self, BoxError> {
        ctx.subscribe([BALL_SCORED]);
        score.serve(ctx.world_mut(), Side::Left)?;
        Ok(score)
    }

    /// Points for a side
    pub const fn points(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Winner, once the match is over
    pub const fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// The ball in play
    #[cfg(test)]
    pub const fn current_ball(&self) -> Option<Entity> {
        self.current_ball
    }

    /// Spawn a ball heading towards `towards` at a random angle
    fn serve(&mut self, world: &mut World, towards: Side) -> Result<(), EcsError> {
        let angle = self.rng.gen_range(-FRAC_PI_4..=FRAC_PI_4);
        let velocity =
            Vector2::new(angle.cos() * towards.sign(), angle.sin()) * self.ball.speed;
        self.current_ball = Some(spawn_ball(world, &self.ball, velocity)?);
        Ok(())
    }

    fn award(&mut self, scorer: Side) -> u32 {
        let points = match scorer {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        *points += 1;
        *points
    }
}

impl System for ScoreSystem {
    fn name(&self) -> &str {
        "score"
    }

    fn capabilities(&self) -> SystemCapabilities {
        SystemCapabilities::EVENTS
    }

    fn handle_event(&mut self, event: &Event, world: &mut World) -> SystemResult {
        let Some(&BallScored { scorer, ball }) = event.custom_payload::<BallScored>() else {
            return Ok(());
        };
        if self.winner.is_some() {
            return Ok(());
        }

        let points = self.award(scorer);
        info!("Point to {:?}: {} - {}", scorer, self.left, self.right);

        if let Some(ball) = world.entity(ball) {
            world.remove_entity(ball)?;
        }
        self.current_ball = None;

        if points >= self.points_to_win {
            info!("{:?} wins the match", scorer);
            self.winner = Some(scorer);
        } else {
            self.serve(world, scorer.opponent())?;
        }
        Ok(())
    }
}
