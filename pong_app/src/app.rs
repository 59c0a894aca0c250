//! Headless Pong application
//!
//! Builds the world, then drives `World::update` from a [`FrameClock`] until
//! the frame budget runs out or a side wins.

use ecs_core::prelude::*;
use log::{debug, info};

use crate::components::Side;
use crate::config::PongConfig;
use crate::error::AppError;
use crate::spawn::{spawn_camera, spawn_paddle};
use crate::systems::{
    CameraSystem, CollisionSystem, MovementSystem, PaddleAiSystem, ScoreSystem, TransformSystem,
};

/// Outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSummary {
    /// Frames simulated
    pub frames: u64,
    /// Points scored by the left side
    pub left: u32,
    /// Points scored by the right side
    pub right: u32,
    /// Winner, if the match finished
    pub winner: Option<Side>,
    /// Model matrices recomputed over the run
    pub matrices_recomputed: u64,
}

/// Registered game systems, in registration order
struct GameSystems {
    camera: SystemId,
    score: SystemId,
    transform: SystemId,
    all: Vec<SystemId>,
}

/// Pong game driven by an ECS world
pub struct PongApp {
    config: PongConfig,
    world: World,
    clock: FrameClock,
    systems: GameSystems,
}

impl PongApp {
    /// Build the arena, the systems and the first serve
    pub fn new(config: PongConfig) -> Result<Self, AppError> {
        info!("Creating Pong world...");
        let mut world = World::with_config(config.world.clone());

        let camera = world.register_system(CameraSystem::install);
        spawn_camera(&mut world, &config.arena)?;
        for side in [Side::Left, Side::Right] {
            spawn_paddle(&mut world, &config.arena, &config.paddle, side)?;
        }

        let paddle_ai =
            world.register_system(|_| PaddleAiSystem::new(config.arena.height, config.paddle.height));
        let movement = world.register_system(|_| MovementSystem);
        let collision =
            world.register_system(|_| CollisionSystem::new(config.arena, config.ball.speedup));
        let transform = world.register_system(TransformSystem::install);
        let score = world.try_register_system(|ctx| {
            ScoreSystem::install(
                ctx,
                ScoreSystem::new(config.ball, config.points_to_win, config.seed),
            )
        })?;

        debug!(
            "Pong world ready: {} entities, {} systems",
            world.entity_count(),
            world.systems().len()
        );

        let clock = config.fixed_step.map_or_else(FrameClock::real_time, FrameClock::fixed);
        Ok(Self {
            config,
            world,
            clock,
            systems: GameSystems {
                camera,
                score,
                transform,
                all: vec![camera, paddle_ai, movement, collision, transform, score],
            },
        })
    }

    /// Simulate until a side wins or the frame budget is spent
    pub fn run(&mut self) -> Result<MatchSummary, AppError> {
        info!("Running Pong for up to {} frames", self.config.frames);
        while self.clock.frame_count() < self.config.frames {
            let delta = self.clock.tick();
            self.world.update(delta)?;
            if self.score()?.winner().is_some() {
                break;
            }
        }
        self.summary()
    }

    /// Current score and statistics
    pub fn summary(&self) -> Result<MatchSummary, AppError> {
        let score = self.score()?;
        let transform = self
            .world
            .system::<TransformSystem>(self.systems.transform)
            .ok_or(AppError::MissingSystem("transform"))?;
        Ok(MatchSummary {
            frames: self.world.frame_count(),
            left: score.points(Side::Left),
            right: score.points(Side::Right),
            winner: score.winner(),
            matrices_recomputed: transform.recomputed(),
        })
    }

    /// Camera currently selected for rendering
    pub fn active_camera(&self) -> Option<Entity> {
        self.world
            .system::<CameraSystem>(self.systems.camera)
            .and_then(CameraSystem::active)
    }

    /// The world being simulated
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Remove every system, newest first, then every entity
    pub fn shutdown(mut self) -> Result<(), AppError> {
        for id in self.systems.all.drain(..).rev() {
            self.world.remove_system(id);
        }
        let entities = self.world.entities().to_vec();
        for entity in entities {
            self.world.remove_entity(entity)?;
        }
        info!("Pong world shut down");
        Ok(())
    }

    fn score(&self) -> Result<&ScoreSystem, AppError> {
        self.world
            .system::<ScoreSystem>(self.systems.score)
            .ok_or(AppError::MissingSystem("score"))
    }
}
