//! Game configuration

use ecs_core::{Config, WorldConfig};
use serde::{Deserialize, Serialize};

/// Top-level game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongConfig {
    /// Frames to simulate before stopping
    pub frames: u64,
    /// Fixed simulation step in seconds; real time when absent
    pub fixed_step: Option<f32>,
    /// Seed for serve directions
    pub seed: u64,
    /// Score that ends the match
    pub points_to_win: u32,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Playing field
    pub arena: ArenaConfig,
    /// Paddle settings
    pub paddle: PaddleConfig,
    /// Ball settings
    pub ball: BallConfig,
    /// World settings
    pub world: WorldConfig,
}

/// Playing field, centred on the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Width in world units
    pub width: f32,
    /// Height in world units
    pub height: f32,
}

/// Paddle settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleConfig {
    /// Paddle width
    pub width: f32,
    /// Paddle height
    pub height: f32,
    /// Distance between a paddle's centre and its wall
    pub inset: f32,
    /// Maximum vertical speed, units per second
    pub speed: f32,
}

/// Ball settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Ball radius
    pub radius: f32,
    /// Serve speed, units per second
    pub speed: f32,
    /// Speed multiplier applied on every paddle hit
    pub speedup: f32,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            frames: 3600,
            fixed_step: Some(1.0 / 60.0),
            seed: 7,
            points_to_win: 5,
            log_level: "info".to_string(),
            arena: ArenaConfig::default(),
            paddle: PaddleConfig::default(),
            ball: BallConfig::default(),
            world: WorldConfig::default(),
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            width: 16.0,
            height: 96.0,
            inset: 32.0,
            speed: 260.0,
        }
    }
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: 8.0,
            speed: 320.0,
            speedup: 1.05,
        }
    }
}

impl Config for PongConfig {}

impl ArenaConfig {
    /// Half of the arena width
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    /// Half of the arena height
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }
}
