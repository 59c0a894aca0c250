//! Application errors

use ecs_core::{ConfigError, EcsError};
use thiserror::Error;

/// Errors that stop the game
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The world rejected an operation or a system failed
    #[error("world error: {0}")]
    Ecs(#[from] EcsError),

    /// A game system is no longer registered
    #[error("missing system: {0}")]
    MissingSystem(&'static str),
}
