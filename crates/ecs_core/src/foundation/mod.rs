//! Foundation module - Core utilities used by hosts of a world
//!
//! - Logging initialisation
//! - Frame timing

pub mod logging;
pub mod time;
