//! Velocity integration

use ecs_core::prelude::*;

use super::collect;
use crate::components::{Transform, Velocity};

/// Moves every entity with a [`Velocity`] and a [`Transform`]
#[derive(Debug, Default)]
pub struct MovementSystem;

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn capabilities(&self) -> SystemCapabilities {
        SystemCapabilities::UPDATE
    }

    fn update(&mut self, delta: f32, world: &mut World) -> SystemResult {
        for (id, Velocity(velocity)) in collect::<Velocity>(world) {
            if let Some(transform) = world.component_mut::<Transform>(id) {
                transform.translate(velocity * delta);
            }
        }
        Ok(())
    }
}
