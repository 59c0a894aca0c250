//! Active camera selection
//!
//! The first camera in registration order is the active one. The choice is
//! re-evaluated whenever cameras come and go.

use ecs_core::prelude::*;
use log::info;

use crate::components::{ActiveCameraChanged, Camera, ACTIVE_CAMERA_CHANGED};

/// Tracks which camera the renderer should use
#[derive(Debug, Default)]
pub struct CameraSystem {
    active: Option<Entity>,
}

impl CameraSystem {
    /// Subscribe to entity and component lifecycle events and pick the
    /// camera among entities that already exist
    pub fn install(ctx: &mut SystemContext<'_>) -> Self {
        ctx.subscribe([
            EventType::ENTITY_REGISTERED,
            EventType::ENTITY_REMOVED,
            EventType::COMPONENT_ADDED,
            EventType::COMPONENT_REMOVED,
        ]);
        Self {
            active: first_camera(ctx.world(), None),
        }
    }

    /// The active camera, if any
    pub const fn active(&self) -> Option<Entity> {
        self.active
    }
}

/// First camera in registration order, ignoring `leaving`
fn first_camera(world: &World, leaving: Option<EntityId>) -> Option<Entity> {
    world
        .get_components_by_type(Camera::TYPE)
        .into_iter()
        .filter_map(Component::entity_id)
        .find(|id| Some(*id) != leaving)
        .and_then(|id| world.entity(id))
}

impl System for CameraSystem {
    fn name(&self) -> &str {
        "camera"
    }

    fn capabilities(&self) -> SystemCapabilities {
        SystemCapabilities::EVENTS
    }

    fn handle_event(&mut self, event: &Event, world: &mut World) -> SystemResult {
        let camera_removed = *event.event_type() == EventType::COMPONENT_REMOVED
            && event.component_type().map(ComponentType::as_str) == Some(Camera::TYPE);
        // Removal events fire while the entity is still indexed.
        let leaving = if *event.event_type() == EventType::ENTITY_REMOVED || camera_removed {
            event.entity().map(|entity| entity.id())
        } else {
            None
        };

        let candidate = first_camera(world, leaving);
        if candidate != self.active {
            info!(
                "Active camera changed: {:?} -> {:?}",
                self.active.map(|e| e.id()),
                candidate.map(|e| e.id())
            );
            self.active = candidate;
            world.publish(Event::custom(
                ACTIVE_CAMERA_CHANGED,
                ActiveCameraChanged { camera: candidate },
            ))?;
        }
        Ok(())
    }
}
