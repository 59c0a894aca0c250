//! Model matrix cache
//!
//! Only dirty transforms are recomputed. Cached matrices are keyed by entity
//! id and evicted as soon as their entity or its transform goes away.

use std::collections::HashMap;

use ecs_core::prelude::*;
use log::debug;
use nalgebra::Matrix4;

use crate::components::Transform;

/// Keeps a model matrix per entity with a [`Transform`]
#[derive(Debug, Default)]
pub struct TransformSystem {
    matrices: HashMap<EntityId, Matrix4<f32>>,
    recomputed: u64,
}

impl TransformSystem {
    /// Register the system's event subscriptions
    pub fn install(ctx: &mut SystemContext<'_>) -> Self {
        ctx.subscribe([EventType::ENTITY_REMOVED, EventType::COMPONENT_REMOVED]);
        Self::default()
    }

    /// Cached model matrix of an entity
    #[cfg(test)]
    pub fn model_matrix(&self, id: EntityId) -> Option<&Matrix4<f32>> {
        self.matrices.get(&id)
    }

    /// Number of cached matrices
    #[cfg(test)]
    pub fn cached(&self) -> usize {
        self.matrices.len()
    }

    /// Number of matrix recomputations so far
    pub const fn recomputed(&self) -> u64 {
        self.recomputed
    }
}

impl System for TransformSystem {
    fn name(&self) -> &str {
        "transform"
    }

    fn capabilities(&self) -> SystemCapabilities {
        SystemCapabilities::UPDATE | SystemCapabilities::EVENTS | SystemCapabilities::CLEANUP
    }

    fn update(&mut self, _delta: f32, world: &mut World) -> SystemResult {
        for component in world.get_components_by_type_mut(Transform::TYPE) {
            let Some(id) = component.entity_id() else {
                continue;
            };
            if let Some(transform) = component.data_mut::<Transform>() {
                if transform.take_dirty() {
                    self.matrices.insert(id, transform.model_matrix());
                    self.recomputed += 1;
                }
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &Event, _world: &mut World) -> SystemResult {
        let evict = *event.event_type() == EventType::ENTITY_REMOVED
            || event.component_type().map(ComponentType::as_str) == Some(Transform::TYPE);
        if let Some(entity) = event.entity().filter(|_| evict) {
            self.matrices.remove(&entity.id());
        }
        Ok(())
    }

    fn cleanup(&mut self, _world: &mut World) {
        debug!("Releasing {} cached model matrices", self.matrices.len());
        self.matrices.clear();
    }
}
