//! Game systems, in the order the app registers them

mod camera;
mod collision;
mod movement;
mod paddle_ai;
mod score;
mod transform;

pub use camera::CameraSystem;
pub use collision::CollisionSystem;
pub use movement::MovementSystem;
pub use paddle_ai::PaddleAiSystem;
pub use score::ScoreSystem;
pub use transform::TransformSystem;

use ecs_core::prelude::*;

/// Copy out every `T` component together with its owner
fn collect<T: ComponentData + Copy>(world: &World) -> Vec<(EntityId, T)> {
    world
        .get_components_by_type(T::TYPE)
        .into_iter()
        .filter_map(|component| Some((component.entity_id()?, *component.data::<T>()?)))
        .collect()
}
