//! Entity-Component-System implementation
//!
//! The [`World`] is the only object application code touches directly. It
//! composes the entity registry, the event bus and the system manager.

pub mod component;
pub mod entity;
pub mod error;
pub mod registry;
pub mod scheduler;
pub mod system;
pub mod world;

#[cfg(test)]
mod tests;

pub use component::{Component, ComponentData, ComponentType, DirtyFlag};
pub use entity::{Entity, EntityId};
pub use error::EcsError;
pub use registry::EntityRegistry;
pub use scheduler::SystemManager;
pub use system::{BoxError, System, SystemCapabilities, SystemContext, SystemId, SystemResult};
pub use world::World;
