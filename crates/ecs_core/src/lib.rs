//! # ECS Core
//!
//! The entity-component-system substrate that rendering, input, physics and
//! camera systems plug into.
//!
//! ## Features
//!
//! - **Dual component index**: components by type (registration order) and by entity
//! - **Synchronous event bus**: lifecycle and domain events delivered in subscription order
//! - **System lifecycle**: capability-based registration and an ordered per-frame update
//! - **Fail loudly**: registration is atomic, system failures propagate to the caller
//!
//! ## Quick Start
//!
//! ```rust
//! use ecs_core::prelude::*;
//!
//! struct Ticker {
//!     frames: u32,
//! }
//!
//! impl System for Ticker {
//!     fn name(&self) -> &str {
//!         "ticker"
//!     }
//!
//!     fn capabilities(&self) -> SystemCapabilities {
//!         SystemCapabilities::UPDATE
//!     }
//!
//!     fn update(&mut self, _delta: f32, _world: &mut World) -> SystemResult {
//!         self.frames += 1;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), EcsError> {
//!     let mut world = World::new();
//!     let entity = world.register_entity(vec![Component::with_type("Position", 0.0_f32)])?;
//!     let ticker = world.register_system(|_ctx| Ticker { frames: 0 });
//!
//!     world.update(1.0 / 60.0)?;
//!
//!     assert_eq!(world.system::<Ticker>(ticker).map(|t| t.frames), Some(1));
//!     assert!(world.get_component_by_entity_id_and_type(entity.id(), "Position").is_some());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod ecs;
pub mod events;
pub mod foundation;

pub use config::{Config, ConfigError, WorldConfig};
pub use ecs::{EcsError, World};

/// Common imports for world users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, WorldConfig},
        ecs::{
            BoxError, Component, ComponentData, ComponentType, DirtyFlag, EcsError, Entity,
            EntityId, System, SystemCapabilities, SystemContext, SystemId, SystemResult, World,
        },
        events::{Event, EventPayload, EventType},
        foundation::time::FrameClock,
    };
}
