//! World error types

use thiserror::Error;

use super::{BoxError, ComponentType, EntityId, SystemId};

/// Errors raised by [`World`](super::World) operations
#[derive(Error, Debug)]
pub enum EcsError {
    /// Two components of one entity share a type tag. Nothing was indexed.
    #[error("duplicate component type `{component_type}`")]
    DuplicateComponentType {
        /// The repeated tag
        component_type: ComponentType,
    },

    /// The component already belongs to another entity
    #[error("component `{component_type}` already belongs to {owner}")]
    ComponentAlreadyOwned {
        /// Tag of the offending component
        component_type: ComponentType,
        /// Its current owner
        owner: EntityId,
    },

    /// The entity is not registered in this world
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// A frame was started from inside a system that is still running
    #[error("system `{name}` ({system}) is already running and cannot be re-entered")]
    SystemBusy {
        /// Id of the running system
        system: SystemId,
        /// Its name
        name: String,
    },

    /// A system's event handler, update or constructor failed
    #[error("system `{system}` failed: {source}")]
    SystemFailed {
        /// Name of the failing system
        system: String,
        /// The system's own error
        #[source]
        source: BoxError,
    },
}

impl EcsError {
    pub(crate) fn system_failed(system: &str, source: BoxError) -> Self {
        Self::SystemFailed {
            system: system.to_owned(),
            source,
        }
    }
}
