//! Entity implementation

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide id source. Ids are never handed out twice, even across worlds,
/// so caches keyed by entity id can never alias a newer entity.
static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocate a fresh, never-before-seen id
    pub(crate) fn allocate() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for logging and external cache keys
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Handle to an entity registered in a [`World`](crate::ecs::World)
///
/// Component queries are resolved through the world that created the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    id: EntityId,
}

impl Entity {
    pub(crate) const fn new(id: EntityId) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub const fn id(&self) -> EntityId {
        self.id
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}
