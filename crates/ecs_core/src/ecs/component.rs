//! Component records and the string tags that index them
//!
//! A component is a tagged, opaque data value. The core indexes components by
//! their [`ComponentType`] tag and never looks inside the payload; systems
//! recover the concrete type with [`Component::data`], guarded by the tag.

use std::any::Any;
use std::borrow::{Borrow, Cow};
use std::fmt;

use super::EntityId;

/// String tag naming a kind of component
///
/// An entity holds at most one component per tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentType(Cow<'static, str>);

impl ComponentType {
    /// Tag from a static string, usable in constants
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    /// Tag from any string
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Self(tag.into())
    }

    /// Tag text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ComponentType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ComponentType {
    fn from(tag: &'static str) -> Self {
        Self::from_static(tag)
    }
}

impl From<String> for ComponentType {
    fn from(tag: String) -> Self {
        Self(Cow::Owned(tag))
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload types that carry their own component tag
///
/// ```rust
/// use ecs_core::ecs::{Component, ComponentData};
///
/// struct Position { x: f32 }
///
/// impl ComponentData for Position {
///     const TYPE: &'static str = "Position";
/// }
///
/// let component = Component::new(Position { x: 0.0 });
/// assert_eq!(component.component_type().as_str(), "Position");
/// ```
pub trait ComponentData: Any {
    /// Tag under which components of this payload are indexed
    const TYPE: &'static str;

    /// The tag as a [`ComponentType`]
    fn component_type() -> ComponentType {
        ComponentType::from_static(Self::TYPE)
    }
}

/// A named, typed unit of data owned by at most one entity
pub struct Component {
    component_type: ComponentType,
    entity_id: Option<EntityId>,
    data: Box<dyn Any>,
}

impl Component {
    /// Create a component tagged with the payload's [`ComponentData::TYPE`]
    pub fn new<T: ComponentData>(data: T) -> Self {
        Self::with_type(T::TYPE, data)
    }

    /// Create a component with an explicit tag
    pub fn with_type<T: Any>(component_type: impl Into<ComponentType>, data: T) -> Self {
        Self {
            component_type: component_type.into(),
            entity_id: None,
            data: Box::new(data),
        }
    }

    /// The component's tag
    pub const fn component_type(&self) -> &ComponentType {
        &self.component_type
    }

    /// Owning entity, once the component has been registered
    pub const fn entity_id(&self) -> Option<EntityId> {
        self.entity_id
    }

    /// Bind the component to its owner. Callers check ownership first.
    pub(crate) fn assign_entity(&mut self, entity_id: EntityId) {
        debug_assert!(
            self.entity_id.is_none() || self.entity_id == Some(entity_id),
            "component {} reassigned from {:?} to {}",
            self.component_type,
            self.entity_id,
            entity_id
        );
        self.entity_id = Some(entity_id);
    }

    /// Whether the payload is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.data.is::<T>()
    }

    /// Borrow the payload as a `T`
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref()
    }

    /// Mutably borrow the payload as a `T`
    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.downcast_mut()
    }

    /// Take the payload out, or give the component back if it is not a `T`
    pub fn into_data<T: Any>(self) -> Result<T, Self> {
        let Self {
            component_type,
            entity_id,
            data,
        } = self;
        data.downcast::<T>().map(|data| *data).map_err(|data| Self {
            component_type,
            entity_id,
            data,
        })
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("component_type", &self.component_type)
            .field("entity_id", &self.entity_id)
            .finish_non_exhaustive()
    }
}

/// Staleness marker for derived state (model matrices, uniform blocks, ...)
///
/// Producers call [`mark`](Self::mark) when source data changes; the consuming
/// system recomputes and calls [`take`](Self::take). Starts dirty, since
/// derived state has never been computed for a fresh component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyFlag(bool);

impl DirtyFlag {
    /// A flag that starts clean
    pub const fn clean() -> Self {
        Self(false)
    }

    /// Flag the derived state as stale
    pub fn mark(&mut self) {
        self.0 = true;
    }

    /// Flag the derived state as fresh
    pub fn clear(&mut self) {
        self.0 = false;
    }

    /// Whether derived state must be recomputed
    pub const fn is_dirty(self) -> bool {
        self.0
    }

    /// Clear the flag, reporting whether it was set
    pub fn take(&mut self) -> bool {
        std::mem::replace(&mut self.0, false)
    }
}

impl Default for DirtyFlag {
    fn default() -> Self {
        Self(true)
    }
}
