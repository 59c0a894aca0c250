//! Event bus for world lifecycle and domain events
//!
//! Key principles:
//! - Topic registration (only notify interested systems)
//! - Synchronous delivery on the publishing call; only a subscriber that is
//!   still running gets the event once it returns
//! - Subscriber order is subscription order
//! - First failing handler stops delivery (see [`World::publish`](crate::World::publish))

use std::any::Any;
use std::borrow::{Borrow, Cow};
use std::collections::HashMap;
use std::fmt;

use crate::ecs::{ComponentType, Entity, SystemId};

/// Event topic identification
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventType(Cow<'static, str>);

impl EventType {
    /// An entity was registered; payload is [`EventPayload::Entity`]
    pub const ENTITY_REGISTERED: Self = Self::from_static("entity-registered");
    /// An entity is about to be removed; payload is [`EventPayload::Entity`]
    pub const ENTITY_REMOVED: Self = Self::from_static("entity-removed");
    /// A component was added to a live entity; payload is [`EventPayload::Component`]
    pub const COMPONENT_ADDED: Self = Self::from_static("component-added");
    /// A component is about to be removed from a live entity; payload is [`EventPayload::Component`]
    pub const COMPONENT_REMOVED: Self = Self::from_static("component-removed");

    /// Topic from a static string, usable in constants
    pub const fn from_static(topic: &'static str) -> Self {
        Self(Cow::Borrowed(topic))
    }

    /// Topic from any string
    pub fn new(topic: impl Into<Cow<'static, str>>) -> Self {
        Self(topic.into())
    }

    /// Topic text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EventType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for EventType {
    fn from(topic: &'static str) -> Self {
        Self::from_static(topic)
    }
}

impl From<String> for EventType {
    fn from(topic: String) -> Self {
        Self(Cow::Owned(topic))
    }
}

impl From<&EventType> for EventType {
    fn from(topic: &EventType) -> Self {
        topic.clone()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data carried by an event
pub enum EventPayload {
    /// No data
    None,
    /// Entity the event is about
    Entity(Entity),
    /// Component of an entity the event is about
    Component {
        /// Owning entity
        entity: Entity,
        /// Component tag
        component_type: ComponentType,
    },
    /// Collaborator-defined data
    Custom(Box<dyn Any>),
}

impl fmt::Debug for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Entity(entity) => f.debug_tuple("Entity").field(entity).finish(),
            Self::Component {
                entity,
                component_type,
            } => f
                .debug_struct("Component")
                .field("entity", entity)
                .field("component_type", component_type)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Immutable record published through the bus
#[derive(Debug)]
pub struct Event {
    event_type: EventType,
    payload: EventPayload,
}

impl Event {
    /// Create an event with an explicit payload
    pub fn new(event_type: impl Into<EventType>, payload: EventPayload) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }

    /// Create an event with no payload
    pub fn signal(event_type: impl Into<EventType>) -> Self {
        Self::new(event_type, EventPayload::None)
    }

    /// Create an event carrying collaborator-defined data
    pub fn custom<T: Any>(event_type: impl Into<EventType>, payload: T) -> Self {
        Self::new(event_type, EventPayload::Custom(Box::new(payload)))
    }

    /// Create an event about an entity
    pub fn for_entity(event_type: impl Into<EventType>, entity: Entity) -> Self {
        Self::new(event_type, EventPayload::Entity(entity))
    }

    pub(crate) fn entity_registered(entity: Entity) -> Self {
        Self::for_entity(EventType::ENTITY_REGISTERED, entity)
    }

    pub(crate) fn entity_removed(entity: Entity) -> Self {
        Self::for_entity(EventType::ENTITY_REMOVED, entity)
    }

    pub(crate) fn component_added(entity: Entity, component_type: ComponentType) -> Self {
        Self {
            event_type: EventType::COMPONENT_ADDED,
            payload: EventPayload::Component {
                entity,
                component_type,
            },
        }
    }

    pub(crate) fn component_removed(entity: Entity, component_type: ComponentType) -> Self {
        Self {
            event_type: EventType::COMPONENT_REMOVED,
            payload: EventPayload::Component {
                entity,
                component_type,
            },
        }
    }

    /// Topic of the event
    pub const fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Payload of the event
    pub const fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Entity the event is about, for entity and component payloads
    pub const fn entity(&self) -> Option<Entity> {
        match &self.payload {
            EventPayload::Entity(entity) | EventPayload::Component { entity, .. } => Some(*entity),
            EventPayload::None | EventPayload::Custom(_) => None,
        }
    }

    /// Component tag, for component payloads
    pub const fn component_type(&self) -> Option<&ComponentType> {
        match &self.payload {
            EventPayload::Component { component_type, .. } => Some(component_type),
            _ => None,
        }
    }

    /// Collaborator-defined payload as a `T`
    pub fn custom_payload<T: Any>(&self) -> Option<&T> {
        match &self.payload {
            EventPayload::Custom(data) => data.downcast_ref(),
            _ => None,
        }
    }
}

/// Topic → subscriber table
///
/// The bus only routes; delivery is performed by the world, which owns the
/// systems.
#[derive(Debug, Default)]
pub struct EventBus {
    subscriptions: HashMap<EventType, Vec<SystemId>>,
}

impl EventBus {
    /// Create a new empty event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system for each topic. Repeated pairs are ignored.
    pub fn subscribe<I, T>(&mut self, system: SystemId, event_types: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<EventType>,
    {
        for event_type in event_types {
            let subscribers = self
                .subscriptions
                .entry(event_type.into())
                .or_insert_with(Vec::new);
            if !subscribers.contains(&system) {
                subscribers.push(system);
            }
        }
    }

    /// Remove a system from each topic
    pub fn unsubscribe<I, T>(&mut self, system: SystemId, event_types: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<EventType>,
    {
        for event_type in event_types {
            let event_type: EventType = event_type.into();
            if let Some(subscribers) = self.subscriptions.get_mut(&event_type) {
                subscribers.retain(|id| *id != system);
            }
        }
    }

    /// Remove a system from every topic
    pub fn unsubscribe_all(&mut self, system: SystemId) {
        for subscribers in self.subscriptions.values_mut() {
            subscribers.retain(|id| *id != system);
        }
    }

    /// Snapshot of the subscribers of a topic, in subscription order
    pub fn subscribers(&self, event_type: &str) -> Vec<SystemId> {
        self.subscriptions
            .get(event_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a system is subscribed to a topic
    pub fn is_subscribed(&self, system: SystemId, event_type: &str) -> bool {
        self.subscriptions
            .get(event_type)
            .is_some_and(|subscribers| subscribers.contains(&system))
    }

    /// Topics a system is subscribed to, sorted
    pub fn topics_of(&self, system: SystemId) -> Vec<EventType> {
        let mut topics: Vec<EventType> = self
            .subscriptions
            .iter()
            .filter(|(_, subscribers)| subscribers.contains(&system))
            .map(|(topic, _)| topic.clone())
            .collect();
        topics.sort();
        topics
    }
}
