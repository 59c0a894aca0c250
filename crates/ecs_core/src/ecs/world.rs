//! ECS World implementation
//!
//! Ordering guarantees:
//! - `register_entity` publishes `entity-registered` only after both indexes
//!   are updated, so subscribers see a complete entity.
//! - `remove_entity` publishes `entity-removed` before the indexes are
//!   cleared, so subscribers can still read the entity's components.
//! - `update` runs updateable systems strictly in registration order, and an
//!   event published by one system is delivered before the next one runs.
//! - An event aimed at a system that is still running is parked and handed
//!   to it right after it returns; the other subscribers get it immediately.

use std::any::type_name;
use std::collections::HashSet;
use std::rc::Rc;

use log::{debug, trace, warn};

use super::scheduler::{Checkout, Detached, Removal};
use super::{
    BoxError, Component, ComponentData, EcsError, Entity, EntityId, EntityRegistry, System,
    SystemCapabilities, SystemContext, SystemId, SystemManager,
};
use crate::config::WorldConfig;
use crate::events::{Event, EventBus, EventType};

/// ECS World containing all entities, components, systems and subscriptions
pub struct World {
    config: WorldConfig,
    registry: EntityRegistry,
    bus: EventBus,
    systems: SystemManager,
    /// Entities whose `entity-removed` event is being delivered
    removing: HashSet<EntityId>,
    frame_count: u64,
}

impl World {
    /// Create a new world with default settings
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a new world from configuration
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            registry: EntityRegistry::with_type_capacity(config.type_capacity),
            bus: EventBus::new(),
            systems: SystemManager::new(),
            removing: HashSet::new(),
            frame_count: 0,
            config,
        }
    }

    /// Active configuration
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Entities and components
    // ---------------------------------------------------------------------

    /// Register an entity with its initial components
    ///
    /// Fails with [`EcsError::DuplicateComponentType`] if two components share
    /// a tag; nothing is indexed in that case. On success `entity-registered`
    /// is published. If a subscriber fails, the registration is rolled back:
    /// `entity-removed` is published, the entity is dropped and the
    /// subscriber's error is returned.
    pub fn register_entity(&mut self, components: Vec<Component>) -> Result<Entity, EcsError> {
        let count = components.len();
        let entity = self.registry.insert_entity(components)?;
        debug!("Registered {} with {} components", entity, count);
        if let Err(error) = self.publish(Event::entity_registered(entity)) {
            self.unwind_registration(entity);
            return Err(error);
        }
        Ok(entity)
    }

    fn unwind_registration(&mut self, entity: Entity) {
        let id = entity.id();
        if !self.registry.contains(id) || !self.removing.insert(id) {
            return;
        }
        if let Err(error) = self.publish(Event::entity_removed(entity)) {
            warn!("Rolling back {}: {}", entity, error);
        }
        self.removing.remove(&id);
        let removed = self.registry.remove_entity(id);
        debug!("Rolled back {} and {} components", entity, removed.len());
    }

    /// Remove an entity and all of its components
    ///
    /// Unknown or already removed entities are ignored. If an
    /// `entity-removed` subscriber fails, the error is returned and the
    /// entity is left registered.
    pub fn remove_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        let id = entity.id();
        if !self.registry.contains(id) || !self.removing.insert(id) {
            return Ok(());
        }
        let published = self.publish(Event::entity_removed(entity));
        self.removing.remove(&id);
        published?;

        let removed = self.registry.remove_entity(id);
        debug!("Removed {} and {} components", entity, removed.len());
        Ok(())
    }

    /// Attach a component to a registered entity
    ///
    /// Publishes `component-added` once the component is indexed.
    pub fn add_component(&mut self, entity: Entity, component: Component) -> Result<(), EcsError> {
        let component_type = component.component_type().clone();
        self.registry.insert_component(entity.id(), component)?;
        trace!("Added {} to {}", component_type, entity);
        self.publish(Event::component_added(entity, component_type))
    }

    /// Detach a component from an entity
    ///
    /// Publishes `component-removed` while the component is still indexed,
    /// then returns it. Absent components are ignored.
    pub fn remove_component(
        &mut self,
        entity: Entity,
        component_type: &str,
    ) -> Result<Option<Component>, EcsError> {
        let Some(tag) = self
            .registry
            .get(entity.id(), component_type)
            .map(|component| component.component_type().clone())
        else {
            return Ok(None);
        };
        self.publish(Event::component_removed(entity, tag))?;
        let removed = self.registry.remove_component(entity.id(), component_type);
        trace!("Removed {} from {}", component_type, entity);
        Ok(removed)
    }

    /// All components of a type, in registration order
    pub fn get_components_by_type(&self, component_type: &str) -> Vec<&Component> {
        self.registry.by_type(component_type)
    }

    /// All components of a type, mutably, in registration order
    pub fn get_components_by_type_mut(&mut self, component_type: &str) -> Vec<&mut Component> {
        self.registry.by_type_mut(component_type)
    }

    /// All components of an entity, in registration order
    pub fn get_components_by_entity_id(&self, id: EntityId) -> Vec<&Component> {
        self.registry.by_entity(id)
    }

    /// The entity's single component of a type, if any
    pub fn get_component_by_entity_id_and_type(
        &self,
        id: EntityId,
        component_type: &str,
    ) -> Option<&Component> {
        self.registry.get(id, component_type)
    }

    /// Mutable variant of [`get_component_by_entity_id_and_type`](Self::get_component_by_entity_id_and_type)
    pub fn get_component_by_entity_id_and_type_mut(
        &mut self,
        id: EntityId,
        component_type: &str,
    ) -> Option<&mut Component> {
        self.registry.get_mut(id, component_type)
    }

    /// Typed payload of the entity's `T` component
    pub fn component<T: ComponentData>(&self, id: EntityId) -> Option<&T> {
        self.registry.get(id, T::TYPE)?.data()
    }

    /// Mutable typed payload of the entity's `T` component
    pub fn component_mut<T: ComponentData>(&mut self, id: EntityId) -> Option<&mut T> {
        self.registry.get_mut(id, T::TYPE)?.data_mut()
    }

    /// Handle of a registered entity
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        self.registry.contains(id).then_some(Entity::new(id))
    }

    /// Whether the entity is registered
    pub fn is_registered(&self, entity: Entity) -> bool {
        self.registry.contains(entity.id())
    }

    /// Registered entities, in registration order
    pub fn entities(&self) -> &[Entity] {
        self.registry.entities()
    }

    /// Number of registered entities
    pub fn entity_count(&self) -> usize {
        self.registry.entity_count()
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// Subscribe a system to event topics
    pub fn subscribe<I, T>(&mut self, system: SystemId, event_types: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<EventType>,
    {
        self.bus.subscribe(system, event_types);
    }

    /// Unsubscribe a system from event topics
    pub fn unsubscribe<I, T>(&mut self, system: SystemId, event_types: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<EventType>,
    {
        self.bus.unsubscribe(system, event_types);
    }

    /// Unsubscribe a system from every topic
    pub fn unsubscribe_all(&mut self, system: SystemId) {
        self.bus.unsubscribe_all(system);
    }

    /// Subscription table
    pub const fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Deliver an event synchronously to every subscriber of its topic
    ///
    /// Subscribers are called in subscription order. The first failing
    /// handler stops delivery and its error is returned; remaining
    /// subscribers are not notified. A subscriber that is running when the
    /// event is published receives it as soon as its current call returns.
    pub fn publish(&mut self, event: Event) -> Result<(), EcsError> {
        let event = Rc::new(event);
        let subscribers = self.bus.subscribers(event.event_type().as_str());
        if self.config.trace_events {
            trace!(
                "Publishing {} to {} subscribers",
                event.event_type(),
                subscribers.len()
            );
        }
        for id in subscribers {
            self.deliver(id, &event)?;
        }
        Ok(())
    }

    fn deliver(&mut self, id: SystemId, event: &Rc<Event>) -> Result<(), EcsError> {
        let handles_events = self
            .systems
            .capabilities(id)
            .is_some_and(|caps| caps.contains(SystemCapabilities::EVENTS));
        if !handles_events {
            return Ok(());
        }
        let mut system = match self.systems.checkout(id) {
            Checkout::Ready(system) => system,
            Checkout::Running => {
                trace!("Parked {} for running system {}", event.event_type(), id);
                self.systems.park(id, Rc::clone(event));
                return Ok(());
            }
            Checkout::Absent => return Ok(()),
        };
        let result = system
            .handle_event(event, self)
            .map_err(|source| EcsError::system_failed(system.name(), source));
        self.checkin(id, system);
        result?;
        self.flush(id)
    }

    /// Hand a system the events parked while it was running
    ///
    /// Stops at the first failure; the rest stay parked until the system's
    /// next call returns.
    fn flush(&mut self, id: SystemId) -> Result<(), EcsError> {
        while let Some(event) = self.systems.next_pending(id) {
            self.deliver(id, &event)?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Systems
    // ---------------------------------------------------------------------

    /// Construct and register a system
    ///
    /// The factory receives a [`SystemContext`] so the system can subscribe
    /// to topics and query the world while it is built.
    pub fn register_system<S, F>(&mut self, factory: F) -> SystemId
    where
        S: System,
        F: FnOnce(&mut SystemContext<'_>) -> S,
    {
        let id = self.systems.allocate_id();
        let system = factory(&mut SystemContext { world: &mut *self, id });
        self.install(id, Box::new(system));
        id
    }

    /// Construct and register a system whose construction can fail
    ///
    /// Subscriptions made by a failing factory are rolled back.
    pub fn try_register_system<S, F>(&mut self, factory: F) -> Result<SystemId, EcsError>
    where
        S: System,
        F: FnOnce(&mut SystemContext<'_>) -> Result<S, BoxError>,
    {
        let id = self.systems.allocate_id();
        match factory(&mut SystemContext { world: &mut *self, id }) {
            Ok(system) => {
                self.install(id, Box::new(system));
                Ok(id)
            }
            Err(source) => {
                self.bus.unsubscribe_all(id);
                Err(EcsError::system_failed(type_name::<S>(), source))
            }
        }
    }

    fn install(&mut self, id: SystemId, system: Box<dyn System>) {
        let capabilities = self.systems.insert(id, system);
        if !capabilities.contains(SystemCapabilities::EVENTS) {
            let topics = self.bus.topics_of(id);
            if !topics.is_empty() {
                warn!(
                    "{} subscribed to {:?} without the EVENTS capability; subscriptions dropped",
                    id,
                    topics
                );
                self.bus.unsubscribe_all(id);
            }
        }
        debug!(
            "Registered system '{}' ({}) with {:?}",
            self.systems.name(id).unwrap_or_default(),
            id,
            capabilities
        );
    }

    /// Remove a system
    ///
    /// Runs its `cleanup` hook once and unsubscribes it from every topic.
    /// A system removed while running is torn down as soon as it returns.
    /// Returns `false` if the system was unknown or already removed.
    pub fn remove_system(&mut self, id: SystemId) -> bool {
        match self.systems.remove(id) {
            Removal::Detached(detached) => {
                self.retire(id, detached);
                true
            }
            Removal::Deferred => {
                self.bus.unsubscribe_all(id);
                debug!("Deferred removal of running system {}", id);
                true
            }
            Removal::Unknown => false,
        }
    }

    fn checkin(&mut self, id: SystemId, system: Box<dyn System>) {
        if let Some(detached) = self.systems.checkin(id, system) {
            self.retire(id, detached);
        }
    }

    fn retire(&mut self, id: SystemId, detached: Detached) {
        let Detached {
            mut system,
            capabilities,
        } = detached;
        self.bus.unsubscribe_all(id);
        if capabilities.contains(SystemCapabilities::CLEANUP) {
            system.cleanup(self);
        }
        debug!("Removed system '{}' ({})", system.name(), id);
    }

    /// Borrow a registered system as its concrete type
    ///
    /// `None` while the system is running.
    pub fn system<S: System>(&self, id: SystemId) -> Option<&S> {
        self.systems.get(id)?.as_any().downcast_ref()
    }

    /// Mutably borrow a registered system as its concrete type
    pub fn system_mut<S: System>(&mut self, id: SystemId) -> Option<&mut S> {
        self.systems.get_mut(id)?.as_any_mut().downcast_mut()
    }

    /// Whether the system is registered
    pub fn has_system(&self, id: SystemId) -> bool {
        self.systems.contains(id)
    }

    /// System table
    pub const fn systems(&self) -> &SystemManager {
        &self.systems
    }

    // ---------------------------------------------------------------------
    // Frame loop
    // ---------------------------------------------------------------------

    /// Run one frame: every updateable system, in registration order
    ///
    /// All systems receive the same `delta` (clamped to
    /// [`WorldConfig::max_delta`] when set). Systems registered during the
    /// frame first run on the next one; systems removed before their turn
    /// are skipped. The first failure aborts the frame and is returned.
    ///
    /// Calling `update` from inside a system's own `update` fails with
    /// [`EcsError::SystemBusy`] once the frame reaches that system.
    pub fn update(&mut self, delta: f32) -> Result<(), EcsError> {
        let delta = self.config.max_delta.map_or(delta, |max| delta.min(max));
        self.frame_count += 1;
        trace!("Frame {} (delta {})", self.frame_count, delta);

        for id in self.systems.updateable_snapshot() {
            let mut system = match self.systems.checkout(id) {
                Checkout::Ready(system) => system,
                Checkout::Running => {
                    return Err(EcsError::SystemBusy {
                        system: id,
                        name: self.systems.name(id).unwrap_or_default().to_owned(),
                    })
                }
                Checkout::Absent => continue,
            };
            let result = system
                .update(delta, self)
                .map_err(|source| EcsError::system_failed(system.name(), source));
            self.checkin(id, system);
            result?;
            self.flush(id)?;
        }
        Ok(())
    }

    /// Number of `update` calls so far
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
