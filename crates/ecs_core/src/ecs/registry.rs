//! Entity registry with the dual component index
//!
//! Components live in per-type slot map columns. Two indexes point into them:
//! - `by_type`: tag → column, whose key list keeps registration order
//! - `by_entity`: entity → (tag, key) pairs, in registration order
//!
//! A key is present in `by_type[c.type]` iff it is present in
//! `by_entity[c.entity_id]`, for exactly as long as the entity is registered.
//! Every mutating method below maintains that invariant and validates its
//! input before touching either index. Columns left empty are dropped.

use std::collections::{HashMap, HashSet};

use slotmap::{new_key_type, SlotMap};

use super::{Component, ComponentType, EcsError, Entity, EntityId};

new_key_type! {
    /// Stable handle to a component within its type's column
    pub struct ComponentKey;
}

/// Every component of one type
#[derive(Debug, Default)]
struct Column {
    components: SlotMap<ComponentKey, Component>,
    /// Keys in registration order
    order: Vec<ComponentKey>,
}

impl Column {
    fn remove(&mut self, key: ComponentKey) -> Option<Component> {
        let component = self.components.remove(key)?;
        self.order.retain(|k| *k != key);
        Some(component)
    }
}

/// Owns entity identities and the component indexes
#[derive(Debug, Default)]
pub struct EntityRegistry {
    by_type: HashMap<ComponentType, Column>,
    by_entity: HashMap<EntityId, Vec<(ComponentType, ComponentKey)>>,
    entities: Vec<Entity>,
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with room for `type_capacity` component types
    pub fn with_type_capacity(type_capacity: usize) -> Self {
        Self {
            by_type: HashMap::with_capacity(type_capacity),
            ..Self::default()
        }
    }

    /// Register a new entity owning `components`
    ///
    /// All-or-nothing: the input is validated before any index is touched.
    pub fn insert_entity(&mut self, components: Vec<Component>) -> Result<Entity, EcsError> {
        let mut seen = HashSet::with_capacity(components.len());
        for component in &components {
            if !seen.insert(component.component_type()) {
                return Err(EcsError::DuplicateComponentType {
                    component_type: component.component_type().clone(),
                });
            }
            if let Some(owner) = component.entity_id() {
                return Err(EcsError::ComponentAlreadyOwned {
                    component_type: component.component_type().clone(),
                    owner,
                });
            }
        }

        let entity = Entity::new(EntityId::allocate());
        let mut entries = Vec::with_capacity(components.len());
        for component in components {
            entries.push(self.index(entity.id(), component));
        }
        self.by_entity.insert(entity.id(), entries);
        self.entities.push(entity);
        Ok(entity)
    }

    /// Drop an entity and all of its components. Unknown entities are ignored.
    pub fn remove_entity(&mut self, id: EntityId) -> Vec<Component> {
        let Some(entries) = self.by_entity.remove(&id) else {
            return Vec::new();
        };
        self.entities.retain(|entity| entity.id() != id);

        entries
            .into_iter()
            .filter_map(|(tag, key)| self.unindex(tag.as_str(), key))
            .collect()
    }

    /// Attach a component to a registered entity
    pub fn insert_component(&mut self, id: EntityId, component: Component) -> Result<(), EcsError> {
        if !self.contains(id) {
            return Err(EcsError::UnknownEntity(id));
        }
        if self.key_of(id, component.component_type().as_str()).is_some() {
            return Err(EcsError::DuplicateComponentType {
                component_type: component.component_type().clone(),
            });
        }
        if let Some(owner) = component.entity_id().filter(|owner| *owner != id) {
            return Err(EcsError::ComponentAlreadyOwned {
                component_type: component.component_type().clone(),
                owner,
            });
        }

        let entry = self.index(id, component);
        self.by_entity.entry(id).or_default().push(entry);
        Ok(())
    }

    /// Detach one component from an entity, if present
    pub fn remove_component(&mut self, id: EntityId, component_type: &str) -> Option<Component> {
        let key = self.key_of(id, component_type)?;
        if let Some(entries) = self.by_entity.get_mut(&id) {
            entries.retain(|(_, k)| *k != key);
        }
        self.unindex(component_type, key)
    }

    /// Whether the entity is registered
    pub fn contains(&self, id: EntityId) -> bool {
        self.by_entity.contains_key(&id)
    }

    /// Registered entities in registration order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of registered entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of stored components
    pub fn component_count(&self) -> usize {
        self.by_type.values().map(|column| column.components.len()).sum()
    }

    /// Number of component types currently in use
    pub fn type_count(&self) -> usize {
        self.by_type.len()
    }

    /// All components of a type, in registration order
    pub fn by_type(&self, component_type: &str) -> Vec<&Component> {
        self.by_type
            .get(component_type)
            .map(|column| {
                column
                    .order
                    .iter()
                    .filter_map(|key| column.components.get(*key))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All components of a type, mutably, in registration order
    ///
    /// Only the type's own column is visited.
    pub fn by_type_mut(&mut self, component_type: &str) -> Vec<&mut Component> {
        let Some(Column { components, order }) = self.by_type.get_mut(component_type) else {
            return Vec::new();
        };
        let mut slots: HashMap<ComponentKey, &mut Component> = components.iter_mut().collect();
        order.iter().filter_map(|key| slots.remove(key)).collect()
    }

    /// All components of an entity, in registration order
    pub fn by_entity(&self, id: EntityId) -> Vec<&Component> {
        self.by_entity
            .get(&id)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(tag, key)| self.by_type.get(tag)?.components.get(*key))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The entity's component of a type
    pub fn get(&self, id: EntityId, component_type: &str) -> Option<&Component> {
        let key = self.key_of(id, component_type)?;
        self.by_type.get(component_type)?.components.get(key)
    }

    /// The entity's component of a type, mutably
    pub fn get_mut(&mut self, id: EntityId, component_type: &str) -> Option<&mut Component> {
        let key = self.key_of(id, component_type)?;
        self.by_type.get_mut(component_type)?.components.get_mut(key)
    }

    fn key_of(&self, id: EntityId, component_type: &str) -> Option<ComponentKey> {
        self.by_entity
            .get(&id)?
            .iter()
            .find(|(tag, _)| tag.as_str() == component_type)
            .map(|(_, key)| *key)
    }

    fn index(&mut self, id: EntityId, mut component: Component) -> (ComponentType, ComponentKey) {
        component.assign_entity(id);
        let component_type = component.component_type().clone();
        let column = self.by_type.entry(component_type.clone()).or_default();
        let key = column.components.insert(component);
        column.order.push(key);
        (component_type, key)
    }

    fn unindex(&mut self, component_type: &str, key: ComponentKey) -> Option<Component> {
        let column = self.by_type.get_mut(component_type)?;
        let component = column.remove(key);
        if column.order.is_empty() {
            self.by_type.remove(component_type);
        }
        component
    }
}
