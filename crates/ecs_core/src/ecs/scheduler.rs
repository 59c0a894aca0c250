//! System lifecycle management
//!
//! Owns registered systems in registration order and keeps the updateable
//! subset in its own ordered list. Each system moves through
//! Unregistered → Registered → Removed; removal is terminal.
//!
//! While a system runs, the world checks it out of its slot so the system can
//! be handed `&mut World`. A checked-out slot is "running": events aimed at it
//! are parked in the slot until it is checked back in, and removing it is
//! deferred until then too.

use std::collections::VecDeque;
use std::rc::Rc;

use super::{System, SystemCapabilities, SystemId};
use crate::events::Event;

struct SystemSlot {
    id: SystemId,
    name: String,
    capabilities: SystemCapabilities,
    /// `None` while the system is running
    system: Option<Box<dyn System>>,
    /// Events published to the system while it was running
    pending: VecDeque<Rc<Event>>,
    removed: bool,
}

/// Outcome of taking a system out of its slot
pub(crate) enum Checkout {
    /// The system, now marked running
    Ready(Box<dyn System>),
    /// Already running further up the call stack
    Running,
    /// Not registered, or removed
    Absent,
}

/// A system taken out of the manager for good
pub(crate) struct Detached {
    pub(crate) system: Box<dyn System>,
    pub(crate) capabilities: SystemCapabilities,
}

/// Outcome of a removal request
pub(crate) enum Removal {
    /// The system was idle and is now detached
    Detached(Detached),
    /// The system is running; it will be detached when checked back in
    Deferred,
    /// Not registered, or already removed
    Unknown,
}

/// Registered systems, in registration order
#[derive(Default)]
pub struct SystemManager {
    next_id: u64,
    slots: Vec<SystemSlot>,
    updateable: Vec<SystemId>,
}

impl SystemManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate_id(&mut self) -> SystemId {
        let id = SystemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Store a constructed system, classifying it once by its capabilities
    pub(crate) fn insert(&mut self, id: SystemId, system: Box<dyn System>) -> SystemCapabilities {
        let capabilities = system.capabilities();
        if capabilities.contains(SystemCapabilities::UPDATE) {
            self.updateable.push(id);
        }
        self.slots.push(SystemSlot {
            id,
            name: system.name().to_owned(),
            capabilities,
            system: Some(system),
            pending: VecDeque::new(),
            removed: false,
        });
        capabilities
    }

    /// Take a system out to run it
    pub(crate) fn checkout(&mut self, id: SystemId) -> Checkout {
        let Some(slot) = self.slot_mut(id).filter(|slot| !slot.removed) else {
            return Checkout::Absent;
        };
        match slot.system.take() {
            Some(system) => Checkout::Ready(system),
            None => Checkout::Running,
        }
    }

    /// Queue an event for a running system
    pub(crate) fn park(&mut self, id: SystemId, event: Rc<Event>) {
        if let Some(slot) = self.slot_mut(id).filter(|slot| !slot.removed) {
            slot.pending.push_back(event);
        }
    }

    /// Oldest event parked for an idle system
    pub(crate) fn next_pending(&mut self, id: SystemId) -> Option<Rc<Event>> {
        let slot = self
            .slot_mut(id)
            .filter(|slot| !slot.removed && slot.system.is_some())?;
        slot.pending.pop_front()
    }

    /// Number of events parked for a system
    pub fn pending_len(&self, id: SystemId) -> usize {
        self.live_slot(id).map_or(0, |slot| slot.pending.len())
    }

    /// Put a system back after running it
    ///
    /// Returns the system detached if it was removed while it ran.
    pub(crate) fn checkin(&mut self, id: SystemId, system: Box<dyn System>) -> Option<Detached> {
        let index = self.position(id)?;
        if self.slots[index].removed {
            let slot = self.slots.remove(index);
            return Some(Detached {
                system,
                capabilities: slot.capabilities,
            });
        }
        self.slots[index].system = Some(system);
        None
    }

    pub(crate) fn remove(&mut self, id: SystemId) -> Removal {
        let Some(index) = self.position(id) else {
            return Removal::Unknown;
        };
        if self.slots[index].removed {
            return Removal::Unknown;
        }
        self.updateable.retain(|updateable| *updateable != id);

        if self.slots[index].system.is_none() {
            self.slots[index].removed = true;
            return Removal::Deferred;
        }
        let slot = self.slots.remove(index);
        match slot.system {
            Some(system) => Removal::Detached(Detached {
                system,
                capabilities: slot.capabilities,
            }),
            None => Removal::Unknown,
        }
    }

    /// Updateable systems at this instant, in registration order
    pub(crate) fn updateable_snapshot(&self) -> Vec<SystemId> {
        self.updateable.clone()
    }

    /// Capabilities declared at registration
    pub fn capabilities(&self, id: SystemId) -> Option<SystemCapabilities> {
        self.live_slot(id).map(|slot| slot.capabilities)
    }

    /// Name of a registered system
    pub fn name(&self, id: SystemId) -> Option<&str> {
        self.live_slot(id).map(|slot| slot.name.as_str())
    }

    /// Whether the system is registered and not removed
    pub fn contains(&self, id: SystemId) -> bool {
        self.live_slot(id).is_some()
    }

    /// Whether the system is currently executing
    pub fn is_running(&self, id: SystemId) -> bool {
        self.live_slot(id).is_some_and(|slot| slot.system.is_none())
    }

    /// Registered system ids, in registration order
    pub fn ids(&self) -> Vec<SystemId> {
        self.slots
            .iter()
            .filter(|slot| !slot.removed)
            .map(|slot| slot.id)
            .collect()
    }

    /// Number of registered systems
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.removed).count()
    }

    /// Whether no systems are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of systems driven by the frame loop
    pub fn updateable_len(&self) -> usize {
        self.updateable.len()
    }

    /// Borrow an idle system
    pub fn get(&self, id: SystemId) -> Option<&dyn System> {
        self.live_slot(id)?.system.as_deref()
    }

    /// Mutably borrow an idle system
    pub fn get_mut(&mut self, id: SystemId) -> Option<&mut (dyn System + 'static)> {
        let slot = self.slot_mut(id).filter(|slot| !slot.removed)?;
        slot.system.as_deref_mut()
    }

    fn position(&self, id: SystemId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == id)
    }

    fn live_slot(&self, id: SystemId) -> Option<&SystemSlot> {
        self.slots.iter().find(|slot| slot.id == id && !slot.removed)
    }

    fn slot_mut(&mut self, id: SystemId) -> Option<&mut SystemSlot> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }
}
