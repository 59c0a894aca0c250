//! System trait and capability flags
//!
//! A system is a unit of behavior that reacts to published events and/or runs
//! once per frame. What a system can do is declared once, through
//! [`System::capabilities`], and cached by the world at registration.

use std::any::Any;
use std::fmt;

use bitflags::bitflags;

use super::World;
use crate::events::{Event, EventType};

/// Error type returned by system code
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Result of a system callback
pub type SystemResult = Result<(), BoxError>;

/// Identifier of a registered system, unique within its world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId(pub(crate) u64);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}

bitflags! {
    /// Optional behaviors a system opts into
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SystemCapabilities: u8 {
        /// Driven by [`World::update`] every frame
        const UPDATE = 1 << 0;
        /// Receives events for the topics it subscribed to
        const EVENTS = 1 << 1;
        /// Wants [`System::cleanup`] when removed
        const CLEANUP = 1 << 2;
    }
}

/// Downcasting support for boxed systems
pub trait AsAny: Any {
    /// Borrow as `dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Unit of behavior plugged into a [`World`]
///
/// Callbacks receive the world mutably so they can query components and route
/// structural changes (register/remove entities, publish events) through it.
/// Errors are not caught by the world: they propagate to whoever called
/// [`World::update`] or [`World::publish`].
pub trait System: AsAny {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Behaviors this system implements. Read once at registration.
    fn capabilities(&self) -> SystemCapabilities;

    /// Handle an event from a subscribed topic
    fn handle_event(&mut self, _event: &Event, _world: &mut World) -> SystemResult {
        Ok(())
    }

    /// Per-frame update
    fn update(&mut self, _delta: f32, _world: &mut World) -> SystemResult {
        Ok(())
    }

    /// Release non-component resources (GPU handles, timers, listeners)
    fn cleanup(&mut self, _world: &mut World) {}
}

/// Construction context handed to system factories
///
/// Lets a system subscribe to topics and query the world while it is being
/// built, before it is stored.
pub struct SystemContext<'w> {
    pub(crate) world: &'w mut World,
    pub(crate) id: SystemId,
}

impl SystemContext<'_> {
    /// Id the system will be registered under
    pub const fn id(&self) -> SystemId {
        self.id
    }

    /// Subscribe the system under construction to event topics
    pub fn subscribe<I, T>(&mut self, event_types: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<EventType>,
    {
        self.world.subscribe(self.id, event_types);
    }

    /// Read access to the world
    pub fn world(&self) -> &World {
        &*self.world
    }

    /// Write access to the world
    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }
}
