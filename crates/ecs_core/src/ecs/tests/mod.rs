//! Cross-module tests for the world: registry, bus and system manager together

mod properties;

use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::{System, SystemCapabilities, SystemResult, World};
use crate::events::Event;

type Log = Rc<RefCell<Vec<String>>>;
type UpdateHook = Box<dyn FnMut(f32, &mut World) -> SystemResult>;
type EventHook = Box<dyn FnMut(&Event, &mut World) -> SystemResult>;

fn new_log() -> Log {
    Rc::default()
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// System that records every callback into a shared log and optionally runs a
/// hook after recording
struct Recorder {
    name: &'static str,
    capabilities: SystemCapabilities,
    log: Log,
    on_update: Option<UpdateHook>,
    on_event: Option<EventHook>,
}

impl Recorder {
    fn new(name: &'static str, capabilities: SystemCapabilities, log: &Log) -> Self {
        Self {
            name,
            capabilities,
            log: Rc::clone(log),
            on_update: None,
            on_event: None,
        }
    }

    fn on_update(mut self, hook: impl FnMut(f32, &mut World) -> SystemResult + 'static) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }

    fn on_event(mut self, hook: impl FnMut(&Event, &mut World) -> SystemResult + 'static) -> Self {
        self.on_event = Some(Box::new(hook));
        self
    }
}

impl System for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> SystemCapabilities {
        self.capabilities
    }

    fn handle_event(&mut self, event: &Event, world: &mut World) -> SystemResult {
        self.log
            .borrow_mut()
            .push(format!("{}:{}", self.name, event.event_type()));
        match &mut self.on_event {
            Some(hook) => hook(event, world),
            None => Ok(()),
        }
    }

    fn update(&mut self, delta: f32, world: &mut World) -> SystemResult {
        self.log
            .borrow_mut()
            .push(format!("{}:update({})", self.name, delta));
        match &mut self.on_update {
            Some(hook) => hook(delta, world),
            None => Ok(()),
        }
    }

    fn cleanup(&mut self, _world: &mut World) {
        self.log.borrow_mut().push(format!("{}:cleanup", self.name));
    }
}
