//! World invariants: uniqueness, index consistency, event ordering, update
//! ordering, idempotent removal and failure propagation

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use super::*;
use crate::config::WorldConfig;
use crate::ecs::{BoxError, Component, EcsError, Entity, SystemId};
use crate::events::EventType;

fn tagged(tag: &'static str, value: i32) -> Component {
    Component::with_type(tag, value)
}

fn assert_indexes_agree(world: &World, entity: Entity) {
    for component in world.get_components_by_entity_id(entity.id()) {
        assert_eq!(component.entity_id(), Some(entity.id()));
        let by_type = world.get_components_by_type(component.component_type().as_str());
        assert!(by_type.iter().any(|c| std::ptr::eq(*c, component)));
    }
}

#[test]
fn test_uniqueness_survives_other_registrations() {
    let mut world = World::new();
    let first = world
        .register_entity(vec![tagged("A", 1), tagged("B", 2)])
        .unwrap();
    for value in 0..10 {
        world
            .register_entity(vec![tagged("A", value), tagged("C", value)])
            .unwrap();
    }

    for entity in world.entities() {
        let components = world.get_components_by_entity_id(entity.id());
        let tags: HashSet<_> = components.iter().map(|c| c.component_type()).collect();
        assert_eq!(tags.len(), components.len());
    }

    let err = world.add_component(first, tagged("B", 3)).unwrap_err();
    assert!(matches!(err, EcsError::DuplicateComponentType { .. }));
    assert_eq!(
        world
            .get_component_by_entity_id_and_type(first.id(), "B")
            .and_then(Component::data::<i32>),
        Some(&2)
    );
}

#[test]
fn test_indexes_agree_before_and_after_removal() {
    let mut world = World::new();
    let kept = world
        .register_entity(vec![tagged("A", 1), tagged("B", 2)])
        .unwrap();
    let removed = world
        .register_entity(vec![tagged("B", 3), tagged("C", 4)])
        .unwrap();
    assert_indexes_agree(&world, kept);
    assert_indexes_agree(&world, removed);

    world.remove_entity(removed).unwrap();

    assert!(world.get_components_by_entity_id(removed.id()).is_empty());
    assert!(world.get_components_by_type("C").is_empty());
    assert_eq!(world.get_components_by_type("B").len(), 1);
    assert_indexes_agree(&world, kept);
}

#[test]
fn test_duplicate_types_fail_atomically() {
    let log = new_log();
    let mut world = World::new();
    world.register_system(|ctx| {
        ctx.subscribe([EventType::ENTITY_REGISTERED]);
        Recorder::new("observer", SystemCapabilities::EVENTS, &log)
    });

    let err = world
        .register_entity(vec![tagged("A", 1), tagged("A", 2)])
        .unwrap_err();

    assert!(matches!(err, EcsError::DuplicateComponentType { ref component_type } if component_type.as_str() == "A"));
    assert!(world.get_components_by_type("A").is_empty());
    assert_eq!(world.entity_count(), 0);
    assert!(entries(&log).is_empty());
}

#[test]
fn test_registered_event_sees_complete_entity() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut world = World::new();
    let sink = Rc::clone(&seen);
    world.register_system(move |ctx| {
        ctx.subscribe([EventType::ENTITY_REGISTERED]);
        Recorder::new("inspector", SystemCapabilities::EVENTS, &new_log()).on_event(
            move |event, world| {
                if let Some(entity) = event.entity() {
                    let position = world
                        .get_component_by_entity_id_and_type(entity.id(), "Position")
                        .and_then(Component::data::<i32>)
                        .copied();
                    sink.borrow_mut().push(position);
                }
                Ok(())
            },
        )
    });

    world
        .register_entity(vec![tagged("Velocity", 1), tagged("Position", 7)])
        .unwrap();

    assert_eq!(*seen.borrow(), vec![Some(7)]);
}

#[test]
fn test_removed_event_precedes_index_clearing() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut world = World::new();
    let sink = Rc::clone(&seen);
    world.register_system(move |ctx| {
        ctx.subscribe([EventType::ENTITY_REMOVED]);
        Recorder::new("inspector", SystemCapabilities::EVENTS, &new_log()).on_event(
            move |event, world| {
                if let Some(entity) = event.entity() {
                    sink.borrow_mut()
                        .push(world.get_components_by_entity_id(entity.id()).len());
                }
                Ok(())
            },
        )
    });
    let entity = world
        .register_entity(vec![tagged("Position", 0), tagged("Velocity", 1)])
        .unwrap();

    world.remove_entity(entity).unwrap();

    assert_eq!(*seen.borrow(), vec![2]);
    assert!(world
        .get_component_by_entity_id_and_type(entity.id(), "Position")
        .is_none());
    assert!(world.get_components_by_entity_id(entity.id()).is_empty());
    assert!(!world.is_registered(entity));
}

#[test]
fn test_update_runs_in_registration_order_with_same_delta() {
    let log = new_log();
    let mut world = World::new();
    for name in ["s1", "s2", "s3"] {
        world.register_system(|_| Recorder::new(name, SystemCapabilities::UPDATE, &log));
    }
    world.register_system(|_| Recorder::new("passive", SystemCapabilities::EVENTS, &log));

    world.update(0.125).unwrap();

    assert_eq!(
        entries(&log),
        vec!["s1:update(0.125)", "s2:update(0.125)", "s3:update(0.125)"]
    );
    assert_eq!(world.frame_count(), 1);
}

#[test]
fn test_removal_is_idempotent() {
    let log = new_log();
    let mut world = World::new();
    let entity = world.register_entity(vec![tagged("A", 1)]).unwrap();
    let system = world.register_system(|_| {
        Recorder::new(
            "s",
            SystemCapabilities::UPDATE | SystemCapabilities::CLEANUP,
            &log,
        )
    });

    world.remove_entity(entity).unwrap();
    world.remove_entity(entity).unwrap();
    assert!(world.remove_system(system));
    assert!(!world.remove_system(system));

    assert_eq!(world.entity_count(), 0);
    assert_eq!(world.systems().len(), 0);
    assert_eq!(entries(&log), vec!["s:cleanup"]);
}

#[test]
fn test_first_failing_handler_stops_delivery() {
    let log = new_log();
    let mut world = World::new();
    world.register_system(|ctx| {
        ctx.subscribe(["ping"]);
        Recorder::new("first", SystemCapabilities::EVENTS, &log)
    });
    world.register_system(|ctx| {
        ctx.subscribe(["ping"]);
        Recorder::new("failing", SystemCapabilities::EVENTS, &log)
            .on_event(|_, _| Err("boom".into()))
    });
    world.register_system(|ctx| {
        ctx.subscribe(["ping"]);
        Recorder::new("last", SystemCapabilities::EVENTS, &log)
    });

    let err = world.publish(Event::signal("ping")).unwrap_err();

    assert!(matches!(err, EcsError::SystemFailed { ref system, .. } if system == "failing"));
    assert_eq!(entries(&log), vec!["first:ping", "failing:ping"]);
}

#[test]
fn test_failing_removal_handler_keeps_entity() {
    let mut world = World::new();
    world.register_system(|ctx| {
        ctx.subscribe([EventType::ENTITY_REMOVED]);
        Recorder::new("veto", SystemCapabilities::EVENTS, &new_log())
            .on_event(|_, _| Err("not now".into()))
    });
    let entity = world.register_entity(vec![tagged("A", 1)]).unwrap();

    assert!(world.remove_entity(entity).is_err());
    assert!(world.is_registered(entity));
    assert_eq!(world.get_components_by_type("A").len(), 1);
}

#[test]
fn test_nested_removal_of_same_entity_is_ignored() {
    let log = new_log();
    let mut world = World::new();
    world.register_system(|ctx| {
        ctx.subscribe([EventType::ENTITY_REMOVED]);
        Recorder::new("cascade", SystemCapabilities::EVENTS, &log).on_event(|event, world| {
            if let Some(entity) = event.entity() {
                world.remove_entity(entity)?;
            }
            Ok(())
        })
    });
    let entity = world.register_entity(vec![tagged("A", 1)]).unwrap();

    world.remove_entity(entity).unwrap();

    assert_eq!(entries(&log), vec!["cascade:entity-removed"]);
    assert!(!world.is_registered(entity));
}

#[test]
fn test_removed_system_is_unsubscribed_everywhere() {
    let log = new_log();
    let mut world = World::new();
    let system = world.register_system(|ctx| {
        ctx.subscribe(["a", "b"]);
        Recorder::new(
            "listener",
            SystemCapabilities::EVENTS | SystemCapabilities::CLEANUP,
            &log,
        )
    });
    world.publish(Event::signal("a")).unwrap();

    world.remove_system(system);
    world.publish(Event::signal("a")).unwrap();
    world.publish(Event::signal("b")).unwrap();

    assert_eq!(entries(&log), vec!["listener:a", "listener:cleanup"]);
    assert!(world.event_bus().topics_of(system).is_empty());
}

#[test]
fn test_explicit_unsubscribe() {
    let log = new_log();
    let mut world = World::new();
    let system = world.register_system(|ctx| {
        ctx.subscribe(["a", "b"]);
        Recorder::new("listener", SystemCapabilities::EVENTS, &log)
    });

    world.unsubscribe(system, ["a"]);
    world.publish(Event::signal("a")).unwrap();
    world.publish(Event::signal("b")).unwrap();

    assert_eq!(entries(&log), vec!["listener:b"]);
}

#[test]
fn test_event_for_running_system_arrives_after_it_returns() {
    let log = new_log();
    let mut world = World::new();
    let echo_log = Rc::clone(&log);
    let echo = world.register_system(|ctx| {
        ctx.subscribe(["echo"]);
        Recorder::new(
            "echo",
            SystemCapabilities::UPDATE | SystemCapabilities::EVENTS,
            &log,
        )
        .on_update(move |_, world| {
            world.publish(Event::signal("echo"))?;
            echo_log.borrow_mut().push("echo:published".to_owned());
            Ok(())
        })
    });
    world.register_system(|_| Recorder::new("next", SystemCapabilities::UPDATE, &log));

    world.update(0.5).unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "echo:update(0.5)",
            "echo:published",
            "echo:echo",
            "next:update(0.5)"
        ]
    );
    assert!(!world.systems().is_running(echo));
    assert_eq!(world.systems().pending_len(echo), 0);
}

#[test]
fn test_spawner_and_other_subscribers_all_see_registration() {
    let log = new_log();
    let mut world = World::new();
    world.register_system(|ctx| {
        ctx.subscribe([EventType::ENTITY_REGISTERED]);
        Recorder::new(
            "spawner",
            SystemCapabilities::UPDATE | SystemCapabilities::EVENTS,
            &log,
        )
        .on_update(|_, world| {
            world.register_entity(vec![tagged("Sprite", 1)])?;
            Ok(())
        })
    });
    world.register_system(|ctx| {
        ctx.subscribe([EventType::ENTITY_REGISTERED]);
        Recorder::new("renderer", SystemCapabilities::EVENTS, &log)
    });

    world.update(0.1).unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "spawner:update(0.1)",
            "renderer:entity-registered",
            "spawner:entity-registered"
        ]
    );
    assert_eq!(world.entity_count(), 1);
}

#[test]
fn test_nested_update_reports_busy_system() {
    let mut world = World::new();
    let outer = world.register_system(|_| {
        Recorder::new("outer", SystemCapabilities::UPDATE, &new_log()).on_update(|delta, world| {
            world.update(delta)?;
            Ok(())
        })
    });

    let err = world.update(0.016).unwrap_err();

    let EcsError::SystemFailed { system, source } = err else {
        panic!("expected a system failure");
    };
    assert_eq!(system, "outer");
    assert!(matches!(
        source.downcast_ref::<EcsError>(),
        Some(EcsError::SystemBusy { system, .. }) if *system == outer
    ));
    assert!(!world.systems().is_running(outer));
}

#[test]
fn test_rejected_registration_is_rolled_back() {
    let log = new_log();
    let mut world = World::new();
    world.register_system(|ctx| {
        ctx.subscribe([EventType::ENTITY_REGISTERED, EventType::ENTITY_REMOVED]);
        Recorder::new("index", SystemCapabilities::EVENTS, &log)
    });
    world.register_system(|ctx| {
        ctx.subscribe([EventType::ENTITY_REGISTERED]);
        Recorder::new("strict", SystemCapabilities::EVENTS, &log)
            .on_event(|_, _| Err("no room".into()))
    });

    let err = world.register_entity(vec![tagged("A", 1)]).unwrap_err();

    assert!(matches!(err, EcsError::SystemFailed { ref system, .. } if system == "strict"));
    assert_eq!(world.entity_count(), 0);
    assert!(world.get_components_by_type("A").is_empty());
    assert_eq!(
        entries(&log),
        vec![
            "index:entity-registered",
            "strict:entity-registered",
            "index:entity-removed"
        ]
    );
}

#[test]
fn test_default_world_passes_delta_through() {
    let log = new_log();
    let mut world = World::new();
    world.register_system(|_| Recorder::new("s", SystemCapabilities::UPDATE, &log));

    world.update(1.0).unwrap();
    world.update(4.5).unwrap();

    assert_eq!(entries(&log), vec!["s:update(1)", "s:update(4.5)"]);
}

#[test]
fn test_system_registered_mid_frame_runs_next_frame() {
    let log = new_log();
    let mut world = World::new();
    let spawner_log = Rc::clone(&log);
    let spawned = Rc::new(Cell::new(false));
    world.register_system(|_| {
        Recorder::new("spawner", SystemCapabilities::UPDATE, &log).on_update(move |_, world| {
            if !spawned.replace(true) {
                world.register_system(|_| {
                    Recorder::new("late", SystemCapabilities::UPDATE, &spawner_log)
                });
            }
            Ok(())
        })
    });

    world.update(1.0).unwrap();
    world.update(1.0).unwrap();

    assert_eq!(
        entries(&log),
        vec!["spawner:update(1)", "spawner:update(1)", "late:update(1)"]
    );
}

#[test]
fn test_system_removed_mid_frame_is_skipped() {
    let log = new_log();
    let mut world = World::new();
    let victim: Rc<Cell<Option<SystemId>>> = Rc::default();
    let target = Rc::clone(&victim);
    world.register_system(|_| {
        Recorder::new("remover", SystemCapabilities::UPDATE, &log).on_update(move |_, world| {
            if let Some(id) = target.take() {
                world.remove_system(id);
            }
            Ok(())
        })
    });
    let id = world.register_system(|_| {
        Recorder::new(
            "victim",
            SystemCapabilities::UPDATE | SystemCapabilities::CLEANUP,
            &log,
        )
    });
    victim.set(Some(id));

    world.update(1.0).unwrap();
    world.update(1.0).unwrap();

    assert_eq!(
        entries(&log),
        vec!["remover:update(1)", "victim:cleanup", "remover:update(1)"]
    );
}

#[test]
fn test_system_removing_itself_is_cleaned_up_after_returning() {
    let log = new_log();
    let mut world = World::new();
    let own_id: Rc<Cell<Option<SystemId>>> = Rc::default();
    let hook_id = Rc::clone(&own_id);
    let id = world.register_system(|_| {
        Recorder::new(
            "once",
            SystemCapabilities::UPDATE | SystemCapabilities::CLEANUP,
            &log,
        )
        .on_update(move |_, world| {
            if let Some(id) = hook_id.get() {
                assert!(world.remove_system(id));
                assert!(!world.has_system(id));
            }
            Ok(())
        })
    });
    own_id.set(Some(id));

    world.update(1.0).unwrap();
    world.update(1.0).unwrap();

    assert_eq!(entries(&log), vec!["once:update(1)", "once:cleanup"]);
    assert_eq!(world.systems().len(), 0);
}

#[test]
fn test_delta_is_clamped_by_config() {
    let log = new_log();
    let mut world = World::with_config(WorldConfig {
        max_delta: Some(0.5),
        ..WorldConfig::default()
    });
    world.register_system(|_| Recorder::new("s", SystemCapabilities::UPDATE, &log));

    world.update(3.0).unwrap();
    world.update(0.25).unwrap();

    assert_eq!(entries(&log), vec!["s:update(0.5)", "s:update(0.25)"]);
}

#[test]
fn test_failing_factory_rolls_back_subscriptions() {
    let mut world = World::new();
    let result = world.try_register_system(|ctx| -> Result<Recorder, BoxError> {
        ctx.subscribe(["a"]);
        Err("missing asset".into())
    });

    assert!(matches!(result, Err(EcsError::SystemFailed { ref system, .. }) if system.ends_with("Recorder")));
    assert!(world.event_bus().subscribers("a").is_empty());
    assert_eq!(world.systems().len(), 0);
}

#[test]
fn test_subscriptions_without_event_capability_are_dropped() {
    let log = new_log();
    let mut world = World::new();
    world.register_system(|ctx| {
        ctx.subscribe(["a"]);
        Recorder::new("deaf", SystemCapabilities::UPDATE, &log)
    });

    world.publish(Event::signal("a")).unwrap();

    assert!(entries(&log).is_empty());
    assert!(world.event_bus().subscribers("a").is_empty());
}

#[test]
fn test_component_events_on_incremental_changes() {
    let log = new_log();
    let mut world = World::new();
    world.register_system(|ctx| {
        ctx.subscribe([EventType::COMPONENT_ADDED, EventType::COMPONENT_REMOVED]);
        Recorder::new("watcher", SystemCapabilities::EVENTS, &log).on_event(|event, world| {
            if let (Some(entity), Some(tag)) = (event.entity(), event.component_type()) {
                assert!(world
                    .get_component_by_entity_id_and_type(entity.id(), tag.as_str())
                    .is_some());
            }
            Ok(())
        })
    });
    let entity = world.register_entity(Vec::new()).unwrap();

    world.add_component(entity, tagged("Camera", 1)).unwrap();
    let detached = world.remove_component(entity, "Camera").unwrap();
    let missing = world.remove_component(entity, "Camera").unwrap();

    assert_eq!(detached.and_then(|c| c.into_data::<i32>().ok()), Some(1));
    assert!(missing.is_none());
    assert_eq!(
        entries(&log),
        vec!["watcher:component-added", "watcher:component-removed"]
    );
}

#[test]
fn test_add_component_to_unknown_entity_fails() {
    let mut world = World::new();
    let entity = world.register_entity(Vec::new()).unwrap();
    world.remove_entity(entity).unwrap();

    let err = world.add_component(entity, tagged("A", 1)).unwrap_err();

    assert!(matches!(err, EcsError::UnknownEntity(id) if id == entity.id()));
}

#[test]
fn test_entity_ids_are_never_reused() {
    let mut first = World::new();
    let mut second = World::new();
    let a = first.register_entity(Vec::new()).unwrap();
    first.remove_entity(a).unwrap();
    let b = first.register_entity(Vec::new()).unwrap();
    let c = second.register_entity(Vec::new()).unwrap();

    assert_ne!(a.id(), b.id());
    assert_ne!(b.id(), c.id());
    assert_ne!(a.id(), c.id());
}
