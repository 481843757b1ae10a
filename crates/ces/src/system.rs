//! # Systems
//!
//! Systems hold the logic (and usually their own [`ComponentStore`]s).
//! The schedule runs them in registration order and tears them down in
//! reverse order.
//!
//! [`ComponentStore`]: crate::ComponentStore

use ces_core::{EventDispatcher, Handle, SlotStore};

use crate::error::WorldResult;
use crate::world::{despawn_entity, EntityRecord};

/// Everything a system may touch during a call.
///
/// Entities are read through [`entities`](Self::entities). Spawning and
/// despawning go through the context so a despawn from inside a system
/// behaves exactly like [`World::despawn`](crate::World::despawn).
pub struct SystemContext<'a> {
    entities: &'a mut SlotStore<EntityRecord>,
    /// The world's event dispatcher. Register handlers in `init`, enqueue
    /// in `update`.
    pub events: &'a mut EventDispatcher,
    /// Current frame number.
    pub frame: u64,
    publish_despawn_events: bool,
}

impl<'a> SystemContext<'a> {
    pub(crate) fn new(
        entities: &'a mut SlotStore<EntityRecord>,
        events: &'a mut EventDispatcher,
        frame: u64,
        publish_despawn_events: bool,
    ) -> Self {
        Self {
            entities,
            events,
            frame,
            publish_despawn_events,
        }
    }

    /// The world's entities, read-only.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &SlotStore<EntityRecord> {
        self.entities
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Handle) -> bool {
        self.entities.has(entity)
    }

    /// Gets an entity's record mutably, for linking component handles.
    pub fn entity_mut(&mut self, entity: Handle) -> Option<&mut EntityRecord> {
        self.entities.get_mut(entity)
    }

    /// Spawns an entity in the current frame.
    pub fn spawn(&mut self) -> Handle {
        self.entities.add(EntityRecord::new(self.frame))
    }

    /// Despawns an entity, same as [`World::despawn`](crate::World::despawn).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Store`](crate::WorldError::Store) if `entity`
    /// is not alive.
    pub fn despawn(&mut self, entity: Handle) -> WorldResult<EntityRecord> {
        despawn_entity(
            self.entities,
            self.events,
            entity,
            self.publish_despawn_events,
        )
    }
}

/// A unit of per-frame logic.
///
/// Only [`name`](Self::name) and [`update`](Self::update) are required.
pub trait System {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Called once before the first update.
    fn init(&mut self, _ctx: &mut SystemContext<'_>) {}

    /// Called once per tick.
    fn update(&mut self, ctx: &mut SystemContext<'_>);

    /// Called once during teardown, in reverse registration order.
    fn shutdown(&mut self, _ctx: &mut SystemContext<'_>) {}
}

/// Ordered list of systems.
#[derive(Default)]
pub struct SystemSchedule {
    systems: Vec<Box<dyn System>>,
}

impl SystemSchedule {
    /// Creates an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a system.
    pub fn push(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    /// Number of systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Checks if no systems are scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Names of all systems in run order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.systems.iter().map(|system| system.name())
    }

    /// Initializes every system in registration order.
    pub fn init_all(&mut self, ctx: &mut SystemContext<'_>) {
        for system in &mut self.systems {
            tracing::info!(system = system.name(), "init");
            system.init(ctx);
        }
    }

    /// Updates every system in registration order.
    pub fn update_all(&mut self, ctx: &mut SystemContext<'_>) {
        for system in &mut self.systems {
            system.update(ctx);
        }
    }

    /// Shuts every system down in reverse registration order and drops it.
    ///
    /// The schedule is empty afterwards.
    pub fn shutdown_all(&mut self, ctx: &mut SystemContext<'_>) {
        while let Some(mut system) = self.systems.pop() {
            tracing::info!(system = system.name(), "shutdown");
            system.shutdown(ctx);
        }
    }
}

impl std::fmt::Debug for SystemSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::EntityDespawned;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Probe {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl System for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn init(&mut self, _ctx: &mut SystemContext<'_>) {
            self.log.borrow_mut().push(format!("init {}", self.name));
        }

        fn update(&mut self, ctx: &mut SystemContext<'_>) {
            self.log
                .borrow_mut()
                .push(format!("update {} @{}", self.name, ctx.frame));
        }

        fn shutdown(&mut self, _ctx: &mut SystemContext<'_>) {
            self.log.borrow_mut().push(format!("shutdown {}", self.name));
        }
    }

    #[test]
    fn test_schedule_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut schedule = SystemSchedule::new();
        for name in ["a", "b", "c"] {
            schedule.push(Box::new(Probe {
                name,
                log: Rc::clone(&log),
            }));
        }

        let mut entities = SlotStore::new();
        let mut events = EventDispatcher::new();
        let mut ctx = SystemContext::new(&mut entities, &mut events, 7, false);

        schedule.init_all(&mut ctx);
        schedule.update_all(&mut ctx);
        schedule.shutdown_all(&mut ctx);

        assert!(schedule.is_empty());
        assert_eq!(
            *log.borrow(),
            vec![
                "init a", "init b", "init c",
                "update a @7", "update b @7", "update c @7",
                "shutdown c", "shutdown b", "shutdown a",
            ]
        );
    }

    #[test]
    fn test_context_despawn_publishes_when_enabled() {
        let mut entities = SlotStore::new();
        let mut events = EventDispatcher::new();

        let mut ctx = SystemContext::new(&mut entities, &mut events, 3, true);
        let entity = ctx.spawn();
        assert_eq!(ctx.entities().get(entity).map(|r| r.spawned_frame), Some(3));
        assert!(ctx.despawn(entity).is_ok());
        assert!(!ctx.is_alive(entity));
        assert!(ctx.despawn(entity).is_err());

        let published: Vec<_> = events
            .pending()
            .filter_map(|event| event.decode::<EntityDespawned>())
            .map(|despawned| despawned.handle())
            .collect();
        assert_eq!(published, vec![entity]);
    }

    #[test]
    fn test_context_despawn_silent_when_disabled() {
        let mut entities = SlotStore::new();
        let mut events = EventDispatcher::new();

        let mut ctx = SystemContext::new(&mut entities, &mut events, 0, false);
        let entity = ctx.spawn();
        ctx.despawn(entity).unwrap();

        assert!(entities.is_empty());
        assert!(events.is_empty());
    }
}
