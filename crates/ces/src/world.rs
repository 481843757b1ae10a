//! # World
//!
//! Caller-owned container tying entities, events and systems together.
//!
//! ```text
//! tick N:
//! ┌─────────────────────────────────────────────────────────┐
//! │ 1. UPDATE   every system, registration order            │
//! │             (systems read entities, enqueue events)     │
//! │ 2. DRAIN    event queue once, first matching handler    │
//! │ 3. REPORT   pending backlog check, totals, frame += 1   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is global. Several worlds can live side by side, which is
//! what the tests do.

use bytemuck::{Pod, Zeroable};
use ces_core::{DrainReport, EventDispatcher, EventKind, Handle, SlotStore, TypedEvent};

use crate::config::WorldConfig;
use crate::error::{WorldError, WorldResult};
use crate::system::{System, SystemContext, SystemSchedule};

/// Per-entity data kept by the world itself.
///
/// Component values are not stored here; they live in per-type
/// [`ComponentStore`](crate::ComponentStore)s that point back at the entity.
/// The record can additionally list component handles it owns, for callers
/// that walk from entity to components instead. [`World::despawn`] hands the
/// record back so those components can be detached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityRecord {
    /// Frame in which the entity was spawned.
    pub spawned_frame: u64,
    components: Vec<Handle>,
}

impl EntityRecord {
    pub(crate) const fn new(spawned_frame: u64) -> Self {
        Self {
            spawned_frame,
            components: Vec::new(),
        }
    }

    /// Component handles linked to this entity, in link order.
    #[must_use]
    pub fn components(&self) -> &[Handle] {
        &self.components
    }

    /// Links a component handle. Returns `false` if it was already linked.
    pub fn link(&mut self, component: Handle) -> bool {
        if self.components.contains(&component) {
            return false;
        }
        self.components.push(component);
        true
    }

    /// Unlinks a component handle. Returns `false` if it was not linked.
    pub fn unlink(&mut self, component: Handle) -> bool {
        match self.components.iter().position(|&c| c == component) {
            Some(pos) => {
                self.components.swap_remove(pos);
                true
            }
            None => false,
        }
    }
}

/// Published by [`World::despawn`] so systems can drop data tied to the
/// entity.
///
/// Kinds `0xFFFF_0000` and above are reserved for world events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct EntityDespawned {
    /// Raw bits of the despawned entity's handle.
    pub entity: u64,
}

impl EntityDespawned {
    /// The despawned entity's handle.
    #[must_use]
    pub const fn handle(&self) -> Handle {
        Handle::from_bits(self.entity)
    }
}

impl TypedEvent for EntityDespawned {
    const KIND: EventKind = EventKind(0xFFFF_0001);
}

/// Removes an entity and, if enabled, publishes [`EntityDespawned`].
pub(crate) fn despawn_entity(
    entities: &mut SlotStore<EntityRecord>,
    events: &mut EventDispatcher,
    entity: Handle,
    publish: bool,
) -> WorldResult<EntityRecord> {
    let record = entities.remove(entity)?;
    if publish {
        events.publish(&EntityDespawned {
            entity: entity.to_bits(),
        });
    }
    Ok(record)
}

/// Result of one [`World::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Frame that was just run.
    pub frame: u64,
    /// Event drain outcome for the frame.
    pub drain: DrainReport,
}

/// Running totals over all ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainTotals {
    /// Ticks recorded.
    pub ticks: u64,
    /// Sum of events evaluated.
    pub evaluated: u64,
    /// Sum of events consumed.
    pub consumed: u64,
    /// Largest backlog left after any tick.
    pub peak_pending: usize,
}

impl DrainTotals {
    /// Records one drain.
    pub fn record(&mut self, report: DrainReport) {
        self.ticks += 1;
        self.evaluated += report.evaluated as u64;
        self.consumed += report.consumed as u64;
        self.peak_pending = self.peak_pending.max(report.pending);
    }
}

/// The world: entity store, event dispatcher and system schedule.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    entities: SlotStore<EntityRecord>,
    events: EventDispatcher,
    systems: SystemSchedule,
    frame: u64,
    totals: DrainTotals,
    initialized: bool,
}

impl World {
    /// Creates a world, reserving storage as configured.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let entities = SlotStore::with_capacity(config.entity_capacity);
        let events = EventDispatcher::with_capacity(config.event_queue_capacity);
        Self {
            config,
            entities,
            events,
            systems: SystemSchedule::new(),
            frame: 0,
            totals: DrainTotals::default(),
            initialized: false,
        }
    }

    /// The configuration this world was built with.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Spawns an entity.
    pub fn spawn(&mut self) -> Handle {
        self.entities.add(EntityRecord::new(self.frame))
    }

    /// Despawns an entity and returns its record.
    ///
    /// Publishes [`EntityDespawned`] when
    /// [`WorldConfig::publish_despawn_events`] is set. Components pointing
    /// at the entity are not touched here; they become orphans until their
    /// owning system prunes them or the caller detaches the handles listed
    /// in the returned record.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Store`] if `entity` is not alive.
    pub fn despawn(&mut self, entity: Handle) -> WorldResult<EntityRecord> {
        despawn_entity(
            &mut self.entities,
            &mut self.events,
            entity,
            self.config.publish_despawn_events,
        )
    }

    /// Links a component handle to an entity's record.
    ///
    /// Returns `false` if the handle was already linked.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DeadEntity`] if `entity` is not alive.
    pub fn link(&mut self, entity: Handle, component: Handle) -> WorldResult<bool> {
        self.entities
            .get_mut(entity)
            .map(|record| record.link(component))
            .ok_or(WorldError::DeadEntity(entity))
    }

    /// Checks if an entity is alive.
    #[must_use]
    pub fn is_alive(&self, entity: Handle) -> bool {
        self.entities.has(entity)
    }

    /// Gets an entity's record.
    #[must_use]
    pub fn entity(&self, entity: Handle) -> Option<&EntityRecord> {
        self.entities.get(entity)
    }

    /// Gets an entity's record mutably.
    pub fn entity_mut(&mut self, entity: Handle) -> Option<&mut EntityRecord> {
        self.entities.get_mut(entity)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// The entity store, for attaching components.
    #[must_use]
    pub fn entities(&self) -> &SlotStore<EntityRecord> {
        &self.entities
    }

    /// The event dispatcher.
    #[must_use]
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// The event dispatcher, mutably.
    pub fn events_mut(&mut self) -> &mut EventDispatcher {
        &mut self.events
    }

    /// Adds a system to the end of the schedule.
    ///
    /// If the world is already initialized, the system is initialized right
    /// away.
    pub fn add_system(&mut self, mut system: Box<dyn System>) {
        if self.initialized {
            tracing::info!(system = system.name(), "init");
            let mut ctx = SystemContext::new(
                &mut self.entities,
                &mut self.events,
                self.frame,
                self.config.publish_despawn_events,
            );
            system.init(&mut ctx);
        }
        self.systems.push(system);
    }

    /// Number of scheduled systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Initializes all systems. Calling it again does nothing.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        let mut ctx = SystemContext::new(
            &mut self.entities,
            &mut self.events,
            self.frame,
            self.config.publish_despawn_events,
        );
        self.systems.init_all(&mut ctx);
    }

    /// Runs one frame: update all systems, then drain events once.
    ///
    /// Initializes the world first if [`init`](Self::init) was not called.
    pub fn tick(&mut self) -> TickReport {
        self.init();

        let mut ctx = SystemContext::new(
            &mut self.entities,
            &mut self.events,
            self.frame,
            self.config.publish_despawn_events,
        );
        self.systems.update_all(&mut ctx);

        let drain = self.events.drain();
        self.totals.record(drain);

        if drain.pending > self.config.pending_warn_threshold {
            tracing::warn!(
                frame = self.frame,
                pending = drain.pending,
                threshold = self.config.pending_warn_threshold,
                "unhandled events piling up"
            );
        }
        if self.config.log_drain_reports {
            tracing::info!(
                frame = self.frame,
                evaluated = drain.evaluated,
                consumed = drain.consumed,
                pending = drain.pending,
                "tick"
            );
        }

        let report = TickReport {
            frame: self.frame,
            drain,
        };
        self.frame += 1;
        report
    }

    /// Shuts all systems down in reverse registration order.
    ///
    /// The schedule is empty afterwards; entities and pending events stay.
    pub fn shutdown(&mut self) {
        let mut ctx = SystemContext::new(
            &mut self.entities,
            &mut self.events,
            self.frame,
            self.config.publish_despawn_events,
        );
        self.systems.shutdown_all(&mut ctx);
        self.initialized = false;
    }

    /// Number of ticks run so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Drain totals over all ticks.
    #[must_use]
    pub fn totals(&self) -> &DrainTotals {
        &self.totals
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}
