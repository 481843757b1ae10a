//! # Component Storage
//!
//! One [`SlotStore`] per component type. Each record carries the handle of
//! the entity that owns it, so entities never hold component values.
//!
//! ```text
//! entities: SlotStore<EntityRecord>      positions: ComponentStore<Position>
//! ┌────────┐                             ┌───────────────────────────┐
//! │ e0 ... │ <────── owner handle ────── │ (owner: e0, value: [...]) │
//! │ e1 ... │ <────── owner handle ────── │ (owner: e1, value: [...]) │
//! └────────┘                             └───────────────────────────┘
//! ```
//!
//! An entity can be despawned while components still point at it. Those
//! orphans are detected by handle validation and removed with
//! [`ComponentStore::prune_orphans`].

use ces_core::{Handle, SlotStore};

use crate::error::{WorldError, WorldResult};
use crate::world::EntityRecord;

/// A component value with its owning entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Attached<C> {
    /// Entity this component belongs to.
    pub owner: Handle,
    /// The component data.
    pub value: C,
}

/// Storage for all components of type `C`.
#[derive(Clone, Debug)]
pub struct ComponentStore<C> {
    records: SlotStore<Attached<C>>,
}

impl<C> ComponentStore<C> {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: SlotStore::new(),
        }
    }

    /// Attaches `value` to `owner` and returns the component's handle.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DeadEntity`] if `owner` is not alive in
    /// `entities`.
    pub fn attach(
        &mut self,
        entities: &SlotStore<EntityRecord>,
        owner: Handle,
        value: C,
    ) -> WorldResult<Handle> {
        if !entities.has(owner) {
            return Err(WorldError::DeadEntity(owner));
        }
        Ok(self.records.add(Attached { owner, value }))
    }

    /// Detaches a component and returns its value.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Store`] if `component` is not live.
    pub fn detach(&mut self, component: Handle) -> WorldResult<C> {
        Ok(self.records.remove(component)?.value)
    }

    /// Gets a component value.
    #[must_use]
    pub fn get(&self, component: Handle) -> Option<&C> {
        self.records.get(component).map(|record| &record.value)
    }

    /// Gets a component value mutably.
    pub fn get_mut(&mut self, component: Handle) -> Option<&mut C> {
        self.records.get_mut(component).map(|record| &mut record.value)
    }

    /// Returns the owning entity of a component.
    #[must_use]
    pub fn owner(&self, component: Handle) -> Option<Handle> {
        self.records.get(component).map(|record| record.owner)
    }

    /// Iterates over `(component handle, record)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &Attached<C>)> + '_ {
        self.records.iter()
    }

    /// Iterates mutably over `(component handle, record)` pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut Attached<C>)> + '_ {
        self.records.iter_mut()
    }

    /// Iterates over the components owned by `owner`.
    pub fn owned_by(&self, owner: Handle) -> impl Iterator<Item = (Handle, &C)> + '_ {
        self.records
            .iter()
            .filter(move |(_, record)| record.owner == owner)
            .map(|(handle, record)| (handle, &record.value))
    }

    /// Number of attached components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks if no components are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes every component whose owner is no longer alive.
    ///
    /// Returns the number of components removed.
    pub fn prune_orphans(&mut self, entities: &SlotStore<EntityRecord>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| entities.has(record.owner));
        let pruned = before - self.records.len();
        if pruned > 0 {
            tracing::debug!(pruned, "pruned orphaned components");
        }
        pruned
    }
}

impl<C> Default for ComponentStore<C> {
    fn default() -> Self {
        Self::new()
    }
}
