//! # CES Core
//!
//! The two primitives every entity/component/system layer is built from:
//!
//! - [`SlotStore`]: a generational slot map. Values are densely packed and
//!   relocate on removal, while [`Handle`]s stay stable and stale handles are
//!   detected instead of aliasing a new value.
//! - [`EventDispatcher`]: a deferred event queue drained against predicate
//!   handlers. First handler to accept an event wins; unhandled events stay
//!   queued.
//!
//! The two are independent and never call each other.
//!
//! ## Architecture Rules
//!
//! 1. **Caller-owned instances** - no globals, as many stores and
//!    dispatchers per process as needed
//! 2. **Data-oriented design** - values live in contiguous arrays
//! 3. **Single-threaded** - no locks, no atomics; serialize access externally
//!
//! ## Example
//!
//! ```rust
//! use ces_core::{Event, EventDispatcher, EventKind, SlotStore};
//!
//! let mut positions = SlotStore::new();
//! let id = positions.add([1.0f32, 2.0, 3.0]);
//!
//! let mut events = EventDispatcher::new();
//! events.register(|event: &Event| event.kind() == EventKind(1));
//! events.enqueue(Event::signal(EventKind(1)));
//! events.drain();
//!
//! assert!(positions.has(id));
//! assert!(events.is_empty());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod events;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use events::{
    typed, DrainReport, Event, EventDispatcher, EventHandler, EventKind, EventPayload,
    TypedEvent,
};
pub use store::{Handle, SlotStore};
