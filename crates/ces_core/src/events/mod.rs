//! # Event Dispatch
//!
//! Deferred delivery of fixed-size events to predicate handlers.
//!
//! ## Design Philosophy
//!
//! - Events are 64-byte `Copy` records, no allocation per event
//! - Producers enqueue during the update, the cycle owner drains once
//! - The first handler that accepts an event consumes it
//! - Unhandled events stay queued until something accepts them

mod dispatcher;
mod event;
mod handler;

pub use dispatcher::{DrainReport, EventDispatcher};
pub use event::{
    Event, EventKind, EventPayload, TypedEvent, AUX_SIZE, CORE_SIZE, PAYLOAD_QUADS,
    PAYLOAD_SIZE, PAYLOAD_WORDS,
};
pub use handler::{typed, EventHandler, Typed};
