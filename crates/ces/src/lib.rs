//! # CES
//!
//! Entity/component/system layer built on the two `ces_core` primitives.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                            World                             │
//! │                                                              │
//! │  entities: SlotStore<EntityRecord>     events: Dispatcher    │
//! │        ▲                                     ▲               │
//! │        │ owner handles                       │ enqueue/drain │
//! │  ┌─────┴──────────────┐   ┌──────────────────┴─────────┐     │
//! │  │ System A           │   │ System B                   │     │
//! │  │  ComponentStore<P> │   │  ComponentStore<N>         │     │
//! │  └────────────────────┘   └────────────────────────────┘     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities hold no data beyond a small record. Components live in per-type
//! stores owned by the systems that act on them, each record pointing back
//! at its entity by handle.
//!
//! ## Modules
//!
//! - `config`: TOML-loadable world configuration
//! - `component`: per-type component stores
//! - `system`: system trait and ordered schedule
//! - `world`: the frame orchestrator

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod component;
pub mod config;
pub mod error;
pub mod system;
pub mod world;

// Re-export the core
pub use ces_core as core;

// Re-export commonly used types
pub use ces_core::{
    typed, DrainReport, Event, EventDispatcher, EventHandler, EventKind, EventPayload, Handle,
    SlotStore, StoreError, TypedEvent,
};
pub use component::{Attached, ComponentStore};
pub use config::WorldConfig;
pub use error::{WorldError, WorldResult};
pub use system::{System, SystemContext, SystemSchedule};
pub use world::{DrainTotals, EntityDespawned, EntityRecord, TickReport, World};
