//! # Slot Store
//!
//! Stable, generation-checked identity over densely packed values.
//!
//! ## Design Philosophy
//!
//! - Handles are plain `u64` values: 32-bit slot index + 32-bit generation
//! - Values are stored contiguously for cache-friendly iteration
//! - Removal compacts by swap-and-pop, handles never move
//! - A removed handle never validates again

mod handle;
mod slot_store;

pub use handle::Handle;
pub use slot_store::{Iter, IterMut, SlotStore};
