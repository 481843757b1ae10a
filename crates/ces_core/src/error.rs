//! # Store Error Types
//!
//! All errors that can occur in the slot store.

use thiserror::Error;

use crate::store::Handle;

/// Errors that can occur in the slot store.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The handle does not refer to a live value of this store.
    ///
    /// Either the value was removed (stale generation), or the handle was
    /// issued by a different store.
    #[error("invalid handle {handle:?}")]
    InvalidHandle {
        /// The rejected handle.
        handle: Handle,
    },

    /// The indirection table already spans the whole 32-bit index space.
    #[error("slot index space exhausted at {slots} slots")]
    SlotsExhausted {
        /// Number of slots in the table.
        slots: usize,
    },

    /// Growing the table or the dense array failed.
    #[error("allocation failed while growing storage for {requested} more entries")]
    AllocationFailed {
        /// Number of additional entries requested.
        requested: usize,
    },
}

/// Result type for slot store operations.
pub type StoreResult<T> = Result<T, StoreError>;
