//! # Handles
//!
//! A handle is the only way to refer to a value held by a
//! [`SlotStore`](super::SlotStore). It is a single `u64` made of:
//! - Lower 32 bits: slot index into the indirection table
//! - Upper 32 bits: generation of that slot when the handle was issued

use std::fmt;

/// Opaque, generation-qualified reference into a [`SlotStore`](super::SlotStore).
///
/// Handles are `Copy` and cheap to pass around. They stay valid while the
/// value they were issued for is alive, no matter how often the store
/// compacts its dense array. Once that value is removed the handle never
/// validates again, even if its slot is recycled.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Handle(u64);

impl Handle {
    /// Null handle. Never issued by any store.
    pub const NULL: Self = Self(u64::MAX);

    /// Packs a slot index and generation into a handle.
    #[inline]
    #[must_use]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the slot index portion of the handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the raw 64-bit representation.
    ///
    /// Useful for packing a handle into an event payload. The value is only
    /// meaningful to the store that issued it.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds a handle from [`Handle::to_bits`] output.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Checks if this is the null handle.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }

    /// Same slot, next generation.
    #[inline]
    #[must_use]
    pub(crate) const fn next_generation(self) -> Self {
        Self::new(self.index(), self.generation() + 1)
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Handle(null)")
        } else {
            write!(f, "Handle({}v{})", self.index(), self.generation())
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_fields() {
        let handle = Handle::new(12345, 67890);
        assert_eq!(handle.index(), 12345);
        assert_eq!(handle.generation(), 67890);
        assert_eq!(handle.to_bits(), (67890u64 << 32) | 12345);
    }

    #[test]
    fn test_next_generation_keeps_index() {
        let handle = Handle::new(7, 1).next_generation();
        assert_eq!(handle.index(), 7);
        assert_eq!(handle.generation(), 2);
    }

    #[test]
    fn test_null_and_default() {
        assert!(Handle::NULL.is_null());
        assert!(Handle::default().is_null());
        assert!(!Handle::new(0, 1).is_null());
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", Handle::new(3, 2)), "Handle(3v2)");
        assert_eq!(format!("{:?}", Handle::NULL), "Handle(null)");
    }
}
