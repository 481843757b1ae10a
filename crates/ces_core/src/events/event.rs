//! # Event Records
//!
//! An [`Event`] is a 64-byte record: a 4-byte [`EventKind`] followed by a
//! 60-byte [`EventPayload`].
//!
//! ```text
//! ┌──────────┬──────────────────────────────┬─────────────────────────┐
//! │ kind u32 │ core [u8; 32]                │ aux [u8; 28]            │
//! └──────────┴──────────────────────────────┴─────────────────────────┘
//!            │<────────────── payload, 60 bytes ─────────────────────>│
//! ```
//!
//! The dispatcher never looks inside the payload. Producers and consumers
//! agree on a layout per kind, either through the raw views below or
//! through a [`TypedEvent`] type.

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;

use bytemuck::{Pod, Zeroable};

/// Payload size in bytes.
pub const PAYLOAD_SIZE: usize = 60;
/// Size of the leading "core" region of the payload.
pub const CORE_SIZE: usize = 32;
/// Size of the trailing "aux" region of the payload.
pub const AUX_SIZE: usize = PAYLOAD_SIZE - CORE_SIZE;
/// Number of 32-bit words in the payload.
pub const PAYLOAD_WORDS: usize = PAYLOAD_SIZE / 4;
/// Number of whole 64-bit words in the payload (one 32-bit word remains).
pub const PAYLOAD_QUADS: usize = PAYLOAD_SIZE / 8;

/// Integer discriminator telling consumers how to read a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
#[repr(transparent)]
pub struct EventKind(pub u32);

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kind#{}", self.0)
    }
}

/// Opaque 60-byte event payload.
///
/// Multi-byte views (`word`, `quad`) use little-endian byte order so the
/// layout can double as a wire format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct EventPayload {
    core: [u8; CORE_SIZE],
    aux: [u8; AUX_SIZE],
}

impl EventPayload {
    /// All-zero payload.
    pub const ZERO: Self = Self {
        core: [0; CORE_SIZE],
        aux: [0; AUX_SIZE],
    };

    /// Builds a payload from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; PAYLOAD_SIZE]) -> Self {
        bytemuck::cast(bytes)
    }

    /// Builds a payload from 15 little-endian 32-bit words.
    #[must_use]
    pub fn from_words(words: [u32; PAYLOAD_WORDS]) -> Self {
        let mut payload = Self::ZERO;
        for (i, word) in words.into_iter().enumerate() {
            payload.set_word(i, word);
        }
        payload
    }

    /// Raw byte view.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; PAYLOAD_SIZE] {
        bytemuck::cast_ref(self)
    }

    /// Mutable raw byte view.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8; PAYLOAD_SIZE] {
        bytemuck::cast_mut(self)
    }

    /// The leading 32-byte region.
    #[inline]
    #[must_use]
    pub const fn core(&self) -> &[u8; CORE_SIZE] {
        &self.core
    }

    /// Mutable leading 32-byte region.
    #[inline]
    pub fn core_mut(&mut self) -> &mut [u8; CORE_SIZE] {
        &mut self.core
    }

    /// The trailing 28-byte region.
    #[inline]
    #[must_use]
    pub const fn aux(&self) -> &[u8; AUX_SIZE] {
        &self.aux
    }

    /// Mutable trailing 28-byte region.
    #[inline]
    pub fn aux_mut(&mut self) -> &mut [u8; AUX_SIZE] {
        &mut self.aux
    }

    /// Reads 32-bit word `index` (0..15).
    ///
    /// # Panics
    ///
    /// Panics if `index >= PAYLOAD_WORDS`.
    #[must_use]
    pub fn word(&self, index: usize) -> u32 {
        assert!(index < PAYLOAD_WORDS, "word index {index} out of range");
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&self.as_bytes()[index * 4..index * 4 + 4]);
        u32::from_le_bytes(buf)
    }

    /// Writes 32-bit word `index` (0..15).
    ///
    /// # Panics
    ///
    /// Panics if `index >= PAYLOAD_WORDS`.
    pub fn set_word(&mut self, index: usize, value: u32) {
        assert!(index < PAYLOAD_WORDS, "word index {index} out of range");
        self.as_bytes_mut()[index * 4..index * 4 + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// All 15 words.
    #[must_use]
    pub fn words(&self) -> [u32; PAYLOAD_WORDS] {
        let mut words = [0u32; PAYLOAD_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.word(i);
        }
        words
    }

    /// Reads 64-bit word `index` (0..7).
    ///
    /// The final 4 bytes are only reachable as word 14.
    ///
    /// # Panics
    ///
    /// Panics if `index >= PAYLOAD_QUADS`.
    #[must_use]
    pub fn quad(&self, index: usize) -> u64 {
        assert!(index < PAYLOAD_QUADS, "quad index {index} out of range");
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.as_bytes()[index * 8..index * 8 + 8]);
        u64::from_le_bytes(buf)
    }

    /// Writes 64-bit word `index` (0..7).
    ///
    /// # Panics
    ///
    /// Panics if `index >= PAYLOAD_QUADS`.
    pub fn set_quad(&mut self, index: usize, value: u64) {
        assert!(index < PAYLOAD_QUADS, "quad index {index} out of range");
        self.as_bytes_mut()[index * 8..index * 8 + 8].copy_from_slice(&value.to_le_bytes());
    }
}

impl Default for EventPayload {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for EventPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventPayload").field(&self.words()).finish()
    }
}

/// A strongly typed payload bound to one [`EventKind`].
///
/// The type must be plain old data no larger than [`PAYLOAD_SIZE`]. Larger
/// types fail to compile at the call site of [`Event::encode`].
///
/// ```
/// use bytemuck::{Pod, Zeroable};
/// use ces_core::{Event, EventKind, TypedEvent};
///
/// #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
/// #[repr(C)]
/// struct Moved {
///     x: f32,
///     y: f32,
/// }
///
/// impl TypedEvent for Moved {
///     const KIND: EventKind = EventKind(1);
/// }
///
/// let event = Event::encode(&Moved { x: 1.0, y: 2.0 });
/// assert_eq!(event.kind(), EventKind(1));
/// assert_eq!(event.decode::<Moved>(), Some(Moved { x: 1.0, y: 2.0 }));
/// ```
pub trait TypedEvent: Pod {
    /// Kind tag written into every event carrying this type.
    const KIND: EventKind;
}

/// Compile-time check that `E` fits in a payload.
struct FitsPayload<E>(PhantomData<E>);

impl<E> FitsPayload<E> {
    const OK: () = assert!(
        size_of::<E>() <= PAYLOAD_SIZE,
        "typed event does not fit in a 60-byte payload"
    );
}

/// A queued event: kind tag plus opaque payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Event {
    kind: EventKind,
    payload: EventPayload,
}

impl Event {
    /// Creates an event from a kind and raw payload.
    #[inline]
    #[must_use]
    pub const fn new(kind: EventKind, payload: EventPayload) -> Self {
        Self { kind, payload }
    }

    /// Creates an event with an all-zero payload.
    #[inline]
    #[must_use]
    pub const fn signal(kind: EventKind) -> Self {
        Self::new(kind, EventPayload::ZERO)
    }

    /// Creates an event from a typed payload. Unused trailing bytes are zero.
    #[must_use]
    pub fn encode<E: TypedEvent>(value: &E) -> Self {
        let () = FitsPayload::<E>::OK;
        let mut payload = EventPayload::ZERO;
        payload.as_bytes_mut()[..size_of::<E>()].copy_from_slice(bytemuck::bytes_of(value));
        Self::new(E::KIND, payload)
    }

    /// Reads a typed payload back, if this event has `E`'s kind.
    #[must_use]
    pub fn decode<E: TypedEvent>(&self) -> Option<E> {
        let () = FitsPayload::<E>::OK;
        if self.kind != E::KIND {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(
            &self.payload.as_bytes()[..size_of::<E>()],
        ))
    }

    /// Returns `true` if this event carries kind `E::KIND`.
    #[inline]
    #[must_use]
    pub fn is<E: TypedEvent>(&self) -> bool {
        self.kind == E::KIND
    }

    /// The event kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// The raw payload.
    #[inline]
    #[must_use]
    pub const fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// The raw payload, mutably.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut EventPayload {
        &mut self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Damage {
        target: u64,
        amount: u32,
        critical: u32,
    }

    impl TypedEvent for Damage {
        const KIND: EventKind = EventKind(7);
    }

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Tick {
        frame: u32,
    }

    impl TypedEvent for Tick {
        const KIND: EventKind = EventKind(8);
    }

    #[test]
    fn test_layout_sizes() {
        assert_eq!(size_of::<EventPayload>(), 60);
        assert_eq!(size_of::<Event>(), 64);
        assert_eq!(AUX_SIZE, 28);
    }

    #[test]
    fn test_typed_decode_checks_kind() {
        let damage = Damage {
            target: 0xDEAD_BEEF_0000_0001,
            amount: 25,
            critical: 1,
        };
        let event = Event::encode(&damage);

        assert!(event.is::<Damage>());
        assert_eq!(event.decode::<Damage>(), Some(damage));
        let decoded = event.decode::<Damage>().unwrap();
        assert_eq!(
            (decoded.target, decoded.amount, decoded.critical),
            (0xDEAD_BEEF_0000_0001, 25, 1)
        );
        assert_eq!(event.decode::<Tick>(), None);
    }

    #[test]
    fn test_encode_zero_fills_tail() {
        let event = Event::encode(&Tick { frame: 3 });
        assert_eq!(event.decode::<Tick>().map(|tick| tick.frame), Some(3));
        assert_eq!(&event.payload().as_bytes()[..4], &3u32.to_ne_bytes());
        assert!(event.payload().as_bytes()[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_word_views_are_little_endian() {
        let mut payload = EventPayload::ZERO;
        payload.set_word(0, 0x0403_0201);
        payload.set_word(14, 0xAABB_CCDD);

        assert_eq!(&payload.as_bytes()[..4], &[1, 2, 3, 4]);
        assert_eq!(&payload.aux()[24..], &[0xDD, 0xCC, 0xBB, 0xAA]);
        assert_eq!(payload.quad(0), 0x0403_0201);
    }

    #[test]
    fn test_quad_and_word_overlap() {
        let mut payload = EventPayload::ZERO;
        payload.set_quad(6, 0x1111_2222_3333_4444);
        assert_eq!(payload.word(12), 0x3333_4444);
        assert_eq!(payload.word(13), 0x1111_2222);
        assert_eq!(payload.word(14), 0);
    }

    #[test]
    fn test_core_and_aux_regions() {
        let mut payload = EventPayload::ZERO;
        payload.core_mut()[31] = 9;
        payload.aux_mut()[0] = 10;
        assert_eq!(payload.as_bytes()[31], 9);
        assert_eq!(payload.as_bytes()[32], 10);
    }

    #[test]
    fn test_words_constructor() {
        let mut words = [0u32; PAYLOAD_WORDS];
        words[3] = 42;
        let payload = EventPayload::from_words(words);
        assert_eq!(payload.words(), words);
        assert_eq!(EventPayload::from_bytes(*payload.as_bytes()), payload);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_word_out_of_range() {
        let _ = EventPayload::ZERO.word(PAYLOAD_WORDS);
    }
}
