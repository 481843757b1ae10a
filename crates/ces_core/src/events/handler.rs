//! Event handler capability.

use std::marker::PhantomData;

use super::event::{Event, TypedEvent};

/// A stateful predicate over events.
///
/// Returning `true` consumes the event: it is removed from the queue and no
/// later handler sees it. Returning `false` passes it on. Side effects are
/// allowed either way.
///
/// Any `FnMut(&Event) -> bool` closure is a handler.
pub trait EventHandler {
    /// Offers `event` to this handler.
    fn handle(&mut self, event: &Event) -> bool;
}

impl<F> EventHandler for F
where
    F: FnMut(&Event) -> bool,
{
    #[inline]
    fn handle(&mut self, event: &Event) -> bool {
        self(event)
    }
}

/// Handler adapter that only sees events of one [`TypedEvent`] kind.
///
/// Created by [`typed`].
pub struct Typed<E, F> {
    func: F,
    _event: PhantomData<fn(E)>,
}

impl<E, F> EventHandler for Typed<E, F>
where
    E: TypedEvent,
    F: FnMut(E) -> bool,
{
    fn handle(&mut self, event: &Event) -> bool {
        match event.decode::<E>() {
            Some(value) => (self.func)(value),
            None => false,
        }
    }
}

/// Wraps `func` so it is only called for events of kind `E::KIND`, with the
/// payload already decoded. Other kinds are passed on.
pub fn typed<E, F>(func: F) -> Typed<E, F>
where
    E: TypedEvent,
    F: FnMut(E) -> bool,
{
    Typed {
        func,
        _event: PhantomData,
    }
}
