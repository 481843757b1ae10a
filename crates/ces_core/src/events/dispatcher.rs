//! # Event Dispatcher
//!
//! Deferred, first-match event delivery.
//!
//! ```text
//! enqueue ──> [ e0 | e1 | e2 | ... ] ──drain──> for each event:
//!                                                  h0? h1? h2? ...
//!                                                  first `true` consumes it,
//!                                                  no match keeps it queued
//! ```

use std::fmt;

use super::event::{Event, TypedEvent};
use super::handler::EventHandler;

/// Outcome of a single [`EventDispatcher::drain`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Events that were in the queue when the drain started.
    pub evaluated: usize,
    /// Events consumed by some handler.
    pub consumed: usize,
    /// Events left in the queue afterwards.
    pub pending: usize,
}

/// Registry of handlers plus a queue of pending events.
///
/// Events are not delivered on [`enqueue`](Self::enqueue). They wait until
/// the owner of the update cycle calls [`drain`](Self::drain).
///
/// # Thread Safety
///
/// Single-threaded. Handlers need not be `Send`.
///
/// # Example
///
/// ```
/// use ces_core::{Event, EventDispatcher, EventKind};
///
/// let mut events = EventDispatcher::new();
/// events.register(|event: &Event| event.kind() == EventKind(1));
///
/// events.enqueue(Event::signal(EventKind(1)));
/// events.enqueue(Event::signal(EventKind(99)));
///
/// let report = events.drain();
/// assert_eq!(report.consumed, 1);
/// assert_eq!(events.pending_len(), 1); // kind 99 waits for a handler
/// ```
#[derive(Default)]
pub struct EventDispatcher {
    /// Handlers in registration order.
    handlers: Vec<Box<dyn EventHandler>>,
    /// Pending events in arrival order.
    queue: Vec<Event>,
}

impl EventDispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dispatcher with room for `capacity` pending events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handlers: Vec::new(),
            queue: Vec::with_capacity(capacity),
        }
    }

    /// Appends a handler. Handlers are tried in registration order.
    ///
    /// There is no deduplication: registering the same logic twice means it
    /// is offered each event twice.
    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Appends an already boxed handler.
    pub fn register_boxed(&mut self, handler: Box<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Queues an event for the next [`drain`](Self::drain). O(1).
    #[inline]
    pub fn enqueue(&mut self, event: Event) {
        self.queue.push(event);
    }

    /// Encodes and queues a typed event.
    #[inline]
    pub fn publish<E: TypedEvent>(&mut self, value: &E) {
        self.enqueue(Event::encode(value));
    }

    /// Offers every pending event to the handlers, once.
    ///
    /// Each event present when the call starts is evaluated exactly once, in
    /// queue order. For each event the handlers are tried from the first
    /// registered one until one consumes it. Consumed events are removed;
    /// the rest stay queued, in their original relative order, for the next
    /// call.
    ///
    /// An empty queue returns immediately without touching any handler.
    pub fn drain(&mut self) -> DrainReport {
        let evaluated = self.queue.len();
        if evaluated == 0 {
            return DrainReport::default();
        }

        let handlers = &mut self.handlers;
        self.queue
            .retain(|event| !handlers.iter_mut().any(|handler| handler.handle(event)));

        let pending = self.queue.len();
        let report = DrainReport {
            evaluated,
            consumed: evaluated - pending,
            pending,
        };
        tracing::debug!(
            evaluated = report.evaluated,
            consumed = report.consumed,
            pending = report.pending,
            "drained event queue"
        );
        report
    }

    /// Number of events waiting in the queue.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Checks if no events are waiting.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterates over pending events in queue order.
    pub fn pending(&self) -> impl Iterator<Item = &Event> + '_ {
        self.queue.iter()
    }

    /// Number of registered handlers.
    #[inline]
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Drops every pending event without offering it to any handler.
    ///
    /// Returns the number of events discarded.
    pub fn clear_pending(&mut self) -> usize {
        let discarded = self.queue.len();
        self.queue.clear();
        discarded
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .field("pending", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event::{EventKind, EventPayload};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Event of `kind` whose first payload word is `tag`.
    fn tagged(kind: u32, tag: u32) -> Event {
        let mut payload = EventPayload::ZERO;
        payload.set_word(0, tag);
        Event::new(EventKind(kind), payload)
    }

    /// Handler matching `kind` that logs `(name, tag)` for every call.
    fn recording(
        name: &'static str,
        kind: u32,
        log: &Rc<RefCell<Vec<(&'static str, u32)>>>,
    ) -> impl EventHandler + 'static {
        let log = Rc::clone(log);
        move |event: &Event| {
            log.borrow_mut().push((name, event.payload().word(0)));
            event.kind() == EventKind(kind)
        }
    }

    #[test]
    fn test_first_match_consumes_in_queue_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut events = EventDispatcher::new();
        events.register(recording("h1", 1, &log));
        events.register(recording("h2", 2, &log));

        events.enqueue(tagged(1, 10));
        events.enqueue(tagged(2, 20));
        events.enqueue(tagged(1, 30));

        let report = events.drain();
        assert_eq!(
            report,
            DrainReport {
                evaluated: 3,
                consumed: 3,
                pending: 0
            }
        );
        assert!(events.is_empty());
        // h1 is always tried first; h2 only sees what h1 declined.
        assert_eq!(
            *log.borrow(),
            vec![("h1", 10), ("h1", 20), ("h2", 20), ("h1", 30)]
        );
    }

    #[test]
    fn test_unmatched_event_persists() {
        let mut events = EventDispatcher::new();
        events.register(|event: &Event| event.kind() == EventKind(1));
        events.enqueue(tagged(99, 0));

        let report = events.drain();
        assert_eq!(report.consumed, 0);
        assert_eq!(events.pending_len(), 1);

        events.register(|event: &Event| event.kind() == EventKind(99));
        let report = events.drain();
        assert_eq!(report.consumed, 1);
        assert!(events.is_empty());
    }

    #[test]
    fn test_pending_keeps_relative_order() {
        let mut events = EventDispatcher::new();
        events.register(|event: &Event| event.kind() == EventKind(1));

        for (kind, tag) in [(5, 1), (1, 2), (6, 3), (1, 4), (5, 5)] {
            events.enqueue(tagged(kind, tag));
        }
        events.drain();

        let tags: Vec<_> = events.pending().map(|e| e.payload().word(0)).collect();
        assert_eq!(tags, vec![1, 3, 5]);
    }

    #[test]
    fn test_each_event_evaluated_once_per_drain() {
        let calls = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&calls);
        let mut events = EventDispatcher::new();
        events.register(move |_: &Event| {
            *counter.borrow_mut() += 1;
            false
        });

        for tag in 0..4 {
            events.enqueue(tagged(3, tag));
        }
        events.drain();
        assert_eq!(*calls.borrow(), 4);
        events.drain();
        assert_eq!(*calls.borrow(), 8);
    }

    #[test]
    fn test_drain_empty_queue_is_noop() {
        let calls = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&calls);
        let mut events = EventDispatcher::new();
        events.register(move |_: &Event| {
            *counter.borrow_mut() += 1;
            true
        });

        assert_eq!(events.drain(), DrainReport::default());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_duplicate_registration_is_kept() {
        let mut events = EventDispatcher::new();
        let handler = |event: &Event| event.kind() == EventKind(1);
        events.register(handler);
        events.register(handler);
        assert_eq!(events.handler_count(), 2);
    }

    #[test]
    fn test_register_boxed_keeps_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut events = EventDispatcher::new();
        events.register(recording("plain", 2, &log));
        let boxed: Box<dyn EventHandler> = Box::new(recording("boxed", 1, &log));
        events.register_boxed(boxed);
        assert_eq!(events.handler_count(), 2);

        events.enqueue(tagged(1, 7));
        let report = events.drain();
        assert_eq!(report.consumed, 1);
        assert_eq!(*log.borrow(), vec![("plain", 7), ("boxed", 7)]);
    }

    #[test]
    fn test_clear_pending() {
        let mut events = EventDispatcher::with_capacity(4);
        events.enqueue(tagged(1, 0));
        events.enqueue(tagged(2, 0));
        assert_eq!(events.clear_pending(), 2);
        assert!(events.is_empty());
    }
}
